//! # The Net Graph
//!
//! All nodes live in one [`Netlist`] arena and are named by [`NodeId`]
//! handles. A [`NetPointer`] names one input port of one node.
//!
//! ```text
//!            fan-in (≤ 4)                 fan-out (owned edge list)
//!   driver ──► port 0 ┐                  ┌──► NetPointer(n7, 0)
//!   driver ──► port 1 ├─► [ functor ] ───┼──► NetPointer(n9, 2)
//!   driver ──► port 2 │                  └──► NetPointer(n3, 1)
//!   driver ──► port 3 ┘
//! ```
//!
//! Every node owns its fan-out list. A port accepts at most one driver, so
//! the set of edges into a node is also bounded at 4 and recorded on the
//! receiving node for `disconnect` and diagnostics.
//!
//! Graph construction (`create_*`, `connect`) reports mistakes as
//! `Err(..)`. Delivery (`send_*`, `deliver_*`, in `propagate`) assumes a
//! well-formed graph and treats violations as fatal.

pub mod functor;
mod propagate;

use std::any::Any;
use std::fmt;

use serde::{Deserialize, Serialize};
use smallvec::SmallVec;
use tracing::debug;

use crate::config::NetlistConfig;
use crate::signal::{RealSignal, StrengthSignal, VectorSignal};
use crate::functor::Drive;
use crate::value::{Vector4, Vector8};
use crate::vpi::{CallbackId, SignalQuery, SignalValue, ValueCallback, ValueFormat};
use crate::{Error, Result};

pub use functor::{Emission, FunctorCapabilities, NetFunctor, Outbox};

/// Number of input ports on every node.
pub const PORT_COUNT: usize = 4;

// ============================================================================
// NodeId / NetPointer
// ============================================================================

/// Stable handle of a node in a `Netlist`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct NodeId(pub u32);

impl NodeId {
    #[inline]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "n{}", self.0)
    }
}

/// One input port of one node, or nil.
///
/// Equality is by (node, port). The default value is nil.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct NetPointer {
    target: Option<(NodeId, u8)>,
}

impl NetPointer {
    pub const NIL: NetPointer = NetPointer { target: None };

    /// Point at `port` of `node`. Ports above 3 are fatal.
    pub fn new(node: NodeId, port: usize) -> Self {
        if port >= PORT_COUNT {
            contract_violation!("port {port} of {node} out of range (nodes have {PORT_COUNT} ports)");
        }
        Self { target: Some((node, port as u8)) }
    }

    pub fn is_nil(&self) -> bool {
        self.target.is_none()
    }

    pub fn node(&self) -> Option<NodeId> {
        self.target.map(|(node, _)| node)
    }

    /// Port index, 0 for nil.
    pub fn port(&self) -> usize {
        self.target.map_or(0, |(_, port)| port as usize)
    }
}

impl fmt::Display for NetPointer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.target {
            Some((node, port)) => write!(f, "{node}:{port}"),
            None => write!(f, "nil"),
        }
    }
}

// ============================================================================
// Net
// ============================================================================

/// A graph node: 4 input ports, an owned fan-out list, an optional
/// functor, and a flags word for the elaborator.
#[derive(Default)]
pub struct Net {
    drivers: [Option<NodeId>; PORT_COUNT],
    fanout: SmallVec<[NetPointer; 2]>,
    functor: Option<Box<dyn NetFunctor>>,
    flags: u32,
}

impl Net {
    /// The node currently driving `port`, if any.
    pub fn driver(&self, port: usize) -> Option<NodeId> {
        self.drivers.get(port).copied().flatten()
    }

    pub fn fanout(&self) -> &[NetPointer] {
        &self.fanout
    }

    pub fn functor(&self) -> Option<&dyn NetFunctor> {
        self.functor.as_deref()
    }

    pub fn has_functor(&self) -> bool {
        self.functor.is_some()
    }

    pub fn flags(&self) -> u32 {
        self.flags
    }

    pub fn set_flags(&mut self, flags: u32) {
        self.flags = flags;
    }
}

impl fmt::Debug for Net {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Net")
            .field("drivers", &self.drivers)
            .field("fanout", &self.fanout)
            .field("functor", &self.functor.as_ref().map(|fun| fun.kind()))
            .field("flags", &self.flags)
            .finish()
    }
}

// ============================================================================
// Netlist
// ============================================================================

/// Arena of nets.
///
/// Nodes are created during elaboration and live as long as the netlist.
#[derive(Debug, Default)]
pub struct Netlist {
    nets: Vec<Net>,
    config: NetlistConfig,
}

impl Netlist {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_config(config: NetlistConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { nets: Vec::with_capacity(config.node_capacity), config })
    }

    pub fn config(&self) -> &NetlistConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.nets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nets.is_empty()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        (0..self.nets.len()).map(|idx| NodeId(idx as u32))
    }

    pub fn net(&self, id: NodeId) -> Result<&Net> {
        self.nets.get(id.index()).ok_or(Error::UnknownNode(id))
    }

    pub fn net_mut(&mut self, id: NodeId) -> Result<&mut Net> {
        self.nets.get_mut(id.index()).ok_or(Error::UnknownNode(id))
    }

    // ========================================================================
    // Construction
    // ========================================================================

    /// Add a node with `functor` bound to it.
    pub fn create_net(&mut self, functor: impl NetFunctor) -> NodeId {
        self.push(Net { functor: Some(Box::new(functor)), ..Net::default() })
    }

    /// Add a node with no functor. Deliveries to it are skipped.
    pub fn create_empty(&mut self) -> NodeId {
        self.push(Net::default())
    }

    fn push(&mut self, net: Net) -> NodeId {
        let id = NodeId(self.nets.len() as u32);
        debug!(node = %id, kind = net.functor.as_ref().map_or("empty", |f| f.kind()), "net created");
        self.nets.push(net);
        id
    }

    /// Bind (or replace) the functor of an existing node.
    pub fn set_functor(&mut self, id: NodeId, functor: impl NetFunctor) -> Result<()> {
        self.net_mut(id)?.functor = Some(Box::new(functor));
        Ok(())
    }

    /// Add `to` to the fan-out of `from`.
    pub fn connect(&mut self, from: NodeId, to: NetPointer) -> Result<()> {
        self.net(from)?;
        let Some(target) = to.node() else {
            return Err(Error::Unsupported(format!("connecting {from} to a nil port")));
        };
        let port = to.port();
        let dest = self.net_mut(target)?;
        if let Some(driver) = dest.drivers[port] {
            return Err(Error::PortInUse { node: target, port, driver });
        }
        dest.drivers[port] = Some(from);
        self.nets[from.index()].fanout.push(to);
        debug!(from = %from, to = %to, "edge connected");
        Ok(())
    }

    /// Remove the edge `from -> to`. Returns whether it existed.
    pub fn disconnect(&mut self, from: NodeId, to: NetPointer) -> Result<bool> {
        let fanout = &mut self.net_mut(from)?.fanout;
        let Some(pos) = fanout.iter().position(|p| *p == to) else {
            return Ok(false);
        };
        fanout.remove(pos);
        if let Some(target) = to.node() {
            self.net_mut(target)?.drivers[to.port()] = None;
        }
        debug!(from = %from, to = %to, "edge disconnected");
        Ok(true)
    }

    pub fn fanout(&self, id: NodeId) -> Result<&[NetPointer]> {
        Ok(self.net(id)?.fanout())
    }

    /// A `size`-bit vector signal, filled per `NetlistConfig::signal_init`.
    pub fn create_signal(&mut self, size: usize) -> NodeId {
        let init = self.config.signal_init;
        self.create_net(VectorSignal::new(size, init))
    }

    /// A strength-aware signal; vec4 inputs are promoted at the configured
    /// default drive.
    pub fn create_strength_signal(&mut self, size: usize) -> NodeId {
        let drive = self.config.default_drive;
        self.create_net(StrengthSignal::with_drive(size, drive))
    }

    pub fn create_real_signal(&mut self) -> NodeId {
        self.create_net(RealSignal::new())
    }

    /// A `Drive` node with both strengths at the configured default.
    pub fn create_drive(&mut self) -> NodeId {
        let drive = self.config.default_drive;
        self.create_net(Drive::new(drive, drive))
    }

    // ========================================================================
    // Functor access
    // ========================================================================

    /// The functor of `id`, if it is a `T`.
    pub fn functor<T: NetFunctor>(&self, id: NodeId) -> Option<&T> {
        let functor: &dyn Any = self.nets.get(id.index())?.functor.as_deref()?;
        functor.downcast_ref::<T>()
    }

    pub fn functor_mut<T: NetFunctor>(&mut self, id: NodeId) -> Option<&mut T> {
        let functor: &mut dyn Any = self.nets.get_mut(id.index())?.functor.as_deref_mut()?;
        functor.downcast_mut::<T>()
    }

    // ========================================================================
    // Procedural bridge
    // ========================================================================

    pub fn signal(&self, id: NodeId) -> Result<&dyn SignalQuery> {
        self.net(id)?
            .functor
            .as_deref()
            .and_then(|f| f.as_signal())
            .ok_or(Error::NotASignal(id))
    }

    pub fn signal_mut(&mut self, id: NodeId) -> Result<&mut dyn SignalQuery> {
        self.net_mut(id)?
            .functor
            .as_deref_mut()
            .and_then(|f| f.as_signal_mut())
            .ok_or(Error::NotASignal(id))
    }

    /// Current logical value of a vector or strength signal.
    pub fn signal_vec4(&self, id: NodeId) -> Result<Vector4> {
        match self.signal(id)?.get_value(ValueFormat::Vector4)? {
            SignalValue::Vector4(v) => Ok(v),
            other => Err(Error::Unsupported(format!("{id} returned {other:?} for a vector query"))),
        }
    }

    pub fn signal_vec8(&self, id: NodeId) -> Result<Vector8> {
        match self.signal(id)?.get_value(ValueFormat::Vector8)? {
            SignalValue::Vector8(v) => Ok(v),
            other => Err(Error::Unsupported(format!("{id} returned {other:?} for a strength query"))),
        }
    }

    pub fn get_value(&self, id: NodeId, format: ValueFormat) -> Result<SignalValue> {
        self.signal(id)?.get_value(format)
    }

    pub fn add_callback(&mut self, id: NodeId, callback: impl ValueCallback + 'static) -> Result<CallbackId> {
        Ok(self.signal_mut(id)?.callbacks_mut().add(Box::new(callback)))
    }

    pub fn remove_callback(&mut self, id: NodeId, callback: CallbackId) -> Result<bool> {
        Ok(self.signal_mut(id)?.callbacks_mut().remove(callback))
    }
}
