//! The node behavior contract.
//!
//! A functor receives typed values at its node's ports and writes whatever
//! it wants to emit into an [`Outbox`]. The netlist delivers the outbox to
//! the node's fan-out once the receive call has returned.

use std::any::Any;

use smallvec::SmallVec;

use super::{NetPointer, NodeId};
use crate::functor::wide::WideValue;
use crate::sizer::LpmDevice;
use crate::value::{Vector4, Vector8};
use crate::vpi::SignalQuery;

// ============================================================================
// Capabilities
// ============================================================================

/// Which receive operations a functor implements beyond `recv_vec4`.
///
/// All fields default to false. The netlist consults this before every
/// delivery: a strength vector sent to a functor without `vec8` is reduced
/// to a `Vector4` and delivered through `recv_vec4`; any other unsupported
/// kind is a fatal graph error.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FunctorCapabilities {
    pub vec8: bool,
    pub real: bool,
    pub long: bool,
    pub vec4_pv: bool,
    /// Accepts forwarded inputs from wide-functor shards.
    pub wide: bool,
}

// ============================================================================
// Outbox
// ============================================================================

/// One value leaving a node.
#[derive(Debug, Clone, PartialEq)]
pub enum Emission {
    Vec4(Vector4),
    Vec8(Vector8),
    Real(f64),
    Long(i64),
    Vec4Pv { val: Vector4, base: usize, wid: usize, vwid: usize },
    /// Not sent on the fan-out: handed to the wide core `core` as the value
    /// of its absolute input `index`.
    Wide { core: NodeId, index: usize, value: WideValue },
}

/// Values produced by one receive call, in emission order.
#[derive(Debug, Default)]
pub struct Outbox {
    pending: SmallVec<[Emission; 1]>,
}

impl Outbox {
    pub fn vec4(&mut self, val: Vector4) {
        self.pending.push(Emission::Vec4(val));
    }

    pub fn vec8(&mut self, val: Vector8) {
        self.pending.push(Emission::Vec8(val));
    }

    pub fn real(&mut self, val: f64) {
        self.pending.push(Emission::Real(val));
    }

    pub fn long(&mut self, val: i64) {
        self.pending.push(Emission::Long(val));
    }

    pub fn vec4_pv(&mut self, val: Vector4, base: usize, wid: usize, vwid: usize) {
        self.pending.push(Emission::Vec4Pv { val, base, wid, vwid });
    }

    pub fn forward_wide(&mut self, core: NodeId, index: usize, value: WideValue) {
        self.pending.push(Emission::Wide { core, index, value });
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn emissions(&self) -> &[Emission] {
        &self.pending
    }

    pub(crate) fn into_emissions(self) -> SmallVec<[Emission; 1]> {
        self.pending
    }
}

// ============================================================================
// NetFunctor
// ============================================================================

/// Behavior bound to a `Net`.
///
/// Only `recv_vec4` is required. The other receive operations are called
/// only when `capabilities()` advertises them; their default bodies are
/// fatal so that a functor that advertises a capability it does not
/// implement is caught immediately.
pub trait NetFunctor: Any {
    /// Short name for logs and diagnostics.
    fn kind(&self) -> &'static str;

    fn recv_vec4(&mut self, port: NetPointer, bit: &Vector4, out: &mut Outbox);

    fn recv_vec8(&mut self, port: NetPointer, _bit: &Vector8, _out: &mut Outbox) {
        contract_violation!("{} at {port} advertises recv_vec8 but does not implement it", self.kind());
    }

    fn recv_real(&mut self, port: NetPointer, _bit: f64, _out: &mut Outbox) {
        contract_violation!("{} at {port} advertises recv_real but does not implement it", self.kind());
    }

    fn recv_long(&mut self, port: NetPointer, _bit: i64, _out: &mut Outbox) {
        contract_violation!("{} at {port} advertises recv_long but does not implement it", self.kind());
    }

    /// Part-select delivery: `bit` is `wid` bits destined for offset `base`
    /// of a `vwid`-bit vector.
    fn recv_vec4_pv(
        &mut self,
        port: NetPointer,
        _bit: &Vector4,
        _base: usize,
        _wid: usize,
        _vwid: usize,
        _out: &mut Outbox,
    ) {
        contract_violation!("{} at {port} advertises recv_vec4_pv but does not implement it", self.kind());
    }

    /// Wide-core input: absolute input `index` changed to `value`.
    fn recv_wide(&mut self, index: usize, _value: WideValue, _out: &mut Outbox) {
        contract_violation!("{} advertises wide input {index} but does not implement it", self.kind());
    }

    fn capabilities(&self) -> FunctorCapabilities {
        FunctorCapabilities::default()
    }

    /// The procedural-bridge view of this node, for signal functors.
    fn as_signal(&self) -> Option<&dyn SignalQuery> {
        None
    }

    fn as_signal_mut(&mut self) -> Option<&mut dyn SignalQuery> {
        None
    }

    /// Device description for the hardware-cost statistics pass.
    fn device_info(&self) -> Option<LpmDevice> {
        None
    }
}
