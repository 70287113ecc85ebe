//! Devices with more than four inputs.
//!
//! ```text
//!   WideInput (ports 0..3)  ──┐
//!   WideInput (ports 4..7)  ──┼──► WideCore<D> ──► fan-out
//!   WideInput (ports 8..)   ──┘
//! ```
//!
//! Shards are ordinary 4-port nodes. Each forwards what it receives to the
//! core as a change of one absolute input. The core keeps every input's
//! latest value in a [`WidePorts`] store and notifies its [`WideDevice`],
//! which reads whatever inputs it needs and emits through the core.

use crate::net::{FunctorCapabilities, NetFunctor, NetPointer, Netlist, NodeId, Outbox, PORT_COUNT};
use crate::sizer::LpmDevice;
use crate::value::Vector4;
use crate::{Error, Result};

/// A value forwarded from a shard to its core.
#[derive(Debug, Clone, PartialEq)]
pub enum WideValue {
    Vec4(Vector4),
    Real(f64),
}

// ============================================================================
// Port store
// ============================================================================

/// Latest value of every input of a wide device. Vector inputs start out
/// zero width, real inputs at 0.0.
#[derive(Debug, Clone)]
pub struct WidePorts {
    vec4: Vec<Vector4>,
    real: Vec<f64>,
}

impl WidePorts {
    fn new(count: usize) -> Self {
        Self { vec4: vec![Vector4::default(); count], real: vec![0.0; count] }
    }

    pub fn port_count(&self) -> usize {
        self.vec4.len()
    }

    pub fn value(&self, idx: usize) -> &Vector4 {
        match self.vec4.get(idx) {
            Some(v) => v,
            None => contract_violation!("wide input {idx} out of range for {} inputs", self.port_count()),
        }
    }

    pub fn value_r(&self, idx: usize) -> f64 {
        match self.real.get(idx) {
            Some(v) => *v,
            None => contract_violation!("wide input {idx} out of range for {} inputs", self.port_count()),
        }
    }
}

// ============================================================================
// Device contract
// ============================================================================

/// The computation behind a wide core.
pub trait WideDevice: 'static {
    fn kind(&self) -> &'static str {
        "wide"
    }

    /// Vector input `port` changed. Emitting into `out` propagates from the
    /// core.
    fn recv_vec4_from_inputs(&mut self, port: usize, ports: &WidePorts, out: &mut Outbox);

    /// Real input `port` changed.
    fn recv_real_from_inputs(&mut self, port: usize, _ports: &WidePorts, _out: &mut Outbox) {
        contract_violation!("{} does not accept real input {port}", self.kind());
    }

    fn device_info(&self) -> Option<LpmDevice> {
        None
    }
}

// ============================================================================
// Core and shards
// ============================================================================

/// The node that owns a wide device's inputs and output.
pub struct WideCore<D> {
    ports: WidePorts,
    device: D,
}

impl<D: WideDevice> WideCore<D> {
    pub fn new(device: D, nports: usize) -> Self {
        Self { ports: WidePorts::new(nports), device }
    }

    pub fn ports(&self) -> &WidePorts {
        &self.ports
    }

    pub fn device(&self) -> &D {
        &self.device
    }
}

impl<D: WideDevice> NetFunctor for WideCore<D> {
    fn kind(&self) -> &'static str {
        self.device.kind()
    }

    fn recv_vec4(&mut self, port: NetPointer, _bit: &Vector4, _out: &mut Outbox) {
        contract_violation!("{} core takes input through its shards, not {port}", self.device.kind());
    }

    fn recv_wide(&mut self, index: usize, value: WideValue, out: &mut Outbox) {
        let count = self.ports.port_count();
        if index >= count {
            contract_violation!("{} input {index} out of range for {count} inputs", self.device.kind());
        }
        match value {
            WideValue::Vec4(v) => {
                self.ports.vec4[index] = v;
                self.device.recv_vec4_from_inputs(index, &self.ports, out);
            }
            WideValue::Real(v) => {
                self.ports.real[index] = v;
                self.device.recv_real_from_inputs(index, &self.ports, out);
            }
        }
    }

    fn capabilities(&self) -> FunctorCapabilities {
        FunctorCapabilities { wide: true, ..Default::default() }
    }

    fn device_info(&self) -> Option<LpmDevice> {
        self.device.device_info()
    }
}

/// A 4-port shard covering inputs `base..base + 4` of a core.
#[derive(Debug, Clone, Copy)]
pub struct WideInput {
    core: NodeId,
    base: usize,
}

impl WideInput {
    pub fn new(core: NodeId, base: usize) -> Self {
        Self { core, base }
    }
}

impl NetFunctor for WideInput {
    fn kind(&self) -> &'static str {
        "wide_input"
    }

    fn recv_vec4(&mut self, port: NetPointer, bit: &Vector4, out: &mut Outbox) {
        out.forward_wide(self.core, self.base + port.port(), WideValue::Vec4(bit.clone()));
    }

    fn recv_real(&mut self, port: NetPointer, bit: f64, out: &mut Outbox) {
        out.forward_wide(self.core, self.base + port.port(), WideValue::Real(bit));
    }

    fn capabilities(&self) -> FunctorCapabilities {
        FunctorCapabilities { real: true, ..Default::default() }
    }
}

// ============================================================================
// Construction
// ============================================================================

/// Handles of a wide device built by `Netlist::create_wide`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WideHandle {
    /// The node whose fan-out carries the device output.
    pub core: NodeId,
    pub inputs: Vec<NodeId>,
    nports: usize,
}

impl WideHandle {
    pub fn port_count(&self) -> usize {
        self.nports
    }

    /// The shard port for absolute input `idx`.
    pub fn input(&self, idx: usize) -> NetPointer {
        if idx >= self.nports {
            contract_violation!("wide input {idx} out of range for {} inputs", self.nports);
        }
        NetPointer::new(self.inputs[idx / PORT_COUNT], idx % PORT_COUNT)
    }
}

impl Netlist {
    /// Build a core for `device` plus one shard per 4 inputs.
    pub fn create_wide<D: WideDevice>(&mut self, device: D, nports: usize) -> Result<WideHandle> {
        if nports == 0 {
            return Err(Error::Config(format!("wide device {} needs at least one input", device.kind())));
        }
        let core = self.create_net(WideCore::new(device, nports));
        let inputs = (0..nports.div_ceil(PORT_COUNT))
            .map(|shard| self.create_net(WideInput::new(core, shard * PORT_COUNT)))
            .collect();
        Ok(WideHandle { core, inputs, nports })
    }
}
