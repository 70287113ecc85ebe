//! The strength-aware vector signal.

use tracing::debug;

use super::{AssignMode, PORT_CASSIGN, PORT_FORCE, PORT_INPUT, SignalCommand, SignalState};
use crate::net::{FunctorCapabilities, NetFunctor, NetPointer, Outbox};
use crate::value::{Bit4, Fill, Scalar, Strength, Vector2, Vector4, Vector8, coerce8_to_width};
use crate::vpi::{CallbackList, SignalQuery, SignalValue, ValueFormat};
use crate::Result;

const KIND: &str = "signal8";

/// A `Vector8` net. Logic vectors arriving at any data port are promoted
/// at the signal's drive strength.
#[derive(Debug)]
pub struct StrengthSignal {
    state: SignalState,
    drive: Strength,
    bits: Vector8,
    force: Vector8,
    force_mask: Vector2,
    shadowed: Option<Vector8>,
    callbacks: CallbackList,
}

impl StrengthSignal {
    /// A `size`-bit signal, initially HiZ, promoting logic input at Strong.
    pub fn new(size: usize) -> Self {
        Self::with_drive(size, Strength::Strong)
    }

    pub fn with_drive(size: usize, drive: Strength) -> Self {
        Self {
            state: SignalState::new(),
            drive,
            bits: Vector8::new(size),
            force: Vector8::new(size),
            force_mask: Vector2::empty(),
            shadowed: None,
            callbacks: CallbackList::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.bits.size()
    }

    pub fn mode(&self) -> AssignMode {
        self.state.mode()
    }

    pub fn is_forced(&self) -> bool {
        self.force_mask.size() > 0
    }

    /// Output scalar `idx`. Past the end reads as a strong `x`.
    pub fn scalar_value(&self, idx: usize) -> Scalar {
        if idx >= self.size() {
            return Scalar::new(Bit4::X, Strength::Strong);
        }
        if self.force_mask.value(idx) {
            self.force.value(idx)
        } else {
            self.bits.value(idx)
        }
    }

    pub fn value(&self, idx: usize) -> Bit4 {
        self.scalar_value(idx).value()
    }

    pub fn vec8_value(&self) -> Vector8 {
        if !self.is_forced() {
            return self.bits.clone();
        }
        (0..self.size()).map(|idx| self.scalar_value(idx)).collect()
    }

    pub fn vec4_value(&self) -> Vector4 {
        self.vec8_value().reduce4()
    }

    pub fn tracked_value(&self) -> &Vector8 {
        &self.bits
    }

    pub fn shadowed_input(&self) -> Option<&Vector8> {
        self.shadowed.as_ref()
    }

    fn calculate_output(&mut self, from_force: bool, out: &mut Outbox) {
        if !from_force && self.force_mask.is_all_ones() {
            return;
        }
        let value = self.vec8_value();
        out.vec8(value.clone());
        self.callbacks.run(|| SignalValue::Vector8(value));
    }

    fn release(&mut self, command: SignalCommand, out: &mut Outbox) {
        self.state.released(KIND, command);
        if command == SignalCommand::ReleaseNet {
            self.force_mask = Vector2::empty();
            out.vec8(self.bits.clone());
            let value = self.bits.clone();
            self.callbacks.run(|| SignalValue::Vector8(value));
        } else {
            self.bits = self.vec8_value();
            self.force_mask = Vector2::empty();
        }
    }

    fn check_width(&self, port: NetPointer, width: usize) {
        if width != self.size() {
            contract_violation!("{width}-bit value sent to {}-bit signal at {port}", self.size());
        }
    }
}

impl NetFunctor for StrengthSignal {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn recv_vec4(&mut self, port: NetPointer, bit: &Vector4, out: &mut Outbox) {
        let promoted = Vector8::from_vector4(bit, self.drive);
        self.recv_vec8(port, &promoted, out);
    }

    fn recv_vec8(&mut self, port: NetPointer, bit: &Vector8, out: &mut Outbox) {
        match port.port() {
            PORT_INPUT => {
                self.check_width(port, bit.size());
                if self.state.is_continuous_assign() {
                    self.shadowed = Some(bit.clone());
                } else if self.state.needs_init() || !self.bits.eeq(bit) {
                    self.bits = bit.clone();
                    self.state.mark_initialized();
                    self.calculate_output(false, out);
                }
            }
            PORT_CASSIGN => {
                self.check_width(port, bit.size());
                self.state.start_continuous_assign(KIND);
                self.bits = bit.clone();
                self.calculate_output(false, out);
            }
            PORT_FORCE => {
                if !self.is_forced() {
                    debug!(signal = KIND, width = self.size(), "force");
                }
                self.force = coerce8_to_width(bit, self.size());
                self.force_mask = Vector2::filled(Fill::Ones, self.size());
                self.calculate_output(true, out);
            }
            _ => contract_violation!("strength value sent to signal command port {port}"),
        }
    }

    fn recv_long(&mut self, port: NetPointer, bit: i64, out: &mut Outbox) {
        match SignalCommand::decode(port, bit) {
            SignalCommand::Deassign => self.state.deassign(KIND),
            command => self.release(command, out),
        }
    }

    fn capabilities(&self) -> FunctorCapabilities {
        FunctorCapabilities { vec8: true, long: true, ..Default::default() }
    }

    fn as_signal(&self) -> Option<&dyn SignalQuery> {
        Some(self)
    }

    fn as_signal_mut(&mut self) -> Option<&mut dyn SignalQuery> {
        Some(self)
    }
}

impl SignalQuery for StrengthSignal {
    fn get_value(&self, format: ValueFormat) -> Result<SignalValue> {
        match format {
            ValueFormat::Vector8 => Ok(SignalValue::Vector8(self.vec8_value())),
            other => SignalValue::from_vec4(&self.vec4_value(), other),
        }
    }

    fn callbacks(&self) -> &CallbackList {
        &self.callbacks
    }

    fn callbacks_mut(&mut self) -> &mut CallbackList {
        &mut self.callbacks
    }

    fn state(&self) -> &SignalState {
        &self.state
    }

    fn state_mut(&mut self) -> &mut SignalState {
        &mut self.state
    }
}
