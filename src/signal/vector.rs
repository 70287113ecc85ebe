//! The logic-vector signal.

use tracing::debug;

use super::{AssignMode, PORT_CASSIGN, PORT_FORCE, PORT_INPUT, SignalCommand, SignalState};
use crate::net::{FunctorCapabilities, NetFunctor, NetPointer, Outbox};
use crate::value::{Bit4, Fill, Scalar, Strength, Vector2, Vector4, coerce_to_width};
use crate::vpi::{CallbackList, SignalQuery, SignalValue, ValueFormat};
use crate::Result;

const KIND: &str = "signal";

/// A `Vector4` net or register.
#[derive(Debug)]
pub struct VectorSignal {
    state: SignalState,
    /// Value of the unforced source (port 0, or port 1 while assigned).
    bits: Vector4,
    force: Vector4,
    /// Forced lanes; zero width when nothing is forced.
    force_mask: Vector2,
    /// Last port-0 value seen while a continuous assignment held the signal.
    shadowed: Option<Vector4>,
    callbacks: CallbackList,
}

impl VectorSignal {
    pub fn new(size: usize, init: Bit4) -> Self {
        Self {
            state: SignalState::new(),
            bits: Vector4::new(size, init),
            force: Vector4::new(size, Bit4::Z),
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

    /// Output bit `idx`: the forced value in forced lanes, else the tracked
    /// value. `x` past the end.
    pub fn value(&self, idx: usize) -> Bit4 {
        if self.force_mask.value(idx) {
            self.force.value(idx)
        } else {
            self.bits.value(idx)
        }
    }

    /// Output bit `idx` as a strong scalar.
    pub fn scalar_value(&self, idx: usize) -> Scalar {
        Scalar::new(self.value(idx), Strength::Strong)
    }

    /// The whole output vector.
    pub fn vec4_value(&self) -> Vector4 {
        if !self.is_forced() {
            return self.bits.clone();
        }
        let mut out = self.bits.clone();
        for idx in 0..out.size() {
            if self.force_mask.value(idx) {
                out.set_bit(idx, self.force.value(idx));
            }
        }
        out
    }

    /// The value of the unforced source, as tracked under any force.
    pub fn tracked_value(&self) -> &Vector4 {
        &self.bits
    }

    /// The latest port-0 value ignored because of a continuous assignment.
    pub fn shadowed_input(&self) -> Option<&Vector4> {
        self.shadowed.as_ref()
    }

    fn calculate_output(&mut self, from_force: bool, out: &mut Outbox) {
        // A fully forced output cannot move unless the force itself changed.
        if !from_force && self.force_mask.is_all_ones() {
            return;
        }
        let value = self.vec4_value();
        out.vec4(value.clone());
        self.callbacks.run(|| SignalValue::Vector4(value));
    }

    fn release(&mut self, command: SignalCommand, out: &mut Outbox) {
        self.state.released(KIND, command);
        match command {
            SignalCommand::ReleaseNet => {
                self.force_mask = Vector2::empty();
                out.vec4(self.bits.clone());
                let value = self.bits.clone();
                self.callbacks.run(|| SignalValue::Vector4(value));
            }
            _ => {
                // The output holds still: the forced lanes become the
                // tracked value until the source next changes.
                self.bits = self.vec4_value();
                self.force_mask = Vector2::empty();
            }
        }
    }

    /// Ports 0 and 1 carry whole values of the signal's own width.
    fn check_width(&self, port: NetPointer, width: usize) {
        if width != self.size() {
            contract_violation!("{width}-bit value sent to {}-bit signal at {port}", self.size());
        }
    }

    fn write_part(target: &mut Vector4, bit: &Vector4, base: usize) {
        for idx in 0..bit.size() {
            if base + idx >= target.size() {
                break;
            }
            target.set_bit(base + idx, bit.value(idx));
        }
    }
}

impl NetFunctor for VectorSignal {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn recv_vec4(&mut self, port: NetPointer, bit: &Vector4, out: &mut Outbox) {
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
                self.force = coerce_to_width(bit, self.size());
                self.force_mask = Vector2::filled(Fill::Ones, self.size());
                self.calculate_output(true, out);
            }
            _ => contract_violation!("vector value sent to signal command port {port}"),
        }
    }

    fn recv_vec4_pv(
        &mut self,
        port: NetPointer,
        bit: &Vector4,
        base: usize,
        wid: usize,
        vwid: usize,
        out: &mut Outbox,
    ) {
        if bit.size() != wid {
            contract_violation!("part of {} bits declared {wid} wide at {port}", bit.size());
        }
        if vwid != self.size() {
            contract_violation!("part for a {vwid}-bit vector sent to {}-bit signal at {port}", self.size());
        }
        match port.port() {
            PORT_INPUT => {
                if self.state.is_continuous_assign() {
                    let mut shadow = self.shadowed.take().unwrap_or_else(|| self.bits.clone());
                    Self::write_part(&mut shadow, bit, base);
                    self.shadowed = Some(shadow);
                } else {
                    Self::write_part(&mut self.bits, bit, base);
                    self.state.mark_initialized();
                    self.calculate_output(false, out);
                }
            }
            PORT_CASSIGN => {
                self.state.start_continuous_assign(KIND);
                Self::write_part(&mut self.bits, bit, base);
                self.calculate_output(false, out);
            }
            PORT_FORCE => {
                if !self.is_forced() {
                    debug!(signal = KIND, base, wid, "part force");
                    self.force_mask = Vector2::filled(Fill::Zeros, self.size());
                    self.force = Vector4::new(self.size(), Bit4::Z);
                }
                for idx in 0..wid {
                    if base + idx >= self.size() {
                        break;
                    }
                    self.force_mask.set_bit(base + idx, true);
                    self.force.set_bit(base + idx, bit.value(idx));
                }
                self.calculate_output(true, out);
            }
            _ => contract_violation!("part vector sent to signal command port {port}"),
        }
    }

    fn recv_long(&mut self, port: NetPointer, bit: i64, out: &mut Outbox) {
        match SignalCommand::decode(port, bit) {
            SignalCommand::Deassign => self.state.deassign(KIND),
            command => self.release(command, out),
        }
    }

    fn capabilities(&self) -> FunctorCapabilities {
        FunctorCapabilities { long: true, vec4_pv: true, ..Default::default() }
    }

    fn as_signal(&self) -> Option<&dyn SignalQuery> {
        Some(self)
    }

    fn as_signal_mut(&mut self) -> Option<&mut dyn SignalQuery> {
        Some(self)
    }
}

impl SignalQuery for VectorSignal {
    fn get_value(&self, format: ValueFormat) -> Result<SignalValue> {
        SignalValue::from_vec4(&self.vec4_value(), format)
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
