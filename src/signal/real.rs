//! The real-valued signal.

use tracing::debug;

use super::{AssignMode, PORT_CASSIGN, PORT_FORCE, PORT_INPUT, SignalCommand, SignalState};
use crate::net::{FunctorCapabilities, NetFunctor, NetPointer, Outbox};
use crate::value::Vector4;
use crate::vpi::{CallbackList, SignalQuery, SignalValue, ValueFormat, unsupported_format};
use crate::Result;

const KIND: &str = "signal_real";

/// A `real` variable. The whole value is forced or not; there are no lanes.
#[derive(Debug)]
pub struct RealSignal {
    state: SignalState,
    bits: f64,
    force: f64,
    forced: bool,
    shadowed: Option<f64>,
    callbacks: CallbackList,
}

impl Default for RealSignal {
    fn default() -> Self {
        Self::new()
    }
}

impl RealSignal {
    pub fn new() -> Self {
        Self {
            state: SignalState::new(),
            bits: 0.0,
            force: 0.0,
            forced: false,
            shadowed: None,
            callbacks: CallbackList::new(),
        }
    }

    pub fn mode(&self) -> AssignMode {
        self.state.mode()
    }

    pub fn is_forced(&self) -> bool {
        self.forced
    }

    pub fn real_value(&self) -> f64 {
        if self.forced { self.force } else { self.bits }
    }

    pub fn tracked_value(&self) -> f64 {
        self.bits
    }

    pub fn shadowed_input(&self) -> Option<f64> {
        self.shadowed
    }

    fn propagate(&mut self, value: f64, out: &mut Outbox) {
        out.real(value);
        self.callbacks.run(|| SignalValue::Real(value));
    }
}

impl NetFunctor for RealSignal {
    fn kind(&self) -> &'static str {
        KIND
    }

    fn recv_vec4(&mut self, port: NetPointer, bit: &Vector4, _out: &mut Outbox) {
        contract_violation!("{}-bit vector sent to real signal at {port}", bit.size());
    }

    fn recv_real(&mut self, port: NetPointer, bit: f64, out: &mut Outbox) {
        match port.port() {
            PORT_INPUT => {
                if self.state.is_continuous_assign() {
                    self.shadowed = Some(bit);
                } else if self.state.needs_init() || self.bits.to_bits() != bit.to_bits() {
                    self.bits = bit;
                    self.state.mark_initialized();
                    if !self.forced {
                        self.propagate(bit, out);
                    }
                }
            }
            PORT_CASSIGN => {
                self.state.start_continuous_assign(KIND);
                self.bits = bit;
                if !self.forced {
                    self.propagate(bit, out);
                }
            }
            PORT_FORCE => {
                if !self.forced {
                    debug!(signal = KIND, "force");
                }
                self.force = bit;
                self.forced = true;
                self.propagate(bit, out);
            }
            _ => contract_violation!("real value sent to signal command port {port}"),
        }
    }

    fn recv_long(&mut self, port: NetPointer, bit: i64, out: &mut Outbox) {
        match SignalCommand::decode(port, bit) {
            SignalCommand::Deassign => self.state.deassign(KIND),
            command => {
                self.state.released(KIND, command);
                if command == SignalCommand::ReleaseNet {
                    self.forced = false;
                    self.propagate(self.bits, out);
                } else {
                    self.bits = self.real_value();
                    self.forced = false;
                }
            }
        }
    }

    fn capabilities(&self) -> FunctorCapabilities {
        FunctorCapabilities { real: true, long: true, ..Default::default() }
    }

    fn as_signal(&self) -> Option<&dyn SignalQuery> {
        Some(self)
    }

    fn as_signal_mut(&mut self) -> Option<&mut dyn SignalQuery> {
        Some(self)
    }
}

impl SignalQuery for RealSignal {
    fn get_value(&self, format: ValueFormat) -> Result<SignalValue> {
        let value = self.real_value();
        match format {
            ValueFormat::Real => Ok(SignalValue::Real(value)),
            // Verilog real-to-integer conversion rounds half away from zero.
            ValueFormat::Int => Ok(SignalValue::Int(value.round() as i64)),
            other => Err(unsupported_format(KIND, other)),
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

#[cfg(test)]
mod tests {
    use super::*;
    use crate::net::{Emission, NodeId};
    use crate::Error;

    fn port(p: usize) -> NetPointer {
        NetPointer::new(NodeId(0), p)
    }

    #[test]
    fn test_force_then_release_reg() {
        let mut sig = RealSignal::new();
        let mut out = Outbox::default();
        sig.recv_real(port(0), 1.0, &mut out);
        sig.recv_real(port(2), 2.5, &mut out);
        sig.recv_real(port(0), 3.0, &mut out);
        assert_eq!(out.emissions(), &[Emission::Real(1.0), Emission::Real(2.5)]);
        assert_eq!(sig.real_value(), 2.5);
        assert_eq!(sig.tracked_value(), 3.0);

        let mut out = Outbox::default();
        sig.recv_long(port(3), SignalCommand::ReleaseReg.code(), &mut out);
        assert!(out.is_empty());
        assert_eq!(sig.real_value(), 2.5);
        assert!(!sig.is_forced());
    }

    #[test]
    fn test_release_net_propagates_tracked() {
        let mut sig = RealSignal::new();
        let mut out = Outbox::default();
        sig.recv_real(port(0), 1.0, &mut out);
        sig.recv_real(port(2), 9.0, &mut out);
        let mut out = Outbox::default();
        sig.recv_long(port(3), SignalCommand::ReleaseNet.code(), &mut out);
        assert_eq!(out.emissions(), &[Emission::Real(1.0)]);
    }

    #[test]
    fn test_cassign_shadows_input() {
        let mut sig = RealSignal::new();
        let mut out = Outbox::default();
        sig.recv_real(port(1), 4.0, &mut out);
        sig.recv_real(port(0), 5.0, &mut out);
        assert_eq!(out.emissions(), &[Emission::Real(4.0)]);
        assert_eq!(sig.shadowed_input(), Some(5.0));
        assert_eq!(sig.mode(), AssignMode::ContinuousAssign);
    }

    #[test]
    fn test_value_formats() {
        let mut sig = RealSignal::new();
        sig.recv_real(port(0), 2.5, &mut Outbox::default());
        assert_eq!(sig.get_value(ValueFormat::Int).unwrap(), SignalValue::Int(3));
        assert!(matches!(sig.get_value(ValueFormat::Vector4), Err(Error::Unsupported(_))));
    }

    #[test]
    #[should_panic(expected = "sent to real signal")]
    fn test_vector_input_is_fatal() {
        RealSignal::new().recv_vec4(port(0), &Vector4::unknown(1), &mut Outbox::default());
    }
}
