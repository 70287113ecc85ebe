//! End-to-end tests for devices with more than four inputs.

use logicnet::functor::{WideDevice, WidePorts};
use logicnet::{Bit4, NetPointer, Netlist, Outbox, SignalValue, ValueFormat, Vector4};
use pretty_assertions::assert_eq;

// ============================================================================
// Helper devices
// ============================================================================

/// Reduction AND over the low bit of every input.
struct WideAnd;

impl WideDevice for WideAnd {
    fn kind(&self) -> &'static str {
        "wide_and"
    }

    fn recv_vec4_from_inputs(&mut self, _port: usize, ports: &WidePorts, out: &mut Outbox) {
        let result = (0..ports.port_count())
            .map(|idx| ports.value(idx).value(0))
            .fold(Bit4::One, |acc, bit| acc & bit);
        out.vec4(Vector4::new(1, result));
    }
}

/// Sum of all real inputs.
struct RealSum;

impl WideDevice for RealSum {
    fn recv_vec4_from_inputs(&mut self, _port: usize, _ports: &WidePorts, _out: &mut Outbox) {}

    fn recv_real_from_inputs(&mut self, _port: usize, ports: &WidePorts, out: &mut Outbox) {
        out.real((0..ports.port_count()).map(|idx| ports.value_r(idx)).sum());
    }
}

// ============================================================================
// Tests
// ============================================================================

#[test]
fn test_wide_and_over_six_inputs() {
    let mut net = Netlist::new();
    let wide = net.create_wide(WideAnd, 6).unwrap();
    assert_eq!(wide.inputs.len(), 2);
    let sig = net.create_signal(1);
    net.connect(wide.core, NetPointer::new(sig, 0)).unwrap();

    let one = Vector4::new(1, Bit4::One);
    for idx in 0..5 {
        net.deliver_vec4(wide.input(idx), &one);
    }
    // Input 5 has not arrived yet, so it reads as x.
    assert_eq!(net.signal_vec4(sig).unwrap().value(0), Bit4::X);

    net.deliver_vec4(wide.input(5), &one);
    assert_eq!(net.signal_vec4(sig).unwrap().value(0), Bit4::One);

    net.deliver_vec4(wide.input(2), &Vector4::new(1, Bit4::Zero));
    assert_eq!(net.signal_vec4(sig).unwrap().value(0), Bit4::Zero);
}

#[test]
fn test_real_inputs_reach_core() {
    let mut net = Netlist::new();
    let wide = net.create_wide(RealSum, 5).unwrap();
    let sig = net.create_real_signal();
    net.connect(wide.core, NetPointer::new(sig, 0)).unwrap();

    net.deliver_real(wide.input(0), 1.5);
    net.deliver_real(wide.input(4), 2.0);
    assert_eq!(net.get_value(sig, ValueFormat::Real).unwrap(), SignalValue::Real(3.5));
}

#[test]
fn test_shards_can_be_driven_by_the_graph() {
    let mut net = Netlist::new();
    let wide = net.create_wide(WideAnd, 5).unwrap();
    let src = net.create_signal(1);
    for idx in 0..5 {
        net.connect(src, wide.input(idx)).unwrap();
    }
    let sig = net.create_signal(1);
    net.connect(wide.core, NetPointer::new(sig, 0)).unwrap();

    net.deliver_vec4(NetPointer::new(src, 0), &Vector4::new(1, Bit4::One));
    assert_eq!(net.signal_vec4(sig).unwrap().value(0), Bit4::One);
}

#[test]
#[should_panic(expected = "out of range")]
fn test_input_past_port_count_is_fatal() {
    let mut net = Netlist::new();
    let wide = net.create_wide(WideAnd, 5).unwrap();
    let _ = wide.input(5);
}
