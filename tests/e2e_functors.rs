//! End-to-end tests for the combinational functors wired into netlists.

use logicnet::functor::{Concat, ExtendSigned, Repeat, Resolver};
use logicnet::{
    Bit4, Error, NetFunctor, NetPointer, Netlist, NodeId, Scalar, Strength, Vector4, Vector8,
};
use pretty_assertions::assert_eq;

fn v(s: &str) -> Vector4 {
    s.parse().unwrap()
}

/// Build `functor -> signal` and return (functor node, signal node).
fn into_signal(net: &mut Netlist, functor: impl NetFunctor, width: usize) -> (NodeId, NodeId) {
    let node = net.create_net(functor);
    let sig = net.create_signal(width);
    net.connect(node, NetPointer::new(sig, 0)).unwrap();
    (node, sig)
}

// ============================================================================
// 1. Concat
// ============================================================================

#[test]
fn test_concat_bit_order() {
    let mut net = Netlist::new();
    let (cat, sig) = into_signal(&mut net, Concat::new(2, 3, 0, 0), 5);
    net.deliver_vec4(NetPointer::new(cat, 0), &Vector4::from_u64(0b10, 2));
    net.deliver_vec4(NetPointer::new(cat, 1), &Vector4::from_u64(0b101, 3));
    assert_eq!(net.signal_vec4(sig).unwrap(), Vector4::from_u64(0b10110, 5));
}

#[test]
fn test_concat_four_inputs() {
    let mut net = Netlist::new();
    let (cat, sig) = into_signal(&mut net, Concat::new(1, 2, 3, 4), 10);
    for (port, bits) in ["1", "00", "111", "0z0z"].iter().enumerate() {
        net.deliver_vec4(NetPointer::new(cat, port), &v(bits));
    }
    assert_eq!(net.signal_vec4(sig).unwrap().to_string(), "0z0z111001");
}

#[test]
fn test_concat_reemits_whole_vector() {
    let mut net = Netlist::new();
    let (cat, sig) = into_signal(&mut net, Concat::new(1, 1, 0, 0), 2);
    net.deliver_vec4(NetPointer::new(cat, 1), &v("1"));
    assert_eq!(net.signal_vec4(sig).unwrap().to_string(), "1x");
    net.deliver_vec4(NetPointer::new(cat, 0), &v("0"));
    assert_eq!(net.signal_vec4(sig).unwrap().to_string(), "10");
}

// ============================================================================
// 2. Repeat and sign extension
// ============================================================================

#[test]
fn test_repeat_tiles_lsb_first() {
    let mut net = Netlist::new();
    let (rep, sig) = into_signal(&mut net, Repeat::new(8, 2).unwrap(), 8);
    net.deliver_vec4(NetPointer::new(rep, 0), &v("10x1"));
    assert_eq!(net.signal_vec4(sig).unwrap().to_string(), "10x110x1");
    assert!(matches!(Repeat::new(7, 2), Err(Error::Config(_))));
}

#[test]
fn test_sign_extend() {
    let mut net = Netlist::new();
    let (ext, sig) = into_signal(&mut net, ExtendSigned::new(8), 8);
    net.deliver_vec4(NetPointer::new(ext, 0), &Vector4::from_u64(0b1011, 4));
    assert_eq!(net.signal_vec4(sig).unwrap(), Vector4::from_u64(0b1111_1011, 8));

    net.deliver_vec4(NetPointer::new(ext, 0), &Vector4::from_u64(0b0101_0101, 8));
    assert_eq!(net.signal_vec4(sig).unwrap(), Vector4::from_u64(0b0101_0101, 8));
}

// ============================================================================
// 3. Drive and resolution
// ============================================================================

#[test]
fn test_two_drivers_through_resolver() {
    let mut net = Netlist::new();
    let strong = net.create_drive();
    let weak = net.create_drive();
    let res = net.create_net(Resolver::new());
    let wire = net.create_strength_signal(2);
    net.connect(strong, NetPointer::new(res, 0)).unwrap();
    net.connect(weak, NetPointer::new(res, 1)).unwrap();
    net.connect(res, NetPointer::new(wire, 0)).unwrap();

    net.deliver_long(NetPointer::new(weak, 1), Strength::Weak.level() as i64);
    net.deliver_long(NetPointer::new(weak, 2), Strength::Weak.level() as i64);
    net.deliver_vec4(NetPointer::new(weak, 0), &v("00"));
    net.deliver_vec4(NetPointer::new(strong, 0), &v("1z"));

    let value = net.signal_vec8(wire).unwrap();
    assert_eq!(value.value(1), Scalar::new(Bit4::One, Strength::Strong));
    assert_eq!(value.value(0), Scalar::new(Bit4::Zero, Strength::Weak));
    assert_eq!(net.signal_vec4(wire).unwrap().to_string(), "10");
}

#[test]
fn test_equal_drivers_conflict() {
    let mut net = Netlist::new();
    let res = net.create_net(Resolver::new());
    let wire = net.create_strength_signal(1);
    net.connect(res, NetPointer::new(wire, 0)).unwrap();

    net.deliver_vec8(NetPointer::new(res, 0), &Vector8::from_vector4(&v("1"), Strength::Pull));
    net.deliver_vec8(NetPointer::new(res, 1), &Vector8::from_vector4(&v("0"), Strength::Pull));
    let bit = net.signal_vec8(wire).unwrap().value(0);
    assert_eq!(bit.value(), Bit4::X);
    assert_eq!((bit.strength0(), bit.strength1()), (Strength::Pull, Strength::Pull));
}

#[test]
fn test_partial_driver_only_touches_its_lanes() {
    let mut net = Netlist::new();
    let res = net.create_net(Resolver::with_drive(Strength::Pull));
    let wire = net.create_strength_signal(4);
    net.connect(res, NetPointer::new(wire, 0)).unwrap();

    net.deliver_vec8(NetPointer::new(res, 0), &Vector8::from_vector4(&v("0000"), Strength::Weak));
    net.deliver_vec4_pv(NetPointer::new(res, 1), &v("11"), 1, 2, 4);
    assert_eq!(net.signal_vec4(wire).unwrap().to_string(), "0110");
    assert_eq!(net.signal_vec8(wire).unwrap().value(1).strength1(), Strength::Pull);
}
