//! Delivery of value changes along fan-out lists.
//!
//! `send_*` delivers a value to every port in a node's fan-out, in list
//! order. `deliver_*` delivers to one port. Both are synchronous: a
//! receiving functor's own outputs are delivered, depth first, before the
//! next port in the list is visited.
//!
//! The fan-out list is copied before the walk, so a functor that rewires
//! the graph during a delivery does not disturb the walk in progress.

use smallvec::SmallVec;
use tracing::trace;

use super::{Emission, NetPointer, Netlist, NodeId, Outbox};
use crate::functor::wide::WideValue;
use crate::value::{Vector4, Vector8};

#[derive(Debug, Clone, Copy)]
enum Delivery<'a> {
    Vec4(&'a Vector4),
    Vec8(&'a Vector8),
    Real(f64),
    Long(i64),
    Vec4Pv { val: &'a Vector4, base: usize, wid: usize, vwid: usize },
}

impl Delivery<'_> {
    fn kind(&self) -> &'static str {
        match self {
            Delivery::Vec4(_) => "vec4",
            Delivery::Vec8(_) => "vec8",
            Delivery::Real(_) => "real",
            Delivery::Long(_) => "long",
            Delivery::Vec4Pv { .. } => "vec4_pv",
        }
    }
}

impl Netlist {
    // ========================================================================
    // Fan-out
    // ========================================================================

    pub fn send_vec4(&mut self, from: NodeId, val: &Vector4) {
        for ptr in self.fanout_snapshot(from) {
            self.deliver(ptr, Delivery::Vec4(val));
        }
    }

    pub fn send_vec8(&mut self, from: NodeId, val: &Vector8) {
        for ptr in self.fanout_snapshot(from) {
            self.deliver(ptr, Delivery::Vec8(val));
        }
    }

    pub fn send_real(&mut self, from: NodeId, val: f64) {
        for ptr in self.fanout_snapshot(from) {
            self.deliver(ptr, Delivery::Real(val));
        }
    }

    pub fn send_long(&mut self, from: NodeId, val: i64) {
        for ptr in self.fanout_snapshot(from) {
            self.deliver(ptr, Delivery::Long(val));
        }
    }

    /// Send the `wid`-bit part `val`, destined for offset `base` of a
    /// `vwid`-bit vector.
    pub fn send_vec4_pv(&mut self, from: NodeId, val: &Vector4, base: usize, wid: usize, vwid: usize) {
        for ptr in self.fanout_snapshot(from) {
            self.deliver(ptr, Delivery::Vec4Pv { val, base, wid, vwid });
        }
    }

    fn fanout_snapshot(&self, from: NodeId) -> SmallVec<[NetPointer; 2]> {
        match self.nets.get(from.index()) {
            Some(net) => net.fanout.clone(),
            None => contract_violation!("send from unknown node {from}"),
        }
    }

    // ========================================================================
    // Single port
    // ========================================================================

    pub fn deliver_vec4(&mut self, ptr: NetPointer, val: &Vector4) {
        self.deliver(ptr, Delivery::Vec4(val));
    }

    pub fn deliver_vec8(&mut self, ptr: NetPointer, val: &Vector8) {
        self.deliver(ptr, Delivery::Vec8(val));
    }

    pub fn deliver_real(&mut self, ptr: NetPointer, val: f64) {
        self.deliver(ptr, Delivery::Real(val));
    }

    pub fn deliver_long(&mut self, ptr: NetPointer, val: i64) {
        self.deliver(ptr, Delivery::Long(val));
    }

    pub fn deliver_vec4_pv(&mut self, ptr: NetPointer, val: &Vector4, base: usize, wid: usize, vwid: usize) {
        self.deliver(ptr, Delivery::Vec4Pv { val, base, wid, vwid });
    }

    /// Hand absolute input `index` of the wide core `core` a new value.
    pub fn deliver_wide(&mut self, core: NodeId, index: usize, value: WideValue) {
        let trace_on = self.config.trace_propagation;
        let Some(net) = self.nets.get_mut(core.index()) else {
            contract_violation!("wide input {index} forwarded to unknown node {core}");
        };
        let Some(functor) = net.functor.as_deref_mut() else {
            contract_violation!("wide input {index} forwarded to {core}, which has no functor");
        };
        if !functor.capabilities().wide {
            contract_violation!("{} at {core} is not a wide core", functor.kind());
        }
        if trace_on {
            trace!(node = %core, index, "deliver wide");
        }
        let mut out = Outbox::default();
        functor.recv_wide(index, value, &mut out);
        self.flush(core, out);
    }

    // ========================================================================
    // Dispatch
    // ========================================================================

    fn deliver(&mut self, ptr: NetPointer, value: Delivery<'_>) {
        let Some(node) = ptr.node() else { return };
        let trace_on = self.config.trace_propagation;
        let Some(net) = self.nets.get_mut(node.index()) else {
            contract_violation!("delivery to unknown node {node}");
        };
        let Some(functor) = net.functor.as_deref_mut() else {
            if trace_on {
                trace!(to = %ptr, kind = value.kind(), "skip: no functor");
            }
            return;
        };
        if trace_on {
            trace!(to = %ptr, functor = functor.kind(), kind = value.kind(), "deliver");
        }

        let caps = functor.capabilities();
        let mut out = Outbox::default();
        match value {
            Delivery::Vec4(val) => functor.recv_vec4(ptr, val, &mut out),
            Delivery::Vec8(val) if caps.vec8 => functor.recv_vec8(ptr, val, &mut out),
            Delivery::Vec8(val) => functor.recv_vec4(ptr, &val.reduce4(), &mut out),
            Delivery::Real(val) if caps.real => functor.recv_real(ptr, val, &mut out),
            Delivery::Long(val) if caps.long => functor.recv_long(ptr, val, &mut out),
            Delivery::Vec4Pv { val, base, wid, vwid } if caps.vec4_pv => {
                functor.recv_vec4_pv(ptr, val, base, wid, vwid, &mut out)
            }
            other => contract_violation!("{} at {ptr} cannot receive {}", functor.kind(), other.kind()),
        }
        self.flush(node, out);
    }

    fn flush(&mut self, from: NodeId, out: Outbox) {
        for emission in out.into_emissions() {
            match emission {
                Emission::Vec4(val) => self.send_vec4(from, &val),
                Emission::Vec8(val) => self.send_vec8(from, &val),
                Emission::Real(val) => self.send_real(from, val),
                Emission::Long(val) => self.send_long(from, val),
                Emission::Vec4Pv { val, base, wid, vwid } => self.send_vec4_pv(from, &val, base, wid, vwid),
                Emission::Wide { core, index, value } => self.deliver_wide(core, index, value),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::cell::RefCell;
    use std::rc::Rc;

    use super::*;
    use crate::net::{FunctorCapabilities, NetFunctor};
    use crate::value::{Bit4, Strength};

    /// Records every delivery into a shared log and optionally re-emits.
    struct Tap {
        tag: &'static str,
        log: Rc<RefCell<Vec<String>>>,
        caps: FunctorCapabilities,
        forward: bool,
    }

    impl Tap {
        fn new(tag: &'static str, log: &Rc<RefCell<Vec<String>>>) -> Self {
            Self { tag, log: Rc::clone(log), caps: FunctorCapabilities::default(), forward: false }
        }
    }

    impl NetFunctor for Tap {
        fn kind(&self) -> &'static str {
            "tap"
        }

        fn recv_vec4(&mut self, port: NetPointer, bit: &Vector4, out: &mut Outbox) {
            self.log.borrow_mut().push(format!("{}:{}:{bit}", self.tag, port.port()));
            if self.forward {
                out.vec4(bit.clone());
            }
        }

        fn recv_vec8(&mut self, port: NetPointer, bit: &Vector8, _out: &mut Outbox) {
            self.log.borrow_mut().push(format!("{}:{}:vec8 {bit}", self.tag, port.port()));
        }

        fn capabilities(&self) -> FunctorCapabilities {
            self.caps
        }
    }

    #[test]
    fn test_send_visits_fanout_in_order() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut net = Netlist::new();
        let src = net.create_empty();
        let a = net.create_net(Tap::new("a", &log));
        let gap = net.create_empty();
        let b = net.create_net(Tap::new("b", &log));
        net.connect(src, NetPointer::new(a, 2)).unwrap();
        net.connect(src, NetPointer::new(gap, 0)).unwrap();
        net.connect(src, NetPointer::new(b, 0)).unwrap();

        net.send_vec4(src, &Vector4::new(1, Bit4::One));
        assert_eq!(*log.borrow(), vec!["a:2:1".to_string(), "b:0:1".to_string()]);
    }

    #[test]
    fn test_vec8_reduces_without_capability() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut net = Netlist::new();
        let plain = net.create_net(Tap::new("p", &log));
        let mut strong = Tap::new("s", &log);
        strong.caps.vec8 = true;
        let strong = net.create_net(strong);

        let v8 = Vector8::from_vector4(&"1z".parse().unwrap(), Strength::Pull);
        net.deliver_vec8(NetPointer::new(plain, 0), &v8);
        net.deliver_vec8(NetPointer::new(strong, 0), &v8);
        assert_eq!(*log.borrow(), vec!["p:0:1z".to_string(), "s:0:vec8 Pu1 HiZ".to_string()]);
    }

    #[test]
    fn test_outputs_propagate_depth_first() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut net = Netlist::new();
        let src = net.create_empty();
        let mut mid = Tap::new("mid", &log);
        mid.forward = true;
        let mid = net.create_net(mid);
        let leaf = net.create_net(Tap::new("leaf", &log));
        let last = net.create_net(Tap::new("last", &log));
        net.connect(src, NetPointer::new(mid, 0)).unwrap();
        net.connect(src, NetPointer::new(last, 0)).unwrap();
        net.connect(mid, NetPointer::new(leaf, 1)).unwrap();

        net.send_vec4(src, &Vector4::new(1, Bit4::Zero));
        assert_eq!(
            *log.borrow(),
            vec!["mid:0:0".to_string(), "leaf:1:0".to_string(), "last:0:0".to_string()]
        );
    }

    #[test]
    fn test_nil_and_empty_targets_are_skipped() {
        let mut net = Netlist::new();
        let empty = net.create_empty();
        net.deliver_vec4(NetPointer::NIL, &Vector4::unknown(1));
        net.deliver_vec4(NetPointer::new(empty, 0), &Vector4::unknown(1));
    }

    #[test]
    #[should_panic(expected = "cannot receive real")]
    fn test_unsupported_kind_is_fatal() {
        let log = Rc::new(RefCell::new(Vec::new()));
        let mut net = Netlist::new();
        let p = net.create_net(Tap::new("p", &log));
        net.deliver_real(NetPointer::new(p, 0), 1.5);
    }

    #[test]
    #[should_panic(expected = "unknown node")]
    fn test_delivery_to_unknown_node_is_fatal() {
        let mut net = Netlist::new();
        net.deliver_vec4(NetPointer::new(NodeId(3), 0), &Vector4::unknown(1));
    }
}
