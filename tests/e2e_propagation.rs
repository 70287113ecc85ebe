//! End-to-end tests for fan-out delivery.
//!
//! Each test builds a small netlist, injects a value the way a scheduler
//! would, and checks which receive operations ran and in what order.

use std::cell::RefCell;
use std::rc::Rc;

use logicnet::{
    Bit4, FunctorCapabilities, NetFunctor, NetPointer, Netlist, NodeId, Outbox, Strength,
    Vector4, Vector8,
};
use pretty_assertions::assert_eq;

type Log = Rc<RefCell<Vec<String>>>;

// ============================================================================
// Helper functors
// ============================================================================

/// Logs each delivery as `tag:port:value`.
struct Recorder {
    tag: String,
    log: Log,
    caps: FunctorCapabilities,
}

impl Recorder {
    fn new(tag: &str, log: &Log) -> Self {
        Self { tag: tag.to_string(), log: Rc::clone(log), caps: FunctorCapabilities::default() }
    }

    fn push(&self, port: NetPointer, what: String) {
        self.log.borrow_mut().push(format!("{}:{}:{what}", self.tag, port.port()));
    }
}

impl NetFunctor for Recorder {
    fn kind(&self) -> &'static str {
        "recorder"
    }

    fn recv_vec4(&mut self, port: NetPointer, bit: &Vector4, _out: &mut Outbox) {
        self.push(port, bit.to_string());
    }

    fn recv_vec8(&mut self, port: NetPointer, bit: &Vector8, _out: &mut Outbox) {
        self.push(port, format!("[{bit}]"));
    }

    fn recv_real(&mut self, port: NetPointer, bit: f64, _out: &mut Outbox) {
        self.push(port, format!("{bit:?}"));
    }

    fn recv_long(&mut self, port: NetPointer, bit: i64, _out: &mut Outbox) {
        self.push(port, format!("#{bit}"));
    }

    fn recv_vec4_pv(
        &mut self,
        port: NetPointer,
        bit: &Vector4,
        base: usize,
        wid: usize,
        vwid: usize,
        _out: &mut Outbox,
    ) {
        self.push(port, format!("{bit}@{base}+{wid}/{vwid}"));
    }

    fn capabilities(&self) -> FunctorCapabilities {
        self.caps
    }
}

/// Emits its input plus one until it reaches `limit`. Wired to itself it
/// forms a zero-delay loop that terminates.
struct CountUp {
    limit: u64,
    seen: Log,
}

impl NetFunctor for CountUp {
    fn kind(&self) -> &'static str {
        "count_up"
    }

    fn recv_vec4(&mut self, _port: NetPointer, bit: &Vector4, out: &mut Outbox) {
        let val = logicnet::value::vector4_to_u64(bit).unwrap_or(0);
        self.seen.borrow_mut().push(val.to_string());
        if val < self.limit {
            out.vec4(Vector4::from_u64(val + 1, bit.size()));
        }
    }
}

fn full_caps() -> FunctorCapabilities {
    FunctorCapabilities { vec8: true, real: true, long: true, vec4_pv: true, wide: false }
}

// ============================================================================
// 1. Fan-out order and skipping
// ============================================================================

#[test]
fn test_chain_of_k_receivers_in_order() {
    let log = Log::default();
    let mut net = Netlist::new();
    let src = net.create_empty();
    for k in 0..5 {
        let node = net.create_net(Recorder::new(&format!("r{k}"), &log));
        net.connect(src, NetPointer::new(node, k % 4)).unwrap();
    }

    net.send_vec4(src, &"01".parse().unwrap());
    assert_eq!(
        *log.borrow(),
        vec!["r0:0:01", "r1:1:01", "r2:2:01", "r3:3:01", "r4:0:01"]
    );
}

#[test]
fn test_nodes_without_functor_are_skipped() {
    let log = Log::default();
    let mut net = Netlist::new();
    let src = net.create_empty();
    let first = net.create_net(Recorder::new("first", &log));
    let hole = net.create_empty();
    let last = net.create_net(Recorder::new("last", &log));
    for node in [first, hole, last] {
        net.connect(src, NetPointer::new(node, 0)).unwrap();
    }

    net.send_vec4(src, &"1".parse().unwrap());
    assert_eq!(*log.borrow(), vec!["first:0:1", "last:0:1"]);
}

#[test]
fn test_every_value_kind() {
    let log = Log::default();
    let mut net = Netlist::new();
    let src = net.create_empty();
    let mut rec = Recorder::new("r", &log);
    rec.caps = full_caps();
    let rec = net.create_net(rec);
    net.connect(src, NetPointer::new(rec, 2)).unwrap();

    let v4: Vector4 = "1x".parse().unwrap();
    net.send_vec4(src, &v4);
    net.send_vec8(src, &Vector8::from_vector4(&v4, Strength::Weak));
    net.send_real(src, 0.5);
    net.send_long(src, -3);
    net.send_vec4_pv(src, &v4, 4, 2, 8);
    assert_eq!(
        *log.borrow(),
        vec!["r:2:1x", "r:2:[We1 WeX]", "r:2:0.5", "r:2:#-3", "r:2:1x@4+2/8"]
    );
}

#[test]
fn test_strength_reduces_for_logic_only_receivers() {
    let log = Log::default();
    let mut net = Netlist::new();
    let src = net.create_empty();
    let rec = net.create_net(Recorder::new("r", &log));
    net.connect(src, NetPointer::new(rec, 0)).unwrap();

    let v8 = Vector8::from_vector4(&"0z1".parse().unwrap(), Strength::Supply);
    net.send_vec8(src, &v8);
    assert_eq!(*log.borrow(), vec!["r:0:0z1"]);
}

#[test]
fn test_rewiring_after_send_affects_next_send_only() {
    let log = Log::default();
    let mut net = Netlist::new();
    let src = net.create_empty();
    let a = net.create_net(Recorder::new("a", &log));
    let b = net.create_net(Recorder::new("b", &log));
    net.connect(src, NetPointer::new(a, 0)).unwrap();

    net.send_vec4(src, &"1".parse().unwrap());
    net.connect(src, NetPointer::new(b, 0)).unwrap();
    net.disconnect(src, NetPointer::new(a, 0)).unwrap();
    net.send_vec4(src, &Vector4::new(1, Bit4::Z));
    assert_eq!(*log.borrow(), vec!["a:0:1", "b:0:z"]);
}

// ============================================================================
// 2. Re-entrant feedback
// ============================================================================

#[test]
fn test_self_loop_runs_until_stable() {
    let seen = Log::default();
    let mut net = Netlist::new();
    let node = net.create_net(CountUp { limit: 4, seen: Rc::clone(&seen) });
    net.connect(node, NetPointer::new(node, 0)).unwrap();

    net.deliver_vec4(NetPointer::new(node, 0), &Vector4::from_u64(0, 8));
    assert_eq!(*seen.borrow(), vec!["0", "1", "2", "3", "4"]);
}

#[test]
fn test_feedback_through_signal_settles() {
    // sig -> count -> sig: the signal drops repeated values, which ends the loop.
    let seen = Log::default();
    let mut net = Netlist::new();
    let sig = net.create_signal(4);
    let count = net.create_net(CountUp { limit: 2, seen: Rc::clone(&seen) });
    net.connect(sig, NetPointer::new(count, 0)).unwrap();
    net.connect(count, NetPointer::new(sig, 0)).unwrap();

    net.deliver_vec4(NetPointer::new(sig, 0), &Vector4::from_u64(0, 4));
    assert_eq!(*seen.borrow(), vec!["0", "1", "2"]);
    assert_eq!(net.signal_vec4(sig).unwrap(), Vector4::from_u64(2, 4));
}

// ============================================================================
// 3. Tracing gate
// ============================================================================

#[test]
fn test_trace_propagation_config_does_not_change_results() {
    let config = logicnet::NetlistConfig { trace_propagation: true, ..Default::default() };
    let mut net = Netlist::with_config(config).unwrap();
    let sig = net.create_signal(2);
    let empty = net.create_empty();
    net.connect(sig, NetPointer::new(empty, 0)).unwrap();
    net.deliver_vec4(NetPointer::new(sig, 0), &"10".parse().unwrap());
    assert_eq!(net.signal_vec4(sig).unwrap().to_string(), "10");
    assert_eq!(net.len(), 2);
    assert_eq!(net.node_ids().collect::<Vec<_>>(), vec![NodeId(0), NodeId(1)]);
}
