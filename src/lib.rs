//! # logicnet — Four-State Dataflow Net Kernel
//!
//! The value representation and dataflow execution core of an event-driven
//! Verilog simulator. A netlist is a graph of nodes ("nets"); each node has
//! up to 4 input ports, an unbounded fan-out, and a functor that decides
//! what the node does with the values that arrive.
//!
//! ## Design Principles
//!
//! 1. **Arena graph**: every `Net` lives in one `Netlist`; nodes are named by
//!    `NodeId` handles and ports by `NetPointer` (node, port) pairs
//! 2. **Owned fan-out**: each node owns its list of downstream ports
//! 3. **Functors return, the netlist propagates**: a functor writes its
//!    outputs into an `Outbox`; the netlist walks the fan-out after the call,
//!    so re-entrant feedback never aliases a live borrow
//! 4. **Unknown is a value, not an error**: out-of-range reads and `x`/`z`
//!    operands produce `x`; malformed graphs fail fast
//!
//! ## Quick Start
//!
//! ```rust
//! use logicnet::{Netlist, NetPointer, Vector4};
//! use logicnet::functor::Concat;
//!
//! let mut net = Netlist::new();
//! let cat = net.create_net(Concat::new(2, 3, 0, 0));
//! let sig = net.create_signal(5);
//! net.connect(cat, NetPointer::new(sig, 0)).unwrap();
//!
//! net.deliver_vec4(NetPointer::new(cat, 0), &"10".parse().unwrap());
//! net.deliver_vec4(NetPointer::new(cat, 1), &"101".parse().unwrap());
//!
//! let value: Vector4 = net.signal_vec4(sig).unwrap();
//! assert_eq!(value.to_string(), "10110");
//! ```
//!
//! ## Error Regimes
//!
//! | Condition | Handling |
//! |-----------|----------|
//! | `x`/`z` operand, out-of-range bit read | in-band `x` value |
//! | `x`/`z` in a numeric conversion | `Err(Error::Conversion { partial })` |
//! | bad graph construction request | `Err(Error::..)` from the builder |
//! | width mismatch, bad strength, bad port during propagation | fatal (panic) |

/// Fail fast on a broken structural contract: a malformed graph or a value
/// that the graph builder should never have let through.
macro_rules! contract_violation {
    ($($arg:tt)*) => {{
        let message = format!($($arg)*);
        tracing::error!(target: "logicnet::contract", "{message}");
        panic!("contract violation: {message}")
    }};
}

// ============================================================================
// Modules
// ============================================================================

pub mod config;
pub mod value;
pub mod net;
pub mod functor;
pub mod signal;
pub mod vpi;
pub mod sizer;

// ============================================================================
// Re-exports: Values
// ============================================================================

pub use value::{
    Bit4, Vector4, Vector2, Scalar, Strength, Vector8,
    resolve, vector2_to_vector4,
};

// ============================================================================
// Re-exports: Graph
// ============================================================================

pub use config::NetlistConfig;
pub use net::{
    Net, NetPointer, Netlist, NodeId,
    NetFunctor, FunctorCapabilities, Outbox, Emission,
};

// ============================================================================
// Re-exports: Signals and the procedural bridge
// ============================================================================

pub use signal::{AssignMode, SignalCommand, VectorSignal, StrengthSignal, RealSignal};
pub use vpi::{SignalValue, ValueFormat, ValueCallback, CallbackId, ChangeRecorder};

// ============================================================================
// Error Types
// ============================================================================

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("Conversion error: vector holds x/z bits (partial value {partial})")]
    Conversion { partial: u64 },

    #[error("Conversion error: vector holds x/z bits (partial value {partial})")]
    RealConversion { partial: f64 },

    #[error("Unknown node: {0}")]
    UnknownNode(NodeId),

    #[error("Port {port} of node {node} is already driven by node {driver}")]
    PortInUse { node: NodeId, port: usize, driver: NodeId },

    #[error("Node {0} is not a signal")]
    NotASignal(NodeId),

    #[error("Invalid configuration: {0}")]
    Config(String),

    #[error("Parse error: {0}")]
    Parse(String),

    #[error("Unsupported: {0}")]
    Unsupported(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, Error>;
