//! # Node Behaviors
//!
//! Combinational functors. Each holds only its configuration and the last
//! value of its inputs.
//!
//! | Functor | Inputs | Output |
//! |---------|--------|--------|
//! | `Concat` | up to 4 vectors of declared widths | their concatenation, port 0 in the low bits |
//! | `Repeat` | one vector | the input tiled `repeat` times |
//! | `Drive` | vector (0), strengths (1, 2) | strength vector |
//! | `ExtendSigned` | one vector | sign-extended to a target width |
//! | `Resolver` | up to 4 strength vectors | their drive resolution |
//! | `WideCore` / `WideInput` | any number of ports | device-defined |

pub mod concat;
pub mod drive;
pub mod extend;
pub mod repeat;
pub mod resolve;
pub mod wide;

pub use concat::Concat;
pub use drive::Drive;
pub use extend::ExtendSigned;
pub use repeat::Repeat;
pub use resolve::Resolver;
pub use wide::{WideCore, WideDevice, WideHandle, WideInput, WidePorts, WideValue};
