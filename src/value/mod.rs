//! # Signal Values
//!
//! The value types that flow along nets. These are pure data: no graph,
//! no state, no I/O.
//!
//! | Type | Domain | Used for |
//! |------|--------|----------|
//! | `Bit4` | 0/1/x/z | single logic bit |
//! | `Vector4` | packed `Bit4`s | most net traffic |
//! | `Vector2` | 2-state integer | arithmetic, bit masks |
//! | `Scalar` | `Bit4` + strengths | one driven bit |
//! | `Vector8` | `Scalar`s | multi-driver nets |

pub mod bit4;
pub mod vector4;
pub mod vector2;
pub mod scalar;
pub mod vector8;

pub use bit4::{Bit4, add_with_carry, edge};
pub use vector4::{
    Vector4, compare_gtge, compare_gtge_signed, coerce_to_width,
    vector4_to_f64, vector4_to_u64,
};
pub use vector2::{Fill, Vector2, vector2_to_vector4};
pub use scalar::{Scalar, Strength, resolve};
pub use vector8::{Vector8, coerce8_to_width};
