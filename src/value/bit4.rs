//! The Verilog 4-value bit.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};

use serde::{Deserialize, Serialize};

/// One Verilog bit: `0`, `1`, `x` (unknown) or `z` (high impedance).
///
/// The discriminants are fixed so that a bit always fits in 2 packed bits;
/// `Vector4` relies on this encoding.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Bit4 {
    #[serde(rename = "0")]
    Zero = 0,
    #[serde(rename = "1")]
    One = 1,
    #[default]
    #[serde(rename = "x")]
    X = 2,
    #[serde(rename = "z")]
    Z = 3,
}

const FROM_BITS: [Bit4; 4] = [Bit4::Zero, Bit4::One, Bit4::X, Bit4::Z];

impl Bit4 {
    /// Decode the low 2 bits of `bits`.
    #[inline]
    pub const fn from_bits(bits: u64) -> Self {
        FROM_BITS[(bits & 3) as usize]
    }

    #[inline]
    pub const fn bits(self) -> u64 {
        self as u64
    }

    /// True for `x` and `z`.
    #[inline]
    pub const fn is_xz(self) -> bool {
        self as u8 >= 2
    }

    pub const fn from_bool(b: bool) -> Self {
        if b { Bit4::One } else { Bit4::Zero }
    }

    /// The definite value of the bit, if it has one.
    pub const fn to_bool(self) -> Option<bool> {
        match self {
            Bit4::Zero => Some(false),
            Bit4::One => Some(true),
            Bit4::X | Bit4::Z => None,
        }
    }

    pub fn from_char(c: char) -> Option<Self> {
        match c {
            '0' => Some(Bit4::Zero),
            '1' => Some(Bit4::One),
            'x' | 'X' => Some(Bit4::X),
            'z' | 'Z' => Some(Bit4::Z),
            _ => None,
        }
    }

    pub const fn as_char(self) -> char {
        match self {
            Bit4::Zero => '0',
            Bit4::One => '1',
            Bit4::X => 'x',
            Bit4::Z => 'z',
        }
    }
}

impl fmt::Display for Bit4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

// ============================================================================
// Verilog truth tables
// ============================================================================

impl Not for Bit4 {
    type Output = Bit4;

    fn not(self) -> Bit4 {
        match self {
            Bit4::Zero => Bit4::One,
            Bit4::One => Bit4::Zero,
            Bit4::X | Bit4::Z => Bit4::X,
        }
    }
}

impl BitAnd for Bit4 {
    type Output = Bit4;

    fn bitand(self, rhs: Bit4) -> Bit4 {
        match (self, rhs) {
            (Bit4::Zero, _) | (_, Bit4::Zero) => Bit4::Zero,
            (Bit4::One, Bit4::One) => Bit4::One,
            _ => Bit4::X,
        }
    }
}

impl BitOr for Bit4 {
    type Output = Bit4;

    fn bitor(self, rhs: Bit4) -> Bit4 {
        match (self, rhs) {
            (Bit4::One, _) | (_, Bit4::One) => Bit4::One,
            (Bit4::Zero, Bit4::Zero) => Bit4::Zero,
            _ => Bit4::X,
        }
    }
}

impl BitXor for Bit4 {
    type Output = Bit4;

    fn bitxor(self, rhs: Bit4) -> Bit4 {
        match (self.to_bool(), rhs.to_bool()) {
            (Some(a), Some(b)) => Bit4::from_bool(a ^ b),
            _ => Bit4::X,
        }
    }
}

/// Full adder on 4-value bits. `carry` is read as carry-in and replaced by
/// carry-out. Any `x`/`z` among the inputs makes both results `x`.
pub fn add_with_carry(a: Bit4, b: Bit4, carry: &mut Bit4) -> Bit4 {
    if a.is_xz() || b.is_xz() || carry.is_xz() {
        *carry = Bit4::X;
        return Bit4::X;
    }

    let sum = a.bits() + b.bits() + carry.bits();
    *carry = Bit4::from_bool(sum >= 2);
    Bit4::from_bool(sum & 1 == 1)
}

/// Classify the `from -> to` transition: `> 0` posedge, `0` no edge,
/// `< 0` negedge.
pub fn edge(from: Bit4, to: Bit4) -> i32 {
    use Bit4::*;
    match (from, to) {
        (Zero, One) | (Zero, X) | (Zero, Z) | (X, One) | (Z, One) => 1,
        (One, Zero) | (One, X) | (One, Z) | (X, Zero) | (Z, Zero) => -1,
        _ => 0,
    }
}
