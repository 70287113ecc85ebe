//! Strength-annotated scalars and the Verilog drive resolution rules.
//!
//! A scalar is modelled as a range on a signed strength axis: 0-side
//! strengths are negative, 1-side strengths positive, HiZ is the empty
//! range. An unambiguous `0` or `1` is a range on one side only; an `x` is a
//! range that crosses the origin.
//!
//! ```text
//!   Su0 St0 Pu0 La0 We0 Me0 Sm0 | Sm1 Me1 We1 La1 Pu1 St1 Su1
//!   -7  -6  -5  -4  -3  -2  -1  |  1   2   3   4   5   6   7
//! ```

use std::fmt;

use serde::{Deserialize, Serialize};

use super::Bit4;
use crate::{Error, Result};

/// IEEE 1364 drive strengths, weakest first.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[repr(u8)]
pub enum Strength {
    HiZ = 0,
    Small = 1,
    Medium = 2,
    Weak = 3,
    Large = 4,
    Pull = 5,
    #[default]
    Strong = 6,
    Supply = 7,
}

const LEVELS: [Strength; 8] = [
    Strength::HiZ,
    Strength::Small,
    Strength::Medium,
    Strength::Weak,
    Strength::Large,
    Strength::Pull,
    Strength::Strong,
    Strength::Supply,
];

impl Strength {
    /// Strength for a numeric level. Levels above 7 are a contract
    /// violation; use `TryFrom` for untrusted input.
    pub fn from_level(level: u8) -> Self {
        match LEVELS.get(level as usize) {
            Some(s) => *s,
            None => contract_violation!("strength level {level} out of range 0..=7"),
        }
    }

    pub const fn level(self) -> u8 {
        self as u8
    }

    /// Two-letter mnemonic used in `%v` style displays.
    pub const fn mnemonic(self) -> &'static str {
        match self {
            Strength::HiZ => "Hi",
            Strength::Small => "Sm",
            Strength::Medium => "Me",
            Strength::Weak => "We",
            Strength::Large => "La",
            Strength::Pull => "Pu",
            Strength::Strong => "St",
            Strength::Supply => "Su",
        }
    }

    /// Strength after passing through a resistive device.
    pub const fn resistive(self) -> Self {
        match self {
            Strength::HiZ => Strength::HiZ,
            Strength::Small | Strength::Medium => Strength::Small,
            Strength::Weak | Strength::Large => Strength::Medium,
            Strength::Pull => Strength::Weak,
            Strength::Strong | Strength::Supply => Strength::Pull,
        }
    }
}

impl TryFrom<u8> for Strength {
    type Error = Error;

    fn try_from(level: u8) -> Result<Self> {
        LEVELS
            .get(level as usize)
            .copied()
            .ok_or_else(|| Error::Config(format!("strength level {level} out of range 0..=7")))
    }
}

impl TryFrom<i64> for Strength {
    type Error = Error;

    fn try_from(level: i64) -> Result<Self> {
        u8::try_from(level)
            .map_err(|_| Error::Config(format!("strength level {level} out of range 0..=7")))
            .and_then(Strength::try_from)
    }
}

// ============================================================================
// Scalar
// ============================================================================

/// A single bit with drive strength.
///
/// `str0` is the strength at the 0-most end of the drive range and `str1` at
/// the 1-most end. For an unambiguous `0` or `1` both ends lie on the same
/// side; for `x` they lie on opposite sides. `z` always carries HiZ.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Scalar {
    value: Bit4,
    str0: Strength,
    str1: Strength,
}

impl Default for Scalar {
    fn default() -> Self {
        Self::hiz()
    }
}

impl Scalar {
    pub const fn hiz() -> Self {
        Self { value: Bit4::Z, str0: Strength::HiZ, str1: Strength::HiZ }
    }

    /// An unambiguous drive of `value` at strength `str`. A `z` value or a
    /// HiZ strength gives the HiZ scalar.
    pub fn new(value: Bit4, str: Strength) -> Self {
        if str == Strength::HiZ || value == Bit4::Z {
            return Self::hiz();
        }
        Self { value, str0: str, str1: str }
    }

    /// A drive that uses `str0` when `value` is 0 and `str1` when it is 1.
    /// An `x` spans from `str0` on the 0 side to `str1` on the 1 side.
    pub fn with_strengths(value: Bit4, str0: Strength, str1: Strength) -> Self {
        match value {
            Bit4::Zero => Self::new(Bit4::Zero, str0),
            Bit4::One => Self::new(Bit4::One, str1),
            Bit4::Z => Self::hiz(),
            Bit4::X => {
                // A one-sided x degenerates to the side that drives.
                match (str0, str1) {
                    (Strength::HiZ, Strength::HiZ) => Self::hiz(),
                    (Strength::HiZ, s) => Self::new(Bit4::One, s),
                    (s, Strength::HiZ) => Self::new(Bit4::Zero, s),
                    _ => Self { value: Bit4::X, str0, str1 },
                }
            }
        }
    }

    pub fn value(&self) -> Bit4 {
        self.value
    }

    pub fn strength0(&self) -> Strength {
        self.str0
    }

    pub fn strength1(&self) -> Strength {
        self.str1
    }

    pub fn is_hiz(&self) -> bool {
        self.value == Bit4::Z
    }

    pub fn eeq(&self, that: &Scalar) -> bool {
        self == that
    }

    /// Same logical value with both ends passed through a resistive device.
    pub fn resistive(self) -> Self {
        Self { value: self.value, str0: self.str0.resistive(), str1: self.str1.resistive() }
    }

    /// The drive as a signed range `(lo, hi)`, `None` for HiZ.
    fn range(&self) -> Option<(i8, i8)> {
        let s0 = self.str0.level() as i8;
        let s1 = self.str1.level() as i8;
        match self.value {
            Bit4::Z => None,
            Bit4::Zero => Some((-s0.max(s1), -s0.min(s1))),
            Bit4::One => Some((s0.min(s1), s0.max(s1))),
            Bit4::X => Some((-s0, s1)),
        }
    }

    fn from_range(lo: i8, hi: i8) -> Self {
        let level = |s: i8| Strength::from_level(s.unsigned_abs());
        if lo > 0 {
            Self { value: Bit4::One, str0: level(lo), str1: level(hi) }
        } else if hi < 0 {
            Self { value: Bit4::Zero, str0: level(lo), str1: level(hi) }
        } else {
            Self { value: Bit4::X, str0: level(lo), str1: level(hi) }
        }
    }
}

/// Combine two drivers of the same wire.
///
/// HiZ never influences the result. A stronger drive dominates every
/// weaker level of the opposite value; equal strengths of opposite values
/// leave the result ambiguous (`x`) at that strength.
pub fn resolve(a: Scalar, b: Scalar) -> Scalar {
    let (Some((alo, ahi)), Some((blo, bhi))) = (a.range(), b.range()) else {
        return if a.is_hiz() { b } else { a };
    };

    // The weakest level each driver is guaranteed to hold on its side.
    let floor1 = [(alo, ahi), (blo, bhi)]
        .iter()
        .filter(|(lo, _)| *lo > 0)
        .map(|(lo, _)| *lo)
        .max()
        .unwrap_or(0);
    let floor0 = [(alo, ahi), (blo, bhi)]
        .iter()
        .filter(|(_, hi)| *hi < 0)
        .map(|(_, hi)| -*hi)
        .max()
        .unwrap_or(0);

    let mut lo = alo.min(blo);
    let mut hi = ahi.max(bhi);

    if lo < 0 && -lo < floor1 {
        lo = floor1;
    } else if lo > 0 {
        lo = lo.max(floor1);
    }
    if hi > 0 && hi < floor0 {
        hi = -floor0;
    } else if hi < 0 {
        hi = hi.min(-floor0);
    }

    Scalar::from_range(lo, hi)
}

impl fmt::Display for Scalar {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.is_hiz() {
            return write!(f, "HiZ");
        }
        if self.str0 == self.str1 {
            write!(f, "{}{}", self.str0.mnemonic(), self.value.as_char().to_ascii_uppercase())
        } else {
            write!(f, "{}{}{}", self.str0.level(), self.str1.level(), self.value.as_char().to_ascii_uppercase())
        }
    }
}
