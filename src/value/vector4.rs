//! Packed 4-state bit vectors.
//!
//! Bits are addressed from 0 (LSB) to `size - 1` (MSB). Each bit takes two
//! storage bits using the `Bit4` encoding, 32 bits to a word. Vectors that
//! fit in a single word live inline; wider vectors spill to the heap.

use std::fmt;
use std::ops::{BitAnd, BitOr, BitXor, Not};
use std::str::FromStr;

use serde::{Deserialize, Deserializer, Serialize, Serializer};
use smallvec::{SmallVec, smallvec};

use super::Bit4;
use crate::{Error, Result};

const BITS_PER_WORD: usize = 32;

/// Word patterns indexed by `Bit4` encoding.
const WORD_FILL: [u64; 4] = [
    0x0000_0000_0000_0000,
    0x5555_5555_5555_5555,
    0xaaaa_aaaa_aaaa_aaaa,
    0xffff_ffff_ffff_ffff,
];

const LOW_LANES: u64 = WORD_FILL[1];
const HIGH_LANES: u64 = WORD_FILL[2];

/// A fixed-size vector of `Bit4` values.
///
/// Storage bits past `size` are kept at zero so that structural equality
/// is exact (`eeq`) equality.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Vector4 {
    size: usize,
    words: SmallVec<[u64; 1]>,
}

fn word_count(size: usize) -> usize {
    size.div_ceil(BITS_PER_WORD)
}

impl Vector4 {
    /// A vector of `size` bits, all set to `fill`.
    pub fn new(size: usize, fill: Bit4) -> Self {
        let mut v = Self {
            size,
            words: smallvec![WORD_FILL[fill as usize]; word_count(size)],
        };
        v.clear_padding();
        v
    }

    /// An all-`x` vector, the state of an uninitialized signal.
    pub fn unknown(size: usize) -> Self {
        Self::new(size, Bit4::X)
    }

    /// Build from the low `size` bits of `val`; bits above 64 are zero.
    pub fn from_u64(val: u64, size: usize) -> Self {
        let mut v = Self::new(size, Bit4::Zero);
        for idx in 0..size.min(64) {
            if (val >> idx) & 1 == 1 {
                v.set_bit(idx, Bit4::One);
            }
        }
        v
    }

    /// Build from bits listed LSB first.
    pub fn from_bits(bits: &[Bit4]) -> Self {
        let mut v = Self::new(bits.len(), Bit4::Zero);
        for (idx, bit) in bits.iter().enumerate() {
            v.set_bit(idx, *bit);
        }
        v
    }

    /// Copy of `wid` bits of `that` starting at `adr`. Positions past the
    /// end of `that` read as `x`.
    pub fn from_subvalue(that: &Vector4, adr: usize, wid: usize) -> Self {
        let mut v = Self::new(wid, Bit4::X);
        for idx in 0..wid {
            let src = adr + idx;
            if src >= that.size {
                break;
            }
            v.set_bit(idx, that.value(src));
        }
        v
    }

    /// Parse a `C4<...>` literal, bits listed MSB first.
    pub fn from_c4_str(text: &str) -> Result<Self> {
        let body = text
            .strip_prefix("C4<")
            .and_then(|rest| rest.strip_suffix('>'))
            .ok_or_else(|| Error::Parse(format!("expected C4<...> literal, got '{text}'")))?;
        body.parse()
    }

    pub fn size(&self) -> usize {
        self.size
    }

    pub fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// True when the bits are held in the inline word rather than on the heap.
    pub fn is_inline(&self) -> bool {
        !self.words.spilled()
    }

    /// Bit at `idx`, or `x` when `idx` is past the end.
    #[inline]
    pub fn value(&self, idx: usize) -> Bit4 {
        if idx >= self.size {
            return Bit4::X;
        }
        let word = self.words[idx / BITS_PER_WORD];
        Bit4::from_bits(word >> (2 * (idx % BITS_PER_WORD)))
    }

    /// Overwrite the bit at `idx`. Writing past the end is a contract
    /// violation.
    #[inline]
    pub fn set_bit(&mut self, idx: usize, val: Bit4) {
        if idx >= self.size {
            contract_violation!("set_bit index {idx} out of range for {}-bit vector", self.size);
        }
        let shift = 2 * (idx % BITS_PER_WORD);
        let word = &mut self.words[idx / BITS_PER_WORD];
        *word &= !(3u64 << shift);
        *word |= val.bits() << shift;
    }

    /// Copy `that` into this vector starting at `adr`. Bits that would land
    /// past the end are dropped.
    pub fn set_vec(&mut self, adr: usize, that: &Vector4) {
        for idx in 0..that.size {
            if adr + idx >= self.size {
                break;
            }
            self.set_bit(adr + idx, that.value(idx));
        }
    }

    pub fn subvalue(&self, adr: usize, wid: usize) -> Vector4 {
        Self::from_subvalue(self, adr, wid)
    }

    /// Change the width. New high bits are `x`.
    pub fn resize(&mut self, new_size: usize) {
        if new_size == self.size {
            return;
        }
        let old = std::mem::replace(self, Self::new(new_size, Bit4::X));
        self.set_vec(0, &old);
    }

    /// The defined bits of `[adr, adr+wid)` packed 64 to a word, or `None`
    /// if any of them is `x` or `z`.
    pub fn to_words(&self, adr: usize, wid: usize) -> Option<Vec<u64>> {
        let mut out = vec![0u64; wid.div_ceil(64)];
        for idx in 0..wid {
            match self.value(adr + idx) {
                Bit4::Zero => {}
                Bit4::One => out[idx / 64] |= 1 << (idx % 64),
                Bit4::X | Bit4::Z => return None,
            }
        }
        Some(out)
    }

    /// Exact equality: sizes match and every bit matches, with `x` and `z`
    /// treated as distinct values.
    pub fn eeq(&self, that: &Vector4) -> bool {
        self == that
    }

    pub fn has_xz(&self) -> bool {
        self.words.iter().any(|w| w & HIGH_LANES != 0)
    }

    /// Replace every `z` with `x`.
    pub fn change_z2x(&mut self) {
        for word in self.words.iter_mut() {
            // z is 0b11, x is 0b10: clear the low bit of lanes with both set.
            let z_lanes = *word & (*word >> 1) & LOW_LANES;
            *word &= !z_lanes;
        }
    }

    /// The vector as text, MSB first.
    pub fn as_string(&self) -> String {
        (0..self.size).rev().map(|idx| self.value(idx).as_char()).collect()
    }

    /// Two's-complement add of `addend` over the vector width. A vector
    /// holding any `x`/`z` becomes all `x`.
    pub fn add_assign_i64(&mut self, addend: i64) {
        if self.has_xz() {
            *self = Self::unknown(self.size);
            return;
        }

        let mut carry = Bit4::Zero;
        for idx in 0..self.size {
            let bit = if idx < 64 { (addend >> idx) & 1 } else { (addend >> 63) & 1 };
            let sum = super::add_with_carry(self.value(idx), Bit4::from_bool(bit == 1), &mut carry);
            self.set_bit(idx, sum);
        }
    }

    fn clear_padding(&mut self) {
        let used = self.size % BITS_PER_WORD;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << (2 * used)) - 1;
            }
        }
    }

    fn zip_with(&self, that: &Vector4, op: &str, f: impl Fn(Bit4, Bit4) -> Bit4) -> Vector4 {
        if self.size != that.size {
            contract_violation!("{op} of {}-bit and {}-bit vectors", self.size, that.size);
        }
        let mut out = Self::new(self.size, Bit4::Zero);
        for idx in 0..self.size {
            out.set_bit(idx, f(self.value(idx), that.value(idx)));
        }
        out
    }
}

impl std::ops::AddAssign<i64> for Vector4 {
    fn add_assign(&mut self, addend: i64) {
        self.add_assign_i64(addend);
    }
}

// ============================================================================
// Bitwise operators
// ============================================================================

impl Not for &Vector4 {
    type Output = Vector4;

    fn not(self) -> Vector4 {
        let mut out = Vector4::new(self.size, Bit4::Zero);
        for idx in 0..self.size {
            out.set_bit(idx, !self.value(idx));
        }
        out
    }
}

impl BitAnd for &Vector4 {
    type Output = Vector4;

    fn bitand(self, rhs: &Vector4) -> Vector4 {
        self.zip_with(rhs, "&", |a, b| a & b)
    }
}

impl BitOr for &Vector4 {
    type Output = Vector4;

    fn bitor(self, rhs: &Vector4) -> Vector4 {
        self.zip_with(rhs, "|", |a, b| a | b)
    }
}

impl BitXor for &Vector4 {
    type Output = Vector4;

    fn bitxor(self, rhs: &Vector4) -> Vector4 {
        self.zip_with(rhs, "^", |a, b| a ^ b)
    }
}

// ============================================================================
// Comparisons and conversions
// ============================================================================

/// Unsigned magnitude compare: `1` if `a > b`, `0` if `a < b`,
/// `val_if_equal` if equal, `x` if either operand has `x`/`z`.
pub fn compare_gtge(a: &Vector4, b: &Vector4, val_if_equal: Bit4) -> Bit4 {
    if a.has_xz() || b.has_xz() {
        return Bit4::X;
    }
    let wid = a.size().max(b.size());
    for idx in (0..wid).rev() {
        let abit = if idx < a.size() { a.value(idx) } else { Bit4::Zero };
        let bbit = if idx < b.size() { b.value(idx) } else { Bit4::Zero };
        match (abit, bbit) {
            (Bit4::One, Bit4::Zero) => return Bit4::One,
            (Bit4::Zero, Bit4::One) => return Bit4::Zero,
            _ => {}
        }
    }
    val_if_equal
}

/// Two's-complement signed variant of [`compare_gtge`]. The narrower
/// operand is sign extended.
pub fn compare_gtge_signed(a: &Vector4, b: &Vector4, val_if_equal: Bit4) -> Bit4 {
    if a.has_xz() || b.has_xz() {
        return Bit4::X;
    }
    if a.is_empty() || b.is_empty() {
        return compare_gtge(a, b, val_if_equal);
    }

    let a_sign = a.value(a.size() - 1);
    let b_sign = b.value(b.size() - 1);
    match (a_sign, b_sign) {
        (Bit4::One, Bit4::Zero) => return Bit4::Zero,
        (Bit4::Zero, Bit4::One) => return Bit4::One,
        _ => {}
    }

    let wid = a.size().max(b.size());
    for idx in (0..wid).rev() {
        let abit = if idx < a.size() { a.value(idx) } else { a_sign };
        let bbit = if idx < b.size() { b.value(idx) } else { b_sign };
        match (abit, bbit) {
            (Bit4::One, Bit4::Zero) => return Bit4::One,
            (Bit4::Zero, Bit4::One) => return Bit4::Zero,
            _ => {}
        }
    }
    val_if_equal
}

/// Truncate, or pad with `x`, to exactly `width` bits.
pub fn coerce_to_width(that: &Vector4, width: usize) -> Vector4 {
    if that.size() == width {
        return that.clone();
    }
    that.subvalue(0, width)
}

/// Verilog vector-to-integer conversion of the low 64 bits. `x`/`z` bits
/// read as 0 and turn the result into `Error::Conversion` carrying the
/// partial value.
pub fn vector4_to_u64(a: &Vector4) -> Result<u64> {
    let mut val = 0u64;
    let mut exact = true;
    for idx in 0..a.size().min(64) {
        match a.value(idx) {
            Bit4::One => val |= 1 << idx,
            Bit4::Zero => {}
            Bit4::X | Bit4::Z => exact = false,
        }
    }
    // Defined bits above 64 don't fit, but still count for x/z detection.
    if exact && a.size() > 64 && (64..a.size()).any(|idx| a.value(idx).is_xz()) {
        exact = false;
    }
    if exact { Ok(val) } else { Err(Error::Conversion { partial: val }) }
}

/// Verilog vector-to-real conversion. With `signed`, the MSB is the two's
/// complement sign.
pub fn vector4_to_f64(a: &Vector4, signed: bool) -> Result<f64> {
    let mut val = 0.0f64;
    let mut exact = true;
    let mut weight = 1.0f64;
    for idx in 0..a.size() {
        match a.value(idx) {
            Bit4::One => val += weight,
            Bit4::Zero => {}
            Bit4::X | Bit4::Z => exact = false,
        }
        weight *= 2.0;
    }
    if signed && a.value(a.size().wrapping_sub(1)) == Bit4::One {
        val -= weight;
    }
    if exact { Ok(val) } else { Err(Error::RealConversion { partial: val }) }
}

// ============================================================================
// Text forms
// ============================================================================

impl fmt::Display for Vector4 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.as_string())
    }
}

/// Parses plain bit text, MSB first: `"10xz"`.
impl FromStr for Vector4 {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let size = s.chars().count();
        let mut v = Vector4::new(size, Bit4::Zero);
        for (pos, c) in s.chars().enumerate() {
            let bit = Bit4::from_char(c)
                .ok_or_else(|| Error::Parse(format!("invalid bit '{c}' in '{s}'")))?;
            v.set_bit(size - 1 - pos, bit);
        }
        Ok(v)
    }
}

impl Serialize for Vector4 {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.as_string())
    }
}

impl<'de> Deserialize<'de> for Vector4 {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}
