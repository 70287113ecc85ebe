//! 2-state arbitrary-width integers.
//!
//! `Vector2` is the numeric workhorse: arithmetic, shifts and ordering on
//! fully defined values, and bit-granular masks (the signal force mask is
//! one). A `Vector2` built from a `Vector4` that holds `x`/`z` is NaN.

use std::cmp::Ordering;
use std::fmt;
use std::ops::{Add, AddAssign, Div, Mul, Rem, ShlAssign, ShrAssign, Sub, SubAssign};

use super::{Bit4, Vector4};

const BITS_PER_WORD: usize = 64;

/// Fill value for [`Vector2::filled`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Fill {
    Zeros,
    Ones,
}

#[derive(Debug, Clone, Default)]
pub struct Vector2 {
    wid: usize,
    words: Vec<u64>,
    nan: bool,
}

impl Vector2 {
    /// A zero-width vector. Used as "no mask" by signals.
    pub fn empty() -> Self {
        Self::default()
    }

    pub fn nan() -> Self {
        Self { wid: 0, words: Vec::new(), nan: true }
    }

    pub fn filled(fill: Fill, wid: usize) -> Self {
        let word = match fill {
            Fill::Zeros => 0,
            Fill::Ones => u64::MAX,
        };
        let mut v = Self { wid, words: vec![word; wid.div_ceil(BITS_PER_WORD)], nan: false };
        v.trim();
        v
    }

    pub fn from_u64(val: u64, wid: usize) -> Self {
        let mut v = Self::filled(Fill::Zeros, wid);
        if let Some(first) = v.words.first_mut() {
            *first = val;
        }
        v.trim();
        v
    }

    /// Copy of `that` truncated or zero-extended to `wid` bits.
    pub fn resized(that: &Vector2, wid: usize) -> Self {
        let mut v = Self::filled(Fill::Zeros, wid);
        v.nan = that.nan;
        for (dst, src) in v.words.iter_mut().zip(&that.words) {
            *dst = *src;
        }
        v.trim();
        v
    }

    pub fn size(&self) -> usize {
        self.wid
    }

    pub fn is_nan(&self) -> bool {
        self.nan
    }

    pub fn value(&self, idx: usize) -> bool {
        if idx >= self.wid {
            return false;
        }
        (self.words[idx / BITS_PER_WORD] >> (idx % BITS_PER_WORD)) & 1 == 1
    }

    pub fn set_bit(&mut self, idx: usize, bit: bool) {
        if idx >= self.wid {
            contract_violation!("Vector2 set_bit index {idx} out of range for width {}", self.wid);
        }
        let mask = 1u64 << (idx % BITS_PER_WORD);
        let word = &mut self.words[idx / BITS_PER_WORD];
        if bit { *word |= mask } else { *word &= !mask }
    }

    pub fn is_zero(&self) -> bool {
        self.words.iter().all(|w| *w == 0)
    }

    /// True when every bit of a non-empty vector is set.
    pub fn is_all_ones(&self) -> bool {
        self.wid > 0 && (0..self.wid).all(|idx| self.value(idx))
    }

    /// Low 64 bits.
    pub fn to_u64(&self) -> u64 {
        self.words.first().copied().unwrap_or(0)
    }

    fn trim(&mut self) {
        let used = self.wid % BITS_PER_WORD;
        if used != 0 {
            if let Some(last) = self.words.last_mut() {
                *last &= (1u64 << used) - 1;
            }
        }
    }

    fn require_defined(&self, op: &str) {
        if self.nan {
            contract_violation!("Vector2 {op} on a NaN operand");
        }
    }

    fn widened(a: &Vector2, b: &Vector2, op: &str) -> (Vector2, Vector2) {
        a.require_defined(op);
        b.require_defined(op);
        let wid = a.wid.max(b.wid);
        (Self::resized(a, wid), Self::resized(b, wid))
    }

    fn compare(&self, that: &Vector2) -> Ordering {
        let count = self.words.len().max(that.words.len());
        for idx in (0..count).rev() {
            let a = self.words.get(idx).copied().unwrap_or(0);
            let b = that.words.get(idx).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                other => return other,
            }
        }
        Ordering::Equal
    }

    /// Unsigned long division, returning `(quotient, remainder)`.
    fn div_rem(a: &Vector2, b: &Vector2) -> (Vector2, Vector2) {
        let (a, b) = Self::widened(a, b, "division");
        let wid = a.wid;
        if b.is_zero() {
            return (Self::filled(Fill::Ones, wid), Self::filled(Fill::Ones, wid));
        }
        let mut quot = Self::filled(Fill::Zeros, wid);
        let mut rem = Self::filled(Fill::Zeros, wid + 1);
        let divisor = Self::resized(&b, wid + 1);
        for idx in (0..wid).rev() {
            rem <<= 1;
            rem.set_bit(0, a.value(idx));
            if rem.compare(&divisor) != Ordering::Less {
                rem -= &divisor;
                quot.set_bit(idx, true);
            }
        }
        (quot, Self::resized(&rem, wid))
    }
}

/// Convert a `Vector4`. Any `x` or `z` bit makes the result NaN.
impl From<&Vector4> for Vector2 {
    fn from(that: &Vector4) -> Self {
        let mut v = Self::filled(Fill::Zeros, that.size());
        for idx in 0..that.size() {
            match that.value(idx) {
                Bit4::Zero => {}
                Bit4::One => v.set_bit(idx, true),
                Bit4::X | Bit4::Z => return Self::nan(),
            }
        }
        v
    }
}

/// Re-expand a defined integer into a `wid`-bit `Vector4`, zero extending
/// or truncating. A NaN becomes all `x`.
pub fn vector2_to_vector4(that: &Vector2, wid: usize) -> Vector4 {
    if that.is_nan() {
        return Vector4::unknown(wid);
    }
    let mut out = Vector4::new(wid, Bit4::Zero);
    for idx in 0..wid.min(that.size()) {
        if that.value(idx) {
            out.set_bit(idx, Bit4::One);
        }
    }
    out
}

// ============================================================================
// Arithmetic
// ============================================================================

impl AddAssign<&Vector2> for Vector2 {
    fn add_assign(&mut self, that: &Vector2) {
        let (a, b) = Self::widened(self, that, "add");
        let mut carry = 0u64;
        let mut words = Vec::with_capacity(a.words.len());
        for (x, y) in a.words.iter().zip(&b.words) {
            let (s1, c1) = x.overflowing_add(*y);
            let (s2, c2) = s1.overflowing_add(carry);
            carry = u64::from(c1) + u64::from(c2);
            words.push(s2);
        }
        *self = Self { wid: a.wid, words, nan: false };
        self.trim();
    }
}

impl SubAssign<&Vector2> for Vector2 {
    fn sub_assign(&mut self, that: &Vector2) {
        let (a, b) = Self::widened(self, that, "subtract");
        let mut borrow = 0u64;
        let mut words = Vec::with_capacity(a.words.len());
        for (x, y) in a.words.iter().zip(&b.words) {
            let (d1, b1) = x.overflowing_sub(*y);
            let (d2, b2) = d1.overflowing_sub(borrow);
            borrow = u64::from(b1 || b2);
            words.push(d2);
        }
        *self = Self { wid: a.wid, words, nan: false };
        self.trim();
    }
}

impl ShlAssign<usize> for Vector2 {
    fn shl_assign(&mut self, shift: usize) {
        self.require_defined("shift");
        let mut out = Self::filled(Fill::Zeros, self.wid);
        for idx in shift..self.wid {
            if self.value(idx - shift) {
                out.set_bit(idx, true);
            }
        }
        *self = out;
    }
}

impl ShrAssign<usize> for Vector2 {
    fn shr_assign(&mut self, shift: usize) {
        self.require_defined("shift");
        let mut out = Self::filled(Fill::Zeros, self.wid);
        for idx in 0..self.wid.saturating_sub(shift) {
            if self.value(idx + shift) {
                out.set_bit(idx, true);
            }
        }
        *self = out;
    }
}

impl Add for &Vector2 {
    type Output = Vector2;

    fn add(self, rhs: &Vector2) -> Vector2 {
        let mut out = self.clone();
        out += rhs;
        out
    }
}

impl Sub for &Vector2 {
    type Output = Vector2;

    fn sub(self, rhs: &Vector2) -> Vector2 {
        let mut out = self.clone();
        out -= rhs;
        out
    }
}

impl Mul for &Vector2 {
    type Output = Vector2;

    fn mul(self, rhs: &Vector2) -> Vector2 {
        let (a, b) = Vector2::widened(self, rhs, "multiply");
        let mut acc = Vector2::filled(Fill::Zeros, a.wid);
        let mut addend = a.clone();
        for idx in 0..b.wid {
            if b.value(idx) {
                acc += &addend;
            }
            addend <<= 1;
        }
        acc
    }
}

impl Div for &Vector2 {
    type Output = Vector2;

    fn div(self, rhs: &Vector2) -> Vector2 {
        Vector2::div_rem(self, rhs).0
    }
}

impl Rem for &Vector2 {
    type Output = Vector2;

    fn rem(self, rhs: &Vector2) -> Vector2 {
        Vector2::div_rem(self, rhs).1
    }
}

// ============================================================================
// Comparison
// ============================================================================

/// Numeric equality; widths may differ. NaN is never equal to anything.
impl PartialEq for Vector2 {
    fn eq(&self, other: &Self) -> bool {
        self.partial_cmp(other) == Some(Ordering::Equal)
    }
}

/// Numeric ordering, `None` when either side is NaN.
impl PartialOrd for Vector2 {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        if self.nan || other.nan {
            return None;
        }
        Some(self.compare(other))
    }
}

impl fmt::Display for Vector2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.nan {
            return write!(f, "NaN");
        }
        for idx in (0..self.wid).rev() {
            write!(f, "{}", u8::from(self.value(idx)))?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn n(val: u64, wid: usize) -> Vector2 {
        Vector2::from_u64(val, wid)
    }

    #[test]
    fn test_nan_from_xz() {
        let v4: Vector4 = "10x1".parse().unwrap();
        assert!(Vector2::from(&v4).is_nan());
        let v4: Vector4 = "1001".parse().unwrap();
        assert_eq!(Vector2::from(&v4), n(9, 4));
    }

    #[test]
    fn test_arithmetic_wraps_at_width() {
        assert_eq!(&n(200, 8) + &n(100, 8), n(44, 8));
        assert_eq!(&n(3, 8) - &n(5, 8), n(254, 8));
        assert_eq!(&n(20, 8) * &n(13, 8), n(4, 8));
        assert_eq!(&n(100, 8) / &n(7, 8), n(14, 8));
        assert_eq!(&n(100, 8) % &n(7, 8), n(2, 8));
    }

    #[test]
    fn test_wide_arithmetic_carries_across_words() {
        let a = Vector2::filled(Fill::Ones, 64);
        let sum = &Vector2::resized(&a, 70) + &n(1, 70);
        assert!(sum.value(64));
        assert!(!sum.value(0));
        let prod = &Vector2::resized(&a, 128) * &n(2, 128);
        assert!(prod.value(64));
        assert!(!prod.value(0));
    }

    #[test]
    fn test_divide_by_zero_is_all_ones() {
        assert!((&n(5, 4) / &n(0, 4)).is_all_ones());
        assert!((&n(5, 4) % &n(0, 4)).is_all_ones());
    }

    #[test]
    fn test_shifts() {
        let mut v = n(0b0110, 4);
        v <<= 1;
        assert_eq!(v, n(0b1100, 4));
        v >>= 3;
        assert_eq!(v, n(1, 4));
    }

    #[test]
    fn test_ordering() {
        assert!(n(5, 8) > n(4, 3));
        assert!(n(4, 8) <= n(4, 3));
        assert_eq!(Vector2::nan().partial_cmp(&n(0, 1)), None);
        assert!(Vector2::nan() != Vector2::nan());
    }

    #[test]
    #[should_panic(expected = "NaN")]
    fn test_nan_arithmetic_is_fatal() {
        let _ = &Vector2::nan() + &n(1, 4);
    }

    #[test]
    fn test_to_vector4() {
        assert_eq!(vector2_to_vector4(&n(5, 3), 5).to_string(), "00101");
        assert_eq!(vector2_to_vector4(&n(5, 3), 2).to_string(), "01");
        assert_eq!(vector2_to_vector4(&Vector2::nan(), 2).to_string(), "xx");
    }

    #[test]
    fn test_fill_and_mask_queries() {
        let mut mask = Vector2::filled(Fill::Zeros, 4);
        assert!(!mask.is_all_ones());
        for idx in 0..4 {
            mask.set_bit(idx, true);
        }
        assert!(mask.is_all_ones());
        assert!(!Vector2::empty().is_all_ones());
        assert_eq!(mask.to_string(), "1111");
    }
}
