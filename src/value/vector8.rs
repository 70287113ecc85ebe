//! Vectors of strength-annotated scalars.

use std::fmt;

use super::{Bit4, Scalar, Strength, Vector4, resolve};

/// The strength-aware counterpart of `Vector4`: one `Scalar` per bit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub struct Vector8 {
    bits: Vec<Scalar>,
}

impl Vector8 {
    /// A `size`-bit vector of HiZ.
    pub fn new(size: usize) -> Self {
        Self { bits: vec![Scalar::hiz(); size] }
    }

    /// Promote `that` with every bit driven at `str`.
    pub fn from_vector4(that: &Vector4, str: Strength) -> Self {
        Self::from_vector4_with(that, str, str)
    }

    /// Promote `that`, driving 0 bits at `str0` and 1 bits at `str1`.
    pub fn from_vector4_with(that: &Vector4, str0: Strength, str1: Strength) -> Self {
        let bits = (0..that.size())
            .map(|idx| Scalar::with_strengths(that.value(idx), str0, str1))
            .collect();
        Self { bits }
    }

    pub fn size(&self) -> usize {
        self.bits.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    pub fn value(&self, idx: usize) -> Scalar {
        match self.bits.get(idx) {
            Some(s) => *s,
            None => contract_violation!("Vector8 index {idx} out of range for width {}", self.size()),
        }
    }

    pub fn set_bit(&mut self, idx: usize, val: Scalar) {
        let size = self.size();
        match self.bits.get_mut(idx) {
            Some(slot) => *slot = val,
            None => contract_violation!("Vector8 set_bit index {idx} out of range for width {size}"),
        }
    }

    pub fn eeq(&self, that: &Vector8) -> bool {
        self == that
    }

    pub fn iter(&self) -> impl Iterator<Item = &Scalar> {
        self.bits.iter()
    }

    /// Drop strength, keeping the logical value of every bit.
    pub fn reduce4(&self) -> Vector4 {
        let mut out = Vector4::new(self.size(), Bit4::Z);
        for (idx, bit) in self.bits.iter().enumerate() {
            out.set_bit(idx, bit.value());
        }
        out
    }

    /// Strength reduction through a resistive device. Values are unchanged.
    pub fn resistive_reduction(&self) -> Vector8 {
        Self { bits: self.bits.iter().map(|s| s.resistive()).collect() }
    }

    /// Bitwise drive resolution of two equal-width vectors.
    pub fn resolve(&self, that: &Vector8) -> Vector8 {
        if self.size() != that.size() {
            contract_violation!("resolve of {}-bit and {}-bit drive vectors", self.size(), that.size());
        }
        let bits = self.bits.iter().zip(&that.bits).map(|(a, b)| resolve(*a, *b)).collect();
        Self { bits }
    }
}

impl From<&Vector4> for Vector8 {
    fn from(that: &Vector4) -> Self {
        Self::from_vector4(that, Strength::Strong)
    }
}

impl FromIterator<Scalar> for Vector8 {
    fn from_iter<I: IntoIterator<Item = Scalar>>(iter: I) -> Self {
        Self { bits: iter.into_iter().collect() }
    }
}

/// Truncate, or pad with HiZ, to exactly `width` bits.
pub fn coerce8_to_width(that: &Vector8, width: usize) -> Vector8 {
    (0..width)
        .map(|idx| if idx < that.size() { that.value(idx) } else { Scalar::hiz() })
        .collect()
}

impl fmt::Display for Vector8 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (pos, bit) in self.bits.iter().rev().enumerate() {
            if pos > 0 {
                write!(f, " ")?;
            }
            write!(f, "{bit}")?;
        }
        Ok(())
    }
}
