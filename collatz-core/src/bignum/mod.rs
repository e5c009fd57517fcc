//! Fixed-radix unsigned integers specialised for Collatz iteration.
//!
//! A [`BigUnsigned`] is a little-endian sequence of 64-bit limbs. The sequence
//! is never empty and its most significant limb is non-zero, except for the
//! value zero which is stored as a single zero limb. Every mutating operation
//! restores this before returning, which is what lets [`BigUnsigned::is_one`]
//! and [`BigUnsigned::is_zero`] look at a single limb.

use std::fmt;

use common::constants::{LIMB_BITS, LIMB_HEX_DIGITS};

use crate::utils::errors::FormatError;

mod steps;

/// Decimal digits folded into one limb per multiply-add while parsing.
const DECIMAL_CHUNK_DIGITS: usize = 19;

#[derive(Clone, PartialEq, Eq, Hash)]
pub struct BigUnsigned {
    limbs: Vec<u64>,
}

impl BigUnsigned {
    pub fn zero() -> Self {
        Self { limbs: vec![0] }
    }

    pub fn one() -> Self {
        Self::from_u64(1)
    }

    pub fn from_u64(value: u64) -> Self {
        Self { limbs: vec![value] }
    }

    /// Builds a value from little-endian limbs, trimming zero high limbs.
    pub fn from_limbs(mut limbs: Vec<u64>) -> Self {
        if limbs.is_empty() {
            limbs.push(0);
        }
        let mut value = Self { limbs };
        value.normalize();
        value
    }

    /// `2^power - 1`. A zero exponent yields zero.
    pub fn mersenne(power: u32) -> Self {
        let full_limbs = (power / LIMB_BITS) as usize;
        let rest = power % LIMB_BITS;
        let mut limbs = Vec::with_capacity(full_limbs + 1);
        limbs.resize(full_limbs, u64::MAX);
        if rest > 0 {
            limbs.push((1u64 << rest) - 1);
        }
        Self::from_limbs(limbs)
    }

    /// `2^power + 1`.
    pub fn power_of_two_plus_one(power: u32) -> Self {
        if power == 0 {
            return Self::from_u64(2);
        }
        let top = (power / LIMB_BITS) as usize;
        let mut limbs = vec![0u64; top + 1];
        limbs[top] |= 1u64 << (power % LIMB_BITS);
        limbs[0] |= 1;
        Self { limbs }
    }

    /// Parses a bare run of hexadecimal digits.
    ///
    /// The rightmost 16 digits form limb 0, the next 16 limb 1 and so on; a
    /// shorter leading group becomes the most significant limb.
    pub fn from_hex_digits(digits: &str) -> Result<Self, FormatError> {
        if digits.is_empty() {
            return Err(FormatError::MissingDigits);
        }
        let bytes = digits.as_bytes();
        let mut limbs = Vec::with_capacity(bytes.len().div_ceil(LIMB_HEX_DIGITS));
        for group in bytes.rchunks(LIMB_HEX_DIGITS) {
            let mut limb = 0u64;
            for &byte in group {
                let nibble = (byte as char)
                    .to_digit(16)
                    .ok_or_else(|| FormatError::invalid_literal(digits))?;
                limb = (limb << 4) | u64::from(nibble);
            }
            limbs.push(limb);
        }
        Ok(Self::from_limbs(limbs))
    }

    /// Parses a decimal literal, a hexadecimal one prefixed with `0x` or a
    /// binary one prefixed with `0b`. A leading zero does not mean octal.
    pub fn parse_literal(literal: &str) -> Result<Self, FormatError> {
        let trimmed = literal.trim();
        let invalid = || FormatError::invalid_literal(literal);

        if let Some(hex) = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
        {
            return Self::from_hex_digits(hex).map_err(|_| invalid());
        }
        if let Some(binary) = trimmed
            .strip_prefix("0b")
            .or_else(|| trimmed.strip_prefix("0B"))
        {
            return Self::from_binary_digits(binary).ok_or_else(invalid);
        }

        if trimmed.is_empty() || !trimmed.bytes().all(|b| b.is_ascii_digit()) {
            return Err(invalid());
        }

        let mut value = Self::zero();
        for chunk in trimmed.as_bytes().chunks(DECIMAL_CHUNK_DIGITS) {
            let addend = chunk
                .iter()
                .fold(0u64, |acc, &b| acc * 10 + u64::from(b - b'0'));
            value.mul_small_add(10u64.pow(chunk.len() as u32), addend);
        }
        Ok(value)
    }

    fn from_binary_digits(digits: &str) -> Option<Self> {
        if digits.is_empty() {
            return None;
        }
        let mut limbs = Vec::with_capacity(digits.len().div_ceil(LIMB_BITS as usize));
        for group in digits.as_bytes().rchunks(LIMB_BITS as usize) {
            let mut limb = 0u64;
            for &byte in group {
                let bit = match byte {
                    b'0' => 0,
                    b'1' => 1,
                    _ => return None,
                };
                limb = (limb << 1) | bit;
            }
            limbs.push(limb);
        }
        Some(Self::from_limbs(limbs))
    }

    /// Zero-padded hexadecimal, 16 digits per limb, most significant first.
    pub fn to_hex_string(&self) -> String {
        format!("{self:x}")
    }

    pub fn limbs(&self) -> &[u64] {
        &self.limbs
    }

    #[inline]
    pub fn is_zero(&self) -> bool {
        self.limbs.len() == 1 && self.limbs[0] == 0
    }

    #[inline]
    pub fn is_one(&self) -> bool {
        self.limbs.len() == 1 && self.limbs[0] == 1
    }

    #[inline]
    pub fn is_odd(&self) -> bool {
        self.limbs[0] & 1 == 1
    }

    /// Number of significant bits; zero for the value zero.
    pub fn bit_len(&self) -> u64 {
        let top = self.limbs[self.limbs.len() - 1];
        (self.limbs.len() as u64 - 1) * u64::from(LIMB_BITS)
            + u64::from(LIMB_BITS - top.leading_zeros())
    }

    /// Drops zero limbs from the high end, keeping at least one limb.
    pub fn normalize(&mut self) {
        while self.limbs.len() > 1 && self.limbs[self.limbs.len() - 1] == 0 {
            self.limbs.pop();
        }
    }

    /// `self = self * multiplier + addend`, only used while parsing literals.
    fn mul_small_add(&mut self, multiplier: u64, addend: u64) {
        let mut carry = u128::from(addend);
        for limb in self.limbs.iter_mut() {
            let product = u128::from(*limb) * u128::from(multiplier) + carry;
            *limb = product as u64;
            carry = product >> LIMB_BITS;
        }
        if carry > 0 {
            self.limbs.push(carry as u64);
        }
        self.normalize();
    }
}

impl Default for BigUnsigned {
    fn default() -> Self {
        Self::zero()
    }
}

impl From<u64> for BigUnsigned {
    fn from(value: u64) -> Self {
        Self::from_u64(value)
    }
}

impl fmt::LowerHex for BigUnsigned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for limb in self.limbs.iter().rev() {
            write!(f, "{limb:016x}")?;
        }
        Ok(())
    }
}

impl fmt::Debug for BigUnsigned {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Values in a real run are hundreds of megabytes wide.
        if self.limbs.len() <= 4 {
            write!(f, "BigUnsigned(0x{self:x})")
        } else {
            f.debug_struct("BigUnsigned")
                .field("limbs", &self.limbs.len())
                .field("bits", &self.bit_len())
                .finish()
        }
    }
}
