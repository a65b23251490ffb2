//! Half-precision floating-point widening
//! 
//! Converts IEEE 754 binary16 bit patterns to binary32 and binary64 by
//! rebuilding the target bit layout directly, so the result is bit-exact
//! for every class of input (normals, subnormals, zeros, infinities, NaNs).

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

const F16_EXP_BITS: u32 = 5;
const F16_MANT_BITS: u32 = 10;
const F16_EXP_BIAS: i32 = 15;
const F16_EXP_MAX: u32 = (1 << F16_EXP_BITS) - 1;
const F16_MANT_MASK: u16 = (1 << F16_MANT_BITS) - 1;
// Implicit leading one of a normal binary16 mantissa.
const F16_HIDDEN_BIT: u16 = 1 << F16_MANT_BITS;

const F32_MANT_BITS: u32 = 23;
const F32_EXP_BIAS: i32 = 127;
const F32_EXP_MAX: u32 = 0xFF;

const F64_MANT_BITS: u32 = 52;
const F64_EXP_BIAS: i32 = 1023;
const F64_EXP_MAX: u64 = 0x7FF;

/// Error returned when a binary16 hex literal is malformed
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid binary16 hex literal '{text}'; expected 4 hex digits")]
pub struct ParseFloat16Error {
    pub text: String,
}

/// IEEE 754 half-precision value, stored as its raw bit pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Float16(u16);

/// Sign, biased exponent and mantissa fields of a binary16 pattern
struct Fields {
    sign: u16,
    exp: u32,
    mant: u16,
}

/// Width-independent description of a binary16 value
enum Class {
    Zero,
    /// Finite non-zero value: unbiased exponent and the 10 fraction bits
    /// left after normalisation.
    Finite { exp: i32, frac: u16 },
    /// Infinity (zero payload) or NaN.
    Special { payload: u16 },
}

impl Float16 {
    pub const fn from_bits(bits: u16) -> Self {
        Float16(bits)
    }

    /// Parse four hex digits, with an optional `0x` or `0xH` prefix.
    pub fn from_hex(text: &str) -> Result<Self, ParseFloat16Error> {
        let digits = text
            .strip_prefix("0xH")
            .or_else(|| text.strip_prefix("0x"))
            .unwrap_or(text);
        if digits.len() != 4 || !digits.bytes().all(|b| b.is_ascii_hexdigit()) {
            return Err(ParseFloat16Error { text: text.to_string() });
        }
        u16::from_str_radix(digits, 16)
            .map(Float16)
            .map_err(|_| ParseFloat16Error { text: text.to_string() })
    }

    pub const fn to_bits(self) -> u16 {
        self.0
    }

    pub fn is_sign_negative(self) -> bool {
        self.fields().sign != 0
    }

    /// Widen to single precision.
    pub fn to_f32(self) -> f32 {
        let sign = u32::from(self.fields().sign) << 31;
        let bits = match self.classify() {
            Class::Zero => sign,
            Class::Finite { exp, frac } => {
                let exp = (exp + F32_EXP_BIAS) as u32;
                sign | exp << F32_MANT_BITS | u32::from(frac) << (F32_MANT_BITS - F16_MANT_BITS)
            }
            Class::Special { payload } => {
                sign | F32_EXP_MAX << F32_MANT_BITS
                    | u32::from(payload) << (F32_MANT_BITS - F16_MANT_BITS)
            }
        };
        f32::from_bits(bits)
    }

    /// Widen to double precision.
    pub fn to_f64(self) -> f64 {
        let sign = u64::from(self.fields().sign) << 63;
        let bits = match self.classify() {
            Class::Zero => sign,
            Class::Finite { exp, frac } => {
                let exp = (exp + F64_EXP_BIAS) as u64;
                sign | exp << F64_MANT_BITS | u64::from(frac) << (F64_MANT_BITS - F16_MANT_BITS)
            }
            Class::Special { payload } => {
                sign | F64_EXP_MAX << F64_MANT_BITS
                    | u64::from(payload) << (F64_MANT_BITS - F16_MANT_BITS)
            }
        };
        f64::from_bits(bits)
    }

    fn fields(self) -> Fields {
        Fields {
            sign: self.0 >> 15,
            exp: u32::from((self.0 >> F16_MANT_BITS) & F16_EXP_MAX as u16),
            mant: self.0 & F16_MANT_MASK,
        }
    }

    fn classify(self) -> Class {
        let Fields { exp, mant, .. } = self.fields();
        match (exp, mant) {
            (0, 0) => Class::Zero,
            (0, _) => {
                // Subnormal: shift until the hidden bit appears. Both wider
                // formats can hold the result as a normal number.
                let mut exp = 1 - F16_EXP_BIAS;
                let mut mant = mant;
                while mant & F16_HIDDEN_BIT == 0 {
                    mant <<= 1;
                    exp -= 1;
                }
                Class::Finite { exp, frac: mant & F16_MANT_MASK }
            }
            (F16_EXP_MAX, payload) => Class::Special { payload },
            (exp, frac) => Class::Finite { exp: exp as i32 - F16_EXP_BIAS, frac },
        }
    }
}

impl From<u16> for Float16 {
    fn from(bits: u16) -> Self {
        Float16(bits)
    }
}

impl From<Float16> for f32 {
    fn from(value: Float16) -> Self {
        value.to_f32()
    }
}

impl From<Float16> for f64 {
    fn from(value: Float16) -> Self {
        value.to_f64()
    }
}

impl fmt::Display for Float16 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "0xH{:04X}", self.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const GOLDEN: &[(&str, f64)] = &[
        ("3C00", 1.0),
        ("4000", 2.0),
        ("C000", -2.0),
        ("7BFE", 65472.0),
        ("7BFF", 65504.0),
        ("FBFF", -65504.0),
        ("0000", 0.0),
        ("5B8F", 241.875),
        ("48C8", 9.5625),
    ];

    #[test]
    fn test_float16_to_f32_golden() {
        for &(hex, want) in GOLDEN {
            let got = Float16::from_hex(hex).unwrap().to_f32();
            assert_eq!(got, want as f32, "binary16 0x{hex}");
        }
    }

    #[test]
    fn test_float16_to_f64_golden() {
        for &(hex, want) in GOLDEN {
            let got = Float16::from_hex(hex).unwrap().to_f64();
            assert_eq!(got, want, "binary16 0x{hex}");
        }
    }

    #[test]
    fn test_negative_zero_keeps_sign() {
        let neg = Float16::from_bits(0x8000);
        assert_eq!(neg.to_f32(), 0.0);
        assert!(neg.to_f32().is_sign_negative());
        assert!(neg.to_f64().is_sign_negative());
        assert!(!Float16::from_bits(0x0000).to_f64().is_sign_negative());
    }

    #[test]
    fn test_infinities() {
        assert_eq!(Float16::from_bits(0x7C00).to_f32(), f32::INFINITY);
        assert_eq!(Float16::from_bits(0xFC00).to_f32(), f32::NEG_INFINITY);
        assert_eq!(Float16::from_bits(0x7C00).to_f64(), f64::INFINITY);
        assert_eq!(Float16::from_bits(0xFC00).to_f64(), f64::NEG_INFINITY);
    }

    #[test]
    fn test_nan_payload_preserved() {
        let nan = Float16::from_bits(0x7E01);
        assert!(nan.to_f32().is_nan());
        assert!(nan.to_f64().is_nan());
        assert_eq!(nan.to_f32().to_bits(), 0x7FC0_2000);
        assert_eq!(nan.to_f64().to_bits(), 0x7FF8_0400_0000_0000);
    }

    #[test]
    fn test_subnormals_become_normal() {
        // Smallest positive subnormal is 2^-24.
        assert_eq!(Float16::from_bits(0x0001).to_f64(), 2f64.powi(-24));
        assert_eq!(Float16::from_bits(0x0001).to_f32(), 2f32.powi(-24));
        // Largest subnormal is 1023 * 2^-24.
        assert_eq!(Float16::from_bits(0x03FF).to_f64(), 1023.0 * 2f64.powi(-24));
        assert_eq!(Float16::from_bits(0x8200).to_f64(), -(2f64.powi(-15)));
    }

    #[test]
    fn test_widths_agree_for_every_finite_pattern() {
        for bits in 0..=u16::MAX {
            let h = Float16::from_bits(bits);
            let narrow = h.to_f32();
            if !narrow.is_finite() {
                continue;
            }
            let wide = h.to_f64();
            assert_eq!(narrow as f64, wide, "binary16 0x{bits:04X}");
            assert_eq!(narrow.is_sign_negative(), wide.is_sign_negative());
        }
    }

    #[test]
    fn test_from_hex_prefixes_and_errors() {
        assert_eq!(Float16::from_hex("0x3C00").unwrap().to_bits(), 0x3C00);
        assert_eq!(Float16::from_hex("0xH3c00").unwrap().to_bits(), 0x3C00);
        assert!(Float16::from_hex("3C0").is_err());
        assert!(Float16::from_hex("zzzz").is_err());
        assert!(Float16::from_hex("+3C0").is_err());
        assert_eq!(Float16::from_bits(0x48C8).to_string(), "0xH48C8");
    }
}
