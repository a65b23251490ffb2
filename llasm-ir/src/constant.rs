//! IR Constants
//! 
//! Integer, floating-point, null and undef constants. Floating-point text
//! follows LLVM's rule: a six-digit exponent form when it reads back to the
//! same double, otherwise the raw double bit pattern in hex. Half constants
//! are widened to double only when their text is requested.

use llasm_common::Float16;
use std::fmt;
use crate::types::{FloatKind, PointerType, Type};

/// Constant value
#[derive(Debug, Clone, PartialEq)]
pub enum Constant {
    /// Integer constant of the given bit width
    Int { bits: u32, value: i64 },
    
    /// `float` or `double` constant; `float` values are stored widened
    Float { kind: FloatKind, value: f64 },
    
    /// `half` constant, kept as its binary16 pattern
    Half(Float16),
    
    /// `null` of a pointer type
    Null(PointerType),
    
    /// `undef` of any type
    Undef(Type),
}

impl Constant {
    pub fn int(bits: u32, value: i64) -> Self {
        Constant::Int { bits, value }
    }
    
    pub fn i32(value: i64) -> Self {
        Constant::Int { bits: 32, value }
    }
    
    pub fn i64(value: i64) -> Self {
        Constant::Int { bits: 64, value }
    }
    
    pub fn bool(value: bool) -> Self {
        Constant::Int { bits: 1, value: i64::from(value) }
    }
    
    pub fn float(value: f32) -> Self {
        Constant::Float { kind: FloatKind::Float, value: f64::from(value) }
    }
    
    pub fn double(value: f64) -> Self {
        Constant::Float { kind: FloatKind::Double, value }
    }
    
    pub fn half(value: Float16) -> Self {
        Constant::Half(value)
    }
    
    pub fn ty(&self) -> Type {
        match self {
            Constant::Int { bits, .. } => Type::Int(*bits),
            Constant::Float { kind, .. } => Type::Float(*kind),
            Constant::Half(_) => Type::Float(FloatKind::Half),
            Constant::Null(ptr) => Type::Pointer(ptr.clone()),
            Constant::Undef(ty) => ty.clone(),
        }
    }
    
    /// Integer value, sign-extended from the constant's bit width.
    pub fn int_value(&self) -> Option<i64> {
        match self {
            Constant::Int { bits, value } => Some(sign_extend(*value, *bits)),
            _ => None,
        }
    }
}

fn sign_extend(value: i64, bits: u32) -> i64 {
    if bits == 0 || bits >= 64 {
        return value;
    }
    let shift = 64 - bits;
    (value << shift) >> shift
}

/// Format a double the way LLVM assembly prints floating-point constants.
pub fn format_float(value: f64) -> String {
    if value.is_finite() {
        if let Some(text) = exponent_form(value) {
            if text.parse::<f64>().ok() == Some(value) {
                return text;
            }
        }
    }
    format!("0x{:016X}", value.to_bits())
}

// `%e` layout: one digit, six decimals, signed two-digit exponent.
fn exponent_form(value: f64) -> Option<String> {
    let text = format!("{:.6e}", value.abs());
    let (mantissa, exp) = text.split_once('e')?;
    let exp: i32 = exp.parse().ok()?;
    let sign = if value.is_sign_negative() { "-" } else { "" };
    let exp_sign = if exp < 0 { '-' } else { '+' };
    Some(format!("{sign}{mantissa}e{exp_sign}{:02}", exp.abs()))
}

impl fmt::Display for Constant {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Constant::Int { bits: 1, value } => {
                write!(f, "{}", if *value & 1 != 0 { "true" } else { "false" })
            }
            Constant::Int { .. } => write!(f, "{}", self.int_value().unwrap_or_default()),
            Constant::Float { value, .. } => write!(f, "{}", format_float(*value)),
            Constant::Half(h) => write!(f, "{}", format_float(h.to_f64())),
            Constant::Null(_) => write!(f, "null"),
            Constant::Undef(_) => write!(f, "undef"),
        }
    }
}
