use std::fmt;

use serde::{Deserialize, Serialize};

/// A boxed primitive, the stored form of every numeric and boolean value.
///
/// Reading converts the box to whatever primitive the caller asks for, so a
/// value written as an integer can be read back as a double and vice versa.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub enum NumberBox {
    Int(i64),
    Float(f32),
    Double(f64),
    Bool(bool),
}

impl NumberBox {
    /// Integer view. Floating-point values truncate toward zero (saturating
    /// at the `i64` bounds, NaN becomes 0).
    pub fn as_i64(&self) -> i64 {
        match *self {
            Self::Int(v) => v,
            Self::Float(v) => v as i64,
            Self::Double(v) => v as i64,
            Self::Bool(v) => i64::from(v),
        }
    }

    pub fn as_f32(&self) -> f32 {
        match *self {
            Self::Int(v) => v as f32,
            Self::Float(v) => v,
            Self::Double(v) => v as f32,
            Self::Bool(v) => u8::from(v) as f32,
        }
    }

    pub fn as_f64(&self) -> f64 {
        match *self {
            Self::Int(v) => v as f64,
            Self::Float(v) => f64::from(v),
            Self::Double(v) => v,
            Self::Bool(v) => f64::from(u8::from(v)),
        }
    }

    /// Boolean view: any non-zero number is `true`.
    pub fn as_bool(&self) -> bool {
        match *self {
            Self::Int(v) => v != 0,
            Self::Float(v) => v != 0.0,
            Self::Double(v) => v != 0.0,
            Self::Bool(v) => v,
        }
    }
}

impl fmt::Display for NumberBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Int(v) => write!(f, "{v}"),
            Self::Float(v) => write!(f, "{v}"),
            Self::Double(v) => write!(f, "{v}"),
            Self::Bool(v) => write!(f, "{v}"),
        }
    }
}

impl From<i64> for NumberBox {
    fn from(v: i64) -> Self {
        Self::Int(v)
    }
}

impl From<f32> for NumberBox {
    fn from(v: f32) -> Self {
        Self::Float(v)
    }
}

impl From<f64> for NumberBox {
    fn from(v: f64) -> Self {
        Self::Double(v)
    }
}

impl From<bool> for NumberBox {
    fn from(v: bool) -> Self {
        Self::Bool(v)
    }
}
