//! Canonical string forms and lazy parsing of primitive values
//!
//! Every primitive node stores its value as a string. Scalars are written
//! through [`PrimitiveValue`] so that the same value always produces the same
//! text, and are read back lazily by the typed accessors on
//! [`DataNode`](crate::DataNode).

use crate::{Error, Result};

/// A scalar that can be stored inside a primitive node
pub trait PrimitiveValue {
    /// The canonical string form of this value
    fn to_primitive(&self) -> String;
}

impl PrimitiveValue for bool {
    fn to_primitive(&self) -> String {
        self.to_string()
    }
}

macro_rules! impl_integer_primitive {
    ($($ty:ty),*) => {
        $(
            impl PrimitiveValue for $ty {
                fn to_primitive(&self) -> String {
                    self.to_string()
                }
            }
        )*
    };
}

impl_integer_primitive!(i8, i16, i32, i64, isize, u8, u16, u32, u64, usize);

impl PrimitiveValue for f32 {
    fn to_primitive(&self) -> String {
        format_f32(*self)
    }
}

impl PrimitiveValue for f64 {
    fn to_primitive(&self) -> String {
        format_f64(*self)
    }
}

impl PrimitiveValue for str {
    fn to_primitive(&self) -> String {
        self.to_string()
    }
}

impl PrimitiveValue for String {
    fn to_primitive(&self) -> String {
        self.clone()
    }
}

impl<T: PrimitiveValue + ?Sized> PrimitiveValue for &T {
    fn to_primitive(&self) -> String {
        (**self).to_primitive()
    }
}

/// Format an `f32` in canonical form (`1.0`, `-0.5`, `3.14`)
pub fn format_f32(value: f32) -> String {
    with_fraction(value.to_string())
}

/// Format an `f64` in canonical form (`1.0`, `-0.5`, `3.14`)
pub fn format_f64(value: f64) -> String {
    with_fraction(value.to_string())
}

// Integral floats display without a fractional part; append one so the text
// still reads back as a float.
fn with_fraction(mut repr: String) -> String {
    if repr.bytes().all(|b| b.is_ascii_digit() || b == b'-') {
        repr.push_str(".0");
    }
    repr
}

pub(crate) fn parse_int(value: &str) -> Result<i64> {
    if value.is_empty() {
        return Ok(0);
    }
    value.parse().map_err(|_| Error::InvalidValue {
        value: value.to_string(),
        expected: "integer",
    })
}

pub(crate) fn parse_float(value: &str) -> Result<f64> {
    if value.is_empty() {
        return Ok(0.0);
    }
    value.parse().map_err(|_| Error::InvalidValue {
        value: value.to_string(),
        expected: "float",
    })
}

pub(crate) fn parse_bool(value: &str) -> Result<bool> {
    if value.is_empty() || value.eq_ignore_ascii_case("false") {
        Ok(false)
    } else if value.eq_ignore_ascii_case("true") {
        Ok(true)
    } else {
        Err(Error::InvalidValue {
            value: value.to_string(),
            expected: "boolean",
        })
    }
}
