//! Per-kind field encoding.
//!
//! [`Field`] is implemented for every shape a field slot can take directly:
//! integers of all widths except `u32`, floats, `bool`, `String`, and `Vec`
//! of any of those. Each implementation fixes the canonical [`Value`]
//! representation for its kind and rejects every other variant on decode
//! with [`FieldmapError::TypeMismatch`].
//!
//! Nested serializable objects and sequences of them are not `Field` kinds;
//! they register through
//! [`FieldMap::nested`](crate::FieldMap::nested) and
//! [`FieldMap::nested_seq`](crate::FieldMap::nested_seq), which route
//! through the engine recursively.

use crate::error::{FieldmapError, Result};
use crate::value::Value;

/// A field shape with a defined scalar or sequence mapping into [`Value`].
pub trait Field: Sized {
    /// Registration-time gate. The default accepts; shapes with no
    /// unambiguous mapping (`u32`, and `Vec<u32>` through it) override this
    /// to fail with [`FieldmapError::UnsupportedType`] before any
    /// encode/decode is ever attempted.
    fn check_supported(_key: &str) -> Result<()> {
        Ok(())
    }

    /// Encodes the live value into its canonical [`Value`] form.
    fn encode(&self) -> Result<Value>;

    /// Decodes a value in canonical form back into the field type.
    fn decode(value: &Value) -> Result<Self>;
}

fn mismatch(expected: &str, found: &Value) -> FieldmapError {
    FieldmapError::TypeMismatch(format!("expected {expected}, found {}", found.kind()))
}

// --- INTEGERS ---

macro_rules! impl_int_field {
    ($($t:ty),*) => {$(
        impl Field for $t {
            fn encode(&self) -> Result<Value> {
                Ok(Value::Int(i64::from(*self)))
            }

            fn decode(value: &Value) -> Result<Self> {
                match value {
                    Value::Int(n) => <$t>::try_from(*n).map_err(|_| {
                        FieldmapError::TypeMismatch(format!(
                            "{n} out of range for {}",
                            stringify!($t)
                        ))
                    }),
                    other => Err(mismatch("int", other)),
                }
            }
        }
    )*}
}

impl_int_field!(i8, i16, i32, i64, u8, u16);

impl Field for u64 {
    fn encode(&self) -> Result<Value> {
        i64::try_from(*self).map(Value::Int).map_err(|_| {
            FieldmapError::TypeMismatch(format!("{self} exceeds the Int range of the value tree"))
        })
    }

    fn decode(value: &Value) -> Result<Self> {
        match value {
            Value::Int(n) => u64::try_from(*n)
                .map_err(|_| FieldmapError::TypeMismatch(format!("{n} out of range for u64"))),
            other => Err(mismatch("int", other)),
        }
    }
}

/// `u32` has no unambiguous round-trip through the signed `Int` tree and is
/// rejected at registration; carry such fields as strings with explicit
/// conversion.
impl Field for u32 {
    fn check_supported(key: &str) -> Result<()> {
        Err(FieldmapError::UnsupportedType(format!(
            "field \"{key}\": u32 not supported, please register it as a String"
        )))
    }

    fn encode(&self) -> Result<Value> {
        Err(FieldmapError::UnsupportedType("u32".to_string()))
    }

    fn decode(_value: &Value) -> Result<Self> {
        Err(FieldmapError::UnsupportedType("u32".to_string()))
    }
}

// --- FLOATS ---

impl Field for f64 {
    fn encode(&self) -> Result<Value> {
        if self.is_finite() {
            Ok(Value::Float(*self))
        } else {
            Err(FieldmapError::TypeMismatch(
                "non-finite float has no textual form".to_string(),
            ))
        }
    }

    fn decode(value: &Value) -> Result<Self> {
        match value {
            Value::Float(x) => Ok(*x),
            // Integral literals target float fields losslessly.
            Value::Int(n) => Ok(*n as f64),
            other => Err(mismatch("float", other)),
        }
    }
}

impl Field for f32 {
    fn encode(&self) -> Result<Value> {
        if self.is_finite() {
            Ok(Value::Float(f64::from(*self)))
        } else {
            Err(FieldmapError::TypeMismatch(
                "non-finite float has no textual form".to_string(),
            ))
        }
    }

    fn decode(value: &Value) -> Result<Self> {
        match value {
            Value::Float(x) => Ok(*x as f32),
            Value::Int(n) => Ok(*n as f32),
            other => Err(mismatch("float", other)),
        }
    }
}

// --- BOOL AND STRING ---

impl Field for bool {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Bool(*self))
    }

    fn decode(value: &Value) -> Result<Self> {
        match value {
            Value::Bool(b) => Ok(*b),
            other => Err(mismatch("bool", other)),
        }
    }
}

impl Field for String {
    fn encode(&self) -> Result<Value> {
        Ok(Value::Str(self.clone()))
    }

    fn decode(value: &Value) -> Result<Self> {
        match value {
            Value::Str(s) => Ok(s.clone()),
            other => Err(mismatch("string", other)),
        }
    }
}

// --- HOMOGENEOUS SEQUENCES ---

impl<F: Field> Field for Vec<F> {
    fn check_supported(key: &str) -> Result<()> {
        F::check_supported(key)
    }

    fn encode(&self) -> Result<Value> {
        let mut items = Vec::with_capacity(self.len());
        for item in self {
            items.push(item.encode()?);
        }
        Ok(Value::Array(items))
    }

    fn decode(value: &Value) -> Result<Self> {
        match value {
            Value::Array(items) => items.iter().map(F::decode).collect(),
            other => Err(mismatch("array", other)),
        }
    }
}
