//! The structured value tree.
//!
//! [`Value`] is the JSON-like tagged tree used both as the in-memory
//! serialization target and as the parsed form of wire text. An `Object` is
//! an *ordered* mapping from string keys to values: insertion order is
//! preserved (encoded output stays in declaration order, which keeps
//! rendered text readable and diffable), while key lookup is
//! ASCII-case-insensitive.
//!
//! Keys within one object are unique under case-insensitive comparison.
//! Duplicate insertion is rejected with
//! [`FieldmapError::DuplicateKey`], never silently shadowed, because
//! decode correctness depends on unambiguous lookup.

use crate::codec;
use crate::error::{FieldmapError, Result};

/// A structured value: the recursive JSON-like tree.
///
/// Constructed via the `From` conversions for scalars and strings, via
/// [`Value::put`] for objects, or by parsing text with [`Value::parse`].
#[derive(Debug, Clone)]
pub enum Value {
    /// The absent/neutral value.
    Null,
    /// A boolean.
    Bool(bool),
    /// A signed 64-bit integer. All supported integer field widths encode
    /// into this variant.
    Int(i64),
    /// A double-precision float.
    Float(f64),
    /// A UTF-8 string.
    Str(String),
    /// An ordered sequence of values.
    Array(Vec<Value>),
    /// An ordered mapping of key to value, case-insensitive on lookup.
    Object(Vec<(String, Value)>),
}

impl Value {
    /// Returns an empty `Object` value.
    pub fn object() -> Self {
        Value::Object(Vec::new())
    }

    /// The variant name, for diagnostics.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Int(_) => "int",
            Value::Float(_) => "float",
            Value::Str(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// True if this value is an `Object`.
    pub fn is_object(&self) -> bool {
        matches!(self, Value::Object(_))
    }

    /// True if this value is an `Array`.
    pub fn is_array(&self) -> bool {
        matches!(self, Value::Array(_))
    }

    /// True if this value is `Null`.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// True if this value is a scalar (`Bool`, `Int`, `Float` or `Str`).
    ///
    /// Together with [`is_object`](Value::is_object),
    /// [`is_array`](Value::is_array) and [`is_null`](Value::is_null) this is
    /// mutually exclusive and exhaustive over the variant set.
    pub fn is_scalar(&self) -> bool {
        matches!(
            self,
            Value::Bool(_) | Value::Int(_) | Value::Float(_) | Value::Str(_)
        )
    }

    /// Inserts `value` under `key` into an object.
    ///
    /// A `Null` value is promoted to an empty `Object` first. Promoting a
    /// populated array or scalar is a programming error and fails with
    /// [`FieldmapError::TypeMismatch`]. Inserting a key already present
    /// (any case variant) fails with [`FieldmapError::DuplicateKey`] and
    /// leaves the object unchanged.
    pub fn put(&mut self, key: &str, value: Value) -> Result<()> {
        if self.is_null() {
            *self = Value::object();
        }
        match self {
            Value::Object(fields) => {
                if fields.iter().any(|(k, _)| k.eq_ignore_ascii_case(key)) {
                    return Err(FieldmapError::DuplicateKey(key.to_string()));
                }
                fields.push((key.to_string(), value));
                Ok(())
            }
            other => Err(FieldmapError::TypeMismatch(format!(
                "cannot insert key \"{key}\" into a {} value",
                other.kind()
            ))),
        }
    }

    /// Case-insensitive key lookup.
    ///
    /// Returns `None` when the key is absent or when this value is not an
    /// object. Absence is a normal, representable outcome (it is what
    /// partial unserialization relies on), so this never fails.
    pub fn find(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Object(fields) => fields
                .iter()
                .find(|(k, _)| k.eq_ignore_ascii_case(key))
                .map(|(_, v)| v),
            _ => None,
        }
    }

    /// Parses JSON text into a value tree.
    ///
    /// Fails with [`FieldmapError::Parse`] on malformed text, carrying the
    /// codec's human-readable reason. Duplicate object keys (any case
    /// variant) in the input are rejected.
    pub fn parse(text: &str) -> Result<Value> {
        codec::parse(text)
    }

    /// Renders this value as JSON text, compact (`pretty == false`) or
    /// indented multi-line (`pretty == true`).
    ///
    /// The output round-trips through [`Value::parse`] back to a
    /// semantically equal tree (not necessarily byte-for-byte identical
    /// text).
    pub fn to_text(&self, pretty: bool) -> Result<String> {
        codec::render(self, pretty)
    }
}

/// Semantic tree equality.
///
/// Objects compare order-insensitively with case-insensitive key matching;
/// arrays compare element-wise in order. Floats use exact `f64` equality;
/// the tree itself introduces no rounding.
impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Int(a), Value::Int(b)) => a == b,
            (Value::Float(a), Value::Float(b)) => a == b,
            (Value::Str(a), Value::Str(b)) => a == b,
            (Value::Array(a), Value::Array(b)) => a == b,
            (Value::Object(a), Value::Object(b)) => {
                // Keys are unique within each side, so equal length plus
                // one-sided containment implies equality.
                a.len() == b.len()
                    && a.iter().all(|(k, v)| other.find(k).is_some_and(|w| w == v))
            }
            _ => false,
        }
    }
}

// --- SCALAR CONVERSIONS ---
//
// Mirrors of the per-kind constructors on the wire-message type this tree
// descends from. A `From<u32>` is deliberately absent; see the crate docs.

macro_rules! impl_from_int {
    ($($t:ty),*) => {$(
        impl From<$t> for Value {
            fn from(v: $t) -> Self {
                Value::Int(i64::from(v))
            }
        }
    )*}
}

impl_from_int!(i8, i16, i32, i64, u8, u16);

impl From<f64> for Value {
    fn from(v: f64) -> Self {
        Value::Float(v)
    }
}

impl From<f32> for Value {
    fn from(v: f32) -> Self {
        Value::Float(f64::from(v))
    }
}

impl From<bool> for Value {
    fn from(v: bool) -> Self {
        Value::Bool(v)
    }
}

impl From<&str> for Value {
    fn from(v: &str) -> Self {
        Value::Str(v.to_string())
    }
}

impl From<String> for Value {
    fn from(v: String) -> Self {
        Value::Str(v)
    }
}
