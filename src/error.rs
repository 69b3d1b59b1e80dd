//! Centralized error handling for Fieldmap.
//!
//! All failure conditions are propagated through the [`Result`] type; the
//! library contains no panicking paths (enforced by `#![deny(clippy::panic)]`
//! and `#![deny(clippy::unwrap_used)]`). Errors are `Clone` and `PartialEq`
//! so they can be stored, compared in tests, and shared across threads.
//!
//! ## Propagation Rules
//!
//! Encode and decode failures abort the current whole-object operation:
//! serialize returns no value, unserialize stops applying further entries.
//! The one exception is per-object partial tolerance (see
//! [`FieldTable::set_partial_tolerance`](crate::FieldTable::set_partial_tolerance)),
//! under which [`FieldmapError::TypeMismatch`] and
//! [`FieldmapError::MissingField`] on a single field skip that field instead
//! of failing the call. [`FieldmapError::Parse`] and
//! [`FieldmapError::Internal`] always propagate.
//!
//! There is no global error state; every failure is returned at the call
//! that caused it.

use std::fmt;

/// A specialized `Result` type for Fieldmap operations.
pub type Result<T> = std::result::Result<T, FieldmapError>;

/// The master error enum covering all failure domains in Fieldmap.
///
/// ## Variants
///
/// - **DuplicateKey:** a key was registered twice on one object, or inserted
///   twice into one `Object` value.
/// - **UnsupportedType:** a field shape has no defined encode/decode mapping.
/// - **TypeMismatch:** a value's variant does not match what a field expects.
/// - **MissingField:** decode found no entry for a required key.
/// - **Parse:** malformed input text.
/// - **LockTimeout:** a bounded-wait lock acquisition exceeded its budget.
/// - **Internal:** logic errors in the library (should not occur; please
///   report as bugs).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FieldmapError {
    /// A field key was registered twice (any case variant) on one object,
    /// or [`Value::put`](crate::Value::put) was called with a key already
    /// present in the target object.
    ///
    /// The registry (or value) is left exactly as it was before the failed
    /// call; duplicate keys are never silently overwritten.
    DuplicateKey(String),

    /// The field shape has no defined encode/decode mapping.
    ///
    /// The canonical case is `u32`: represented as a signed `Int` its
    /// round-trip would be ambiguous, so such fields must be registered as
    /// strings with user-managed conversion. Surfaced at registration time,
    /// before any encode/decode attempt.
    UnsupportedType(String),

    /// A value's variant does not match what the field's decode function
    /// expects (e.g. decoding a `Str` into an integer field), or a value
    /// cannot be represented in the target (out-of-range narrowing,
    /// non-finite floats in JSON).
    ///
    /// Fatal to the whole operation unless partial tolerance is enabled for
    /// the object, in which case the specific field is skipped.
    TypeMismatch(String),

    /// Decode found no entry for a required key.
    ///
    /// Same tolerance rule as [`FieldmapError::TypeMismatch`]: with partial
    /// tolerance enabled the field is left at its current value.
    MissingField(String),

    /// Malformed input text (unterminated string, unbalanced braces, ...).
    ///
    /// Always fatal to the unserialize call that triggered parsing; no
    /// fields are touched before this check. The string carries the
    /// human-readable reason reported by the codec.
    Parse(String),

    /// A bounded-wait lock acquisition exceeded its microsecond budget.
    ///
    /// Only produced by the `*_within` entry points; the plain operations
    /// wait without bound. No state is touched on timeout.
    LockTimeout,

    /// Logic error in the declaration machinery or other internal
    /// components, such as a declaration hook re-entering its own object.
    ///
    /// This error should not occur in production. If you encounter it, it
    /// likely indicates a bug; please report it with a minimal reproduction.
    Internal(String),
}

impl fmt::Display for FieldmapError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::DuplicateKey(k) => write!(f, "Duplicate Key: \"{k}\""),
            Self::UnsupportedType(s) => write!(f, "Unsupported Type: {s}"),
            Self::TypeMismatch(s) => write!(f, "Type Mismatch: {s}"),
            Self::MissingField(k) => write!(f, "Missing Field: \"{k}\""),
            Self::Parse(s) => write!(f, "Parse Error: {s}"),
            Self::LockTimeout => write!(f, "Lock Timeout: wait budget exceeded"),
            Self::Internal(s) => write!(f, "Internal Logic Error: {s}"),
        }
    }
}

impl std::error::Error for FieldmapError {}
