//! Public entry points driving the serialization engine.

use crate::codec;
use crate::engine;
use crate::error::Result;
use crate::registry::Serializable;
use crate::value::Value;

/// The main entry point for serializing and unserializing declared objects.
#[derive(Debug)]
pub struct Fieldmap;

impl Fieldmap {
    /// Encodes the object's declared fields into an `Object` value, in
    /// declaration order.
    ///
    /// Runs the declaration hook first if this is the object's first
    /// operation, then the object's `pre_serialize` hook. The first encode
    /// failure aborts the call; no partial value is returned.
    pub fn serialize<T: Serializable + 'static>(obj: &mut T) -> Result<Value> {
        engine::serialize(obj)
    }

    /// [`serialize`](Fieldmap::serialize) followed by textual rendering,
    /// compact or pretty.
    pub fn serialize_text<T: Serializable + 'static>(obj: &mut T, pretty: bool) -> Result<String> {
        engine::serialize(obj)?.to_text(pretty)
    }

    /// Decodes an `Object` value back into the object's declared fields, in
    /// declaration order.
    ///
    /// For each declared key the value is looked up case-insensitively:
    /// found entries decode into the live field; a missing key fails with
    /// [`MissingField`](crate::FieldmapError::MissingField) and a wrong
    /// variant with [`TypeMismatch`](crate::FieldmapError::TypeMismatch),
    /// unless the object's partial tolerance is on, in which case the field
    /// is skipped and keeps its current value. On success the object's
    /// `post_unserialize` hook runs.
    ///
    /// A failure part-way through leaves the fields decoded before it
    /// already updated; callers must treat a failed unserialize as "some
    /// prefix of fields may have changed".
    pub fn unserialize<T: Serializable + 'static>(obj: &mut T, value: &Value) -> Result<()> {
        engine::unserialize(obj, value)
    }

    /// Parses `text` and then behaves as [`unserialize`](Fieldmap::unserialize).
    ///
    /// Parsing happens before anything else: on
    /// [`Parse`](crate::FieldmapError::Parse) failure no field is touched.
    pub fn unserialize_text<T: Serializable + 'static>(obj: &mut T, text: &str) -> Result<()> {
        let value = codec::parse(text)?;
        engine::unserialize(obj, &value)
    }

    /// Runs the object's one-time field declaration if it has not happened
    /// yet. Idempotent; concurrent first-time calls result in exactly one
    /// hook execution.
    ///
    /// Normally implicit (every operation declares on first use), but
    /// useful to front-load the hook or to surface declaration errors
    /// early.
    pub fn declare<T: Serializable + 'static>(obj: &T) -> Result<()> {
        engine::declare(obj)
    }

    /// Bounded-wait variant of [`serialize`](Fieldmap::serialize): waits at
    /// most `wait_us` microseconds for the object's lock and fails with
    /// [`LockTimeout`](crate::FieldmapError::LockTimeout) instead of
    /// blocking forever. No state is touched on timeout.
    pub fn serialize_within<T: Serializable + 'static>(obj: &mut T, wait_us: u64) -> Result<Value> {
        engine::serialize_within(obj, wait_us)
    }

    /// Bounded-wait variant of [`unserialize`](Fieldmap::unserialize).
    pub fn unserialize_within<T: Serializable + 'static>(
        obj: &mut T,
        value: &Value,
        wait_us: u64,
    ) -> Result<()> {
        engine::unserialize_within(obj, value, wait_us)
    }
}
