//! The serialization engine: drives the registry in both directions.
//!
//! Every operation here runs under the owning object's reentrant lock for
//! its full duration, so whole-object encode/decode is atomic with respect
//! to other threads operating on the same object, and lazy declaration
//! happens exactly once even under concurrent first use. No I/O happens
//! while the lock is held.
//!
//! The entry walk needs the entries and `&mut` access to the object at the
//! same time, so the entries are moved out of the table for the duration of
//! the walk and restored afterwards; the object's lock makes the window
//! invisible to other callers.

use crate::error::{FieldmapError, Result};
use crate::registry::{FieldMap, FieldTable, Serializable};
use crate::value::Value;

pub(crate) fn serialize<T: Serializable + 'static>(obj: &mut T) -> Result<Value> {
    let lock = obj.field_table().lock_handle();
    let _guard = lock.guard();
    serialize_locked(obj)
}

pub(crate) fn serialize_within<T: Serializable + 'static>(obj: &mut T, wait_us: u64) -> Result<Value> {
    let lock = obj.field_table().lock_handle();
    let Some(_guard) = lock.try_guard(wait_us) else {
        return Err(FieldmapError::LockTimeout);
    };
    serialize_locked(obj)
}

pub(crate) fn unserialize<T: Serializable + 'static>(obj: &mut T, value: &Value) -> Result<()> {
    let lock = obj.field_table().lock_handle();
    let _guard = lock.guard();
    unserialize_locked(obj, value)
}

pub(crate) fn unserialize_within<T: Serializable + 'static>(
    obj: &mut T,
    value: &Value,
    wait_us: u64,
) -> Result<()> {
    let lock = obj.field_table().lock_handle();
    let Some(_guard) = lock.try_guard(wait_us) else {
        return Err(FieldmapError::LockTimeout);
    };
    unserialize_locked(obj, value)
}

pub(crate) fn declare<T: Serializable + 'static>(obj: &T) -> Result<()> {
    let lock = obj.field_table().lock_handle();
    let _guard = lock.guard();
    ensure_declared(obj.field_table())
}

/// Idempotent compute-once declaration: runs the hook on the first call,
/// observes the completed state afterwards. A failed hook installs nothing
/// and resets the marker, so nothing half-declared survives.
fn ensure_declared<T: Serializable + 'static>(table: &FieldTable<T>) -> Result<()> {
    if !table.mark_declaring()? {
        return Ok(());
    }
    let mut map = FieldMap::new();
    match T::declare_fields(&mut map) {
        Ok(()) => {
            table.install_entries(map.into_entries());
            Ok(())
        }
        Err(e) => {
            table.abandon_declaration();
            Err(e)
        }
    }
}

fn serialize_locked<T: Serializable + 'static>(obj: &mut T) -> Result<Value> {
    ensure_declared(obj.field_table())?;
    obj.pre_serialize();

    let entries = obj.field_table().take_entries();
    let mut root = Value::object();
    let mut outcome = Ok(());
    for entry in &entries {
        match entry.encode(obj) {
            Ok(encoded) => {
                if let Err(e) = root.put(entry.key(), encoded) {
                    outcome = Err(e);
                    break;
                }
            }
            Err(e) => {
                outcome = Err(e);
                break;
            }
        }
    }
    obj.field_table().restore_entries(entries);

    // The first encode failure abandons the remaining entries; no partial
    // object escapes.
    outcome.map(|()| root)
}

fn unserialize_locked<T: Serializable + 'static>(obj: &mut T, value: &Value) -> Result<()> {
    ensure_declared(obj.field_table())?;

    if !value.is_object() {
        return Err(FieldmapError::TypeMismatch(format!(
            "expected object, found {}",
            value.kind()
        )));
    }

    let tolerant = obj.field_table().partial_tolerance();
    let entries = obj.field_table().take_entries();
    let mut outcome = Ok(());
    for entry in &entries {
        match value.find(entry.key()) {
            Some(found) => match entry.decode(found, obj) {
                Ok(()) => {}
                Err(FieldmapError::TypeMismatch(_) | FieldmapError::MissingField(_))
                    if tolerant => {}
                Err(e) => {
                    outcome = Err(e);
                    break;
                }
            },
            None if tolerant => {}
            None => {
                outcome = Err(FieldmapError::MissingField(entry.key().to_string()));
                break;
            }
        }
    }
    obj.field_table().restore_entries(entries);

    // Entries decoded before a failure stay applied; the caller is told the
    // operation failed rather than being promised a rollback.
    outcome?;
    obj.post_unserialize();
    Ok(())
}
