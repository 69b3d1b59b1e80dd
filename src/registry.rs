//! The field mapping registry.
//!
//! This is the heart of the library: a per-object ordered collection of
//! `(key, encode, decode)` entries, built lazily on first use by replaying
//! the object's declaration hook exactly once, and guarded by the object's
//! reentrant lock for every operation.
//!
//! The mapping this design descends from stored a raw field address next to
//! two function pointers per entry. Here each entry instead boxes a
//! [`FieldCodec`] trait object capturing a typed projection
//! `fn(&mut T) -> &mut F` into the owning struct: one registry type for
//! heterogeneous fields, with no address arithmetic and no unsafe.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError};

use crate::error::{FieldmapError, Result};
use crate::field::Field;
use crate::lock::ReentrantLock;
use crate::value::Value;

/// A type that declares a field mapping and can be driven by
/// [`Fieldmap`](crate::Fieldmap).
///
/// Implementors embed a [`FieldTable`] and hand it out through
/// [`field_table`](Serializable::field_table). The declaration hook runs
/// exactly once per object instance, lazily, on the first serialize or
/// unserialize call.
pub trait Serializable {
    /// Access to the per-object serialization state embedded in the type.
    fn field_table(&self) -> &FieldTable<Self>
    where
        Self: Sized;

    /// The one-time declaration hook: registers every field of the type on
    /// the given map. Registration is only reachable from here: the
    /// [`FieldMap`] handed in exists for the duration of this call.
    fn declare_fields(map: &mut FieldMap<Self>) -> Result<()>
    where
        Self: Sized;

    /// Invoked once per serialize call, before encoding starts. Override to
    /// refresh derived fields. Default: no-op.
    fn pre_serialize(&mut self) {}

    /// Invoked once per successful unserialize call, after all decoded
    /// values have been applied. Override to recompute derived state.
    /// Default: no-op.
    fn post_unserialize(&mut self) {}
}

/// Encode/decode pair for one declared field, erased over the field type.
pub(crate) trait FieldCodec<T>: Send + Sync {
    fn encode(&self, obj: &mut T) -> Result<Value>;
    fn decode(&self, value: &Value, obj: &mut T) -> Result<()>;
}

/// One declared field of a serializable object: its key plus the erased
/// codec holding the typed projection.
pub struct FieldEntry<T> {
    key: String,
    codec: Box<dyn FieldCodec<T>>,
}

impl<T> FieldEntry<T> {
    pub(crate) fn key(&self) -> &str {
        &self.key
    }

    pub(crate) fn encode(&self, obj: &mut T) -> Result<Value> {
        self.codec.encode(obj)
    }

    pub(crate) fn decode(&self, value: &Value, obj: &mut T) -> Result<()> {
        self.codec.decode(value, obj)
    }
}

impl<T> fmt::Debug for FieldEntry<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FieldEntry").field("key", &self.key).finish()
    }
}

// --- CONCRETE CODECS ---

/// Directly-mapped field kinds (scalars, strings, `Vec` of those).
struct SlotCodec<T, F> {
    project: fn(&mut T) -> &mut F,
}

impl<T, F: Field> FieldCodec<T> for SlotCodec<T, F> {
    fn encode(&self, obj: &mut T) -> Result<Value> {
        (self.project)(obj).encode()
    }

    fn decode(&self, value: &Value, obj: &mut T) -> Result<()> {
        *(self.project)(obj) = F::decode(value)?;
        Ok(())
    }
}

/// A nested serializable field, encoded recursively as an `Object`. Decode
/// reuses the live nested object in place, so its own tolerance setting and
/// hooks apply.
struct NestedCodec<T, F> {
    project: fn(&mut T) -> &mut F,
}

impl<T, F: Serializable + 'static> FieldCodec<T> for NestedCodec<T, F> {
    fn encode(&self, obj: &mut T) -> Result<Value> {
        crate::engine::serialize((self.project)(obj))
    }

    fn decode(&self, value: &Value, obj: &mut T) -> Result<()> {
        crate::engine::unserialize((self.project)(obj), value)
    }
}

/// A homogeneous sequence of nested serializable objects. Decode rebuilds
/// the vector from `F::default()` elements, since fresh elements must exist
/// before they can be unserialized into.
struct NestedSeqCodec<T, F> {
    project: fn(&mut T) -> &mut Vec<F>,
}

impl<T, F: Serializable + Default + 'static> FieldCodec<T> for NestedSeqCodec<T, F> {
    fn encode(&self, obj: &mut T) -> Result<Value> {
        let items = (self.project)(obj);
        let mut encoded = Vec::with_capacity(items.len());
        for item in items.iter_mut() {
            encoded.push(crate::engine::serialize(item)?);
        }
        Ok(Value::Array(encoded))
    }

    fn decode(&self, value: &Value, obj: &mut T) -> Result<()> {
        let items = match value {
            Value::Array(items) => items,
            other => {
                return Err(FieldmapError::TypeMismatch(format!(
                    "expected array, found {}",
                    other.kind()
                )))
            }
        };
        let mut fresh = Vec::with_capacity(items.len());
        for item in items {
            let mut element = F::default();
            crate::engine::unserialize(&mut element, item)?;
            fresh.push(element);
        }
        *(self.project)(obj) = fresh;
        Ok(())
    }
}

// --- DECLARATION SURFACE ---

/// The registration surface handed to
/// [`Serializable::declare_fields`].
///
/// Keys are unique within one object under case-insensitive comparison;
/// registering a duplicate fails with [`FieldmapError::DuplicateKey`] and
/// leaves the map as it was. Declaration order is preserved and becomes the
/// encode output order.
pub struct FieldMap<T> {
    entries: Vec<FieldEntry<T>>,
}

impl<T: Serializable + 'static> FieldMap<T> {
    pub(crate) fn new() -> Self {
        FieldMap {
            entries: Vec::new(),
        }
    }

    pub(crate) fn into_entries(self) -> Vec<FieldEntry<T>> {
        self.entries
    }

    /// Registers a directly-mapped field: any integer width except `u32`,
    /// `f32`/`f64`, `bool`, `String`, or a `Vec` of those.
    ///
    /// The projection is a plain function from the owning struct to the
    /// field slot, typically a closure literal like
    /// `|s: &mut Sensor| &mut s.id`.
    pub fn field<F: Field + 'static>(&mut self, key: &str, project: fn(&mut T) -> &mut F) -> Result<()> {
        F::check_supported(key)?;
        self.insert(key, Box::new(SlotCodec { project }))
    }

    /// Registers a nested serializable field, encoded recursively as an
    /// `Object`.
    pub fn nested<F: Serializable + 'static>(
        &mut self,
        key: &str,
        project: fn(&mut T) -> &mut F,
    ) -> Result<()> {
        self.insert(key, Box::new(NestedCodec { project }))
    }

    /// Registers a homogeneous sequence of nested serializable objects,
    /// encoded as an `Array` of `Object`s in element order.
    pub fn nested_seq<F: Serializable + Default + 'static>(
        &mut self,
        key: &str,
        project: fn(&mut T) -> &mut Vec<F>,
    ) -> Result<()> {
        self.insert(key, Box::new(NestedSeqCodec { project }))
    }

    /// Number of fields registered so far.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// True if nothing has been registered yet.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn insert(&mut self, key: &str, codec: Box<dyn FieldCodec<T>>) -> Result<()> {
        if self
            .entries
            .iter()
            .any(|entry| entry.key.eq_ignore_ascii_case(key))
        {
            return Err(FieldmapError::DuplicateKey(key.to_string()));
        }
        self.entries.push(FieldEntry {
            key: key.to_string(),
            codec,
        });
        Ok(())
    }
}

// --- PER-OBJECT STATE ---

/// Lifecycle marker for the lazy one-time declaration.
///
/// `Declaring` exists to detect a declaration hook reaching back into its
/// own object (which would otherwise recurse forever under the reentrant
/// lock) rather than relying on lock reentrancy alone.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum DeclState {
    Undeclared,
    Declaring,
    Declared,
}

struct TableSlot<T> {
    state: DeclState,
    entries: Vec<FieldEntry<T>>,
}

/// Per-object serialization state: the reentrant operation lock, the
/// declaration marker, the registered entries, and the partial-tolerance
/// flag.
///
/// Embed one in each serializable type and return it from
/// [`Serializable::field_table`]. The table starts empty; the declaration
/// hook populates it exactly once on first use. Cloning a table yields a
/// fresh undeclared one, so serializable types can derive `Clone`; the
/// clone re-declares lazily on its own first use.
pub struct FieldTable<T> {
    lock: Arc<ReentrantLock>,
    slot: Mutex<TableSlot<T>>,
    tolerant: AtomicBool,
}

impl<T> FieldTable<T> {
    /// Creates an empty, undeclared table with tolerance off.
    pub fn new() -> Self {
        FieldTable {
            lock: Arc::new(ReentrantLock::new()),
            slot: Mutex::new(TableSlot {
                state: DeclState::Undeclared,
                entries: Vec::new(),
            }),
            tolerant: AtomicBool::new(false),
        }
    }

    /// Switches partial unserialization tolerance for the owning object.
    ///
    /// With tolerance on, a missing or type-mismatched field is skipped
    /// during decode (the live field keeps its current value) instead of
    /// failing the whole operation. The setting is per object and may be
    /// toggled between calls on the same instance.
    pub fn set_partial_tolerance(&self, tolerant: bool) {
        self.tolerant.store(tolerant, Ordering::Relaxed);
    }

    /// Current partial-tolerance setting.
    pub fn partial_tolerance(&self) -> bool {
        self.tolerant.load(Ordering::Relaxed)
    }

    /// True once the declaration hook has completed for this object.
    pub fn is_declared(&self) -> bool {
        self.slot_guard().state == DeclState::Declared
    }

    /// Number of registered fields (zero until first use).
    pub fn field_count(&self) -> usize {
        self.slot_guard().entries.len()
    }

    /// Shared handle to the per-object operation lock.
    ///
    /// The engine acquires it internally for every operation; the handle is
    /// public so a caller can additionally hold the lock across *several*
    /// operations on the same object, making the whole group atomic with
    /// respect to other threads. Reentrancy makes the engine's own
    /// acquisition nest harmlessly inside.
    pub fn lock_handle(&self) -> Arc<ReentrantLock> {
        Arc::clone(&self.lock)
    }

    /// First half of the compute-once protocol. `Ok(true)` means this
    /// caller must run the declaration hook; `Ok(false)` means declaration
    /// already completed.
    pub(crate) fn mark_declaring(&self) -> Result<bool> {
        let mut slot = self.slot_guard();
        match slot.state {
            DeclState::Declared => Ok(false),
            DeclState::Declaring => Err(FieldmapError::Internal(
                "declaration hook re-entered its own object".to_string(),
            )),
            DeclState::Undeclared => {
                slot.state = DeclState::Declaring;
                Ok(true)
            }
        }
    }

    /// Completes a successful declaration.
    pub(crate) fn install_entries(&self, entries: Vec<FieldEntry<T>>) {
        let mut slot = self.slot_guard();
        slot.entries = entries;
        slot.state = DeclState::Declared;
    }

    /// Rolls a failed declaration back to the undeclared state, installing
    /// nothing.
    pub(crate) fn abandon_declaration(&self) {
        let mut slot = self.slot_guard();
        slot.entries = Vec::new();
        slot.state = DeclState::Undeclared;
    }

    /// Moves the entries out for a walk that also needs `&mut` access to
    /// the owning object; callers must pair this with
    /// [`restore_entries`](FieldTable::restore_entries).
    pub(crate) fn take_entries(&self) -> Vec<FieldEntry<T>> {
        std::mem::take(&mut self.slot_guard().entries)
    }

    pub(crate) fn restore_entries(&self, entries: Vec<FieldEntry<T>>) {
        self.slot_guard().entries = entries;
    }

    fn slot_guard(&self) -> std::sync::MutexGuard<'_, TableSlot<T>> {
        self.slot.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl<T> Default for FieldTable<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for FieldTable<T> {
    fn clone(&self) -> Self {
        let fresh = Self::new();
        fresh.set_partial_tolerance(self.partial_tolerance());
        fresh
    }
}

impl<T> fmt::Debug for FieldTable<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let slot = self.slot_guard();
        f.debug_struct("FieldTable")
            .field("state", &slot.state)
            .field("fields", &slot.entries.len())
            .field("tolerant", &self.partial_tolerance())
            .finish()
    }
}
