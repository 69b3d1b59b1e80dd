//! # Fieldmap
//!
//! A reflection-free structured-serialization framework. Any type declares a
//! set of named fields once, and the library mechanically derives both encode
//! and decode logic from that single declaration: encoding walks the live
//! fields into a JSON-like [`Value`] tree, decoding walks a received tree
//! back into the live fields.
//!
//! ## Overview
//!
//! Fieldmap deliberately avoids derive macros and runtime reflection. A type
//! opts in by embedding a [`FieldTable`] and implementing [`Serializable`]:
//! the `declare_fields` hook registers each field exactly once, binding a
//! case-insensitive key to a typed projection into the struct. The hook runs
//! lazily, on the first serialize or unserialize call, and never again for
//! the lifetime of the object.
//!
//! ### Key Properties
//!
//! *   **Declare once, run many:** a single declaration drives both
//!     directions. There is no way for encode and decode to drift apart.
//! *   **Ordered, diffable output:** encoded objects preserve declaration
//!     order, so rendered text is stable and human-comparable.
//! *   **Partial tolerance:** a per-object switch lets decode skip missing
//!     or mismatched fields instead of failing the whole operation.
//! *   **Thread-safe tables:** every operation on an object runs under that
//!     object's [`ReentrantLock`], so the field table is populated exactly
//!     once even under concurrent first use.
//!
//! ## Core Concepts
//!
//! ### `Value`
//!
//! The [`Value`] tree (`Null`, `Bool`, `Int`, `Float`, `Str`, `Array`,
//! `Object`) is both the in-memory serialization target and the parsed form
//! of wire text. Object keys are unique under case-insensitive comparison
//! and keep insertion order. The textual grammar itself is delegated to
//! `serde_json`; [`Value`] implements the serde data model directly, so
//! parsing and rendering are single-pass.
//!
//! ### `Serializable` and `FieldTable`
//!
//! The [`Serializable`] trait is the capability seam. Implementors embed a
//! [`FieldTable`], which owns the declaration state, the registered entries,
//! the partial-tolerance flag, and the per-object lock.
//!
//! ### `Fieldmap`
//!
//! The [`Fieldmap`] struct is the entry point driving the registry: it
//! builds a [`Value`] from live fields, or pushes a received [`Value`] back
//! into them, recursing through nested serializable fields and homogeneous
//! sequences.
//!
//! ## Usage
//!
//! ```
//! use fieldmap::{FieldMap, FieldTable, Fieldmap, Serializable};
//!
//! #[derive(Default)]
//! struct Sensor {
//!     table: FieldTable<Sensor>,
//!     id: i64,
//!     label: String,
//!     ratio: f64,
//! }
//!
//! impl Serializable for Sensor {
//!     fn field_table(&self) -> &FieldTable<Self> {
//!         &self.table
//!     }
//!
//!     fn declare_fields(map: &mut FieldMap<Self>) -> fieldmap::Result<()> {
//!         map.field("id", |s: &mut Sensor| &mut s.id)?;
//!         map.field("label", |s: &mut Sensor| &mut s.label)?;
//!         map.field("ratio", |s: &mut Sensor| &mut s.ratio)?;
//!         Ok(())
//!     }
//! }
//!
//! # fn main() -> fieldmap::Result<()> {
//! let mut sensor = Sensor {
//!     id: 42,
//!     label: "x".into(),
//!     ratio: 1.5,
//!     ..Default::default()
//! };
//!
//! let text = Fieldmap::serialize_text(&mut sensor, false)?;
//! assert_eq!(text, r#"{"id":42,"label":"x","ratio":1.5}"#);
//!
//! let mut copy = Sensor::default();
//! Fieldmap::unserialize_text(&mut copy, &text)?;
//! assert_eq!(copy.id, 42);
//! assert_eq!(copy.label, "x");
//! assert_eq!(copy.ratio, 1.5);
//! # Ok(())
//! # }
//! ```
//!
//! ## Supported Field Kinds
//!
//! | Field kind | Encoded as |
//! |---|---|
//! | `i8`..`i64`, `u8`, `u16`, `u64` | `Int` |
//! | `f32`, `f64` | `Float` |
//! | `bool` | `Bool` |
//! | `String` | `Str` |
//! | nested [`Serializable`] | `Object` (recursive) |
//! | `Vec` of a supported kind | `Array`, order preserved |
//!
//! `u32` is deliberately unsupported: represented as a signed `Int` its
//! round-trip would be ambiguous. Register such fields as strings with
//! explicit conversion; registering a `u32` directly fails with
//! [`FieldmapError::UnsupportedType`].
//!
//! ## Safety and Error Handling
//!
//! * **No Unsafe:** field access goes through typed projections, never raw
//!   addresses (enforced by `#![deny(unsafe_code)]`).
//! * **No Panics:** all failure conditions are surfaced as
//!   [`FieldmapError`] values (enforced by clippy lints).
//! * **Documented partiality:** a failed unserialize may leave a prefix of
//!   fields already updated; the library reports the failure instead of
//!   pretending to roll back. See [`Fieldmap::unserialize`].

#![deny(unsafe_code)]
#![deny(clippy::unwrap_used)]
#![deny(clippy::panic)]
#![warn(missing_docs)]

// --- PUBLIC API MODULES ---
pub mod api;
pub mod codec;
pub mod error;
pub mod field;
pub mod lock;
pub mod registry;
pub mod value;

// --- INTERNAL IMPLEMENTATION MODULES ---
mod engine;
mod macros;

// --- RE-EXPORTS ---

pub use api::Fieldmap;
pub use error::{FieldmapError, Result};
pub use field::Field;
pub use lock::{ReentrantGuard, ReentrantLock};
pub use registry::{FieldMap, FieldTable, Serializable};
pub use value::Value;
