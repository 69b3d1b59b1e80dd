//! Declaration shorthand.

/// Registers directly-mapped fields under their own identifier names.
///
/// Expands to one [`FieldMap::field`](crate::FieldMap::field) call per
/// listed field, keyed by `stringify!`-ing the identifier, with `?`
/// propagation, so it is only usable inside a `declare_fields` hook (or
/// another function returning [`crate::Result`]). Nested serializable
/// fields still register explicitly through `nested`/`nested_seq`.
///
/// ```
/// use fieldmap::{fields, FieldMap, FieldTable, Serializable};
///
/// #[derive(Default)]
/// struct Pose {
///     table: FieldTable<Pose>,
///     x: f64,
///     y: f64,
///     frozen: bool,
/// }
///
/// impl Serializable for Pose {
///     fn field_table(&self) -> &FieldTable<Self> {
///         &self.table
///     }
///
///     fn declare_fields(map: &mut FieldMap<Self>) -> fieldmap::Result<()> {
///         fields!(map => Pose { x, y, frozen });
///         Ok(())
///     }
/// }
/// ```
#[macro_export]
macro_rules! fields {
    ($map:expr => $ty:ty { $($name:ident),+ $(,)? }) => {
        $(
            $map.field(stringify!($name), |obj: &mut $ty| &mut obj.$name)?;
        )+
    };
}
