#![allow(missing_docs)]

use fieldmap::{fields, FieldMap, FieldTable, Fieldmap, FieldmapError, Serializable};

/// Hook attempts a case-variant duplicate registration, asserts the
/// rejection in place, and carries on.
#[derive(Default)]
struct DupProbe {
    table: FieldTable<DupProbe>,
    a: i64,
    b: i64,
}

impl Serializable for DupProbe {
    fn field_table(&self) -> &FieldTable<Self> {
        &self.table
    }

    fn declare_fields(map: &mut FieldMap<Self>) -> fieldmap::Result<()> {
        map.field("alpha", |s: &mut DupProbe| &mut s.a)?;

        let clash = map.field("ALPHA", |s: &mut DupProbe| &mut s.b);
        assert_eq!(
            clash,
            Err(FieldmapError::DuplicateKey("ALPHA".to_string()))
        );
        assert_eq!(map.len(), 1, "failed registration must not grow the map");

        map.field("beta", |s: &mut DupProbe| &mut s.b)?;
        Ok(())
    }
}

#[derive(Default)]
struct UnsignedProbe {
    table: FieldTable<UnsignedProbe>,
    raw: u32,
}

impl Serializable for UnsignedProbe {
    fn field_table(&self) -> &FieldTable<Self> {
        &self.table
    }

    fn declare_fields(map: &mut FieldMap<Self>) -> fieldmap::Result<()> {
        map.field("raw", |s: &mut UnsignedProbe| &mut s.raw)?;
        Ok(())
    }
}

#[derive(Default)]
struct UnsignedVecProbe {
    table: FieldTable<UnsignedVecProbe>,
    raw: Vec<u32>,
}

impl Serializable for UnsignedVecProbe {
    fn field_table(&self) -> &FieldTable<Self> {
        &self.table
    }

    fn declare_fields(map: &mut FieldMap<Self>) -> fieldmap::Result<()> {
        map.field("raw", |s: &mut UnsignedVecProbe| &mut s.raw)?;
        Ok(())
    }
}

#[derive(Default)]
struct WideProbe {
    table: FieldTable<WideProbe>,
    wide: u64,
}

impl Serializable for WideProbe {
    fn field_table(&self) -> &FieldTable<Self> {
        &self.table
    }

    fn declare_fields(map: &mut FieldMap<Self>) -> fieldmap::Result<()> {
        map.field("wide", |s: &mut WideProbe| &mut s.wide)?;
        Ok(())
    }
}

#[derive(Default)]
struct Pose {
    table: FieldTable<Pose>,
    x: f64,
    y: f64,
    frozen: bool,
}

impl Serializable for Pose {
    fn field_table(&self) -> &FieldTable<Self> {
        &self.table
    }

    fn declare_fields(map: &mut FieldMap<Self>) -> fieldmap::Result<()> {
        fields!(map => Pose { x, y, frozen });
        Ok(())
    }
}

// --- TESTS ---

/// Duplicate keys (any case variant) are rejected without disturbing the
/// entries registered so far.
#[test]
fn duplicate_key_rejected_in_hook() -> fieldmap::Result<()> {
    let mut probe = DupProbe {
        a: 10,
        b: 20,
        ..Default::default()
    };

    let tree = Fieldmap::serialize(&mut probe)?;
    assert_eq!(probe.table.field_count(), 2);
    assert_eq!(tree.find("alpha"), Some(&fieldmap::Value::Int(10)));
    assert_eq!(tree.find("beta"), Some(&fieldmap::Value::Int(20)));
    Ok(())
}

/// Registering a `u32` field fails with `UnsupportedType` at declaration
/// time, before any encode attempt, and installs nothing.
#[test]
fn u32_field_unsupported() {
    let mut probe = UnsignedProbe::default();
    let err = Fieldmap::serialize(&mut probe).unwrap_err();
    assert!(matches!(err, FieldmapError::UnsupportedType(_)));
    assert!(!probe.table.is_declared());
    assert_eq!(probe.table.field_count(), 0);
}

/// The `u32` rejection reaches through sequence registration too.
#[test]
fn vec_u32_field_unsupported() {
    let mut probe = UnsignedVecProbe::default();
    let err = Fieldmap::serialize(&mut probe).unwrap_err();
    assert!(matches!(err, FieldmapError::UnsupportedType(_)));
}

/// `u64` registers fine; values beyond the signed Int range fail at encode
/// time and abort the whole serialize.
#[test]
fn u64_overflow_fails_encode() -> fieldmap::Result<()> {
    let mut probe = WideProbe {
        wide: u64::MAX,
        ..Default::default()
    };
    let err = Fieldmap::serialize(&mut probe).unwrap_err();
    assert!(matches!(err, FieldmapError::TypeMismatch(_)));

    probe.wide = i64::MAX as u64;
    let tree = Fieldmap::serialize(&mut probe)?;
    assert_eq!(tree.find("wide"), Some(&fieldmap::Value::Int(i64::MAX)));
    Ok(())
}

/// Any number of public API calls leaves exactly one declaration's worth of
/// fields registered.
#[test]
fn declaration_is_idempotent() -> fieldmap::Result<()> {
    let mut probe = DupProbe::default();

    Fieldmap::declare(&probe)?;
    assert!(probe.table.is_declared());
    assert_eq!(probe.table.field_count(), 2);

    for _ in 0..5 {
        Fieldmap::serialize(&mut probe)?;
        Fieldmap::declare(&probe)?;
    }
    assert_eq!(probe.table.field_count(), 2);
    Ok(())
}

/// The `fields!` shorthand registers under the identifier names.
#[test]
fn fields_macro_uses_identifier_names() -> fieldmap::Result<()> {
    let mut pose = Pose {
        x: 1.0,
        y: -2.0,
        frozen: true,
        ..Default::default()
    };

    let text = Fieldmap::serialize_text(&mut pose, false)?;
    assert_eq!(text, r#"{"x":1.0,"y":-2.0,"frozen":true}"#);
    Ok(())
}

/// A cloned object starts with a fresh, undeclared table and re-declares
/// lazily on its own first use.
#[test]
fn cloned_table_redeclares() -> fieldmap::Result<()> {
    let mut probe = DupProbe::default();
    Fieldmap::declare(&probe)?;

    let table_copy: FieldTable<DupProbe> = probe.table.clone();
    assert!(!table_copy.is_declared());
    assert_eq!(table_copy.field_count(), 0);

    Fieldmap::serialize(&mut probe)?;
    Ok(())
}
