#![allow(missing_docs)]

use fieldmap::{FieldMap, FieldTable, Fieldmap, Serializable, Value};

#[derive(Default, Clone)]
struct Endpoint {
    table: FieldTable<Endpoint>,
    host: String,
    port: i64,
}

impl Serializable for Endpoint {
    fn field_table(&self) -> &FieldTable<Self> {
        &self.table
    }

    fn declare_fields(map: &mut FieldMap<Self>) -> fieldmap::Result<()> {
        map.field("host", |e: &mut Endpoint| &mut e.host)?;
        map.field("port", |e: &mut Endpoint| &mut e.port)?;
        Ok(())
    }
}

#[derive(Default)]
struct Service {
    table: FieldTable<Service>,
    name: String,
    control: Endpoint,
    peers: Vec<Endpoint>,
}

impl Serializable for Service {
    fn field_table(&self) -> &FieldTable<Self> {
        &self.table
    }

    fn declare_fields(map: &mut FieldMap<Self>) -> fieldmap::Result<()> {
        map.field("name", |s: &mut Service| &mut s.name)?;
        map.nested("control", |s: &mut Service| &mut s.control)?;
        map.nested_seq("peers", |s: &mut Service| &mut s.peers)?;
        Ok(())
    }
}

/// Uses the pre/post hooks to keep a derived field in sync with the
/// declared ones.
#[derive(Default)]
struct Span {
    table: FieldTable<Span>,
    start: i64,
    end: i64,
    /// Derived, not declared: refreshed by the hooks.
    length: i64,
}

impl Serializable for Span {
    fn field_table(&self) -> &FieldTable<Self> {
        &self.table
    }

    fn declare_fields(map: &mut FieldMap<Self>) -> fieldmap::Result<()> {
        map.field("start", |s: &mut Span| &mut s.start)?;
        map.field("end", |s: &mut Span| &mut s.end)?;
        Ok(())
    }

    fn pre_serialize(&mut self) {
        self.length = self.end - self.start;
    }

    fn post_unserialize(&mut self) {
        self.length = self.end - self.start;
    }
}

fn endpoint(host: &str, port: i64) -> Endpoint {
    Endpoint {
        host: host.into(),
        port,
        ..Default::default()
    }
}

// --- TESTS ---

/// A nested serializable field encodes as a recursively built object.
#[test]
fn nested_object_round_trip() -> fieldmap::Result<()> {
    let mut service = Service {
        name: "registry".into(),
        control: endpoint("localhost", 9090),
        ..Default::default()
    };

    let text = Fieldmap::serialize_text(&mut service, false)?;
    assert_eq!(
        text,
        r#"{"name":"registry","control":{"host":"localhost","port":9090},"peers":[]}"#
    );

    let mut restored = Service::default();
    Fieldmap::unserialize_text(&mut restored, &text)?;
    assert_eq!(restored.name, "registry");
    assert_eq!(restored.control.host, "localhost");
    assert_eq!(restored.control.port, 9090);
    assert!(restored.peers.is_empty());
    Ok(())
}

/// A sequence of three nested objects encodes to an array of three objects
/// in original order and decodes back with identical field values.
#[test]
fn nested_sequence_preserves_order() -> fieldmap::Result<()> {
    let mut service = Service {
        name: "mesh".into(),
        control: endpoint("ctrl", 1),
        peers: vec![
            endpoint("alpha", 10),
            endpoint("beta", 20),
            endpoint("gamma", 30),
        ],
        ..Default::default()
    };

    let tree = Fieldmap::serialize(&mut service)?;
    let peers = match tree.find("peers") {
        Some(Value::Array(items)) => items,
        other => panic!("expected peers array, got {other:?}"),
    };
    assert_eq!(peers.len(), 3);
    assert!(peers.iter().all(Value::is_object));

    let mut restored = Service::default();
    Fieldmap::unserialize(&mut restored, &tree)?;
    let hosts: Vec<&str> = restored.peers.iter().map(|p| p.host.as_str()).collect();
    assert_eq!(hosts, ["alpha", "beta", "gamma"]);
    assert_eq!(restored.peers[2].port, 30);
    Ok(())
}

/// Decoding a sequence replaces the prior elements entirely.
#[test]
fn nested_sequence_replaces_existing_elements() -> fieldmap::Result<()> {
    let mut source = Service {
        name: "short".into(),
        control: endpoint("c", 0),
        peers: vec![endpoint("only", 1)],
        ..Default::default()
    };
    let tree = Fieldmap::serialize(&mut source)?;

    let mut target = Service {
        peers: vec![endpoint("stale-1", 91), endpoint("stale-2", 92)],
        ..Default::default()
    };
    Fieldmap::unserialize(&mut target, &tree)?;
    assert_eq!(target.peers.len(), 1);
    assert_eq!(target.peers[0].host, "only");
    Ok(())
}

/// Pre/post hooks run once per operation and can maintain derived state.
#[test]
fn hooks_refresh_derived_fields() -> fieldmap::Result<()> {
    let mut span = Span {
        start: 10,
        end: 25,
        ..Default::default()
    };

    let tree = Fieldmap::serialize(&mut span)?;
    assert_eq!(span.length, 15, "pre_serialize refreshed the derived field");
    assert_eq!(tree.find("length"), None, "derived field is not declared");

    let mut copy = Span::default();
    Fieldmap::unserialize(&mut copy, &tree)?;
    assert_eq!(copy.length, 15, "post_unserialize recomputed it");
    Ok(())
}

/// The post hook does not run when the operation fails.
#[test]
fn post_hook_skipped_on_failure() -> fieldmap::Result<()> {
    let mut span = Span {
        length: -1,
        ..Default::default()
    };

    let partial = Value::parse(r#"{"start": 1}"#)?;
    assert!(Fieldmap::unserialize(&mut span, &partial).is_err());
    assert_eq!(span.length, -1, "derived field untouched after failure");
    Ok(())
}
