//! Integration tests for snapshots and checkpoints

use cadence_engine::{Fact, Rule};
use cadence_foundation::{EntityId, ErrorKind, Value};
use cadence_runtime::{Context, Snapshot, from_bytes, to_bytes, with_priority};

fn e(n: u64) -> EntityId {
    EntityId::new(n)
}

fn rules() -> Vec<Rule> {
    vec![with_priority(
        5,
        &Rule::builder("alive").when("?e", "health", "?hp").build(),
    )]
}

fn world() -> Context {
    Context::new()
        .add_rules(rules())
        .insert_fact(e(1), "health", 100)
        .insert_fact(e(2), "health", 50)
        .insert_fact(e(2), "name", "mira")
}

#[test]
fn rollback_reproduces_fact_set() {
    let ctx = world().checkpoint("x");
    let later = ctx
        .insert_fact(e(1), "health", 1)
        .retract_fact(e(2), "name")
        .insert_fact(e(4), "new", true);

    let restored = later.rollback("x", rules()).unwrap();
    assert_eq!(restored.save().fact_set(), world().save().fact_set());
    assert_eq!(restored.fact(e(1), "health"), Some(&Value::Int(100)));
}

#[test]
fn rollback_reapplies_rules() {
    let restored = world()
        .checkpoint("x")
        .rollback("x", rules())
        .unwrap();

    assert_eq!(restored.query_matches("alive").len(), 2);
    assert_eq!(restored.priority_of("alive"), 5);
    assert_eq!(restored.pending_activations().len(), 2);
}

#[test]
fn rollback_unknown_name() {
    let err = world().rollback("missing", rules()).unwrap_err();
    assert!(matches!(err.kind, ErrorKind::CheckpointNotFound { .. }));
}

#[test]
fn load_preserves_snapshot_order() {
    let snapshot = Snapshot::new(vec![
        Fact::new(e(3), "b", 1),
        Fact::new(e(1), "a", 2),
    ]);
    let ctx = Context::load(&snapshot, Vec::new()).unwrap();
    assert_eq!(ctx.enumerate_facts(), snapshot.facts);
}

#[test]
fn list_and_remove_checkpoints() {
    let ctx = world().checkpoint("b").checkpoint("a");
    assert_eq!(ctx.list_checkpoints(), vec!["a", "b"]);

    let ctx = ctx.remove_checkpoint("a").remove_checkpoint("zzz");
    assert_eq!(ctx.list_checkpoints(), vec!["b"]);
}

#[test]
fn encoded_snapshot_rolls_forward() {
    let bytes = to_bytes(&world().save()).unwrap();
    let ctx = Context::load(&from_bytes(&bytes).unwrap(), rules()).unwrap();
    assert_eq!(ctx.save().fact_set(), world().save().fact_set());
}
