//! Integration tests for session fact handling

use cadence_engine::{Fact, Session};
use cadence_foundation::{EntityId, Value};

fn e(n: u64) -> EntityId {
    EntityId::new(n)
}

#[test]
fn insert_then_query() {
    let session = Session::new()
        .insert_fact(e(1), "health", 100)
        .insert_fact(e(1), "name", "ada");

    assert!(session.has_fact(e(1), "health"));
    assert!(!session.has_fact(e(2), "health"));
    assert_eq!(session.fact(e(1), "name"), Some(&Value::from("ada")));
    assert_eq!(session.fact_count(), 2);
}

#[test]
fn same_pair_is_an_update() {
    let session = Session::new()
        .insert_fact(e(1), "health", 100)
        .insert_fact(e(2), "health", 50)
        .insert_fact(e(1), "health", 10);

    assert_eq!(
        session.enumerate_facts(),
        vec![Fact::new(e(1), "health", 10), Fact::new(e(2), "health", 50)]
    );
}

#[test]
fn retract_removes_fact() {
    let session = Session::new()
        .insert_fact(e(1), "health", 100)
        .retract_fact(e(1), "health")
        .retract_fact(e(1), "never-there");

    assert!(!session.has_fact(e(1), "health"));
    assert_eq!(session.fact_count(), 0);
}

#[test]
fn batch_insert_matches_single_inserts() {
    let facts = vec![
        Fact::new(e(1), "a", 1),
        Fact::new(e(2), "a", 2),
        Fact::new(e(1), "a", 3),
    ];
    let batched = Session::new().insert_facts(facts.clone());
    let single = facts.into_iter().fold(Session::new(), |s, f| {
        s.insert_fact(f.entity, f.attribute, f.value)
    });

    assert_eq!(batched.enumerate_facts(), single.enumerate_facts());
}

#[test]
fn sessions_are_values() {
    let base = Session::new().insert_fact(e(1), "x", 1);
    let left = base.insert_fact(e(1), "x", 2);
    let right = base.retract_fact(e(1), "x");

    assert_eq!(base.fact(e(1), "x"), Some(&Value::Int(1)));
    assert_eq!(left.fact(e(1), "x"), Some(&Value::Int(2)));
    assert!(!right.has_fact(e(1), "x"));
}
