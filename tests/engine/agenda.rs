//! Integration tests for the agenda and the native run-cycle

use cadence_engine::{Activation, ConflictResolver, EngineConfig, Rule, Session};
use cadence_foundation::{EntityId, Error};

fn e(n: u64) -> EntityId {
    EntityId::new(n)
}

fn fired(session: &Session) -> Vec<String> {
    session
        .fired_rules()
        .iter()
        .map(|k| k.name().to_string())
        .collect()
}

/// Fires the most recently enqueued activation first.
struct Lifo;

impl ConflictResolver for Lifo {
    fn order(&self, pending: &mut [Activation]) {
        pending.sort_by_key(|a| std::cmp::Reverse(a.seq));
    }
}

#[test]
fn agenda_never_holds_duplicates() {
    let session = Session::new()
        .add_rule(Rule::builder("r").when("?e", "tag", true).build())
        .insert_fact(e(1), "tag", true)
        .insert_fact(e(1), "tag", true)
        .insert_fact(e(1), "other", 1);

    assert_eq!(session.pending_activations().len(), 1);
}

#[test]
fn activations_are_enqueued_in_rule_then_match_order() {
    let session = Session::new()
        .add_rule(Rule::builder("first").when("?e", "tag", true).build())
        .add_rule(Rule::builder("second").when("?e", "tag", true).build())
        .insert_facts([
            cadence_engine::Fact::new(e(1), "tag", true),
            cadence_engine::Fact::new(e(2), "tag", true),
        ]);

    let order: Vec<_> = session
        .pending_activations()
        .iter()
        .map(|a| (a.rule.name().to_string(), a.bindings.get_entity("e").unwrap().index()))
        .collect();
    assert_eq!(
        order,
        vec![
            ("first".to_string(), 1),
            ("first".to_string(), 2),
            ("second".to_string(), 1),
            ("second".to_string(), 2),
        ]
    );
}

#[test]
fn native_cycle_fires_in_enqueue_order() {
    let session = Session::new()
        .add_rule(Rule::builder("a").when("?e", "go", true).build())
        .add_rule(Rule::builder("b").when("?e", "go", true).build())
        .insert_fact(e(1), "go", true)
        .run_native_cycle()
        .unwrap();

    assert_eq!(fired(&session), vec!["a", "b"]);
}

#[test]
fn custom_resolver_controls_order() {
    let session = Session::new()
        .add_rule(Rule::builder("a").when("?e", "go", true).build())
        .add_rule(Rule::builder("b").when("?e", "go", true).build())
        .insert_fact(e(1), "go", true)
        .run_native_cycle_with(&Lifo)
        .unwrap();

    assert_eq!(fired(&session), vec!["b", "a"]);
}

#[test]
fn refired_after_match_returns() {
    let session = Session::new()
        .add_rule(Rule::builder("seen").when("?e", "visible", true).build())
        .insert_fact(e(1), "visible", true)
        .run_native_cycle()
        .unwrap()
        .retract_fact(e(1), "visible")
        .insert_fact(e(1), "visible", true);

    assert_eq!(session.pending_activations().len(), 1);
    let session = session.run_native_cycle().unwrap();
    assert_eq!(fired(&session), vec!["seen", "seen"]);
}

#[test]
fn action_failure_propagates() {
    let session = Session::new()
        .add_rule(
            Rule::builder("fails")
                .when("?e", "go", true)
                .then(|_, _| Err(Error::action_failed("fails", "nope"))),
        )
        .insert_fact(e(1), "go", true);

    let err = session.run_native_cycle().unwrap_err();
    assert!(err.to_string().contains("nope"));
}

#[test]
fn unbounded_by_default_but_cap_is_available() {
    assert_eq!(EngineConfig::default().max_activations, None);

    let countdown = Rule::builder("countdown")
        .when(e(0), "n", "?n")
        .guard(|b| b.get_int("n").is_some_and(|n| n > 0))
        .then(|s, b| Ok(s.insert_fact(e(0), "n", b.get_int("n").unwrap_or(0) - 1)));

    let session = Session::new()
        .add_rule(countdown.clone())
        .insert_fact(e(0), "n", 5)
        .run_native_cycle()
        .unwrap();
    assert_eq!(session.fired().len(), 5);

    let capped = Session::with_config(EngineConfig::new().with_max_activations(3))
        .add_rule(countdown)
        .insert_fact(e(0), "n", 5)
        .run_native_cycle();
    assert!(capped.is_err());
}
