//! Integration tests for the agenda priority scheduler

use cadence_engine::Rule;
use cadence_foundation::EntityId;
use cadence_runtime::{Context, RuntimeConfig, with_priority};

fn trigger(name: &str) -> Rule {
    Rule::builder(name).when("?e", "trigger", true).build()
}

fn fired(ctx: &Context) -> Vec<String> {
    ctx.session()
        .fired_rules()
        .iter()
        .map(|k| k.name().to_string())
        .collect()
}

#[test]
fn descending_priority_with_default_zero() {
    let ctx = Context::new()
        .add_rule(with_priority(100, &trigger("a")))
        .add_rule(with_priority(10, &trigger("b")))
        .add_rule(trigger("c"))
        .insert_fact(EntityId::new(1), "trigger", true)
        .run_cycle()
        .unwrap();

    assert_eq!(fired(&ctx), vec!["a", "b", "c"]);
}

#[test]
fn default_priority_between_tagged_rules() {
    let ctx = Context::with_config(RuntimeConfig::new().with_default_priority(50))
        .add_rule(with_priority(100, &trigger("a")))
        .add_rule(with_priority(10, &trigger("b")))
        .add_rule(trigger("c"))
        .insert_fact(EntityId::new(1), "trigger", true)
        .run_cycle()
        .unwrap();

    assert_eq!(fired(&ctx), vec!["a", "c", "b"]);
}

#[test]
fn equal_priorities_keep_registration_order() {
    let ctx = ["w", "x", "y", "z"]
        .iter()
        .fold(Context::new(), |ctx, name| {
            ctx.add_rule(with_priority(5, &trigger(name)))
        })
        .insert_fact(EntityId::new(1), "trigger", true);

    let first = fired(&ctx.run_cycle().unwrap());
    let second = fired(&ctx.run_cycle().unwrap());
    assert_eq!(first, vec!["w", "x", "y", "z"]);
    assert_eq!(first, second);
}

#[test]
fn negative_priorities_run_last() {
    let ctx = Context::new()
        .add_rule(with_priority(-1, &trigger("late")))
        .add_rule(trigger("normal"))
        .insert_fact(EntityId::new(1), "trigger", true)
        .run_cycle()
        .unwrap();

    assert_eq!(fired(&ctx), vec!["normal", "late"]);
}

#[test]
fn explain_matches_actual_order() {
    let ctx = Context::new()
        .add_rule(with_priority(3, &trigger("m")))
        .add_rule(with_priority(7, &trigger("h")))
        .add_rule(trigger("l"))
        .insert_fact(EntityId::new(1), "trigger", true);

    let explained: Vec<_> = ctx
        .explain_execution_order()
        .iter()
        .map(|s| s.rule.name().to_string())
        .collect();
    assert_eq!(explained, fired(&ctx.run_cycle().unwrap()));
}

#[test]
fn high_priority_enqueued_mid_cycle_runs_first() {
    let arm = Rule::builder("arm")
        .when("?e", "trigger", true)
        .then(|s, b| Ok(s.insert_fact(b.get_entity("e").unwrap(), "armed", true)));
    let fire = Rule::builder("fire").when("?e", "armed", true).build();

    let ctx = Context::new()
        .add_rule(with_priority(50, &arm))
        .add_rule(with_priority(10, &trigger("idle")))
        .add_rule(with_priority(100, &fire))
        .insert_fact(EntityId::new(1), "trigger", true)
        .run_cycle()
        .unwrap();

    assert_eq!(fired(&ctx), vec!["arm", "fire", "idle"]);
}

#[test]
fn list_priorities_reflects_tags() {
    let ctx = Context::new()
        .add_rule(with_priority(2, &trigger("two")))
        .add_rule(trigger("zero"))
        .add_rule(with_priority(9, &trigger("nine")));

    let listed: Vec<_> = ctx
        .list_priorities()
        .into_iter()
        .map(|(k, p)| (k.name().to_string(), p))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("nine".to_string(), 9),
            ("two".to_string(), 2),
            ("zero".to_string(), 0),
        ]
    );
}

#[test]
fn run_cycle_leaves_input_untouched() {
    let ctx = Context::new()
        .add_rule(trigger("once"))
        .insert_fact(EntityId::new(1), "trigger", true);
    let after = ctx.run_cycle().unwrap();

    assert_eq!(ctx.pending_activations().len(), 1);
    assert!(after.pending_activations().is_empty());
}
