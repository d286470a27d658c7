//! Integration tests for the module activation registry

use cadence_engine::Rule;
use cadence_foundation::EntityId;
use cadence_runtime::{Context, ModuleStats, with_priority};

fn rule(name: &str) -> Rule {
    Rule::builder(name).when("?e", "tick", true).build()
}

fn game() -> Context {
    Context::new()
        .register_module("combat", vec![rule("attack"), with_priority(10, &rule("dodge"))])
        .register_module("trading", vec![rule("buy"), rule("sell")])
        .register_module("exploration", vec![rule("walk")])
}

fn rule_names(ctx: &Context) -> Vec<String> {
    ctx.rule_names().iter().map(|k| k.name().to_string()).collect()
}

#[test]
fn enable_set_switches_modes() {
    let ctx = game()
        .enable_module("combat")
        .unwrap()
        .enable_module("trading")
        .unwrap()
        .enable_set(&["combat"])
        .unwrap();

    assert!(ctx.is_module_enabled("combat"));
    assert!(!ctx.is_module_enabled("trading"));
    assert!(!ctx.is_module_enabled("exploration"));
    assert_eq!(rule_names(&ctx), vec!["attack", "dodge"]);
}

#[test]
fn enable_twice_equals_enable_once() {
    let base = game().insert_fact(EntityId::new(1), "tick", true);
    let once = base.enable_module("trading").unwrap();
    let twice = once.enable_module("trading").unwrap();

    assert_eq!(rule_names(&once), rule_names(&twice));
    assert_eq!(once.pending_activations(), twice.pending_activations());
    assert_eq!(once.enumerate_facts(), twice.enumerate_facts());
}

#[test]
fn disable_after_enable_restores_rules() {
    let base = game()
        .add_rule(rule("standalone"))
        .enable_module("exploration")
        .unwrap();
    let round_trip = base
        .enable_module("combat")
        .unwrap()
        .disable_module("combat");

    assert_eq!(rule_names(&base), rule_names(&round_trip));
}

#[test]
fn module_rules_carry_their_priorities() {
    let ctx = game()
        .enable_module("combat")
        .unwrap()
        .insert_fact(EntityId::new(1), "tick", true)
        .run_cycle()
        .unwrap();

    let fired: Vec<_> = ctx
        .session()
        .fired_rules()
        .iter()
        .map(|k| k.name().to_string())
        .collect();
    assert_eq!(fired, vec!["dodge", "attack"]);
    assert_eq!(ctx.priority_of("dodge"), 10);

    let ctx = ctx.disable_module("combat");
    assert_eq!(ctx.priority_of("dodge"), 0);
}

#[test]
fn disabling_cancels_pending_activations() {
    let ctx = game()
        .enable_module("trading")
        .unwrap()
        .insert_fact(EntityId::new(1), "tick", true);
    assert_eq!(ctx.pending_activations().len(), 2);

    let ctx = ctx.disable_module("trading");
    assert!(ctx.pending_activations().is_empty());
}

#[test]
fn unknown_module_errors() {
    let err = game().enable_module("magic").unwrap_err();
    assert!(err.is_module_not_registered());
    assert!(game().toggle_module("magic").is_err());
}

#[test]
fn stats_count_modules() {
    let ctx = game().enable_all().unwrap().disable_module("trading");
    assert_eq!(
        ctx.module_stats(),
        ModuleStats {
            registered: 3,
            enabled: 2,
            disabled: 1,
        }
    );

    let listed: Vec<_> = ctx
        .list_modules()
        .iter()
        .map(|m| (m.name.name().to_string(), m.enabled, m.rule_count))
        .collect();
    assert_eq!(
        listed,
        vec![
            ("combat".to_string(), true, 2),
            ("exploration".to_string(), true, 1),
            ("trading".to_string(), false, 2),
        ]
    );
}

#[test]
fn enable_set_accepts_colon_prefixed_names() {
    let ctx = Context::new()
        .register_module(":combat", vec![rule("attack"), rule("dodge")])
        .register_module(":trading", vec![rule("buy")])
        .enable_module(":combat")
        .unwrap()
        .enable_module(":trading")
        .unwrap()
        .enable_set(&[":combat"])
        .unwrap();

    assert!(ctx.is_module_enabled(":combat"));
    assert!(ctx.is_module_enabled("combat"));
    assert!(!ctx.is_module_enabled(":trading"));
    assert_eq!(rule_names(&ctx), vec!["attack", "dodge"]);

    let err = ctx.enable_set(&[":magic"]).unwrap_err();
    assert!(err.is_module_not_registered());
}

#[test]
fn toggling_a_module_keeps_the_standalone_rule_it_replaced() {
    let base = game()
        .add_rule(with_priority(3, &rule("patrol")))
        .add_rule(with_priority(25, &rule("dodge")));
    let before = rule_names(&base);

    let ctx = base.enable_module("combat").unwrap();
    assert_eq!(ctx.priority_of("dodge"), 10);

    let ctx = ctx.disable_module("combat");
    assert_eq!(rule_names(&ctx), before);
    assert_eq!(ctx.priority_of("dodge"), 25);
    assert_eq!(ctx.priority_of("patrol"), 3);
}
