//! Checkpointing a context that carries modules and priorities

use cadence_engine::Rule;
use cadence_foundation::EntityId;
use cadence_runtime::{Context, load_from_file, save_to_file, with_priority};

fn combat() -> Vec<Rule> {
    vec![
        with_priority(
            20,
            &Rule::builder("attack").when("?e", "hostile", true).build(),
        ),
        Rule::builder("loot").when("?e", "dead", true).build(),
    ]
}

fn game() -> Context {
    Context::new()
        .register_module("combat", combat())
        .enable_module("combat")
        .unwrap()
        .insert_fact(EntityId::new(1), "hostile", true)
        .insert_fact(EntityId::new(2), "dead", true)
}

#[test]
fn rollback_with_module_rules_resumes_schedule() {
    let ctx = game().checkpoint("before");
    let after = ctx.run_cycle().unwrap();
    assert!(after.pending_activations().is_empty());

    let restored = after.rollback("before", combat()).unwrap();
    let order: Vec<_> = restored
        .explain_execution_order()
        .into_iter()
        .map(|s| (s.rule.name().to_string(), s.priority))
        .collect();
    assert_eq!(
        order,
        vec![("attack".to_string(), 20), ("loot".to_string(), 0)]
    );
}

#[test]
fn rollback_does_not_restore_module_state() {
    let restored = game().checkpoint("x").rollback("x", Vec::new()).unwrap();
    assert!(!restored.is_module_enabled("combat"));
    assert!(restored.rule_names().is_empty());
}

#[test]
fn file_round_trip_preserves_facts() {
    let path = std::env::temp_dir().join("cadence_integration_game.msgpack");
    let snapshot = game().save();

    save_to_file(&snapshot, &path).unwrap();
    let loaded = load_from_file(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    let ctx = Context::load(&loaded, combat()).unwrap();
    assert_eq!(ctx.save().fact_set(), snapshot.fact_set());
    assert_eq!(ctx.pending_activations().len(), 2);
}
