//! A small simulation driven by prioritized rules whose actions aggregate

use cadence_aggregate::{accumulate, avg, count, exists, forall, group_by, sum};
use cadence_engine::{Bindings, Rule, Session};
use cadence_foundation::{EntityId, Result, Value};
use cadence_runtime::{Context, RuntimeConfig, with_priority};

const WORLD: EntityId = EntityId::new(0);

fn players_rule() -> Rule {
    Rule::builder("players")
        .when("?p", "type", "player")
        .when("?p", "health", "?health")
        .build()
}

fn world() -> Context {
    Context::new()
        .add_rule(players_rule())
        .insert_fact(EntityId::new(1), "type", "player")
        .insert_fact(EntityId::new(1), "health", 100)
        .insert_fact(EntityId::new(2), "type", "player")
        .insert_fact(EntityId::new(2), "health", 80)
}

/// Writes the party's total health onto the world entity.
fn tally(s: &Session, _: &Bindings) -> Result<Session> {
    let total = accumulate(s, "players", &sum("health"));
    Ok(s.insert_fact(WORLD, "party-health", total))
}

#[test]
fn sum_and_avg_over_players() {
    let ctx = world();
    assert_eq!(ctx.accumulate("players", &sum("health")), Value::Int(180));
    assert_eq!(ctx.accumulate("players", &avg("health")), Some(90.0));
    assert_eq!(ctx.accumulate("players", &count()), 2);
}

#[test]
fn action_writes_aggregate() {
    let ctx = world()
        .add_rule(Rule::builder("tally").when("?w", "census", true).then(tally))
        .insert_fact(WORLD, "census", true)
        .run_cycle()
        .unwrap();

    assert_eq!(ctx.fact(WORLD, "party-health"), Some(&Value::Int(180)));
}

#[test]
fn priorities_order_dependent_actions() {
    // heal must land before tally reads health
    let heal = Rule::builder("heal")
        .when("?w", "census", true)
        .then(|s: &Session, _: &Bindings| {
            Ok(s.insert_fact(EntityId::new(2), "health", 100))
        });
    let census = Rule::builder("tally").when("?w", "census", true).then(tally);

    let ctx = world()
        .add_rule(with_priority(1, &census))
        .add_rule(with_priority(5, &heal))
        .insert_fact(WORLD, "census", true)
        .run_cycle()
        .unwrap();

    assert_eq!(ctx.fact(WORLD, "party-health"), Some(&Value::Int(200)));
}

#[test]
fn alarm_raised_when_anyone_is_low() {
    let alarm = Rule::builder("alarm")
        .when("?w", "census", true)
        .then(|s: &Session, b: &Bindings| {
            let low = |m: &Bindings| m.get_int("health").is_some_and(|h| h < 50);
            let w = b.get_entity("w").unwrap_or(WORLD);
            Ok(s.insert_fact(w, "alarm", exists(s, "players", Some(&low))))
        });

    let calm = world()
        .add_rule(alarm.clone())
        .insert_fact(WORLD, "census", true)
        .run_cycle()
        .unwrap();
    assert_eq!(calm.fact(WORLD, "alarm"), Some(&Value::Bool(false)));

    let hurt = world()
        .insert_fact(EntityId::new(2), "health", 10)
        .add_rule(alarm)
        .insert_fact(WORLD, "census", true)
        .run_cycle()
        .unwrap();
    assert_eq!(hurt.fact(WORLD, "alarm"), Some(&Value::Bool(true)));
}

#[test]
fn teams_grouped_after_cycle() {
    let members = Rule::builder("members")
        .when("?p", "team", "?team")
        .when("?p", "health", "?health")
        .build();
    let ctx = world()
        .add_rule(members)
        .insert_fact(EntityId::new(1), "team", "red")
        .insert_fact(EntityId::new(2), "team", "blue")
        .insert_fact(EntityId::new(3), "team", "red")
        .insert_fact(EntityId::new(3), "health", 40)
        .run_cycle()
        .unwrap();

    let groups = ctx.accumulate("members", &group_by("team", "health"));
    assert_eq!(groups.len(), 2);
    assert_eq!(groups.get(&Value::from("red")).map(<[Value]>::len), Some(2));
}

#[test]
fn bounded_cycle_stops_runaway_rule() {
    // every firing creates a new entity that retriggers the rule
    let spawn = Rule::builder("spawn")
        .when("?e", "alive", true)
        .then(|s: &Session, b: &Bindings| {
            let next = b.get_entity("e").map_or(0, EntityId::index) + 1;
            Ok(s.insert_fact(EntityId::new(next), "alive", true))
        });

    let err = Context::with_config(RuntimeConfig::bounded(20))
        .add_rule(spawn)
        .insert_fact(EntityId::new(1), "alive", true)
        .run_cycle()
        .unwrap_err();
    assert!(err.to_string().contains("spawn"));
}

#[test]
fn empty_rule_is_vacuously_satisfied() {
    let nobody = Rule::builder("ghosts").when("?g", "type", "ghost").build();
    let ctx = world().add_rule(nobody);
    let never = |_: &Bindings| false;

    assert!(forall(&ctx, "ghosts", Some(&never)));
    assert!(!exists(&ctx, "ghosts", None));
    assert_eq!(ctx.accumulate("ghosts", &avg("health")), None);
}
