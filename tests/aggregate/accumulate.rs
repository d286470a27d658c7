//! Integration tests for accumulation over session matches

use cadence_aggregate::{
    AccumulatorSet, Extract, accumulate, accumulate_all, avg, bottom_n, collect, count, custom,
    first, group_by, last, max, min, std_dev, sum, top_n, variance,
};
use cadence_engine::{Bindings, Rule, Session};
use cadence_foundation::{EntityId, Value};

fn e(n: u64) -> EntityId {
    EntityId::new(n)
}

fn players_rule() -> Rule {
    Rule::builder("players")
        .when("?p", "type", "player")
        .when("?p", "health", "?hp")
        .build()
}

fn party() -> Session {
    Session::new()
        .add_rule(players_rule())
        .insert_fact(e(1), "type", "player")
        .insert_fact(e(1), "health", 100)
        .insert_fact(e(2), "type", "player")
        .insert_fact(e(2), "health", 80)
}

#[test]
fn sum_and_avg_of_party_health() {
    let session = party();
    assert_eq!(accumulate(&session, "players", &sum("hp")), Value::Int(180));
    assert_eq!(accumulate(&session, "players", &avg("hp")), Some(90.0));
    assert_eq!(accumulate(&session, "players", &count()), 2);
}

#[test]
fn empty_rule_yields_empty_results() {
    let session = Session::new().add_rule(players_rule());
    assert_eq!(accumulate(&session, "players", &count()), 0);
    assert_eq!(accumulate(&session, "players", &sum("hp")), Value::Int(0));
    assert_eq!(accumulate(&session, "players", &avg("hp")), None);
    assert_eq!(accumulate(&session, "players", &min("hp")), None);
    assert_eq!(accumulate(&session, "players", &max("hp")), None);
    assert_eq!(accumulate(&session, "players", &first("hp")), None);
    assert!(accumulate(&session, "players", &collect("hp")).is_empty());
}

#[test]
fn unknown_rule_behaves_like_no_matches() {
    assert_eq!(accumulate(&party(), "nobody", &count()), 0);
    assert_eq!(accumulate(&party(), "nobody", &variance("hp")), None);
}

#[test]
fn ordering_accumulators_follow_match_order() {
    let session = party()
        .insert_fact(e(3), "type", "player")
        .insert_fact(e(3), "health", 80);

    assert_eq!(accumulate(&session, "players", &first("p")), Some(Value::EntityRef(e(1))));
    assert_eq!(accumulate(&session, "players", &last("p")), Some(Value::EntityRef(e(3))));

    let top: Vec<_> = accumulate(&session, "players", &top_n(2, "hp"))
        .iter()
        .filter_map(|b| b.get_entity("p"))
        .collect();
    assert_eq!(top, vec![e(1), e(2)]);

    let bottom: Vec<_> = accumulate(&session, "players", &bottom_n(2, "hp"))
        .iter()
        .filter_map(|b| b.get_entity("p"))
        .collect();
    assert_eq!(bottom, vec![e(2), e(3)]);
}

#[test]
fn group_by_team() {
    let session = party()
        .insert_fact(e(1), "team", "red")
        .insert_fact(e(2), "team", "blue")
        .insert_fact(e(3), "type", "player")
        .insert_fact(e(3), "health", 40)
        .insert_fact(e(3), "team", "red")
        .add_rule(
            Rule::builder("members")
                .when("?p", "team", "?team")
                .when("?p", "health", "?hp")
                .build(),
        );

    let groups = accumulate(&session, "members", &group_by("team", "hp"));
    assert_eq!(groups.len(), 2);
    assert_eq!(
        groups.get(&Value::from("red")),
        Some(&[Value::Int(100), Value::Int(40)][..])
    );
}

#[test]
fn dispersion() {
    let session = party();
    assert_eq!(accumulate(&session, "players", &variance("hp")), Some(100.0));
    assert_eq!(accumulate(&session, "players", &std_dev("hp")), Some(10.0));
}

#[test]
fn computed_extractor() {
    let missing = Extract::with(|b: &Bindings| {
        b.get_int("hp").map(|hp| Value::Int(100 - hp))
    });
    assert_eq!(accumulate(&party(), "players", &sum(missing)), Value::Int(20));
}

#[test]
fn custom_accumulator_over_session() {
    let names = custom(
        String::new,
        |mut acc: String, b: &Bindings| {
            if let Some(p) = b.get_entity("p") {
                acc.push_str(&p.to_string());
            }
            acc
        },
        Value::from,
    );
    assert_eq!(
        accumulate(&party(), "players", &names),
        Value::from("Entity(1)Entity(2)")
    );
}

#[test]
fn accumulate_all_runs_independent_folds() {
    let set = AccumulatorSet::new()
        .with("total", sum("hp"))
        .with("mean", avg("hp"))
        .with("count", count())
        .with("lowest", min("hp"))
        .with("all", collect("hp"));

    let results = accumulate_all(&party(), "players", &set);
    assert_eq!(results.len(), 5);
    assert_eq!(results["total"], Value::Int(180));
    assert_eq!(results["mean"], Value::Float(90.0));
    assert_eq!(results["count"], Value::Int(2));
    assert_eq!(results["lowest"], Value::Int(80));
    assert_eq!(results["all"], Value::from(vec![Value::Int(100), Value::Int(80)]));
}
