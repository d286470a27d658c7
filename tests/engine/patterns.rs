//! Integration tests for rule patterns and guards

use cadence_engine::{Clause, Pattern, Rule, Session};
use cadence_foundation::{EntityId, Keyword};

fn e(n: u64) -> EntityId {
    EntityId::new(n)
}

fn world() -> Session {
    Session::new()
        .insert_fact(e(1), "type", "player")
        .insert_fact(e(1), "health", 100)
        .insert_fact(e(2), "type", "player")
        .insert_fact(e(2), "health", 30)
        .insert_fact(e(3), "type", "monster")
        .insert_fact(e(3), "health", 60)
        .insert_fact(e(2), "poisoned", true)
}

#[test]
fn join_and_negation() {
    let session = world().add_rule(
        Rule::builder("healthy-players")
            .when("?p", "type", "player")
            .when("?p", "health", "?hp")
            .unless("?p", "poisoned", "_")
            .build(),
    );

    let matches = session.query_matches("healthy-players");
    assert_eq!(matches.len(), 1);
    assert_eq!(matches[0].get_entity("p"), Some(e(1)));
    assert_eq!(matches[0].get_int("hp"), Some(100));
}

#[test]
fn guard_filters_matches() {
    let session = world().add_rule(
        Rule::builder("wounded")
            .when("?x", "health", "?hp")
            .guard(|b| b.get_int("hp").is_some_and(|hp| hp < 70))
            .build(),
    );

    let wounded: Vec<_> = session
        .query_matches("wounded")
        .iter()
        .filter_map(|b| b.get_entity("x"))
        .collect();
    assert_eq!(wounded, vec![e(2), e(3)]);
}

#[test]
fn explicit_pattern_value() {
    let pattern = Pattern::new()
        .with_clause(Clause::new("?m", "type", "monster"))
        .with_clause(Clause::new("?m", "health", "?hp"));
    let session = world().add_rule(Rule::builder("monsters").pattern(pattern).build());

    assert_eq!(session.query_matches("monsters").len(), 1);
}

#[test]
fn keyword_constants_match() {
    let session = Session::new()
        .insert_fact(e(1), "mode", Keyword::new("combat"))
        .add_rule(
            Rule::builder("fighting")
                .when("?x", "mode", Keyword::new("combat"))
                .build(),
        );
    assert_eq!(session.query_matches("fighting").len(), 1);
}

#[test]
fn matches_follow_fact_changes() {
    let session = world().add_rule(
        Rule::builder("players")
            .when("?p", "type", "player")
            .build(),
    );
    assert_eq!(session.query_matches("players").len(), 2);

    let session = session.retract_fact(e(1), "type");
    assert_eq!(session.query_matches("players").len(), 1);
}

#[test]
fn unknown_rule_has_no_matches() {
    assert!(world().query_matches("ghost").is_empty());
}
