//! Property tests spanning the layers

use cadence_aggregate::{count, forall, percentage_where, sum};
use cadence_engine::{Bindings, Rule};
use cadence_foundation::{EntityId, Value};
use cadence_runtime::{Context, with_priority};
use proptest::prelude::*;

fn scored(values: &[i64]) -> Context {
    let rule = Rule::builder("scores").when("?e", "score", "?v").build();
    values
        .iter()
        .enumerate()
        .fold(Context::new().add_rule(rule), |ctx, (i, v)| {
            ctx.insert_fact(EntityId::new(i as u64), "score", *v)
        })
}

proptest! {
    #[test]
    fn sum_matches_manual_total(values in prop::collection::vec(-1000i64..1000, 0..40)) {
        let ctx = scored(&values);
        prop_assert_eq!(ctx.accumulate("scores", &sum("v")), Value::Int(values.iter().sum()));
        prop_assert_eq!(ctx.accumulate("scores", &count()), values.len() as i64);
    }

    #[test]
    fn percentage_is_bounded(values in prop::collection::vec(-50i64..50, 0..40), cut in -50i64..50) {
        let ctx = scored(&values);
        let above = |b: &Bindings| b.get_int("v").is_some_and(|v| v > cut);
        let pct = percentage_where(&ctx, "scores", Some(&above));
        prop_assert!((0.0..=100.0).contains(&pct));
        if values.is_empty() {
            prop_assert_eq!(pct, 0.0);
        }
    }

    #[test]
    fn forall_over_nothing(cut in any::<i64>()) {
        let ctx = scored(&[]);
        let pred = |b: &Bindings| b.get_int("v") == Some(cut);
        prop_assert!(forall(&ctx, "scores", Some(&pred)));
    }

    #[test]
    fn cycle_fires_in_descending_priority(priorities in prop::collection::vec(-20i64..20, 1..12)) {
        let ctx = priorities
            .iter()
            .enumerate()
            .fold(Context::new(), |ctx, (i, p)| {
                let rule = Rule::builder(format!("r{i}")).when("?e", "go", true).build();
                ctx.add_rule(with_priority(*p, &rule))
            })
            .insert_fact(EntityId::new(0), "go", true);

        let fired: Vec<usize> = ctx
            .run_cycle()
            .unwrap()
            .session()
            .fired_rules()
            .iter()
            .filter_map(|k| k.name()[1..].parse().ok())
            .collect();

        let mut expected: Vec<usize> = (0..priorities.len()).collect();
        expected.sort_by_key(|&i| std::cmp::Reverse(priorities[i]));
        prop_assert_eq!(fired, expected);
    }

    #[test]
    fn checkpoint_round_trip(values in prop::collection::vec(0i64..5, 0..20)) {
        let ctx = scored(&values);
        let restored = ctx.checkpoint("x").rollback("x", Vec::new()).unwrap();
        prop_assert_eq!(restored.save().fact_set(), ctx.save().fact_set());
    }
}
