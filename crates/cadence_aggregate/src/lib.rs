//! Aggregation over rule matches for Cadence.
//!
//! This crate provides:
//! - [`accumulator`] - Init/step/finish folds, the built-in catalogue, and
//!   [`accumulate`] / [`accumulate_all`]
//! - [`quantify`] - Existential, universal, and proportional questions over
//!   a rule's matches
//!
//! Both read matches through [`cadence_engine::MatchSource`] and never
//! modify the session they read.

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod accumulator;
pub mod quantify;

pub use accumulator::{
    Accumulator, AccumulatorSet, Extract, Groups, accumulate, accumulate_all, avg, bottom_n,
    collect, collect_set, count, custom, distinct_count, first, fold, group_by, last, max, min,
    std_dev, sum, top_n, variance,
};
pub use quantify::{
    Predicate, count_where, exists, exists_at_least, exists_at_most, exists_between,
    exists_exactly_one, exists_fewer_than, exists_more_than, forall, majority, minority, none,
    percentage_where, unanimous,
};
