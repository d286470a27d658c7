//! Host rule engine for Cadence.
//!
//! This crate is the collaborator the control layers are written against:
//! an immutable [`Session`] holding rules, facts, and the pending-activation
//! agenda. It provides:
//! - [`FactStore`] - `(entity, attribute) -> value` working memory
//! - [`Pattern`] / [`PatternMatcher`] - Clause conjunctions and their matches
//! - [`Rule`] - Named productions built with [`RuleBuilder`]
//! - [`Agenda`] - Pending activations with refraction
//! - [`ConflictResolver`] - The ordering seam used by the native run-cycle
//! - [`MatchSource`] - Read-only match queries for aggregation layers

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod agenda;
pub mod config;
pub mod fact;
pub mod pattern;
pub mod query;
pub mod rule;
pub mod session;

pub use agenda::{Activation, Agenda, ConflictResolver, FifoResolver, FiringRecord};
pub use config::EngineConfig;
pub use fact::{Fact, FactStore};
pub use pattern::{Bindings, Clause, Pattern, PatternMatcher, Term};
pub use query::MatchSource;
pub use rule::{Rule, RuleBuilder};
pub use session::Session;
