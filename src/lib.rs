//! Cadence - Agenda scheduling and aggregation for a forward-chaining rule engine
//!
//! This crate re-exports all layers of the Cadence system for convenient access.
//! For detailed documentation, see the individual layer crates.
//!
//! # Architecture
//!
//! ```text
//! Layer 3: cadence_runtime    — Context, priority scheduler, modules, checkpoints
//! Layer 2: cadence_aggregate  — Accumulators and quantified queries
//! Layer 1: cadence_engine     — Sessions, facts, patterns, rules, agenda
//! Layer 0: cadence_foundation — Core types (Value, EntityId, Keyword, Error)
//! ```
//!
//! # Example
//!
//! ```
//! use cadence::aggregate::sum;
//! use cadence::engine::Rule;
//! use cadence::foundation::{EntityId, Value};
//! use cadence::runtime::{Context, with_priority};
//!
//! let players = Rule::builder("players")
//!     .when("?p", "type", "player")
//!     .when("?p", "health", "?hp")
//!     .build();
//!
//! let ctx = Context::new()
//!     .add_rule(with_priority(10, &players))
//!     .insert_fact(EntityId::new(1), "type", "player")
//!     .insert_fact(EntityId::new(1), "health", 100)
//!     .insert_fact(EntityId::new(2), "type", "player")
//!     .insert_fact(EntityId::new(2), "health", 80);
//!
//! assert_eq!(ctx.accumulate("players", &sum("hp")), Value::Int(180));
//! let ctx = ctx.run_cycle().unwrap();
//! assert!(ctx.pending_activations().is_empty());
//! ```

pub use cadence_aggregate as aggregate;
pub use cadence_engine as engine;
pub use cadence_foundation as foundation;
pub use cadence_runtime as runtime;
