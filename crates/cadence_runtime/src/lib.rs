//! Execution-order control for Cadence.
//!
//! This crate wraps the engine session in a [`Context`] that also owns the
//! side tables the control layers need:
//! - [`scheduler`] - Agenda priority ordering and the priority run-cycle
//! - [`module`] - Named rule groups that can be enabled and disabled
//! - [`snapshot`] - Fact-set snapshots and named checkpoints
//! - [`serialize`] - `MessagePack` encoding of snapshots
//! - [`config`] - Runtime configuration

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod config;
pub mod context;
pub mod module;
pub mod scheduler;
pub mod serialize;
pub mod snapshot;

pub use config::RuntimeConfig;
pub use context::Context;
pub use module::{ModuleInfo, ModuleRegistry, ModuleStats};
pub use scheduler::{PRIORITY_TAG, PriorityResolver, ScheduledActivation, with_priority};
pub use serialize::{from_bytes, load_from_file, save_to_file, to_bytes};
pub use snapshot::{SNAPSHOT_VERSION, Snapshot};
