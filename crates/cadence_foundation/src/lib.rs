//! Core values, identifiers, persistent collections, and errors for Cadence.
//!
//! This crate provides:
//! - [`Value`] - The core value type stored in facts and bound by patterns
//! - [`EntityId`] - Opaque entity identifiers
//! - [`Keyword`] - Attribute and rule-name atoms
//! - [`Error`] - Rich error types with context
//! - Persistent collections ([`PVec`], [`PSet`], [`PMap`], [`POrdMap`])

#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]

pub mod collections;
pub mod entity;
pub mod error;
pub mod keyword;
pub mod value;

pub use collections::{PMap, POrdMap, PSet, PVec};
pub use entity::EntityId;
pub use error::{Error, ErrorContext, ErrorKind, SemanticLimit};
pub use keyword::Keyword;
pub use value::Value;

/// Result type used throughout Cadence.
pub type Result<T> = std::result::Result<T, Error>;
