//! Integration tests for Layer 3: Runtime
//!
//! Tests for priority scheduling, module activation, and checkpoints.

mod checkpoints;
mod modules;
mod scheduling;
