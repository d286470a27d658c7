//! Integration tests for Layer 1: Engine
//!
//! Tests for the session collaborator: facts, patterns, agenda, and the
//! native run-cycle.

mod agenda;
mod facts;
mod patterns;
