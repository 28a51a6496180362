//! Test module for determinism, integration and property tests.
//!
//! This module exercises the Entity-Plugin-Resolver system end to end:
//! - **Determinism tests**: Verify same seed and script produce identical results
//! - **Integration tests**: Test the full simulation pipeline
//! - **Property tests**: Invariants that hold under arbitrary input
//! - **Helper functions**: Utilities for test setup
//!
//! # Test Structure
//!
//! - `determinism.rs`: Tests that verify deterministic execution
//! - `integration.rs`: End-to-end tests of combat, enemies, pickups and movement
//! - `properties.rs`: proptest suites
//! - `helpers.rs`: Test setup utilities and factory functions

mod helpers;

// Re-export for convenience
pub use helpers::*;
