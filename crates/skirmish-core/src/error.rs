//! Error types for loading scenarios.
//!
//! Simulation steps never fail: commands that target missing entities are
//! skipped with a warning. Errors only arise at the edges, when a scenario
//! file is read, parsed, or validated.

use std::path::PathBuf;

use thiserror::Error;

/// Errors raised while loading or validating a scenario.
#[derive(Debug, Error)]
pub enum ScenarioError {
    /// The scenario file could not be read.
    #[error("failed to read scenario {}: {source}", .path.display())]
    Io {
        /// File that was read
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// The scenario is not valid JSON or does not match the schema.
    #[error("failed to parse scenario: {0}")]
    Parse(#[from] serde_json::Error),

    /// The scenario parsed but describes something the simulation cannot run.
    #[error("invalid scenario: {0}")]
    Invalid(String),
}

/// Result alias for scenario operations.
pub type Result<T> = std::result::Result<T, ScenarioError>;
