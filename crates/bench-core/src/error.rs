//! Error types for the benchmark engine.

use thiserror::Error;

/// Errors reported by backend adapters.
///
/// Adapters return these instead of logging internally; the dispatcher and
/// the CLI decide whether a failure is fatal (setup) or merely logged
/// (statement execution, cleanup).
#[derive(Error, Debug)]
pub enum BenchError {
    /// Statement execution or connection error reported by the backend.
    #[error("backend error: {0}")]
    Backend(String),

    /// Schema creation or teardown error.
    #[error("schema error: {0}")]
    Schema(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl BenchError {
    /// Wrap any driver error into a [`BenchError::Backend`].
    pub fn backend<E: std::fmt::Display>(err: E) -> Self {
        BenchError::Backend(err.to_string())
    }
}
