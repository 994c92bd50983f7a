//! Benchmark catalog types and the backend adapter contract.

use crate::error::BenchError;

/// How often a benchmark statement executes within one worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BenchKind {
    /// Executed exactly once per worker, independent of the worker's
    /// partition bounds. A run with W workers executes the statement W
    /// times total.
    Single,
    /// Executed once per iteration index in the worker's partition, with
    /// the statement template instantiated per index.
    Loop,
}

/// A named statement template listed by a backend adapter.
///
/// Immutable once listed; see [`crate::template`] for the recognized
/// substitution points.
#[derive(Debug, Clone)]
pub struct Benchmark {
    pub name: String,
    pub kind: BenchKind,
    pub stmt: String,
}

impl Benchmark {
    pub fn new(name: &str, kind: BenchKind, stmt: &str) -> Self {
        Self {
            name: name.to_string(),
            kind,
            stmt: stmt.to_string(),
        }
    }
}

/// Uniform lifecycle every database backend implements.
///
/// Adapters commonly wrap a single shared connection; concurrent `exec`
/// calls from many workers then serialize at the connection layer. The
/// dqlite backend is deliberately limited to exactly one connection.
#[async_trait::async_trait]
pub trait Bencher: Send + Sync {
    /// Idempotently ensure the benchmark schema exists (create-if-absent).
    /// Any failure here is fatal to the run.
    async fn setup(&self) -> Result<(), BenchError>;

    /// Best-effort teardown of the schema and release of the connection.
    async fn cleanup(&self) -> Result<(), BenchError>;

    /// The ordered benchmark catalog for this backend. Pure, no side effects.
    fn benchmarks(&self) -> Vec<Benchmark>;

    /// Execute one opaque statement string against the shared connection.
    ///
    /// A failed statement never aborts the worker or the run; callers log
    /// the error and continue with the next iteration.
    async fn exec(&self, stmt: &str) -> Result<(), BenchError>;
}
