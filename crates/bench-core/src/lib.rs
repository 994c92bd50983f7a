//! Benchmark execution engine for dbbench.
//!
//! This crate provides the backend-independent core of the harness:
//! 1. Partition a total iteration count across a fixed number of workers
//! 2. Dispatch concurrent workers that execute catalog benchmarks or a
//!    user-supplied script against a [`Bencher`] backend adapter
//! 3. Measure and report the elapsed wall-clock time per run
//!
//! # Example
//!
//! ```ignore
//! use bench_core::{dispatch, Bencher};
//! use std::sync::Arc;
//!
//! let bencher: Arc<dyn Bencher> = Arc::new(SqliteBencher::new("bench.sqlite")?);
//! bencher.setup().await?;
//! for b in bencher.benchmarks() {
//!     let result = dispatch::run_benchmark(bencher.clone(), &b, 1000, 25).await;
//!     println!("{}", result.report_line());
//! }
//! ```

pub mod benchmark;
pub mod dispatch;
pub mod error;
pub mod partition;
pub mod script;
pub mod template;

pub use benchmark::{BenchKind, Benchmark, Bencher};
pub use dispatch::{run_benchmark, run_script, RunResult};
pub use error::BenchError;
pub use partition::{partition, Partition};
pub use script::join_script;
