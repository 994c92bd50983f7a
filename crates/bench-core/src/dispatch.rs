//! Worker pool dispatch and run timing.
//!
//! Spawns one task per worker, each bound to its own [`Partition`], and
//! joins on all of them before returning. The join is the only
//! synchronization point: no partial results are observable before it and
//! no ordering is guaranteed between workers. There are no cancellation or
//! timeout semantics; a hung statement blocks its worker and the join.

use crate::benchmark::{BenchKind, Benchmark, Bencher};
use crate::partition::{partition, Partition};
use crate::template;
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::task::JoinSet;
use tracing::warn;

/// Elapsed wall-clock time of one benchmark or script run.
#[derive(Debug, Clone)]
pub struct RunResult {
    pub name: String,
    pub elapsed: Duration,
    pub iterations: u64,
}

impl RunResult {
    /// Elapsed nanoseconds divided by the requested iteration count.
    pub fn ns_per_op(&self) -> u64 {
        if self.iterations == 0 {
            return 0;
        }
        self.elapsed.as_nanos() as u64 / self.iterations
    }

    /// One tab-separated report line: name, elapsed, ns/op.
    pub fn report_line(&self) -> String {
        format!("{}\t{:?}\t{} ns/op", self.name, self.elapsed, self.ns_per_op())
    }
}

/// Run one catalog benchmark with `workers` concurrent workers.
///
/// `Single` benchmarks execute once per worker (so `workers` times total);
/// `Loop` benchmarks execute once per index in each worker's partition,
/// with the template instantiated per index. The timer brackets dispatch
/// and join; nothing else is measured.
pub async fn run_benchmark(
    bencher: Arc<dyn Bencher>,
    benchmark: &Benchmark,
    iterations: u64,
    workers: u64,
) -> RunResult {
    let partitions = partition(iterations, workers);

    let start = Instant::now();
    let mut tasks = JoinSet::new();
    for span in partitions {
        let bencher = bencher.clone();
        let benchmark = benchmark.clone();
        tasks.spawn(async move {
            run_worker(bencher, benchmark, span).await;
        });
    }
    join_all(&mut tasks).await;

    RunResult {
        name: benchmark.name.clone(),
        elapsed: start.elapsed(),
        iterations,
    }
}

/// Run a pre-concatenated script blob with `workers` concurrent workers.
///
/// Every worker executes the identical blob once per index in its
/// partition; no templating is applied to script content.
pub async fn run_script(
    bencher: Arc<dyn Bencher>,
    script: &str,
    iterations: u64,
    workers: u64,
) -> RunResult {
    let partitions = partition(iterations, workers);
    let script: Arc<str> = Arc::from(script);

    let start = Instant::now();
    let mut tasks = JoinSet::new();
    for span in partitions {
        let bencher = bencher.clone();
        let script = script.clone();
        tasks.spawn(async move {
            for i in span.from..span.to {
                if let Err(e) = bencher.exec(&script).await {
                    warn!("script iteration {i} failed: {e}");
                }
            }
        });
    }
    join_all(&mut tasks).await;

    RunResult {
        name: "custom script".to_string(),
        elapsed: start.elapsed(),
        iterations,
    }
}

async fn run_worker(bencher: Arc<dyn Bencher>, benchmark: Benchmark, span: Partition) {
    let mut rng = StdRng::from_os_rng();

    match benchmark.kind {
        BenchKind::Single => {
            let stmt = template::instantiate(&benchmark.stmt, 1, &mut rng);
            if let Err(e) = bencher.exec(&stmt).await {
                warn!("{}: statement failed: {e}", benchmark.name);
            }
        }
        BenchKind::Loop => {
            for i in span.from..span.to {
                let stmt = template::instantiate(&benchmark.stmt, i, &mut rng);
                // A failed statement never aborts the worker; keep issuing
                // the remaining iterations.
                if let Err(e) = bencher.exec(&stmt).await {
                    warn!("{}: iteration {i} failed: {e}", benchmark.name);
                }
            }
        }
    }
}

async fn join_all(tasks: &mut JoinSet<()>) {
    while let Some(joined) = tasks.join_next().await {
        if let Err(e) = joined {
            warn!("worker task failed to join: {e}");
        }
    }
}
