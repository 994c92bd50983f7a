//! Run orchestration: benchmark selection and per-run reporting.

use bench_core::{run_benchmark, run_script, Bencher, RunResult};
use std::sync::Arc;

/// Sentinel filter value selecting every catalog benchmark.
pub const RUN_ALL: &str = "all";

/// Whether the name filter selects this benchmark. Unmatched names are
/// silently skipped.
pub fn selected(filter: &str, name: &str) -> bool {
    filter == RUN_ALL || filter == name
}

/// Run one filter entry and print a report line per finished run.
///
/// When a script blob is supplied it short-circuits the catalog entirely;
/// otherwise every catalog benchmark matching the filter runs in listed
/// order.
pub async fn run(
    bencher: Arc<dyn Bencher>,
    script: Option<&str>,
    filter: &str,
    iterations: u64,
    workers: u64,
) -> Vec<RunResult> {
    if let Some(script) = script {
        let result = run_script(bencher, script, iterations, workers).await;
        println!("{}", result.report_line());
        return vec![result];
    }

    let mut results = Vec::new();
    for benchmark in bencher.benchmarks() {
        if !selected(filter, &benchmark.name) {
            continue;
        }
        let result = run_benchmark(bencher.clone(), &benchmark, iterations, workers).await;
        println!("{}", result.report_line());
        results.push(result);
    }
    results
}

#[cfg(test)]
mod tests {
    use super::*;
    use bench_core::{BenchError, BenchKind, Benchmark};
    use std::sync::Mutex;

    struct CatalogBencher {
        executed: Mutex<Vec<String>>,
    }

    impl CatalogBencher {
        fn new() -> Self {
            Self {
                executed: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait::async_trait]
    impl Bencher for CatalogBencher {
        async fn setup(&self) -> Result<(), BenchError> {
            Ok(())
        }

        async fn cleanup(&self) -> Result<(), BenchError> {
            Ok(())
        }

        fn benchmarks(&self) -> Vec<Benchmark> {
            vec![
                Benchmark::new("inserts", BenchKind::Loop, "INSERT {index}"),
                Benchmark::new("deletes", BenchKind::Loop, "DELETE {index}"),
            ]
        }

        async fn exec(&self, stmt: &str) -> Result<(), BenchError> {
            self.executed.lock().unwrap().push(stmt.to_string());
            Ok(())
        }
    }

    #[test]
    fn test_selected() {
        assert!(selected("all", "inserts"));
        assert!(selected("inserts", "inserts"));
        assert!(!selected("inserts", "deletes"));
    }

    #[tokio::test]
    async fn test_run_all_executes_catalog_in_order() {
        let bencher = Arc::new(CatalogBencher::new());
        let results = run(bencher, None, "all", 10, 2).await;

        let names: Vec<&str> = results.iter().map(|r| r.name.as_str()).collect();
        assert_eq!(names, ["inserts", "deletes"]);
    }

    #[tokio::test]
    async fn test_run_exact_name_filters_catalog() {
        let bencher = Arc::new(CatalogBencher::new());
        let results = run(bencher.clone(), None, "deletes", 10, 2).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "deletes");
        assert!(bencher
            .executed
            .lock()
            .unwrap()
            .iter()
            .all(|s| s.starts_with("DELETE")));
    }

    #[tokio::test]
    async fn test_run_unmatched_name_is_silently_skipped() {
        let bencher = Arc::new(CatalogBencher::new());
        let results = run(bencher.clone(), None, "updates", 10, 2).await;

        assert!(results.is_empty());
        assert!(bencher.executed.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_script_short_circuits_catalog() {
        let bencher = Arc::new(CatalogBencher::new());
        let results = run(bencher.clone(), Some("SELECT 1;SELECT 2;"), "all", 10, 2).await;

        assert_eq!(results.len(), 1);
        assert_eq!(results[0].name, "custom script");

        let executed = bencher.executed.lock().unwrap();
        assert_eq!(executed.len(), 10);
        assert!(executed.iter().all(|s| s == "SELECT 1;SELECT 2;"));
    }
}
