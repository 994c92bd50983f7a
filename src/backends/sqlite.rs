//! SQLite backend over a single file-backed connection.

use bench_core::{BenchError, Benchmark, Bencher};
use tokio::sync::Mutex;
use tracing::warn;

/// Single-connection SQLite adapter. Concurrent workers serialize on the
/// connection mutex.
pub struct SqliteBencher {
    conn: Mutex<Option<rusqlite::Connection>>,
}

impl SqliteBencher {
    /// Open (creating if absent) the database file.
    pub fn open(path: &str) -> Result<Self, BenchError> {
        let conn = rusqlite::Connection::open(path).map_err(BenchError::backend)?;
        Ok(Self {
            conn: Mutex::new(Some(conn)),
        })
    }
}

#[async_trait::async_trait]
impl Bencher for SqliteBencher {
    async fn setup(&self) -> Result<(), BenchError> {
        let guard = self.conn.lock().await;
        let conn = guard
            .as_ref()
            .ok_or_else(|| BenchError::Backend("connection closed".to_string()))?;

        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS dbbench_simple (id INT PRIMARY KEY, balance DECIMAL);
             CREATE TABLE IF NOT EXISTS dbbench_relational_one (oid INT PRIMARY KEY, balance_one DECIMAL);
             CREATE TABLE IF NOT EXISTS dbbench_relational_two (balance_two DECIMAL, relation INT PRIMARY KEY, FOREIGN KEY(relation) REFERENCES dbbench_relational_one(oid));
             PRAGMA foreign_keys = ON;",
        )
        .map_err(|e| BenchError::Schema(e.to_string()))
    }

    async fn cleanup(&self) -> Result<(), BenchError> {
        let mut guard = self.conn.lock().await;
        let Some(conn) = guard.take() else {
            return Ok(());
        };

        for table in [
            "dbbench_simple",
            "dbbench_relational_two",
            "dbbench_relational_one",
        ] {
            if let Err(e) = conn.execute_batch(&format!("DROP TABLE {table}")) {
                warn!("failed to drop table {table}: {e}");
            }
        }
        if let Err((_, e)) = conn.close() {
            warn!("failed to close connection: {e}");
        }
        Ok(())
    }

    fn benchmarks(&self) -> Vec<Benchmark> {
        super::standard_catalog()
    }

    async fn exec(&self, stmt: &str) -> Result<(), BenchError> {
        let guard = self.conn.lock().await;
        let conn = guard
            .as_ref()
            .ok_or_else(|| BenchError::Backend("connection closed".to_string()))?;
        conn.execute_batch(stmt).map_err(BenchError::backend)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bench_core::run_benchmark;
    use std::sync::Arc;

    fn in_memory() -> SqliteBencher {
        let conn = rusqlite::Connection::open_in_memory().unwrap();
        SqliteBencher {
            conn: Mutex::new(Some(conn)),
        }
    }

    #[tokio::test]
    async fn test_setup_is_idempotent() {
        let bencher = in_memory();
        bencher.setup().await.unwrap();
        bencher.setup().await.unwrap();
    }

    #[tokio::test]
    async fn test_insert_benchmark_populates_every_index() {
        let bencher = Arc::new(in_memory());
        bencher.setup().await.unwrap();

        let inserts = bencher
            .benchmarks()
            .into_iter()
            .find(|b| b.name == "inserts")
            .unwrap();
        run_benchmark(bencher.clone(), &inserts, 100, 4).await;

        let guard = bencher.conn.lock().await;
        let conn = guard.as_ref().unwrap();
        let count: i64 = conn
            .query_row("SELECT COUNT(*) FROM dbbench_simple", [], |row| row.get(0))
            .unwrap();
        assert_eq!(count, 100);
    }

    #[tokio::test]
    async fn test_failed_statement_reports_error() {
        let bencher = in_memory();
        bencher.setup().await.unwrap();

        assert!(bencher.exec("NOT SQL AT ALL;").await.is_err());
        // The connection is still usable afterwards.
        bencher.exec("SELECT 1;").await.unwrap();
    }

    #[tokio::test]
    async fn test_cleanup_after_cleanup_is_quiet() {
        let bencher = in_memory();
        bencher.setup().await.unwrap();
        bencher.cleanup().await.unwrap();
        bencher.cleanup().await.unwrap();
    }
}
