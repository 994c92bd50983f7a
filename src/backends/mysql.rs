//! MySQL / MariaDB backend.

use bench_core::{BenchError, Benchmark, Bencher};
use mysql_async::prelude::*;
use mysql_async::{Opts, OptsBuilder, Pool, PoolConstraints, PoolOpts};
use tracing::warn;

const DEFAULT_PORT: u16 = 3306;

/// Pool-backed MySQL adapter. `max_conns` bounds the pool; zero keeps the
/// driver default.
pub struct MysqlBencher {
    pool: Pool,
}

impl MysqlBencher {
    pub fn connect(
        host: &str,
        port: u16,
        user: &str,
        pass: &str,
        max_conns: usize,
    ) -> Result<Self, BenchError> {
        let port = if port == 0 { DEFAULT_PORT } else { port };

        let mut builder = OptsBuilder::default()
            .ip_or_hostname(host)
            .tcp_port(port)
            .user(Some(user))
            .pass(Some(pass))
            // Every pooled connection lands in the benchmark database.
            .init(vec![
                "CREATE DATABASE IF NOT EXISTS dbbench".to_string(),
                "USE dbbench".to_string(),
            ]);

        if max_conns > 0 {
            let constraints = PoolConstraints::new(1, max_conns).ok_or_else(|| {
                BenchError::Backend(format!("invalid connection limit {max_conns}"))
            })?;
            builder = builder.pool_opts(PoolOpts::default().with_constraints(constraints));
        }

        let pool = Pool::new(Opts::from(builder));
        Ok(Self { pool })
    }
}

#[async_trait::async_trait]
impl Bencher for MysqlBencher {
    async fn setup(&self) -> Result<(), BenchError> {
        let mut conn = self.pool.get_conn().await.map_err(BenchError::backend)?;
        for ddl in [
            "CREATE TABLE IF NOT EXISTS dbbench_simple (id INT PRIMARY KEY, balance DECIMAL)",
            "CREATE TABLE IF NOT EXISTS dbbench_relational_one (oid INT PRIMARY KEY, balance_one DECIMAL)",
            "CREATE TABLE IF NOT EXISTS dbbench_relational_two (balance_two DECIMAL, relation INT PRIMARY KEY, FOREIGN KEY(relation) REFERENCES dbbench_relational_one(oid))",
        ] {
            conn.query_drop(ddl)
                .await
                .map_err(|e| BenchError::Schema(e.to_string()))?;
        }
        Ok(())
    }

    async fn cleanup(&self) -> Result<(), BenchError> {
        match self.pool.get_conn().await {
            Ok(mut conn) => {
                for table in [
                    "dbbench_simple",
                    "dbbench_relational_two",
                    "dbbench_relational_one",
                ] {
                    if let Err(e) = conn.query_drop(format!("DROP TABLE {table}")).await {
                        warn!("failed to drop table {table}: {e}");
                    }
                }
            }
            Err(e) => warn!("cleanup connection failed: {e}"),
        }

        self.pool
            .clone()
            .disconnect()
            .await
            .map_err(BenchError::backend)
    }

    fn benchmarks(&self) -> Vec<Benchmark> {
        super::standard_catalog()
    }

    async fn exec(&self, stmt: &str) -> Result<(), BenchError> {
        let mut conn = self.pool.get_conn().await.map_err(BenchError::backend)?;
        conn.query_drop(stmt).await.map_err(BenchError::backend)
    }
}
