//! PostgreSQL and CockroachDB backend (both speak the postgres wire
//! protocol; cockroach differs only in defaults).

use bench_core::{BenchError, Benchmark, Bencher};
use tokio_postgres::NoTls;
use tracing::warn;

const POSTGRES_PORT: u16 = 5432;
const COCKROACH_PORT: u16 = 26257;

/// Single-client postgres adapter; `simple_query` pipelines concurrent
/// statements onto the one connection.
pub struct PostgresBencher {
    client: tokio_postgres::Client,
}

impl PostgresBencher {
    pub async fn connect_postgres(
        host: &str,
        port: u16,
        user: &str,
        pass: &str,
    ) -> Result<Self, BenchError> {
        let port = if port == 0 { POSTGRES_PORT } else { port };
        Self::connect(&format!(
            "host={host} port={port} user={user} password={pass} dbname=postgres"
        ))
        .await
    }

    pub async fn connect_cockroach(
        host: &str,
        port: u16,
        user: &str,
        pass: &str,
    ) -> Result<Self, BenchError> {
        let port = if port == 0 { COCKROACH_PORT } else { port };
        Self::connect(&format!(
            "host={host} port={port} user={user} password={pass} dbname=defaultdb"
        ))
        .await
    }

    async fn connect(config: &str) -> Result<Self, BenchError> {
        let (client, connection) = tokio_postgres::connect(config, NoTls)
            .await
            .map_err(BenchError::backend)?;

        // Drive the connection until the client is dropped.
        tokio::spawn(async move {
            if let Err(e) = connection.await {
                warn!("postgres connection error: {e}");
            }
        });

        Ok(Self { client })
    }
}

#[async_trait::async_trait]
impl Bencher for PostgresBencher {
    async fn setup(&self) -> Result<(), BenchError> {
        self.client
            .batch_execute(
                "CREATE TABLE IF NOT EXISTS dbbench_simple (id INT PRIMARY KEY, balance DECIMAL);
                 CREATE TABLE IF NOT EXISTS dbbench_relational_one (oid INT PRIMARY KEY, balance_one DECIMAL);
                 CREATE TABLE IF NOT EXISTS dbbench_relational_two (balance_two DECIMAL, relation INT PRIMARY KEY, FOREIGN KEY(relation) REFERENCES dbbench_relational_one(oid));",
            )
            .await
            .map_err(|e| BenchError::Schema(e.to_string()))
    }

    async fn cleanup(&self) -> Result<(), BenchError> {
        for table in [
            "dbbench_simple",
            "dbbench_relational_two",
            "dbbench_relational_one",
        ] {
            if let Err(e) = self
                .client
                .batch_execute(&format!("DROP TABLE {table}"))
                .await
            {
                warn!("failed to drop table {table}: {e}");
            }
        }
        Ok(())
    }

    fn benchmarks(&self) -> Vec<Benchmark> {
        super::standard_catalog()
    }

    async fn exec(&self, stmt: &str) -> Result<(), BenchError> {
        self.client
            .simple_query(stmt)
            .await
            .map(|_| ())
            .map_err(BenchError::backend)
    }
}
