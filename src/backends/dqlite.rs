//! dqlite backend: replicated SQLite behind the cluster bootstrap.

use anyhow::Context;
use bench_core::{BenchError, Benchmark, Bencher};
use dqlite_client::{bootstrap, Client, ClusterSession, TcpConnector};
use tokio::sync::Mutex;
use tracing::{info, warn};

/// Adapter for a dqlite cluster.
///
/// Statement execution goes through exactly one connection to the leader,
/// serialized by a mutex; many workers collapse into physically serialized
/// execution there, which is a deliberate property of this backend. The
/// cluster session (diagnostic node clients and topology) is held for the
/// life of the adapter.
pub struct DqliteBencher {
    conn: Mutex<Client>,
    db: u32,
    _session: ClusterSession<Client>,
}

impl DqliteBencher {
    /// Bootstrap the cluster and open the shared SQL connection.
    ///
    /// Leader discovery failure is fatal; voter enrollment and diagnostics
    /// are best-effort (see `dqlite_client::bootstrap`).
    pub async fn connect(leader: &str, voters: &[String]) -> anyhow::Result<Self> {
        info!("setting up the cluster...");
        let mut session = bootstrap(&TcpConnector, leader, voters)
            .await
            .context("cluster bootstrap failed")?;
        session.report_topology().await;

        let mut conn = Client::connect(&session.topology.leader_address)
            .await
            .context("failed to open SQL connection to the leader")?;
        let db = conn
            .open("dbbench")
            .await
            .context("failed to open database on the leader")?;

        Ok(Self {
            conn: Mutex::new(conn),
            db,
            _session: session,
        })
    }
}

#[async_trait::async_trait]
impl Bencher for DqliteBencher {
    async fn setup(&self) -> Result<(), BenchError> {
        let mut conn = self.conn.lock().await;
        for ddl in [
            "CREATE TABLE IF NOT EXISTS dbbench_simple (id INT PRIMARY KEY, balance DECIMAL);",
            "CREATE TABLE IF NOT EXISTS dbbench_relational_one (oid INT PRIMARY KEY, balance_one DECIMAL);",
            "CREATE TABLE IF NOT EXISTS dbbench_relational_two (balance_two DECIMAL, relation INT PRIMARY KEY, FOREIGN KEY(relation) REFERENCES dbbench_relational_one(oid));",
            "PRAGMA foreign_keys = ON;",
        ] {
            conn.exec_sql(self.db, ddl)
                .await
                .map_err(|e| BenchError::Schema(e.to_string()))?;
        }
        Ok(())
    }

    async fn cleanup(&self) -> Result<(), BenchError> {
        let mut conn = self.conn.lock().await;
        for table in [
            "dbbench_simple",
            "dbbench_relational_two",
            "dbbench_relational_one",
        ] {
            if let Err(e) = conn.exec_sql(self.db, &format!("DROP TABLE {table}")).await {
                warn!("failed to drop table {table}: {e}");
            }
        }
        Ok(())
    }

    fn benchmarks(&self) -> Vec<Benchmark> {
        super::standard_catalog()
    }

    async fn exec(&self, stmt: &str) -> Result<(), BenchError> {
        let mut conn = self.conn.lock().await;
        conn.exec_sql(self.db, stmt)
            .await
            .map(|_| ())
            .map_err(BenchError::backend)
    }
}
