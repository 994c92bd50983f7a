//! Command-line interface for dbbench
//!
//! # Usage Examples
//!
//! ```bash
//! # SQLite, full catalog with the defaults (1000 iterations, 25 workers)
//! dbbench --type sqlite
//!
//! # Only the insert and delete benchmarks against MariaDB
//! dbbench --type mariadb --host db.local --user bench --pass secret \
//!   --run "inserts deletes"
//!
//! # Replay a custom script against PostgreSQL
//! dbbench --type postgres --script statements.sql
//!
//! # dqlite cluster: bootstrap the voters, then run the catalog
//! dbbench --type dqlite \
//!   --leader 10.0.0.1:9001 \
//!   --voter 10.0.0.2:9001 --voter 10.0.0.3:9001
//! ```

use anyhow::Context;
use bench_core::{join_script, Bencher};
use clap::{Parser, ValueEnum};
use dbbench::backends::{DqliteBencher, MysqlBencher, PostgresBencher, SqliteBencher};
use dbbench::runner;
use std::io::BufRead;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;
use tracing::warn;

#[derive(Parser)]
#[command(name = "dbbench")]
#[command(version)]
#[command(about = "Concurrent benchmark harness for SQL databases")]
struct Cli {
    /// Database to use
    #[arg(long = "type", value_enum)]
    database_type: DatabaseType,

    /// Address of the server
    #[arg(long, default_value = "localhost")]
    host: String,

    /// Port of the server (0 selects the backend default)
    #[arg(long, default_value_t = 0)]
    port: u16,

    /// User name to connect with the server
    #[arg(long, default_value = "root")]
    user: String,

    /// Password to connect with the server
    #[arg(long, default_value = "root")]
    pass: String,

    /// Max. number of open connections (MySQL/MariaDB only)
    #[arg(long, default_value_t = 0)]
    conns: usize,

    /// Database file (SQLite only)
    #[arg(long, default_value = "dbbench.sqlite")]
    path: String,

    /// How many iterations should be run
    #[arg(long, default_value_t = 1000, value_parser = clap::value_parser!(u64).range(1..))]
    iter: u64,

    /// Max. number of concurrent workers
    #[arg(long, default_value_t = 25, value_parser = clap::value_parser!(u64).range(1..))]
    threads: u64,

    /// Only cleanup benchmark data, e.g. after a crash
    #[arg(long)]
    clean: bool,

    /// Keep benchmark data
    #[arg(long)]
    noclean: bool,

    /// Only run the specified benchmarks, e.g. "inserts deletes"
    #[arg(long, default_value = "all")]
    run: String,

    /// Custom SQL file to execute instead of the benchmark catalog
    #[arg(long, value_name = "PATH")]
    script: Option<PathBuf>,

    /// Leader address of the cluster (dqlite only)
    #[arg(long)]
    leader: Option<String>,

    /// Voter address, repeatable, enrolled in the given order (dqlite only)
    #[arg(long = "voter", value_name = "ADDRESS")]
    voters: Vec<String>,
}

#[derive(Clone, Copy, Debug, ValueEnum)]
enum DatabaseType {
    #[value(name = "sqlite")]
    Sqlite,
    #[value(name = "mysql")]
    Mysql,
    #[value(name = "mariadb")]
    Mariadb,
    #[value(name = "postgres")]
    Postgres,
    #[value(name = "cockroach")]
    Cockroach,
    #[value(name = "dqlite")]
    Dqlite,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if let Err(e) = run().await {
        eprintln!("Error: {e:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = Cli::parse();
    let bencher = connect_backend(&cli).await?;

    // Only clean old data when the clean flag is set.
    if cli.clean {
        if let Err(e) = bencher.cleanup().await {
            warn!("cleanup failed: {e}");
        }
        return Ok(());
    }

    bencher.setup().await.context("schema setup failed")?;

    let script = match &cli.script {
        Some(path) => {
            let lines =
                read_lines(path).with_context(|| format!("failed to read script {path:?}"))?;
            Some(join_script(&lines))
        }
        None => None,
    };

    let start = Instant::now();
    for name in cli.run.split_whitespace() {
        runner::run(
            bencher.clone(),
            script.as_deref(),
            name,
            cli.iter,
            cli.threads,
        )
        .await;
    }
    println!("total: {:?}", start.elapsed());

    // Keep benchmark data only when the noclean flag is set.
    if !cli.noclean {
        if let Err(e) = bencher.cleanup().await {
            warn!("cleanup failed: {e}");
        }
    }
    Ok(())
}

async fn connect_backend(cli: &Cli) -> anyhow::Result<Arc<dyn Bencher>> {
    match cli.database_type {
        DatabaseType::Sqlite => {
            anyhow::ensure!(cli.conns == 0, "can't use --conns with SQLite");
            Ok(Arc::new(SqliteBencher::open(&cli.path)?))
        }
        DatabaseType::Mysql | DatabaseType::Mariadb => Ok(Arc::new(MysqlBencher::connect(
            &cli.host, cli.port, &cli.user, &cli.pass, cli.conns,
        )?)),
        DatabaseType::Postgres => {
            anyhow::ensure!(cli.conns == 0, "can't use --conns with PostgreSQL");
            Ok(Arc::new(
                PostgresBencher::connect_postgres(&cli.host, cli.port, &cli.user, &cli.pass)
                    .await?,
            ))
        }
        DatabaseType::Cockroach => {
            anyhow::ensure!(cli.conns == 0, "can't use --conns with CockroachDB");
            Ok(Arc::new(
                PostgresBencher::connect_cockroach(&cli.host, cli.port, &cli.user, &cli.pass)
                    .await?,
            ))
        }
        DatabaseType::Dqlite => {
            anyhow::ensure!(cli.conns == 0, "can't use --conns with dqlite");
            let leader = cli
                .leader
                .as_deref()
                .context("--leader is required with dqlite")?;
            Ok(Arc::new(DqliteBencher::connect(leader, &cli.voters).await?))
        }
    }
}

fn read_lines(path: &PathBuf) -> std::io::Result<Vec<String>> {
    let file = std::fs::File::open(path)?;
    std::io::BufReader::new(file).lines().collect()
}
