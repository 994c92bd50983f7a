//! Client and cluster bootstrap for dqlite-style replicated SQLite servers.
//!
//! This crate covers the two things the benchmark harness needs from a
//! replicated backend:
//! 1. A per-node wire client ([`Client`]): leader discovery, membership
//!    queries, voter enrollment, and SQL execution over a single TCP
//!    connection.
//! 2. The cluster bootstrap state machine ([`bootstrap`]): seed a node
//!    directory with the leader address, confirm the leader, enroll the
//!    configured voters with deterministic identifiers, and wire up one
//!    diagnostic connection per cluster member.
//!
//! Bootstrap is generic over [`Connector`]/[`NodeHandle`] so it can be
//! exercised against in-memory fakes; [`TcpConnector`] is the production
//! implementation.

pub mod bootstrap;
pub mod client;
pub mod error;
pub mod protocol;
pub mod store;

pub use bootstrap::{
    bootstrap, find_leader, ClusterSession, ClusterTopology, Connector, EnrollOutcome, NodeHandle,
    TcpConnector, BOOTSTRAP_ID,
};
pub use client::Client;
pub use error::Error;
pub use protocol::ExecResult;
pub use store::{NodeInfo, NodeStore, Role};
