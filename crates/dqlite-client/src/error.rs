//! Error types for the dqlite client.

use thiserror::Error;

/// Errors reported by the wire client and the cluster bootstrap.
#[derive(Error, Debug)]
pub enum Error {
    /// IO error on the node connection.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Failure response reported by the server.
    #[error("server failure (code {code}): {message}")]
    Server { code: u64, message: String },

    /// Malformed or unexpected wire data.
    #[error("protocol error: {0}")]
    Protocol(String),

    /// No reachable leader in the node directory. Fatal during bootstrap.
    #[error("no leader reachable through the node directory")]
    NoLeader,
}
