//! Node directory and cluster member descriptions.

use crate::error::Error;
use std::fmt;
use std::sync::Mutex;

/// Role of a cluster member in the replication protocol.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// Full voting member.
    Voter,
    /// Non-voting member kept up to date with the log.
    StandBy,
    /// Member holding no data, available for promotion.
    Spare,
}

impl Role {
    pub fn as_u64(self) -> u64 {
        match self {
            Role::Voter => 0,
            Role::StandBy => 1,
            Role::Spare => 2,
        }
    }

    pub fn from_u64(value: u64) -> Result<Self, Error> {
        match value {
            0 => Ok(Role::Voter),
            1 => Ok(Role::StandBy),
            2 => Ok(Role::Spare),
            other => Err(Error::Protocol(format!("unknown node role {other}"))),
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Role::Voter => write!(f, "voter"),
            Role::StandBy => write!(f, "stand-by"),
            Role::Spare => write!(f, "spare"),
        }
    }
}

/// One cluster member as seen by the protocol.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeInfo {
    pub id: u64,
    pub address: String,
    pub role: Role,
}

impl NodeInfo {
    /// A directory seed entry: address known, identity not yet resolved.
    pub fn seed(address: &str) -> Self {
        Self {
            id: 0,
            address: address.to_string(),
            role: Role::Voter,
        }
    }
}

impl fmt::Display for NodeInfo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({}, {})", self.address, self.id, self.role)
    }
}

/// In-memory node directory used to find the current leader.
///
/// During bootstrap the directory holds only the configured leader
/// address; it is never refreshed afterwards.
#[derive(Debug, Default)]
pub struct NodeStore {
    nodes: Mutex<Vec<NodeInfo>>,
}

impl NodeStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the directory contents.
    pub fn set(&self, nodes: Vec<NodeInfo>) {
        *self.nodes.lock().unwrap() = nodes;
    }

    /// Snapshot of the directory contents.
    pub fn get(&self) -> Vec<NodeInfo> {
        self.nodes.lock().unwrap().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_role_round_trip() {
        for role in [Role::Voter, Role::StandBy, Role::Spare] {
            assert_eq!(Role::from_u64(role.as_u64()).unwrap(), role);
        }
        assert!(Role::from_u64(3).is_err());
    }

    #[test]
    fn test_store_set_and_get() {
        let store = NodeStore::new();
        assert!(store.get().is_empty());

        store.set(vec![NodeInfo::seed("127.0.0.1:9001")]);
        let nodes = store.get();
        assert_eq!(nodes.len(), 1);
        assert_eq!(nodes[0].address, "127.0.0.1:9001");
        assert_eq!(nodes[0].role, Role::Voter);
    }
}
