//! Cluster bootstrap: leader confirmation, voter enrollment, diagnostics.
//!
//! A linear state machine with no retries:
//! 1. Seed a node directory with the configured leader address
//! 2. Confirm and connect to the current leader (fatal on failure)
//! 3. Enroll each configured voter in order, id `index + 2` (best-effort)
//! 4. Open one diagnostic connection per cluster member
//! 5. Report the topology every member perceives

use crate::client::Client;
use crate::error::Error;
use crate::store::{NodeInfo, NodeStore, Role};
use tracing::{info, warn};

/// Identifier the leader assumes when it bootstraps the cluster.
pub const BOOTSTRAP_ID: u64 = 1;

/// Topology introspection and membership operations on one node.
#[async_trait::async_trait]
pub trait NodeHandle: Send {
    /// The leader this node currently perceives.
    async fn leader(&mut self) -> Result<NodeInfo, Error>;

    /// The full cluster membership this node currently perceives.
    async fn cluster(&mut self) -> Result<Vec<NodeInfo>, Error>;

    /// Ask this node (the leader) to add a member to the cluster.
    async fn add(&mut self, node: NodeInfo) -> Result<(), Error>;
}

/// Opens node connections; implemented by [`TcpConnector`] in production
/// and by in-memory fakes in tests.
#[async_trait::async_trait]
pub trait Connector: Send + Sync {
    type Handle: NodeHandle;

    async fn connect(&self, address: &str) -> Result<Self::Handle, Error>;
}

/// Production connector dialing nodes over TCP.
#[derive(Debug, Default, Clone, Copy)]
pub struct TcpConnector;

#[async_trait::async_trait]
impl Connector for TcpConnector {
    type Handle = Client;

    async fn connect(&self, address: &str) -> Result<Client, Error> {
        Client::connect(address).await
    }
}

/// The cluster membership established by bootstrap.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClusterTopology {
    pub leader_address: String,
    /// Configured voters in enrollment order, ids `2, 3, ...`.
    pub voters: Vec<NodeInfo>,
}

/// Per-voter enrollment outcome, recorded so callers can observe partial
/// cluster formation instead of digging through logs.
#[derive(Debug, Clone)]
pub struct EnrollOutcome {
    pub node: NodeInfo,
    pub error: Option<String>,
}

impl EnrollOutcome {
    pub fn enrolled(&self) -> bool {
        self.error.is_none()
    }
}

/// Everything bootstrap established: the topology, the leader handle used
/// for membership changes, and one diagnostic handle per member. Owns the
/// node connections for the life of the process.
pub struct ClusterSession<H> {
    pub topology: ClusterTopology,
    pub leader: H,
    /// Diagnostic connections, leader first, then voters in configuration
    /// order. `None` where the connection attempt failed.
    pub nodes: Vec<(String, Option<H>)>,
    pub enrollment: Vec<EnrollOutcome>,
}

/// Resolve and connect to the current leader through the node directory.
///
/// Each directory entry is dialed in turn and asked for the leader it
/// perceives; the first reachable leader wins. Fails with
/// [`Error::NoLeader`] when the directory is exhausted.
pub async fn find_leader<C: Connector>(
    store: &NodeStore,
    connector: &C,
) -> Result<C::Handle, Error> {
    for entry in store.get() {
        let mut handle = match connector.connect(&entry.address).await {
            Ok(handle) => handle,
            Err(e) => {
                warn!("cannot reach directory node {}: {e}", entry.address);
                continue;
            }
        };

        let leader = match handle.leader().await {
            Ok(leader) => leader,
            Err(e) => {
                warn!("leader query on {} failed: {e}", entry.address);
                continue;
            }
        };
        info!("leader is {} at {}", leader.id, leader.address);

        if leader.address == entry.address {
            return Ok(handle);
        }
        match connector.connect(&leader.address).await {
            Ok(handle) => return Ok(handle),
            Err(e) => warn!("cannot reach reported leader {}: {e}", leader.address),
        }
    }
    Err(Error::NoLeader)
}

/// Stand up the cluster: confirm the leader, enroll the voters, and open
/// diagnostic connections to every member.
///
/// Leader discovery failure is fatal. Voter enrollment is best-effort and
/// non-transactional: a rejected voter is recorded and enrollment of the
/// remaining voters continues. Diagnostic connections are attempted for
/// every configured address regardless of enrollment outcome.
pub async fn bootstrap<C: Connector>(
    connector: &C,
    leader_address: &str,
    voter_addresses: &[String],
) -> Result<ClusterSession<C::Handle>, Error> {
    let store = NodeStore::new();
    store.set(vec![NodeInfo::seed(leader_address)]);

    info!("finding leader through {leader_address}...");
    let mut leader = find_leader(&store, connector).await?;

    // The bootstrap leader implicitly holds id 1; voters get 2, 3, ...
    let voters: Vec<NodeInfo> = voter_addresses
        .iter()
        .enumerate()
        .map(|(i, address)| NodeInfo {
            id: i as u64 + 2,
            address: address.clone(),
            role: Role::Voter,
        })
        .collect();

    let mut enrollment = Vec::with_capacity(voters.len());
    for node in &voters {
        info!("({}) adding voter {}...", node.id, node.address);
        let error = match leader.add(node.clone()).await {
            Ok(()) => None,
            Err(e) => {
                warn!("cannot add node {node}: {e}");
                Some(e.to_string())
            }
        };
        enrollment.push(EnrollOutcome {
            node: node.clone(),
            error,
        });
    }

    let mut nodes = Vec::with_capacity(voters.len() + 1);
    for address in std::iter::once(leader_address).chain(voter_addresses.iter().map(String::as_str))
    {
        let handle = match connector.connect(address).await {
            Ok(handle) => Some(handle),
            Err(e) => {
                warn!("cannot open diagnostic connection to {address}: {e}");
                None
            }
        };
        nodes.push((address.to_string(), handle));
    }

    Ok(ClusterSession {
        topology: ClusterTopology {
            leader_address: leader_address.to_string(),
            voters,
        },
        leader,
        nodes,
        enrollment,
    })
}

impl<H: NodeHandle> ClusterSession<H> {
    /// Log the leader and membership every member perceives.
    ///
    /// Operator visibility only: per-node failures are logged and the node
    /// is skipped, nothing is decided from the answers.
    pub async fn report_topology(&mut self) {
        for (address, handle) in &mut self.nodes {
            let Some(handle) = handle else {
                warn!("{address}: no diagnostic connection, skipping");
                continue;
            };

            match handle.leader().await {
                Ok(leader) => info!("{address}: leader is {} at {}", leader.id, leader.address),
                Err(e) => {
                    warn!("{address}: leader query failed: {e}");
                    continue;
                }
            }

            match handle.cluster().await {
                Ok(members) => {
                    let membership = members
                        .iter()
                        .map(|n| format!("{}--{}", n.address, n.role))
                        .collect::<Vec<_>>()
                        .join(",");
                    info!("{address}: membership: {membership}");
                }
                Err(e) => warn!("{address}: cluster query failed: {e}"),
            }
        }
    }
}
