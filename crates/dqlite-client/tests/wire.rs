//! Wire-level tests against an in-process TCP node.
//!
//! The fake node speaks the same frame codec as the client (both sides are
//! built from the `protocol` module) and answers leader, membership,
//! enrollment, open and exec requests the way a single-node cluster would.

use dqlite_client::protocol::{self, BodyReader, ExecResult, Frame};
use dqlite_client::{bootstrap, Client, Error, NodeHandle, NodeInfo, Role, TcpConnector};
use std::sync::{Arc, Mutex};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::{TcpListener, TcpStream};

/// State shared between the fake node and the test body.
#[derive(Default)]
struct NodeState {
    added: Mutex<Vec<(u64, String)>>,
    executed: Mutex<Vec<String>>,
}

/// Bind a fake node; `leader_address` is what it reports as its leader
/// (empty means "use my own address").
async fn spawn_node(state: Arc<NodeState>, leader_address: Option<String>) -> String {
    let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
    let address = listener.local_addr().unwrap().to_string();
    let reported_leader = leader_address.unwrap_or_else(|| address.clone());

    tokio::spawn(async move {
        loop {
            let Ok((stream, _)) = listener.accept().await else {
                return;
            };
            let state = state.clone();
            let reported_leader = reported_leader.clone();
            tokio::spawn(async move {
                serve_connection(stream, state, reported_leader).await;
            });
        }
    });

    address
}

async fn serve_connection(mut stream: TcpStream, state: Arc<NodeState>, reported_leader: String) {
    // Version handshake.
    let mut version = [0u8; 8];
    if stream.read_exact(&mut version).await.is_err() {
        return;
    }
    assert_eq!(u64::from_le_bytes(version), protocol::PROTOCOL_VERSION);

    loop {
        let mut header = [0u8; 8];
        if stream.read_exact(&mut header).await.is_err() {
            return;
        }
        let (body_len, kind, schema) = Frame::parse_header(&header);
        let mut body = vec![0u8; body_len];
        if stream.read_exact(&mut body).await.is_err() {
            return;
        }
        let request = Frame { kind, schema, body };

        let response = match request.kind {
            protocol::request::CLIENT => protocol::welcome_response(15_000),
            protocol::request::LEADER => protocol::server_response(1, &reported_leader),
            protocol::request::CLUSTER => {
                let mut members = vec![NodeInfo {
                    id: 1,
                    address: reported_leader.clone(),
                    role: Role::Voter,
                }];
                for (id, address) in state.added.lock().unwrap().iter() {
                    members.push(NodeInfo {
                        id: *id,
                        address: address.clone(),
                        role: Role::Voter,
                    });
                }
                protocol::servers_response(&members)
            }
            protocol::request::ADD => {
                let mut reader = BodyReader::new(&request.body);
                let id = reader.get_u64().unwrap();
                let address = reader.get_text().unwrap();
                state.added.lock().unwrap().push((id, address));
                protocol::empty_response()
            }
            protocol::request::OPEN => {
                let mut reader = BodyReader::new(&request.body);
                let _name = reader.get_text().unwrap();
                protocol::db_response(7)
            }
            protocol::request::EXEC_SQL => {
                let mut reader = BodyReader::new(&request.body);
                let _db = reader.get_u64().unwrap();
                let sql = reader.get_text().unwrap();
                state.executed.lock().unwrap().push(sql.clone());
                if sql.contains("BOOM") {
                    protocol::failure_response(1, "near \"BOOM\": syntax error")
                } else {
                    protocol::result_response(ExecResult {
                        last_insert_id: 0,
                        rows_affected: 1,
                    })
                }
            }
            other => protocol::failure_response(400, &format!("unexpected request {other}")),
        };

        if stream.write_all(&response.encode()).await.is_err() {
            return;
        }
    }
}

#[tokio::test]
async fn test_client_handshake_and_leader_query() {
    let state = Arc::new(NodeState::default());
    let address = spawn_node(state, None).await;

    let mut client = Client::connect(&address).await.unwrap();
    let leader = client.leader().await.unwrap();
    assert_eq!(leader.id, 1);
    assert_eq!(leader.address, address);
}

#[tokio::test]
async fn test_open_and_exec_sql() {
    let state = Arc::new(NodeState::default());
    let address = spawn_node(state.clone(), None).await;

    let mut client = Client::connect(&address).await.unwrap();
    let db = client.open("dbbench").await.unwrap();
    assert_eq!(db, 7);

    let result = client
        .exec_sql(db, "INSERT INTO dbbench_simple (id, balance) VALUES( 1, 2);")
        .await
        .unwrap();
    assert_eq!(result.rows_affected, 1);

    assert_eq!(
        state.executed.lock().unwrap().as_slice(),
        &["INSERT INTO dbbench_simple (id, balance) VALUES( 1, 2);".to_string()]
    );
}

#[tokio::test]
async fn test_server_failure_maps_to_error() {
    let state = Arc::new(NodeState::default());
    let address = spawn_node(state, None).await;

    let mut client = Client::connect(&address).await.unwrap();
    let db = client.open("dbbench").await.unwrap();

    let err = client.exec_sql(db, "BOOM;").await.unwrap_err();
    match err {
        Error::Server { code, message } => {
            assert_eq!(code, 1);
            assert!(message.contains("syntax error"));
        }
        other => panic!("expected server failure, got {other}"),
    }

    // The connection survives a statement failure.
    client.exec_sql(db, "SELECT 1;").await.unwrap();
}

#[tokio::test]
async fn test_bootstrap_over_tcp() {
    let leader_state = Arc::new(NodeState::default());
    let leader_address = spawn_node(leader_state.clone(), None).await;

    // Voters report the leader's address, like followers would.
    let voter0 = spawn_node(Arc::new(NodeState::default()), Some(leader_address.clone())).await;
    let voter1 = spawn_node(Arc::new(NodeState::default()), Some(leader_address.clone())).await;

    let mut session = bootstrap(
        &TcpConnector,
        &leader_address,
        &[voter0.clone(), voter1.clone()],
    )
    .await
    .unwrap();

    assert_eq!(
        session.topology.voters,
        vec![
            NodeInfo {
                id: 2,
                address: voter0,
                role: Role::Voter
            },
            NodeInfo {
                id: 3,
                address: voter1,
                role: Role::Voter
            },
        ]
    );
    assert!(session.enrollment.iter().all(|o| o.enrolled()));
    assert_eq!(session.nodes.len(), 3);
    assert!(session.nodes.iter().all(|(_, handle)| handle.is_some()));

    // The leader received both enrollment requests with the assigned ids.
    let added = leader_state.added.lock().unwrap().clone();
    assert_eq!(added.iter().map(|(id, _)| *id).collect::<Vec<_>>(), [2, 3]);

    // Diagnostics run against every member without failing.
    session.report_topology().await;
}
