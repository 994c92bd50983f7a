//! Per-node wire client.

use crate::bootstrap::NodeHandle;
use crate::error::Error;
use crate::protocol::{self, ExecResult, Frame};
use crate::store::{NodeInfo, Role};
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use tokio::net::TcpStream;
use tracing::debug;

/// One TCP connection to a cluster node.
///
/// Requests are issued strictly one at a time on the connection; the
/// benchmark backend wraps the client in a mutex to get its deliberate
/// single-connection serialization.
pub struct Client {
    stream: TcpStream,
    address: String,
}

impl Client {
    /// Connect to a node: TCP, version handshake, client registration.
    pub async fn connect(address: &str) -> Result<Self, Error> {
        let mut stream = TcpStream::connect(address).await?;
        stream
            .write_all(&protocol::PROTOCOL_VERSION.to_le_bytes())
            .await?;

        let mut client = Self {
            stream,
            address: address.to_string(),
        };

        // Register as a client connection. The server answers with its
        // heartbeat timeout, which this client does not use.
        let frame = client.call(protocol::client_request(0)).await?;
        protocol::parse_welcome(&frame)?;

        debug!("connected to node {address}");
        Ok(client)
    }

    pub fn address(&self) -> &str {
        &self.address
    }

    /// Open (creating if absent) the named database; returns its handle.
    pub async fn open(&mut self, name: &str) -> Result<u32, Error> {
        let frame = self.call(protocol::open_request(name)).await?;
        protocol::parse_db(&frame)
    }

    /// Execute one SQL statement against an open database.
    pub async fn exec_sql(&mut self, db: u32, sql: &str) -> Result<ExecResult, Error> {
        let frame = self.call(protocol::exec_sql_request(db, sql)).await?;
        protocol::parse_result(&frame)
    }

    /// Write one request frame and read the response, mapping server
    /// failure responses to [`Error::Server`].
    async fn call(&mut self, frame: Frame) -> Result<Frame, Error> {
        self.stream.write_all(&frame.encode()).await?;

        let mut header = [0u8; 8];
        self.stream.read_exact(&mut header).await?;
        let (body_len, kind, schema) = Frame::parse_header(&header);

        let mut body = vec![0u8; body_len];
        self.stream.read_exact(&mut body).await?;

        let frame = Frame { kind, schema, body };
        if frame.kind == protocol::response::FAILURE {
            let (code, message) = protocol::parse_failure(&frame)?;
            return Err(Error::Server { code, message });
        }
        Ok(frame)
    }
}

#[async_trait::async_trait]
impl NodeHandle for Client {
    async fn leader(&mut self) -> Result<NodeInfo, Error> {
        let frame = self.call(protocol::leader_request()).await?;
        let (id, address) = protocol::parse_server(&frame)?;
        Ok(NodeInfo {
            id,
            address,
            role: Role::Voter,
        })
    }

    async fn cluster(&mut self) -> Result<Vec<NodeInfo>, Error> {
        let frame = self.call(protocol::cluster_request()).await?;
        protocol::parse_servers(&frame)
    }

    async fn add(&mut self, node: NodeInfo) -> Result<(), Error> {
        // Nodes enroll as voters; the response carries no payload.
        self.call(protocol::add_request(node.id, &node.address))
            .await?;
        Ok(())
    }
}
