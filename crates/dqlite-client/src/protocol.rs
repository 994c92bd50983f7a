//! Wire codec for the dqlite client protocol.
//!
//! After an 8-byte little-endian version handshake, every message is a
//! frame: a fixed header `{words: u32, kind: u8, schema: u8, extra: u16}`
//! followed by a body of `words` 8-byte words. Integers are little-endian;
//! strings are nul-terminated and padded to the next word boundary.

use crate::error::Error;
use crate::store::{NodeInfo, Role};
use bytes::{BufMut, BytesMut};

/// Version sent by the client immediately after connecting.
pub const PROTOCOL_VERSION: u64 = 1;

/// Body word size in bytes.
const WORD: usize = 8;

/// Membership list format requested from the server.
pub const CLUSTER_FORMAT_V1: u64 = 1;

/// Request message kinds.
pub mod request {
    pub const LEADER: u8 = 0;
    pub const CLIENT: u8 = 1;
    pub const OPEN: u8 = 3;
    pub const EXEC_SQL: u8 = 8;
    pub const ADD: u8 = 12;
    pub const CLUSTER: u8 = 16;
}

/// Response message kinds.
pub mod response {
    pub const FAILURE: u8 = 0;
    pub const SERVER: u8 = 1;
    pub const WELCOME: u8 = 2;
    pub const SERVERS: u8 = 3;
    pub const DB: u8 = 4;
    pub const RESULT: u8 = 6;
    pub const EMPTY: u8 = 8;
}

/// Outcome of a statement executed on a node.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExecResult {
    pub last_insert_id: u64,
    pub rows_affected: u64,
}

/// One protocol message, header plus word-aligned body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    pub kind: u8,
    pub schema: u8,
    pub body: Vec<u8>,
}

impl Frame {
    pub fn new(kind: u8, body: Vec<u8>) -> Self {
        Self {
            kind,
            schema: 0,
            body,
        }
    }

    /// Serialize header and body for the wire.
    pub fn encode(&self) -> Vec<u8> {
        assert!(
            self.body.len() % WORD == 0,
            "frame body must be word-aligned"
        );
        let words = (self.body.len() / WORD) as u32;

        let mut buf = Vec::with_capacity(WORD + self.body.len());
        buf.extend_from_slice(&words.to_le_bytes());
        buf.push(self.kind);
        buf.push(self.schema);
        buf.extend_from_slice(&0u16.to_le_bytes());
        buf.extend_from_slice(&self.body);
        buf
    }

    /// Parse a frame header; returns `(body_len, kind, schema)`.
    pub fn parse_header(header: &[u8; WORD]) -> (usize, u8, u8) {
        let words = u32::from_le_bytes([header[0], header[1], header[2], header[3]]);
        (words as usize * WORD, header[4], header[5])
    }
}

/// Builder for word-aligned frame bodies.
#[derive(Default)]
pub struct BodyWriter {
    buf: BytesMut,
}

impl BodyWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn put_u64(mut self, value: u64) -> Self {
        self.buf.put_u64_le(value);
        self
    }

    /// Append a nul-terminated string padded to the word boundary.
    pub fn put_text(mut self, text: &str) -> Self {
        self.buf.put_slice(text.as_bytes());
        self.buf.put_u8(0);
        while self.buf.len() % WORD != 0 {
            self.buf.put_u8(0);
        }
        self
    }

    pub fn finish(self) -> Vec<u8> {
        self.buf.to_vec()
    }
}

/// Cursor over a received frame body.
pub struct BodyReader<'a> {
    buf: &'a [u8],
    pos: usize,
}

impl<'a> BodyReader<'a> {
    pub fn new(buf: &'a [u8]) -> Self {
        Self { buf, pos: 0 }
    }

    pub fn get_u64(&mut self) -> Result<u64, Error> {
        let end = self.pos + WORD;
        let bytes = self
            .buf
            .get(self.pos..end)
            .ok_or_else(|| Error::Protocol("truncated frame body".to_string()))?;
        self.pos = end;
        Ok(u64::from_le_bytes(bytes.try_into().unwrap()))
    }

    /// Read a nul-terminated string and skip its word padding.
    pub fn get_text(&mut self) -> Result<String, Error> {
        let rest = &self.buf[self.pos..];
        let nul = rest
            .iter()
            .position(|&b| b == 0)
            .ok_or_else(|| Error::Protocol("unterminated string in frame body".to_string()))?;
        let text = std::str::from_utf8(&rest[..nul])
            .map_err(|e| Error::Protocol(format!("invalid string in frame body: {e}")))?
            .to_string();

        let mut consumed = nul + 1;
        while consumed % WORD != 0 {
            consumed += 1;
        }
        self.pos += consumed;
        Ok(text)
    }
}

// Request builders.

pub fn leader_request() -> Frame {
    Frame::new(request::LEADER, BodyWriter::new().put_u64(0).finish())
}

pub fn client_request(id: u64) -> Frame {
    Frame::new(request::CLIENT, BodyWriter::new().put_u64(id).finish())
}

pub fn open_request(name: &str) -> Frame {
    // name, flags, vfs
    let body = BodyWriter::new().put_text(name).put_u64(0).put_text("").finish();
    Frame::new(request::OPEN, body)
}

pub fn add_request(id: u64, address: &str) -> Frame {
    let body = BodyWriter::new().put_u64(id).put_text(address).finish();
    Frame::new(request::ADD, body)
}

pub fn cluster_request() -> Frame {
    Frame::new(
        request::CLUSTER,
        BodyWriter::new().put_u64(CLUSTER_FORMAT_V1).finish(),
    )
}

pub fn exec_sql_request(db: u32, sql: &str) -> Frame {
    // db id, statement text, then a zero word for an empty parameter tuple
    let body = BodyWriter::new()
        .put_u64(db as u64)
        .put_text(sql)
        .put_u64(0)
        .finish();
    Frame::new(request::EXEC_SQL, body)
}

// Response parsers.

fn expect_kind(frame: &Frame, kind: u8) -> Result<(), Error> {
    if frame.kind != kind {
        return Err(Error::Protocol(format!(
            "unexpected response kind {} (wanted {kind})",
            frame.kind
        )));
    }
    Ok(())
}

pub fn parse_failure(frame: &Frame) -> Result<(u64, String), Error> {
    expect_kind(frame, response::FAILURE)?;
    let mut body = BodyReader::new(&frame.body);
    let code = body.get_u64()?;
    let message = body.get_text()?;
    Ok((code, message))
}

/// Leader response: node id and address.
pub fn parse_server(frame: &Frame) -> Result<(u64, String), Error> {
    expect_kind(frame, response::SERVER)?;
    let mut body = BodyReader::new(&frame.body);
    let id = body.get_u64()?;
    let address = body.get_text()?;
    Ok((id, address))
}

/// Welcome response: heartbeat timeout in milliseconds.
pub fn parse_welcome(frame: &Frame) -> Result<u64, Error> {
    expect_kind(frame, response::WELCOME)?;
    BodyReader::new(&frame.body).get_u64()
}

/// Membership response: the full perceived cluster.
pub fn parse_servers(frame: &Frame) -> Result<Vec<NodeInfo>, Error> {
    expect_kind(frame, response::SERVERS)?;
    let mut body = BodyReader::new(&frame.body);
    let count = body.get_u64()?;

    let mut nodes = Vec::with_capacity(count as usize);
    for _ in 0..count {
        let id = body.get_u64()?;
        let address = body.get_text()?;
        let role = Role::from_u64(body.get_u64()?)?;
        nodes.push(NodeInfo { id, address, role });
    }
    Ok(nodes)
}

pub fn parse_db(frame: &Frame) -> Result<u32, Error> {
    expect_kind(frame, response::DB)?;
    // db id in the low half of the word, padding in the high half
    let word = BodyReader::new(&frame.body).get_u64()?;
    Ok(word as u32)
}

pub fn parse_result(frame: &Frame) -> Result<ExecResult, Error> {
    expect_kind(frame, response::RESULT)?;
    let mut body = BodyReader::new(&frame.body);
    Ok(ExecResult {
        last_insert_id: body.get_u64()?,
        rows_affected: body.get_u64()?,
    })
}

// Response builders, used by the in-process test server and kept next to
// the parsers so the two sides stay in sync.

pub fn failure_response(code: u64, message: &str) -> Frame {
    Frame::new(
        response::FAILURE,
        BodyWriter::new().put_u64(code).put_text(message).finish(),
    )
}

pub fn server_response(id: u64, address: &str) -> Frame {
    Frame::new(
        response::SERVER,
        BodyWriter::new().put_u64(id).put_text(address).finish(),
    )
}

pub fn welcome_response(heartbeat_timeout: u64) -> Frame {
    Frame::new(
        response::WELCOME,
        BodyWriter::new().put_u64(heartbeat_timeout).finish(),
    )
}

pub fn servers_response(nodes: &[NodeInfo]) -> Frame {
    let mut body = BodyWriter::new().put_u64(nodes.len() as u64);
    for node in nodes {
        body = body
            .put_u64(node.id)
            .put_text(&node.address)
            .put_u64(node.role.as_u64());
    }
    Frame::new(response::SERVERS, body.finish())
}

pub fn db_response(id: u32) -> Frame {
    Frame::new(response::DB, BodyWriter::new().put_u64(id as u64).finish())
}

pub fn result_response(result: ExecResult) -> Frame {
    Frame::new(
        response::RESULT,
        BodyWriter::new()
            .put_u64(result.last_insert_id)
            .put_u64(result.rows_affected)
            .finish(),
    )
}

pub fn empty_response() -> Frame {
    Frame::new(response::EMPTY, BodyWriter::new().put_u64(0).finish())
}
