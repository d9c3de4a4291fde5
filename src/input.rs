//! Reading RESP values off network streams and the replica side of the
//! replication handshake.
//!
//! Reads accumulate into a `BytesMut` owned by the caller. Only complete
//! values are consumed from it, a trailing partial value stays buffered until
//! the next read completes it.

use std::sync::OnceLock;

use bytes::{Buf, BytesMut};
use regex::Regex;
use thiserror::Error;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tracing::debug;

use crate::resp::{RespError, RespValue};

/// Errors that can occur while reading and parsing commands from network streams.
#[derive(Error, Debug, PartialEq)]
pub enum CommandReadError {
    #[error("I/O error: {0}")]
    IoError(String),
    #[error("Connection closed")]
    ConnectionClosed,
    #[error("RESP parse error: {0}")]
    RespParseError(#[from] RespError),
    #[error("Invalid response from master during {0:?}")]
    InvalidResponseFromMaster(HandshakeStage),
}

impl CommandReadError {
    pub fn as_resp(&self) -> RespValue {
        match self {
            CommandReadError::RespParseError(err) => err.as_resp(),
            other => RespValue::Error(format!("ERR {}", other)),
        }
    }
}

/// Steps of the replica-side handshake, in the order they run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HandshakeStage {
    Ping,
    ReplconfListeningPort,
    ReplconfCapa,
    Psync,
    AwaitingSnapshot,
}

/// What the master answered to `PSYNC ? -1`.
#[derive(Debug, PartialEq)]
pub struct FullResync {
    pub replication_id: String,
    pub offset: u64,
    pub snapshot: Vec<u8>,
}

/// Drains every complete value from `buffer`.
///
/// Each value comes with the number of bytes it occupied on the wire. Lines
/// starting with a letter are inline commands (`PING\r\n`) and come back as
/// an array of bulk strings. A malformed value is only reported once every
/// complete value in front of it has been returned.
pub fn parse_frames(buffer: &mut BytesMut) -> Result<Vec<(RespValue, usize)>, RespError> {
    let mut frames = Vec::new();

    while !buffer.is_empty() {
        let parsed = if buffer[0].is_ascii_alphabetic() {
            parse_inline(buffer).map(|(parts, consumed)| {
                let value =
                    RespValue::Array(parts.into_iter().map(RespValue::BulkString).collect());
                (value, consumed)
            })
        } else {
            RespValue::parse(buffer)
        };

        match parsed {
            Ok((value, consumed)) => {
                buffer.advance(consumed);
                frames.push((value, consumed));
            }
            Err(e) if e.is_incomplete() => break,
            Err(e) if frames.is_empty() => return Err(e),
            // The bad bytes stay buffered, the next call reports them.
            Err(_) => break,
        }
    }

    Ok(frames)
}

fn parse_inline(input: &[u8]) -> Result<(Vec<String>, usize), RespError> {
    let end = input
        .iter()
        .position(|&byte| byte == b'\n')
        .ok_or(RespError::Incomplete)?;

    let line = std::str::from_utf8(&input[..end]).map_err(|_| RespError::InvalidUtf8)?;
    let parts = line.split_whitespace().map(str::to_string).collect();

    Ok((parts, end + 1))
}

async fn fill_buffer<R>(stream: &mut R, buffer: &mut BytesMut) -> Result<(), CommandReadError>
where
    R: AsyncRead + Unpin,
{
    let number_of_bytes = stream
        .read_buf(buffer)
        .await
        .map_err(|e| CommandReadError::IoError(e.to_string()))?;

    if number_of_bytes == 0 {
        return Err(CommandReadError::ConnectionClosed);
    }

    Ok(())
}

/// Returns every complete value available, reading from `stream` until there
/// is at least one.
pub async fn read_frames<R>(
    stream: &mut R,
    buffer: &mut BytesMut,
) -> Result<Vec<(RespValue, usize)>, CommandReadError>
where
    R: AsyncRead + Unpin,
{
    loop {
        let frames = parse_frames(buffer)?;

        if !frames.is_empty() {
            return Ok(frames);
        }

        fill_buffer(stream, buffer).await?;
    }
}

/// Reads exactly one value, leaving anything after it in `buffer`.
pub async fn read_value<R>(
    stream: &mut R,
    buffer: &mut BytesMut,
) -> Result<RespValue, CommandReadError>
where
    R: AsyncRead + Unpin,
{
    loop {
        match RespValue::parse(buffer) {
            Ok((value, consumed)) => {
                buffer.advance(consumed);
                return Ok(value);
            }
            Err(e) if e.is_incomplete() => fill_buffer(stream, buffer).await?,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Reads the snapshot that follows `FULLRESYNC`.
pub async fn read_rdb_payload<R>(
    stream: &mut R,
    buffer: &mut BytesMut,
) -> Result<Vec<u8>, CommandReadError>
where
    R: AsyncRead + Unpin,
{
    loop {
        match RespValue::parse_rdb(buffer) {
            Ok((value, consumed)) => {
                buffer.advance(consumed);

                let RespValue::Rdb(snapshot) = value else {
                    return Err(CommandReadError::InvalidResponseFromMaster(
                        HandshakeStage::AwaitingSnapshot,
                    ));
                };

                return Ok(snapshot);
            }
            Err(e) if e.is_incomplete() => fill_buffer(stream, buffer).await?,
            Err(e) => return Err(e.into()),
        }
    }
}

/// Performs the replica side of the replication handshake.
///
/// 1. `PING`, expecting `PONG`
/// 2. `REPLCONF listening-port <port>`, expecting `OK`
/// 3. `REPLCONF capa psync2`, expecting `OK`
/// 4. `PSYNC ? -1`, expecting `FULLRESYNC <replid> <offset>`
/// 5. the RDB snapshot
///
/// Bytes the master sent after the snapshot stay in `buffer`, they are the
/// start of the command stream.
pub async fn handshake<S>(
    stream: &mut S,
    buffer: &mut BytesMut,
    listening_port: u16,
) -> Result<FullResync, CommandReadError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    let pong = RespValue::SimpleString("PONG".to_string());
    let ok = RespValue::SimpleString("OK".to_string());

    let response = send_handshake_command(stream, buffer, &["PING"]).await?;
    expect_response(response, &pong, HandshakeStage::Ping)?;

    let port = listening_port.to_string();
    let response =
        send_handshake_command(stream, buffer, &["REPLCONF", "listening-port", &port]).await?;
    expect_response(response, &ok, HandshakeStage::ReplconfListeningPort)?;

    let response = send_handshake_command(stream, buffer, &["REPLCONF", "capa", "psync2"]).await?;
    expect_response(response, &ok, HandshakeStage::ReplconfCapa)?;

    let response = send_handshake_command(stream, buffer, &["PSYNC", "?", "-1"]).await?;
    let (replication_id, offset) = parse_fullresync(response)?;

    let snapshot = read_rdb_payload(stream, buffer).await?;

    Ok(FullResync {
        replication_id,
        offset,
        snapshot,
    })
}

async fn send_handshake_command<S>(
    stream: &mut S,
    buffer: &mut BytesMut,
    command: &[&str],
) -> Result<RespValue, CommandReadError>
where
    S: AsyncRead + AsyncWrite + Unpin,
{
    debug!(?command, "sending handshake command");

    let encoded = RespValue::bulk_string_array(command).encode();
    stream
        .write_all(&encoded)
        .await
        .map_err(|e| CommandReadError::IoError(e.to_string()))?;
    stream
        .flush()
        .await
        .map_err(|e| CommandReadError::IoError(e.to_string()))?;

    read_value(stream, buffer).await
}

fn expect_response(
    response: RespValue,
    expected: &RespValue,
    stage: HandshakeStage,
) -> Result<(), CommandReadError> {
    if &response != expected {
        return Err(CommandReadError::InvalidResponseFromMaster(stage));
    }

    Ok(())
}

fn parse_fullresync(response: RespValue) -> Result<(String, u64), CommandReadError> {
    let invalid = CommandReadError::InvalidResponseFromMaster(HandshakeStage::Psync);

    let RespValue::SimpleString(line) = response else {
        return Err(invalid);
    };

    let parts: Vec<&str> = line.split_whitespace().collect();
    let ["FULLRESYNC", repl_id, offset] = parts.as_slice() else {
        return Err(invalid);
    };

    if !is_valid_repl_id(repl_id) {
        return Err(invalid);
    }

    let Ok(offset) = offset.parse::<u64>() else {
        return Err(invalid);
    };

    Ok((repl_id.to_string(), offset))
}

fn is_valid_repl_id(repl_id: &str) -> bool {
    static REPL_ID: OnceLock<Regex> = OnceLock::new();

    let pattern = REPL_ID.get_or_init(|| {
        Regex::new(r"^[a-zA-Z0-9]{40}$").expect("replication id pattern is valid")
    });

    pattern.is_match(repl_id)
}
