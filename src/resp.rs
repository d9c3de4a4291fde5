//! RESP (REdis Serialization Protocol) values and their wire format.
//!
//! Parsing works on raw bytes and reports how many bytes each value occupied,
//! so a reader can walk a buffer holding several pipelined values. Besides the
//! five RESP2 types this module knows two replication extensions: the null
//! bulk string (`$-1\r\n`) and the RDB snapshot payload, which is length
//! prefixed like a bulk string but has no trailing CRLF.

use bytes::{BufMut, Bytes, BytesMut};
use thiserror::Error;

const CRLF: &[u8] = b"\r\n";

/// Errors produced while decoding RESP input.
#[derive(Error, Debug, PartialEq)]
pub enum RespError {
    #[error("empty input")]
    EmptyInput,
    #[error("unknown RESP type '{0}'")]
    UnknownRespType(char),
    #[error("incomplete input")]
    Incomplete,
    #[error("invalid UTF-8 sequence")]
    InvalidUtf8,
    #[error("failed to parse integer")]
    FailedToParseInteger,
    #[error("invalid bulk string length")]
    InvalidBulkStringLength,
    #[error("bulk string is not terminated by CRLF")]
    UnterminatedBulkString,
    #[error("invalid array length")]
    InvalidArrayLength,
    #[error("invalid RDB payload")]
    InvalidRdbPayload,
}

impl RespError {
    /// True when more bytes could turn the input into a valid value.
    pub fn is_incomplete(&self) -> bool {
        matches!(self, RespError::Incomplete | RespError::EmptyInput)
    }

    pub fn as_resp(&self) -> RespValue {
        RespValue::Error(format!("ERR Protocol error: {}", self))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum RespValue {
    SimpleString(String),
    Error(String),
    Integer(i64),
    BulkString(String),
    NullBulkString,
    Array(Vec<RespValue>),
    /// Full-resync snapshot: `$<len>\r\n<bytes>` without a terminator.
    Rdb(Vec<u8>),
}

impl RespValue {
    /// Builds the array-of-bulk-strings shape every client command uses.
    pub fn bulk_string_array(parts: &[&str]) -> Self {
        RespValue::Array(
            parts
                .iter()
                .map(|part| RespValue::BulkString(part.to_string()))
                .collect(),
        )
    }

    /// Parses the first value in `input`.
    ///
    /// Returns the value together with the exact number of bytes it occupied.
    /// For arrays that count is the header plus the sum of every nested
    /// element's own count, so the caller can continue from that offset.
    pub fn parse(input: &[u8]) -> Result<(RespValue, usize), RespError> {
        let Some(&prefix) = input.first() else {
            return Err(RespError::EmptyInput);
        };

        match prefix {
            b'+' => {
                let (line, consumed) = read_line(input)?;
                Ok((RespValue::SimpleString(to_text(line)?), consumed))
            }
            b'-' => {
                let (line, consumed) = read_line(input)?;
                Ok((RespValue::Error(to_text(line)?), consumed))
            }
            b':' => {
                let (line, consumed) = read_line(input)?;
                Ok((RespValue::Integer(parse_integer(line)?), consumed))
            }
            b'$' => parse_bulk_string(input),
            b'*' => parse_array(input),
            other => Err(RespError::UnknownRespType(other as char)),
        }
    }

    /// Parses an RDB snapshot payload sent after `FULLRESYNC`.
    pub fn parse_rdb(input: &[u8]) -> Result<(RespValue, usize), RespError> {
        match input.first() {
            None => return Err(RespError::EmptyInput),
            Some(b'$') => (),
            Some(_) => return Err(RespError::InvalidRdbPayload),
        }

        let (header, header_len) = read_line(input)?;
        let length = parse_integer(header).map_err(|_| RespError::InvalidRdbPayload)?;
        let length = usize::try_from(length).map_err(|_| RespError::InvalidRdbPayload)?;
        let end = header_len
            .checked_add(length)
            .ok_or(RespError::InvalidRdbPayload)?;

        if input.len() < end {
            return Err(RespError::Incomplete);
        }

        Ok((RespValue::Rdb(input[header_len..end].to_vec()), end))
    }

    pub fn encode(&self) -> Bytes {
        let mut buffer = BytesMut::new();
        self.encode_into(&mut buffer);
        buffer.freeze()
    }

    fn encode_into(&self, buffer: &mut BytesMut) {
        match self {
            RespValue::SimpleString(s) => {
                buffer.put_u8(b'+');
                buffer.put_slice(s.as_bytes());
                buffer.put_slice(CRLF);
            }
            RespValue::Error(s) => {
                buffer.put_u8(b'-');
                buffer.put_slice(s.as_bytes());
                buffer.put_slice(CRLF);
            }
            RespValue::Integer(i) => {
                buffer.put_slice(format!(":{}\r\n", i).as_bytes());
            }
            RespValue::BulkString(s) => {
                buffer.put_slice(format!("${}\r\n", s.len()).as_bytes());
                buffer.put_slice(s.as_bytes());
                buffer.put_slice(CRLF);
            }
            RespValue::NullBulkString => buffer.put_slice(b"$-1\r\n"),
            RespValue::Array(elements) => {
                buffer.put_slice(format!("*{}\r\n", elements.len()).as_bytes());

                for element in elements {
                    element.encode_into(buffer);
                }
            }
            RespValue::Rdb(payload) => {
                buffer.put_slice(format!("${}\r\n", payload.len()).as_bytes());
                buffer.put_slice(payload);
            }
        }
    }
}

/// Returns the bytes between the type prefix and the first CRLF, and the
/// number of bytes up to and including that CRLF.
fn read_line(input: &[u8]) -> Result<(&[u8], usize), RespError> {
    let end = input
        .windows(2)
        .position(|window| window == CRLF)
        .ok_or(RespError::Incomplete)?;

    Ok((&input[1..end], end + CRLF.len()))
}

fn to_text(bytes: &[u8]) -> Result<String, RespError> {
    std::str::from_utf8(bytes)
        .map(str::to_string)
        .map_err(|_| RespError::InvalidUtf8)
}

fn parse_integer(bytes: &[u8]) -> Result<i64, RespError> {
    std::str::from_utf8(bytes)
        .map_err(|_| RespError::InvalidUtf8)?
        .parse::<i64>()
        .map_err(|_| RespError::FailedToParseInteger)
}

fn parse_bulk_string(input: &[u8]) -> Result<(RespValue, usize), RespError> {
    let (header, header_len) = read_line(input)?;
    let length = parse_integer(header).map_err(|_| RespError::InvalidBulkStringLength)?;

    if length == -1 {
        return Ok((RespValue::NullBulkString, header_len));
    }

    let length = usize::try_from(length).map_err(|_| RespError::InvalidBulkStringLength)?;
    let end = header_len
        .checked_add(length)
        .ok_or(RespError::InvalidBulkStringLength)?;

    if input.len() < end + CRLF.len() {
        return Err(RespError::Incomplete);
    }

    if &input[end..end + CRLF.len()] != CRLF {
        return Err(RespError::UnterminatedBulkString);
    }

    let content = to_text(&input[header_len..end])?;

    Ok((RespValue::BulkString(content), end + CRLF.len()))
}

fn parse_array(input: &[u8]) -> Result<(RespValue, usize), RespError> {
    let (header, mut consumed) = read_line(input)?;
    let count = parse_integer(header).map_err(|_| RespError::InvalidArrayLength)?;
    let count = usize::try_from(count).map_err(|_| RespError::InvalidArrayLength)?;

    // The declared count is untrusted, cap the preallocation.
    let mut elements = Vec::with_capacity(count.min(64));

    while elements.len() < count {
        if consumed >= input.len() {
            return Err(RespError::Incomplete);
        }

        let (element, element_len) = RespValue::parse(&input[consumed..])?;
        elements.push(element);
        consumed += element_len;
    }

    Ok((RespValue::Array(elements), consumed))
}
