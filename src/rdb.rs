//! The snapshot shipped to replicas on a full resync.
//!
//! Persistence is not implemented, so every full resync transfers the same
//! pre-baked empty RDB file.

use base64::{engine::general_purpose::STANDARD, Engine as _};

const EMPTY_RDB_BASE64: &str = concat!(
    "UkVESVMwMDEx+glyZWRpcy12ZXIFNy4yLjD6CnJlZGlzLWJpdHPAQPoFY3RpbWXC",
    "bQi8ZfoIdXNlZC1tZW3CsMQQAPoIYW9mLWJhc2XAAP/wbjv+wP9aog==",
);

pub fn empty_rdb() -> Result<Vec<u8>, base64::DecodeError> {
    STANDARD.decode(EMPTY_RDB_BASE64)
}
