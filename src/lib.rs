//! A small Redis-compatible server in Rust.
//!
//! The server speaks the Redis Serialization Protocol (RESP) and supports:
//!
//! - Server commands (PING, ECHO, INFO)
//! - Key-value operations with optional expiry (GET, SET ... PX)
//! - Master-replica replication through the REPLCONF / PSYNC handshake,
//!   with writes on the master propagated to every attached replica
//!
//! Connections are served concurrently on Tokio. Shared state lives in a
//! [`server::ServerContext`] cloned into every connection task.

pub mod commands;
pub mod connection;
pub mod input;
pub mod key_value_store;
pub mod rdb;
pub mod replication;
pub mod resp;
pub mod server;
