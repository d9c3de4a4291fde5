//! PSYNC command implementation for Redis replication synchronization.
//!
//! Only full resynchronization is served: whatever id and offset the replica
//! asks for, it receives `FULLRESYNC` and a snapshot of an empty dataset.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{info, warn};

use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    rdb::empty_rdb,
    resp::RespValue,
    server::RedisServer,
};

/// Represents the parsed arguments for the PSYNC command.
#[derive(Debug, Clone, PartialEq)]
pub struct PsyncArguments {
    /// The replication ID the replica last followed, or "?" on first sync
    replication_id: String,
    /// The replica's offset, or -1 on first sync
    offset: i64,
}

impl PsyncArguments {
    /// Parses `replication_id offset`.
    ///
    /// # Returns
    ///
    /// * `Err(CommandError::InvalidPsyncCommand)` - If not exactly 2 arguments
    /// * `Err(CommandError::InvalidPsyncOffset)` - If offset is not a valid integer
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [replication_id, offset] =
            <[String; 2]>::try_from(arguments).map_err(|_| CommandError::InvalidPsyncCommand)?;

        let offset = offset
            .parse::<i64>()
            .map_err(|_| CommandError::InvalidPsyncOffset)?;

        Ok(Self {
            replication_id,
            offset,
        })
    }
}

/// Handles the Redis PSYNC command.
///
/// # Returns
///
/// * `Ok(CommandResult::Sync(..))` - `+FULLRESYNC <repl_id> <offset>` followed by the
///   RDB payload. The connection layer writes both and then promotes the
///   connection into a replica stream.
/// * `Err(CommandError::PsyncOnReplica)` - If this node is itself a replica
/// * `Err(CommandError::SnapshotUnavailable)` - If the snapshot could not be built
pub async fn psync(
    server: &Arc<RwLock<RedisServer>>,
    client_address: &str,
    arguments: &PsyncArguments,
) -> Result<CommandResult, CommandError> {
    let server_guard = server.read().await;

    if !server_guard.is_master() {
        return Err(CommandError::PsyncOnReplica);
    }

    let snapshot = empty_rdb().map_err(|e| {
        warn!(error = %e, "failed to decode empty snapshot");
        CommandError::SnapshotUnavailable
    })?;

    info!(
        replica = %client_address,
        requested_id = %arguments.replication_id,
        requested_offset = arguments.offset,
        "starting full resynchronization"
    );

    Ok(CommandResult::Sync(vec![
        RespValue::SimpleString(format!(
            "FULLRESYNC {} {}",
            server_guard.repl_id, server_guard.repl_offset
        )),
        RespValue::Rdb(snapshot),
    ]))
}
