use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    key_value_store::KeyValueStore,
    resp::RespValue,
};

/// Represents the parsed arguments for the SET command
#[derive(Debug, Clone, PartialEq)]
pub struct SetArguments {
    /// The key name to store the value under
    key: String,
    /// The value to be stored under the given key
    value: String,
    /// Time to live in milliseconds, from the `PX` option
    expiration_ms: Option<u64>,
}

impl SetArguments {
    /// Parses `key value [PX milliseconds]`.
    ///
    /// # Returns
    ///
    /// * `Err(CommandError::InvalidSetCommand)` - If fewer than 2 arguments are given
    /// * `Err(CommandError::InvalidSetCommandArgument)` - On an unknown or repeated option,
    ///   or `PX` without a value
    /// * `Err(CommandError::InvalidSetCommandExpiration)` - If the `PX` value is not a
    ///   positive 64-bit integer
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() < 2 {
            return Err(CommandError::InvalidSetCommand);
        }

        let mut iter = arguments.into_iter();
        let (Some(key), Some(value)) = (iter.next(), iter.next()) else {
            return Err(CommandError::InvalidSetCommand);
        };

        let mut expiration_ms = None;

        while let Some(option) = iter.next() {
            if !option.eq_ignore_ascii_case("px") || expiration_ms.is_some() {
                return Err(CommandError::InvalidSetCommandArgument);
            }

            let Some(milliseconds) = iter.next() else {
                return Err(CommandError::InvalidSetCommandArgument);
            };

            let milliseconds = milliseconds
                .parse::<i64>()
                .map_err(|_| CommandError::InvalidSetCommandExpiration)?;

            if milliseconds <= 0 {
                return Err(CommandError::InvalidSetCommandExpiration);
            }

            expiration_ms = Some(milliseconds as u64);
        }

        Ok(Self {
            key,
            value,
            expiration_ms,
        })
    }
}

/// Handles the Redis SET command.
///
/// Stores the pair, with an expiry when `PX` was given, and answers `+OK`.
/// Propagation to replicas is done by the caller once this succeeds.
pub async fn set(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: &SetArguments,
) -> Result<CommandResult, CommandError> {
    let mut store_guard = store.lock().await;

    match arguments.expiration_ms {
        Some(ttl) => store_guard.set_px(arguments.key.clone(), arguments.value.clone(), ttl),
        None => store_guard.set(arguments.key.clone(), arguments.value.clone()),
    }

    Ok(CommandResult::Response(RespValue::SimpleString(
        "OK".to_string(),
    )))
}
