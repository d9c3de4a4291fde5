use std::sync::Arc;

use tokio::sync::Mutex;

use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    key_value_store::KeyValueStore,
    resp::RespValue,
};

#[derive(Debug, Clone, PartialEq)]
pub struct GetArguments {
    key: String,
}

impl GetArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [key] =
            <[String; 1]>::try_from(arguments).map_err(|_| CommandError::InvalidGetCommand)?;

        Ok(Self { key })
    }
}

/// Handles the Redis GET command.
///
/// Expired keys are removed by the store on access and reported as missing.
///
/// # Returns
///
/// * Bulk string with the value when the key exists
/// * Null bulk string (`$-1\r\n`) when it does not, never an error
pub async fn get(
    store: &Arc<Mutex<KeyValueStore>>,
    arguments: &GetArguments,
) -> Result<CommandResult, CommandError> {
    let mut store_guard = store.lock().await;

    let response = match store_guard.get(&arguments.key) {
        Some(value) => RespValue::BulkString(value),
        None => RespValue::NullBulkString,
    };

    Ok(CommandResult::Response(response))
}
