//! REPLCONF command implementation for Redis replication configuration.
//!
//! The REPLCONF command is used during the replication handshake to tell the
//! master about the replica: which port it listens on and which protocol
//! capabilities it understands.

use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    resp::RespValue,
    server::RedisServer,
};

#[derive(Debug, Clone, PartialEq)]
enum ReplconfOption {
    ListeningPort(u16),
    Other { name: String, value: String },
}

/// Represents the parsed arguments for the REPLCONF command.
#[derive(Debug, Clone, PartialEq)]
pub struct ReplconfArguments {
    options: Vec<ReplconfOption>,
}

impl ReplconfArguments {
    /// Parses `option value [option value ...]`.
    ///
    /// # Returns
    ///
    /// * `Err(CommandError::InvalidReplconfCommand)` - If no pair is given, a value is
    ///   missing, or `listening-port` is not a valid port
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.is_empty() || arguments.len() % 2 != 0 {
            return Err(CommandError::InvalidReplconfCommand);
        }

        let options = arguments
            .chunks(2)
            .map(|pair| match pair[0].to_lowercase().as_str() {
                "listening-port" => pair[1]
                    .parse::<u16>()
                    .ok()
                    .filter(|port| *port != 0)
                    .map(ReplconfOption::ListeningPort)
                    .ok_or(CommandError::InvalidReplconfCommand),
                name => Ok(ReplconfOption::Other {
                    name: name.to_string(),
                    value: pair[1].clone(),
                }),
            })
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Self { options })
    }
}

/// Handles the Redis REPLCONF command.
///
/// On a master, `listening-port` registers the calling connection as a pending
/// replica. Every other option is acknowledged and ignored.
///
/// # Returns
///
/// * `Ok(CommandResult::Response(+OK))` - Always, once the arguments parsed
pub async fn replconf(
    server: &Arc<RwLock<RedisServer>>,
    client_address: &str,
    arguments: &ReplconfArguments,
) -> Result<CommandResult, CommandError> {
    for option in &arguments.options {
        match option {
            ReplconfOption::ListeningPort(port) => {
                let mut server_guard = server.write().await;

                if server_guard.is_master() {
                    server_guard.replicas.register(client_address, *port);
                    info!(replica = %client_address, listening_port = port, "registered replica");
                }
            }
            ReplconfOption::Other { name, value } => {
                debug!(
                    replica = %client_address,
                    option = %name,
                    %value,
                    "ignoring REPLCONF option"
                );
            }
        }
    }

    Ok(CommandResult::Response(RespValue::SimpleString(
        "OK".to_string(),
    )))
}
