use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    resp::RespValue,
};

#[derive(Debug, Clone, PartialEq)]
pub struct PingArguments {
    message: Option<String>,
}

impl PingArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() > 1 {
            return Err(CommandError::InvalidPingCommand);
        }

        Ok(Self {
            message: arguments.into_iter().next(),
        })
    }
}

/// `PING` answers `+PONG`, `PING <message>` echoes the message as a bulk
/// string.
pub fn ping(arguments: &PingArguments) -> Result<CommandResult, CommandError> {
    let response = match &arguments.message {
        Some(message) => RespValue::BulkString(message.clone()),
        None => RespValue::SimpleString("PONG".to_string()),
    };

    Ok(CommandResult::Response(response))
}
