use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    resp::RespValue,
};

#[derive(Debug, Clone, PartialEq)]
pub struct EchoArguments {
    message: String,
}

impl EchoArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        let [message] = <[String; 1]>::try_from(arguments)
            .map_err(|_| CommandError::InvalidEchoCommand)?;

        Ok(Self { message })
    }
}

/// Handles the Redis ECHO command.
///
/// The ECHO command returns the exact string provided as an argument.
///
/// # Examples
///
/// ```ignore
/// // ECHO "hello world"
/// // Returns: "$11\r\nhello world\r\n"
/// ```
pub fn echo(arguments: &EchoArguments) -> Result<CommandResult, CommandError> {
    Ok(CommandResult::Response(RespValue::BulkString(
        arguments.message.clone(),
    )))
}
