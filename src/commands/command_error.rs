use thiserror::Error;

use crate::resp::RespValue;

#[derive(Error, Debug, PartialEq)]
pub enum CommandError {
    #[error("invalid command")]
    InvalidCommand,
    #[error("invalid command argument")]
    InvalidCommandArgument,
    #[error("unknown command '{0}'")]
    UnknownCommand(String),
    #[error("invalid PING command")]
    InvalidPingCommand,
    #[error("invalid ECHO command")]
    InvalidEchoCommand,
    #[error("invalid GET command")]
    InvalidGetCommand,
    #[error("invalid SET command")]
    InvalidSetCommand,
    #[error("invalid SET command argument")]
    InvalidSetCommandArgument,
    #[error("invalid SET command expiration")]
    InvalidSetCommandExpiration,
    #[error("invalid INFO command")]
    InvalidInfoCommand,
    #[error("invalid INFO section")]
    InvalidInfoSection,
    #[error("invalid REPLCONF command")]
    InvalidReplconfCommand,
    #[error("invalid PSYNC command")]
    InvalidPsyncCommand,
    #[error("invalid PSYNC offset")]
    InvalidPsyncOffset,
    #[error("PSYNC is only served by a master")]
    PsyncOnReplica,
    #[error("snapshot unavailable")]
    SnapshotUnavailable,
    #[error("replica can only process read commands from clients")]
    ReplicaReadOnlyCommands,
}

impl CommandError {
    pub fn as_resp(&self) -> RespValue {
        match self {
            CommandError::InvalidCommand => RespValue::Error(
                "ERR wrong command, expected an array of bulk strings".to_string(),
            ),
            CommandError::InvalidCommandArgument => {
                RespValue::Error("ERR command arguments must be bulk strings".to_string())
            }
            CommandError::UnknownCommand(name) => {
                RespValue::Error(format!("ERR unknown command '{}'", name))
            }
            CommandError::InvalidPingCommand => wrong_number_of_arguments("ping"),
            CommandError::InvalidEchoCommand => wrong_number_of_arguments("echo"),
            CommandError::InvalidGetCommand => wrong_number_of_arguments("get"),
            CommandError::InvalidSetCommand => wrong_number_of_arguments("set"),
            CommandError::InvalidSetCommandArgument => {
                RespValue::Error("ERR syntax error".to_string())
            }
            CommandError::InvalidSetCommandExpiration => {
                RespValue::Error("ERR invalid expire time in 'set' command".to_string())
            }
            CommandError::InvalidInfoCommand => wrong_number_of_arguments("info"),
            CommandError::InvalidInfoSection => {
                RespValue::Error("ERR Invalid INFO section".to_string())
            }
            CommandError::InvalidReplconfCommand => {
                RespValue::Error("ERR Invalid REPLCONF command".to_string())
            }
            CommandError::InvalidPsyncCommand => wrong_number_of_arguments("psync"),
            CommandError::InvalidPsyncOffset => {
                RespValue::Error("ERR Invalid PSYNC offset".to_string())
            }
            CommandError::PsyncOnReplica => RespValue::Error(
                "ERR PSYNC command should not be handled by replica server".to_string(),
            ),
            CommandError::SnapshotUnavailable => {
                RespValue::Error("ERR snapshot unavailable".to_string())
            }
            CommandError::ReplicaReadOnlyCommands => RespValue::Error(
                "READONLY You can't write against a read only replica.".to_string(),
            ),
        }
    }
}

fn wrong_number_of_arguments(command: &str) -> RespValue {
    RespValue::Error(format!(
        "ERR wrong number of arguments for '{}' command",
        command
    ))
}
