use tracing::debug;

use crate::{
    commands::{
        command_error::CommandError,
        echo::{echo, EchoArguments},
        get::{get, GetArguments},
        info::{info, InfoArguments},
        ping::{ping, PingArguments},
        replication::{psync, replconf, PsyncArguments, ReplconfArguments},
        set::{set, SetArguments},
    },
    resp::RespValue,
    server::ServerContext,
};

#[derive(Debug, PartialEq)]
pub enum CommandResult {
    /// Nothing is written back, used for commands applied from the master.
    NoResponse,
    Response(RespValue),
    /// Values written in order before the connection becomes a replica stream.
    Sync(Vec<RespValue>),
}

/// Who sent the command. Commands read from the master's replication stream
/// are applied silently and are never propagated further.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ConnectionKind {
    Client,
    Master,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    Ping(PingArguments),
    Echo(EchoArguments),
    Get(GetArguments),
    Set(SetArguments),
    Info(InfoArguments),
    Replconf(ReplconfArguments),
    Psync(PsyncArguments),
}

impl Command {
    /// Looks up `name` case-insensitively and validates its arguments.
    pub fn parse(name: &str, arguments: Vec<String>) -> Result<Self, CommandError> {
        let command = match name.to_uppercase().as_str() {
            "PING" => Command::Ping(PingArguments::parse(arguments)?),
            "ECHO" => Command::Echo(EchoArguments::parse(arguments)?),
            "GET" => Command::Get(GetArguments::parse(arguments)?),
            "SET" => Command::Set(SetArguments::parse(arguments)?),
            "INFO" => Command::Info(InfoArguments::parse(arguments)?),
            "REPLCONF" => Command::Replconf(ReplconfArguments::parse(arguments)?),
            "PSYNC" => Command::Psync(PsyncArguments::parse(arguments)?),
            _ => return Err(CommandError::UnknownCommand(name.to_string())),
        };

        Ok(command)
    }
}

#[derive(Debug, PartialEq, Clone)]
pub struct CommandHandler {
    pub name: String,
    pub command: Command,
    pub input: RespValue,
}

impl CommandHandler {
    pub fn new(input: RespValue) -> Result<Self, CommandError> {
        let RespValue::Array(elements) = &input else {
            return Err(CommandError::InvalidCommand);
        };

        let name = match elements.first() {
            Some(RespValue::BulkString(s)) => s.clone(),
            _ => return Err(CommandError::InvalidCommand),
        };

        let mut arguments: Vec<String> = Vec::with_capacity(elements.len() - 1);

        for element in &elements[1..] {
            let arg = match element {
                RespValue::BulkString(s) => Ok(s.clone()),
                _ => Err(CommandError::InvalidCommandArgument),
            }?;

            arguments.push(arg);
        }

        let command = Command::parse(&name, arguments)?;

        Ok(Self {
            name: name.to_uppercase(),
            command,
            input,
        })
    }

    pub async fn handle_command(
        &self,
        context: &ServerContext,
        client_address: &str,
        kind: ConnectionKind,
    ) -> Result<CommandResult, CommandError> {
        match &self.command {
            Command::Ping(arguments) => ping(arguments),
            Command::Echo(arguments) => echo(arguments),
            Command::Get(arguments) => get(&context.store, arguments).await,
            Command::Set(arguments) => match kind {
                ConnectionKind::Client => self.set_and_propagate(context, arguments).await,
                ConnectionKind::Master => set(&context.store, arguments).await,
            },
            Command::Info(arguments) => info(&context.server, arguments).await,
            Command::Replconf(arguments) => {
                replconf(&context.server, client_address, arguments).await
            }
            Command::Psync(arguments) => psync(&context.server, client_address, arguments).await,
        }
    }

    /// Applies a client write and queues it for the replicas.
    ///
    /// The server lock is held from before the store write until the command
    /// is queued, so replicas receive writes in the order the store applied
    /// them.
    async fn set_and_propagate(
        &self,
        context: &ServerContext,
        arguments: &SetArguments,
    ) -> Result<CommandResult, CommandError> {
        let mut server_guard = context.server.write().await;

        if !server_guard.is_master() {
            return Err(CommandError::ReplicaReadOnlyCommands);
        }

        let result = set(&context.store, arguments).await?;

        let replicas = server_guard.propagate_write_command(&self.input);
        debug!(command = %self.name, replicas, "propagated write command");

        Ok(result)
    }

    /// Parses and runs one request. Failures become RESP error replies.
    pub async fn execute(
        input: RespValue,
        context: &ServerContext,
        client_address: &str,
        kind: ConnectionKind,
    ) -> CommandResult {
        let handler = match CommandHandler::new(input) {
            Ok(handler) => handler,
            Err(e) => return CommandResult::Response(e.as_resp()),
        };

        match handler.handle_command(context, client_address, kind).await {
            Ok(result) => result,
            Err(e) => {
                debug!(
                    client = %client_address,
                    command = %handler.name,
                    error = %e,
                    "command failed"
                );
                CommandResult::Response(e.as_resp())
            }
        }
    }
}
