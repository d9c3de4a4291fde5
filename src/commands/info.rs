use std::sync::Arc;

use tokio::sync::RwLock;

use crate::{
    commands::{command_error::CommandError, command_handler::CommandResult},
    resp::RespValue,
    server::{RedisRole, RedisServer},
};

#[derive(Debug, Clone, Copy, PartialEq)]
enum InfoSection {
    Default,
    Replication,
}

#[derive(Debug, Clone, PartialEq)]
pub struct InfoArguments {
    section: InfoSection,
}

impl InfoArguments {
    pub fn parse(arguments: Vec<String>) -> Result<Self, CommandError> {
        if arguments.len() > 1 {
            return Err(CommandError::InvalidInfoCommand);
        }

        let Some(section) = arguments.first() else {
            return Ok(InfoArguments {
                section: InfoSection::Default,
            });
        };

        let section = match section.to_lowercase().as_str() {
            "replication" => InfoSection::Replication,
            "default" | "all" | "everything" => InfoSection::Default,
            _ => return Err(CommandError::InvalidInfoSection),
        };

        Ok(InfoArguments { section })
    }
}

/// Handles the Redis INFO command.
///
/// Every line ends with CRLF. Without a section, or with `default`, `all` or
/// `everything`, a short `# Server` block precedes the replication block.
pub async fn info(
    server: &Arc<RwLock<RedisServer>>,
    arguments: &InfoArguments,
) -> Result<CommandResult, CommandError> {
    let server_guard = server.read().await;

    let mut report = String::new();

    if arguments.section == InfoSection::Default {
        report.push_str("# Server\r\n");
        report.push_str(&format!("redis_version:{}\r\n", env!("CARGO_PKG_VERSION")));
        report.push_str(&format!("tcp_port:{}\r\n", server_guard.port));
        report.push_str("\r\n");
    }

    report.push_str("# Replication\r\n");
    report.push_str(&format!("role:{}\r\n", server_guard.role.as_str()));

    match &server_guard.role {
        RedisRole::Master => {
            report.push_str(&format!(
                "connected_slaves:{}\r\n",
                server_guard.replicas.connected_replicas()
            ));
        }
        RedisRole::Replica { host, port } => {
            report.push_str(&format!("master_host:{}\r\n", host));
            report.push_str(&format!("master_port:{}\r\n", port));
        }
    }

    report.push_str(&format!("master_replid:{}\r\n", server_guard.repl_id));
    report.push_str(&format!(
        "master_repl_offset:{}\r\n",
        server_guard.repl_offset
    ));

    Ok(CommandResult::Response(RespValue::BulkString(report)))
}
