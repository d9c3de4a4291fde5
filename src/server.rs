use std::sync::Arc;

use bytes::BytesMut;
use clap::{error::ErrorKind, Parser};
use rand::{distributions::Alphanumeric, Rng};
use thiserror::Error;
use tokio::{
    net::{TcpListener, TcpStream},
    sync::{Mutex, RwLock},
};
use tracing::{debug, error, info};

use crate::{
    connection::{handle_client_connection, handle_master_connection},
    input::{handshake, CommandReadError},
    key_value_store::KeyValueStore,
    replication::ReplicaRegistry,
    resp::RespValue,
};

pub const REPLICATION_ID_LENGTH: usize = 40;

#[derive(Error, Debug, PartialEq)]
pub enum CliError {
    #[error("Invalid command line flag")]
    InvalidCommandLineFlag,
    #[error("Invalid command line flag value")]
    InvalidCommandLineFlagValue,
    #[error("{0}")]
    Usage(String),
}

#[derive(Error, Debug)]
pub enum ServerError {
    #[error("failed to bind {address}: {source}")]
    Bind {
        address: String,
        source: std::io::Error,
    },
    #[error("failed to connect to master {address}: {source}")]
    MasterUnreachable {
        address: String,
        source: std::io::Error,
    },
    #[error("replication handshake failed: {0}")]
    Handshake(#[from] CommandReadError),
}

#[derive(Parser, Debug)]
#[command(name = "redis-lite", about = "A small Redis-compatible server with replication")]
struct Cli {
    /// Port to listen on
    #[arg(long, default_value_t = 6379, value_parser = clap::value_parser!(u16).range(1..))]
    port: u16,

    /// Run as a replica of the given master, written as "<host> <port>"
    #[arg(long, value_name = "HOST PORT")]
    replicaof: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum RedisRole {
    Master,
    Replica { host: String, port: u16 },
}

impl RedisRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            RedisRole::Master => "master",
            RedisRole::Replica { .. } => "slave",
        }
    }

    fn from_replicaof(value: &str) -> Result<Self, CliError> {
        let parts: Vec<&str> = value.split_whitespace().collect();

        let [host, port] = parts.as_slice() else {
            return Err(CliError::InvalidCommandLineFlagValue);
        };

        let port = port
            .parse::<u16>()
            .map_err(|_| CliError::InvalidCommandLineFlagValue)?;

        Ok(RedisRole::Replica {
            host: host.to_string(),
            port,
        })
    }
}

/// Process-wide server state, shared behind `Arc<RwLock<_>>`.
#[derive(Debug)]
pub struct RedisServer {
    pub port: u16,
    pub role: RedisRole,
    pub repl_id: String,
    pub repl_offset: u64,
    pub replicas: ReplicaRegistry,
}

impl RedisServer {
    pub fn new<I: IntoIterator<Item = String>>(command_line_args: I) -> Result<Self, CliError> {
        let cli = Cli::try_parse_from(command_line_args).map_err(|e| match e.kind() {
            ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => CliError::Usage(e.to_string()),
            ErrorKind::UnknownArgument => CliError::InvalidCommandLineFlag,
            _ => CliError::InvalidCommandLineFlagValue,
        })?;

        let role = match cli.replicaof {
            Some(ref value) => RedisRole::from_replicaof(value)?,
            None => RedisRole::Master,
        };

        Ok(RedisServer::with_role(cli.port, role))
    }

    pub fn with_role(port: u16, role: RedisRole) -> Self {
        RedisServer {
            port,
            role,
            repl_id: generate_replication_id(),
            repl_offset: 0,
            replicas: ReplicaRegistry::new(),
        }
    }

    pub fn is_master(&self) -> bool {
        self.role == RedisRole::Master
    }

    /// Sends a write command to every attached replica and advances the
    /// replication offset by its encoded length.
    pub fn propagate_write_command(&mut self, command: &RespValue) -> usize {
        let payload = command.encode();
        self.repl_offset += payload.len() as u64;

        self.replicas.propagate(&payload)
    }

    /// Binds the listener, runs the replica handshake when configured as a
    /// replica, then accepts clients until the process exits.
    pub async fn run(self) -> Result<(), ServerError> {
        let address = format!("127.0.0.1:{}", self.port);
        let listener = TcpListener::bind(&address)
            .await
            .map_err(|source| ServerError::Bind {
                address: address.clone(),
                source,
            })?;

        info!(%address, role = self.role.as_str(), "server listening");

        let role = self.role.clone();
        let port = self.port;
        let context = ServerContext::new(self);

        if let RedisRole::Replica {
            host,
            port: master_port,
        } = role
        {
            start_replication(&context, &host, master_port, port).await?;
        }

        loop {
            match listener.accept().await {
                Ok((stream, client_address)) => {
                    debug!(client = %client_address, "accepted connection");
                    let context = context.clone();

                    tokio::spawn(async move {
                        let client_address = client_address.to_string();
                        handle_client_connection(stream, client_address, context).await;
                    });
                }
                Err(e) => {
                    error!(error = %e, "failed to accept connection");
                }
            }
        }
    }
}

/// Handles shared by every connection task.
#[derive(Debug, Clone)]
pub struct ServerContext {
    pub server: Arc<RwLock<RedisServer>>,
    pub store: Arc<Mutex<KeyValueStore>>,
}

impl ServerContext {
    pub fn new(server: RedisServer) -> Self {
        ServerContext {
            server: Arc::new(RwLock::new(server)),
            store: Arc::new(Mutex::new(KeyValueStore::new())),
        }
    }
}

async fn start_replication(
    context: &ServerContext,
    host: &str,
    master_port: u16,
    listening_port: u16,
) -> Result<(), ServerError> {
    let master_address = format!("{}:{}", host, master_port);
    let mut stream = TcpStream::connect(&master_address)
        .await
        .map_err(|source| ServerError::MasterUnreachable {
            address: master_address.clone(),
            source,
        })?;

    let mut buffer = BytesMut::with_capacity(4096);
    let resync = handshake(&mut stream, &mut buffer, listening_port).await?;

    info!(
        master = %master_address,
        repl_id = %resync.replication_id,
        offset = resync.offset,
        snapshot_bytes = resync.snapshot.len(),
        "replication handshake completed"
    );

    {
        let mut server_guard = context.server.write().await;
        server_guard.repl_id = resync.replication_id;
        server_guard.repl_offset = resync.offset;
    }

    let context = context.clone();
    tokio::spawn(async move {
        handle_master_connection(stream, buffer, master_address, context).await;
    });

    Ok(())
}

pub fn generate_replication_id() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(REPLICATION_ID_LENGTH)
        .map(char::from)
        .collect()
}
