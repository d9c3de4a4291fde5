//! Master-side registry of replicas.
//!
//! A connection shows up here twice during the handshake: `REPLCONF
//! listening-port` registers it as pending, and `PSYNC` attaches its write
//! half. Every attached replica gets an unbounded channel drained by a
//! dedicated writer task, so propagating a write never waits on replica IO.

use std::collections::HashMap;

use bytes::Bytes;
use tokio::{
    io::{AsyncWrite, AsyncWriteExt},
    sync::mpsc,
};
use tracing::{debug, warn};

#[derive(Debug)]
pub struct Replica {
    pub listening_port: Option<u16>,
    sender: Option<mpsc::UnboundedSender<Bytes>>,
}

impl Replica {
    fn pending(listening_port: Option<u16>) -> Self {
        Replica {
            listening_port,
            sender: None,
        }
    }

    /// True once the replica completed PSYNC and receives propagated writes.
    pub fn is_attached(&self) -> bool {
        self.sender.is_some()
    }
}

#[derive(Debug, Default)]
pub struct ReplicaRegistry {
    replicas: HashMap<String, Replica>,
}

impl ReplicaRegistry {
    pub fn new() -> Self {
        ReplicaRegistry {
            replicas: HashMap::new(),
        }
    }

    pub fn register(&mut self, client_address: &str, listening_port: u16) {
        self.replicas
            .entry(client_address.to_string())
            .and_modify(|replica| replica.listening_port = Some(listening_port))
            .or_insert_with(|| Replica::pending(Some(listening_port)));
    }

    /// Hands `writer` to a new writer task and starts streaming to it.
    ///
    /// Must be called from within a tokio runtime.
    pub fn attach<W>(&mut self, client_address: &str, writer: W)
    where
        W: AsyncWrite + Unpin + Send + 'static,
    {
        let (sender, receiver) = mpsc::unbounded_channel();
        tokio::spawn(replica_writer(client_address.to_string(), writer, receiver));

        self.replicas
            .entry(client_address.to_string())
            .or_insert_with(|| Replica::pending(None))
            .sender = Some(sender);
    }

    /// Drops the replica. Its writer task ends once the queue is drained.
    pub fn remove(&mut self, client_address: &str) -> bool {
        self.replicas.remove(client_address).is_some()
    }

    pub fn get(&self, client_address: &str) -> Option<&Replica> {
        self.replicas.get(client_address)
    }

    pub fn connected_replicas(&self) -> usize {
        self.replicas
            .values()
            .filter(|replica| replica.is_attached())
            .count()
    }

    /// Queues `payload` for every attached replica and returns how many
    /// queues accepted it.
    pub fn propagate(&self, payload: &Bytes) -> usize {
        let mut queued = 0;

        for (address, replica) in &self.replicas {
            let Some(sender) = &replica.sender else {
                continue;
            };

            match sender.send(payload.clone()) {
                Ok(()) => queued += 1,
                Err(_) => warn!(replica = %address, "replica writer is gone, dropping command"),
            }
        }

        queued
    }
}

async fn replica_writer<W>(
    address: String,
    mut writer: W,
    mut receiver: mpsc::UnboundedReceiver<Bytes>,
) where
    W: AsyncWrite + Unpin,
{
    while let Some(payload) = receiver.recv().await {
        if let Err(e) = write_payload(&mut writer, &payload).await {
            // The replica stays registered, this command is lost for it.
            warn!(replica = %address, error = %e, "failed to propagate command to replica");
        }
    }

    debug!(replica = %address, "replica writer stopped");
}

async fn write_payload<W>(writer: &mut W, payload: &[u8]) -> tokio::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(payload).await?;
    writer.flush().await?;

    Ok(())
}
