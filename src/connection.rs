use bytes::BytesMut;
use tokio::{
    io::{AsyncRead, AsyncWrite, AsyncWriteExt},
    net::TcpStream,
};
use tracing::{debug, info, warn};

use crate::{
    commands::{CommandHandler, CommandResult, ConnectionKind},
    input::{read_frames, CommandReadError},
    resp::RespValue,
    server::ServerContext,
};

/// Serves one client connection until it closes.
///
/// A connection that sends `PSYNC` is handed over to the replica registry and
/// receives propagated writes from then on.
pub async fn handle_client_connection(
    stream: TcpStream,
    client_address: String,
    context: ServerContext,
) {
    let (reader, writer) = stream.into_split();

    serve_client(reader, writer, &client_address, &context).await;

    let removed = context.server.write().await.replicas.remove(&client_address);

    if removed {
        info!(replica = %client_address, "replica disconnected");
    } else {
        debug!(client = %client_address, "client disconnected");
    }
}

/// Request loop over an already split connection. Replies go out in request
/// order, and the writer is given to the replica registry after a successful
/// `PSYNC`.
pub async fn serve_client<R, W>(
    mut reader: R,
    mut writer: W,
    client_address: &str,
    context: &ServerContext,
) where
    R: AsyncRead + Unpin,
    W: AsyncWrite + Unpin + Send + 'static,
{
    let mut buffer = BytesMut::with_capacity(4096);

    loop {
        let frames = match read_frames(&mut reader, &mut buffer).await {
            Ok(frames) => frames,
            Err(CommandReadError::ConnectionClosed) => return,
            Err(e @ CommandReadError::RespParseError(_)) => {
                warn!(client = %client_address, error = %e, "protocol error, closing connection");
                // The connection is closed either way.
                let _ = write_value(&mut writer, &e.as_resp()).await;
                return;
            }
            Err(e) => {
                warn!(client = %client_address, error = %e, "failed to read from client");
                return;
            }
        };

        for (input, _) in frames {
            let result =
                CommandHandler::execute(input, context, client_address, ConnectionKind::Client)
                    .await;

            match result {
                CommandResult::NoResponse => (),
                CommandResult::Response(response) => {
                    if let Err(e) = write_value(&mut writer, &response).await {
                        warn!(client = %client_address, error = %e, "failed to write response");
                        return;
                    }
                }
                CommandResult::Sync(values) => {
                    for value in &values {
                        if let Err(e) = write_value(&mut writer, value).await {
                            warn!(client = %client_address, error = %e, "failed to write resync");
                            return;
                        }
                    }

                    context
                        .server
                        .write()
                        .await
                        .replicas
                        .attach(client_address, writer);
                    info!(replica = %client_address, "replica attached");

                    drain_replica(&mut reader, &mut buffer, client_address).await;
                    return;
                }
            }
        }
    }
}

/// Reads from a promoted replica until it disconnects. Its write half now
/// belongs to the replica writer task, so nothing is answered.
async fn drain_replica<R>(reader: &mut R, buffer: &mut BytesMut, client_address: &str)
where
    R: AsyncRead + Unpin,
{
    loop {
        match read_frames(reader, buffer).await {
            Ok(frames) => {
                debug!(replica = %client_address, frames = frames.len(), "ignoring replica input");
            }
            Err(CommandReadError::ConnectionClosed) => return,
            Err(e) => {
                warn!(replica = %client_address, error = %e, "replica stream failed");
                return;
            }
        }
    }
}

/// Applies the command stream a replica receives from its master.
///
/// Nothing is written back. Every applied frame advances the replication
/// offset by its size on the wire. `buffer` may already hold commands that
/// arrived together with the snapshot.
pub async fn handle_master_connection<R>(
    mut stream: R,
    mut buffer: BytesMut,
    master_address: String,
    context: ServerContext,
) where
    R: AsyncRead + Unpin,
{
    loop {
        let frames = match read_frames(&mut stream, &mut buffer).await {
            Ok(frames) => frames,
            Err(CommandReadError::ConnectionClosed) => {
                warn!(master = %master_address, "master closed the replication stream");
                return;
            }
            Err(e) => {
                warn!(master = %master_address, error = %e, "replication stream failed");
                return;
            }
        };

        for (input, size) in frames {
            let result =
                CommandHandler::execute(input, &context, &master_address, ConnectionKind::Master)
                    .await;

            if let CommandResult::Response(RespValue::Error(message)) = &result {
                warn!(
                    master = %master_address,
                    error = %message,
                    "failed to apply replicated command"
                );
            }

            context.server.write().await.repl_offset += size as u64;
        }
    }
}

async fn write_value<W>(writer: &mut W, value: &RespValue) -> tokio::io::Result<()>
where
    W: AsyncWrite + Unpin,
{
    writer.write_all(&value.encode()).await?;
    writer.flush().await?;

    Ok(())
}
