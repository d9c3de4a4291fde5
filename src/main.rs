use anyhow::Context;
use tracing_subscriber::EnvFilter;

use redis_lite::server::{CliError, RedisServer};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let server = match RedisServer::new(std::env::args()) {
        Ok(server) => server,
        Err(CliError::Usage(usage)) => {
            println!("{}", usage);
            return Ok(());
        }
        Err(e) => return Err(e).context("invalid command line arguments"),
    };

    server.run().await.context("server stopped")?;

    Ok(())
}
