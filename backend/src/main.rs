//! Backend entry point: configuration, tracing, and server startup.

use clap::Parser;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

use backend::server::{ServerConfig, ServerOptions, run};

#[actix_web::main]
async fn main() -> std::io::Result<()> {
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let options = ServerOptions::parse();
    let config = ServerConfig::from_options(options)?;
    run(config).await
}
