//! simplog server binary.

use clap::Parser;
use simplog_server::{LogServer, ServerConfig, DEFAULT_MAX_BODY_BYTES};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

/// Log ingestion and query server.
#[derive(Parser)]
#[command(name = "simplog")]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Address to listen on
    #[arg(short, long, default_value = "127.0.0.1:8080")]
    bind: SocketAddr,

    /// Override the port of the bind address
    #[arg(short, long)]
    port: Option<u16>,

    /// Persist groups under this directory (in-memory when omitted)
    #[arg(short, long)]
    data_dir: Option<PathBuf>,

    /// Upper bound on a single store call, in seconds
    #[arg(long, default_value = "30")]
    store_timeout_secs: u64,

    /// Maximum accepted request body size, in bytes
    #[arg(long, default_value_t = DEFAULT_MAX_BODY_BYTES)]
    max_body_bytes: usize,

    /// Answer malformed POST bodies with 400 instead of 200
    #[arg(long)]
    strict_body_errors: bool,

    /// Enable verbose output
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> ServerConfig {
        let mut bind = self.bind;
        if let Some(port) = self.port {
            bind.set_port(port);
        }

        let mut config = ServerConfig::new(bind)
            .with_store_timeout(Duration::from_secs(self.store_timeout_secs))
            .with_max_body_bytes(self.max_body_bytes)
            .with_strict_body_errors(self.strict_body_errors);
        if let Some(dir) = &self.data_dir {
            config = config.with_data_dir(dir);
        }
        config
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // RUST_LOG wins over --verbose
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        if cli.verbose {
            EnvFilter::new("debug")
        } else {
            EnvFilter::new("info")
        }
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();

    let config = cli.config();
    tracing::debug!(?config, "starting");
    LogServer::open(config)?.run().await?;
    Ok(())
}
