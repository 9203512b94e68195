//! The log server.

use crate::config::ServerConfig;
use crate::error::ServerResult;
use crate::handler::{handle_request, HandlerContext};
use axum::extract::DefaultBodyLimit;
use axum::Router;
use simplog_store::{DocumentStore, FileStore, InMemoryStore};
use std::sync::Arc;
use tokio::net::TcpListener;

/// The log server.
///
/// Accepts log records over HTTP and answers filtered queries against
/// them. Every request goes through a single fallback handler that
/// resolves the path itself, so unknown paths and methods are answered
/// with JSON errors like every other failure.
///
/// # Example
///
/// ```
/// use simplog_server::{LogServer, ServerConfig};
///
/// let server = LogServer::open(ServerConfig::default()).unwrap();
/// let app = server.router();
/// // Serve `app` with axum, or call `server.run().await`.
/// # drop(app);
/// ```
pub struct LogServer {
    context: Arc<HandlerContext>,
}

impl LogServer {
    /// Creates a server over an existing store.
    pub fn new(config: ServerConfig, store: Arc<dyn DocumentStore>) -> Self {
        Self {
            context: Arc::new(HandlerContext::new(config, store)),
        }
    }

    /// Creates a server with the store the configuration asks for:
    /// a [`FileStore`] when a data directory is set, otherwise an
    /// [`InMemoryStore`].
    ///
    /// # Errors
    ///
    /// Returns an error if the data directory cannot be opened.
    pub fn open(config: ServerConfig) -> ServerResult<Self> {
        let store: Arc<dyn DocumentStore> = match &config.data_dir {
            Some(dir) => Arc::new(FileStore::open(dir)?),
            None => {
                tracing::info!("using in-memory store");
                Arc::new(InMemoryStore::new())
            }
        };
        Ok(Self::new(config, store))
    }

    /// Returns the server configuration.
    pub fn config(&self) -> &ServerConfig {
        &self.context.config
    }

    /// Builds the axum router for this server.
    pub fn router(&self) -> Router {
        Router::new()
            .fallback(handle_request)
            .layer(DefaultBodyLimit::max(self.context.config.max_body_bytes))
            .with_state(Arc::clone(&self.context))
    }

    /// Binds the configured address and serves until SIGINT or SIGTERM.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound or serving fails.
    pub async fn run(self) -> ServerResult<()> {
        let addr = self.context.config.bind_addr;
        let listener = TcpListener::bind(addr).await?;
        tracing::info!(addr = %listener.local_addr()?, "simplog listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        tracing::info!("simplog stopped");
        Ok(())
    }
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{signal, SignalKind};
        match signal(SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
    tracing::info!("shutdown signal received");
}
