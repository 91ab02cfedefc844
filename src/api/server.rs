//! HTTP server setup and connection handling.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use hyper_util::server::graceful::GracefulShutdown;
use tokio::net::TcpListener;
use tokio::sync::Notify;

use crate::error::KvResult;

use super::router;
use super::state::AppState;

/// Configuration for the API server.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Host to bind to.
    pub host: String,
    /// Port to listen on.
    pub port: u16,
    /// How long to wait for in-flight requests to drain on shutdown before
    /// the listener is force-closed.
    pub shutdown_grace: Duration,
}

impl ServerConfig {
    /// Create a new server configuration.
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            host: host.into(),
            port,
            shutdown_grace: Duration::from_secs(5),
        }
    }

    /// Get the socket address.
    pub fn socket_addr(&self) -> SocketAddr {
        let host: std::net::IpAddr = self.host.parse().unwrap_or([0, 0, 0, 0].into());
        SocketAddr::new(host, self.port)
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self::new("0.0.0.0", 3000)
    }
}

/// Triggers a graceful shutdown of a running [`ApiServer`].
#[derive(Clone)]
pub struct ShutdownHandle(Arc<Notify>);

impl ShutdownHandle {
    /// Stop accepting connections and begin draining.
    pub fn shutdown(&self) {
        self.0.notify_one();
    }
}

/// HTTP API server for the store.
pub struct ApiServer {
    config: ServerConfig,
    state: Arc<AppState>,
    shutdown: Arc<Notify>,
}

impl ApiServer {
    /// Create a new API server.
    pub fn new(config: ServerConfig, state: Arc<AppState>) -> Self {
        Self {
            config,
            state,
            shutdown: Arc::new(Notify::new()),
        }
    }

    /// Get a reference to the application state.
    pub fn state(&self) -> Arc<AppState> {
        Arc::clone(&self.state)
    }

    /// Handle that can stop this server from another task.
    pub fn shutdown_handle(&self) -> ShutdownHandle {
        ShutdownHandle(Arc::clone(&self.shutdown))
    }

    /// Run the server until a shutdown is requested.
    ///
    /// On shutdown the listener stops accepting immediately, in-flight
    /// connections get the configured grace period to drain, and whatever
    /// is still open after that is force-closed. Collaborators (engine,
    /// storage) are only closed by the caller after this returns.
    pub async fn run(&self) -> KvResult<()> {
        let addr = self.config.socket_addr();
        let listener = TcpListener::bind(addr).await?;
        let graceful = GracefulShutdown::new();

        tracing::info!(
            host = %self.config.host,
            port = %self.config.port,
            "API server started"
        );

        loop {
            tokio::select! {
                result = listener.accept() => {
                    let (stream, remote_addr) = result?;

                    let io = TokioIo::new(stream);
                    let state = Arc::clone(&self.state);
                    let service = service_fn(move |req| {
                        let state = Arc::clone(&state);
                        async move { router::route(req, state).await }
                    });

                    let conn = http1::Builder::new().serve_connection(io, service);
                    let conn = graceful.watch(conn);

                    tokio::spawn(async move {
                        if let Err(e) = conn.await {
                            if !e.is_incomplete_message() {
                                tracing::warn!(
                                    remote = %remote_addr,
                                    error = %e,
                                    "HTTP connection error"
                                );
                            }
                        }
                    });
                }
                _ = self.shutdown.notified() => {
                    tracing::info!("API server shutting down");
                    break;
                }
            }
        }

        // Stop accepting before draining what is already in flight.
        drop(listener);

        tokio::select! {
            _ = graceful.shutdown() => {
                tracing::info!("in-flight requests drained");
            }
            _ = tokio::time::sleep(self.config.shutdown_grace) => {
                tracing::warn!(
                    grace_ms = self.config.shutdown_grace.as_millis() as u64,
                    "drain grace period elapsed, closing remaining connections"
                );
            }
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn server_config_default() {
        let config = ServerConfig::default();
        assert_eq!(config.host, "0.0.0.0");
        assert_eq!(config.port, 3000);
    }

    #[test]
    fn server_config_socket_addr() {
        let config = ServerConfig::new("127.0.0.1", 9000);
        let addr = config.socket_addr();

        assert_eq!(addr.port(), 9000);
        assert_eq!(addr.ip().to_string(), "127.0.0.1");
    }
}
