//! Reference save endpoint for the Scribe editor
//!
//! Accepts the multipart saves produced by the editor page, writes them under
//! a root directory with a stale-hash check, and answers with the JSON reply
//! the save controller expects. Also serves the keepalive route.

pub mod exposed;
pub mod handlers;
pub mod store;

use axum::{routing::get, Router};
use scribe_core::{Result, ScribeError, ServerConfig};
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::{net::TcpListener, sync::oneshot, task::JoinHandle};
use tower_http::cors::CorsLayer;
use tracing::{error, info};

pub use handlers::AppState;
pub use store::{FileStore, StoredFile};

/// Build the endpoint's router over `store`
pub fn router(store: Arc<FileStore>, cors_enabled: bool) -> Router {
    let router = Router::new()
        .route(
            "/edit/:app/*path",
            get(handlers::load_file).post(handlers::save_file),
        )
        .route("/keepalive", get(handlers::keepalive))
        .with_state(AppState { store });

    if cors_enabled {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// The save endpoint bound to its configuration
pub struct SaveServer {
    config: ServerConfig,
    store: Arc<FileStore>,
}

/// A server running in the background
pub struct ServerHandle {
    pub addr: SocketAddr,
    shutdown: Option<oneshot::Sender<()>>,
    task: JoinHandle<Result<()>>,
}

impl ServerHandle {
    /// Stop accepting connections and wait for the server task to finish
    pub async fn shutdown(mut self) -> Result<()> {
        if let Some(tx) = self.shutdown.take() {
            let _ = tx.send(());
        }
        self.task
            .await
            .map_err(|e| ScribeError::server(format!("Server task failed: {}", e)))?
    }
}

impl SaveServer {
    pub fn new(config: ServerConfig) -> Self {
        let store = Arc::new(FileStore::new(config.root.clone()));
        Self { config, store }
    }

    pub fn router(&self) -> Router {
        router(self.store.clone(), self.config.cors_enabled)
    }

    /// Bind the configured address
    pub async fn bind(&self) -> Result<TcpListener> {
        let address = self.config.bind_address();
        TcpListener::bind(&address)
            .await
            .map_err(|e| ScribeError::server(format!("Failed to bind {}: {}", address, e)))
    }

    /// Serve on `listener` until `shutdown` resolves
    pub async fn serve<F>(self, listener: TcpListener, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let addr = listener.local_addr()?;
        info!(
            "Save endpoint listening on http://{} (root {})",
            addr,
            self.store.root().display()
        );

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ScribeError::server(format!("Server error: {}", e)))?;

        info!("Save endpoint stopped");
        Ok(())
    }

    /// Serve on `listener` from a background task
    pub fn spawn(self, listener: TcpListener) -> Result<ServerHandle> {
        let addr = listener.local_addr()?;
        let (tx, rx) = oneshot::channel::<()>();

        let task = tokio::spawn(async move {
            let result = self
                .serve(listener, async move {
                    let _ = rx.await;
                })
                .await;
            if let Err(e) = &result {
                error!("Save endpoint exited with error: {}", e);
            }
            result
        });

        Ok(ServerHandle {
            addr,
            shutdown: Some(tx),
            task,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_spawn_and_shutdown() {
        let dir = TempDir::new().unwrap();
        let config = ServerConfig {
            port: 1,
            root: dir.path().to_path_buf(),
            ..ServerConfig::default()
        };
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();

        let handle = SaveServer::new(config).spawn(listener).unwrap();
        assert_ne!(handle.addr.port(), 0);

        let stream = tokio::net::TcpStream::connect(handle.addr).await;
        assert!(stream.is_ok());
        drop(stream);

        handle.shutdown().await.unwrap();
    }
}
