//! Test server harness.

use ranker::cache::CachedEncoder;
use ranker::embedding::SentenceEncoder;
use ranker::ranking::RankingEngine;
use ranker::storage::{FileRankingStore, MemoryRankingStore, RankingStore};
use ranker_server::gateway::{HandlerState, create_router_with_state};
use std::net::SocketAddr;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tempfile::TempDir;
use tokio::net::TcpListener;
use tokio::sync::oneshot;
use tokio::task::JoinHandle;

const STARTUP_WAIT_TIMEOUT_SECS: u64 = 5;
const STARTUP_POLL_INTERVAL_MS: u64 = 50;

#[derive(Debug, Clone, Default)]
pub struct TestServerConfig {
    /// Keep results on disk (a temp dir when `storage_path` is unset).
    pub file_store: bool,
    pub storage_path: Option<PathBuf>,
    pub embed_timeout: Option<Duration>,
}

pub struct TestServer {
    pub addr: SocketAddr,
    _server_handle: JoinHandle<()>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    _temp_dir: Option<TempDir>,
}

impl TestServer {
    pub fn url(&self) -> String {
        format!("http://{}", self.addr)
    }

    pub async fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
    }
}

pub async fn wait_for_server_ready(
    addr: SocketAddr,
    timeout: Duration,
    interval: Duration,
) -> Result<(), ServerStartupError> {
    let start = std::time::Instant::now();

    loop {
        if start.elapsed() > timeout {
            return Err(ServerStartupError::Timeout);
        }

        match tokio::net::TcpStream::connect(addr).await {
            Ok(_) => return Ok(()),
            Err(_) => {
                tokio::time::sleep(interval).await;
            }
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum ServerStartupError {
    #[error("Server failed to start within timeout")]
    Timeout,
    #[error("Failed to bind to address: {0}")]
    BindError(#[from] std::io::Error),
    #[error("Server startup failed: {0}")]
    StartupFailed(String),
}

/// Spawns a server on an ephemeral port with the stub encoder behind the embedding cache.
pub async fn spawn_test_server(config: TestServerConfig) -> Result<TestServer, ServerStartupError> {
    let listener = TcpListener::bind(SocketAddr::from(([127, 0, 0, 1], 0))).await?;
    let local_addr = listener.local_addr()?;

    let mut _temp_dir = None;
    let store: Arc<dyn RankingStore> = if config.file_store || config.storage_path.is_some() {
        let path = match config.storage_path {
            Some(path) => path,
            None => {
                let temp_dir =
                    TempDir::new().map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
                let path = temp_dir.path().to_path_buf();
                _temp_dir = Some(temp_dir);
                path
            }
        };
        Arc::new(
            FileRankingStore::open(path)
                .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?,
        )
    } else {
        Arc::new(MemoryRankingStore::new())
    };

    let encoder = SentenceEncoder::stub()
        .map_err(|e| ServerStartupError::StartupFailed(e.to_string()))?;
    let engine = RankingEngine::new(CachedEncoder::new(encoder, 1_000));

    let state = HandlerState::new(engine, store, config.embed_timeout);
    let app = create_router_with_state(state);

    let (shutdown_tx, shutdown_rx) = oneshot::channel();

    let server_handle = tokio::spawn(async move {
        axum::serve(listener, app)
            .with_graceful_shutdown(async {
                let _ = shutdown_rx.await;
            })
            .await
            .unwrap();
    });

    wait_for_server_ready(
        local_addr,
        Duration::from_secs(STARTUP_WAIT_TIMEOUT_SECS),
        Duration::from_millis(STARTUP_POLL_INTERVAL_MS),
    )
    .await?;

    Ok(TestServer {
        addr: local_addr,
        _server_handle: server_handle,
        shutdown_tx: Some(shutdown_tx),
        _temp_dir,
    })
}
