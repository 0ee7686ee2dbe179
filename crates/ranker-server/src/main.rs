//! Resume ranker HTTP server entrypoint.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use mimalloc::MiMalloc;
use tokio::net::TcpListener;
use tokio::signal;

use ranker::cache::CachedEncoder;
use ranker::config::Config;
use ranker::embedding::{SentenceEncoder, TextEncoder};
use ranker::ranking::RankingEngine;
use ranker::storage::{FileRankingStore, MemoryRankingStore, RankingStore};
use ranker_server::gateway::{HandlerState, create_router_with_state};

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    if std::env::args().any(|arg| arg == "--health-check") {
        std::process::exit(run_health_check());
    }

    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Config::from_env()?;
    config.validate()?;
    let addr: SocketAddr = config.socket_addr().parse()?;

    tracing::info!(
        bind_addr = %config.bind_addr,
        port = config.port,
        "Resume ranker starting"
    );

    if config.model_dir.is_none() {
        tracing::warn!("No RANKER_MODEL_DIR configured, running encoder in stub mode");
    }
    let encoder = SentenceEncoder::load(config.encoder_config())?;
    let encoder = CachedEncoder::new(encoder, config.cache_capacity);
    tracing::info!(
        model_id = encoder.model_id(),
        embedding_dim = encoder.embedding_dim(),
        cache_capacity = config.cache_capacity,
        "Encoder ready"
    );

    let store: Arc<dyn RankingStore> = match &config.storage_path {
        Some(path) => Arc::new(FileRankingStore::open(path.clone())?),
        None => {
            tracing::warn!("No RANKER_STORAGE_PATH configured, results are kept in memory");
            Arc::new(MemoryRankingStore::new())
        }
    };

    let state = HandlerState::new(
        RankingEngine::new(encoder),
        store,
        config.embed_timeout(),
    );

    let app = create_router_with_state(state);

    let listener = TcpListener::bind(addr).await?;
    tracing::info!(addr = %addr, "Server listening");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("Resume ranker shutdown complete");
    Ok(())
}

fn run_health_check() -> i32 {
    let port = std::env::var("RANKER_PORT")
        .ok()
        .and_then(|p| p.parse::<u16>().ok())
        .unwrap_or(8080);

    let url = format!("http://127.0.0.1:{}/healthz", port);

    let rt = match tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
    {
        Ok(rt) => rt,
        Err(_) => return 1,
    };

    rt.block_on(async {
        let client = match reqwest::Client::builder()
            .timeout(Duration::from_secs(1))
            .build()
        {
            Ok(client) => client,
            Err(_) => return 1,
        };

        match client.get(&url).send().await {
            Ok(res) if res.status().is_success() => 0,
            _ => 1,
        }
    })
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating graceful shutdown");
        }
        _ = terminate => {
            tracing::info!("Received SIGTERM, initiating graceful shutdown");
        }
    }
}
