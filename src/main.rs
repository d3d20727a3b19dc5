use std::net::SocketAddr;
use std::sync::Arc;

use sqlx::postgres::PgPoolOptions;
use tokio::signal;
use tracing_subscriber::EnvFilter;

use formsheet::clock::SystemClock;
use formsheet::config::{Config, StorageBackend};
use formsheet::state::AppState;
use formsheet::store::{self, MemoryStore, PgStore, SheetStore};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Load .env if present
    let _ = dotenvy::dotenv();

    let config = Config::from_env()?;

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(&config.log_level)
        }))
        .init();

    tracing::info!("Starting Formsheet");

    let store: Arc<dyn SheetStore> = match &config.storage {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory storage, submissions are lost on restart");
            Arc::new(MemoryStore::new())
        }
        StorageBackend::Postgres { database_url } => {
            let pool = PgPoolOptions::new()
                .max_connections(5)
                .connect(database_url)
                .await?;

            sqlx::migrate!("./migrations").run(&pool).await?;
            tracing::info!("Migrations applied");

            Arc::new(PgStore::new(pool))
        }
    };

    store::setup_sheet(store.as_ref(), &config.sheet_name).await?;

    if config.recaptcha.is_enabled() {
        tracing::info!(
            "Bot verification enabled (min score {})",
            config.recaptcha.min_score
        );
    } else {
        tracing::info!("Bot verification disabled: no secret configured");
    }

    let addr = SocketAddr::new(config.host, config.port);
    let state = AppState::new(config, store, Arc::new(SystemClock))?;
    let app = formsheet::build_app(Arc::new(state));

    let listener = tokio::net::TcpListener::bind(addr).await?;
    tracing::info!("Listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    Ok(())
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
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
