use std::sync::Arc;

use anyhow::{Context, Result};
use sqlx::PgPool;
use tokio::{net::TcpListener, signal};
use tracing::info;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use sensor_readings_service::{
    api::{self, AppState},
    config::{Config, StoreBackend},
    db::{self, InMemoryReadingStore, PgReadingStore, ReadingStore},
    weather::WttrClient,
};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env; a missing file is fine when vars are set externally
    let _ = dotenvy::dotenv();

    // Initialise tracing
    tracing_subscriber::registry()
        .with(fmt::layer())
        .with(EnvFilter::from_default_env())
        .init();

    // Load config
    let config = Config::from_env()?;

    // Connect to the store. Failure here ends the process with a non-zero exit.
    let (store, pool): (Arc<dyn ReadingStore>, Option<PgPool>) = match config.store_backend {
        StoreBackend::Postgres => {
            let url = config
                .database_url
                .as_deref()
                .context("missing required env var: DATABASE_URL")?;
            let pool = db::create_pool(url).await?;
            db::run_migrations(&pool).await?;
            info!("Database ready");
            let store: Arc<dyn ReadingStore> = Arc::new(PgReadingStore::new(pool.clone()));
            (store, Some(pool))
        }
        StoreBackend::Memory => {
            info!("Using in-memory reading store; data is lost on restart");
            let store: Arc<dyn ReadingStore> = Arc::new(InMemoryReadingStore::new());
            (store, None)
        }
    };

    let weather = Arc::new(WttrClient::new(&config.weather_base_url));
    let state = AppState::new(store, weather).with_index_page(&config.index_page);

    // Start HTTP server
    let addr = config.listen_addr();
    let listener = TcpListener::bind(&addr).await?;
    info!(addr = %addr, static_dir = %config.static_dir, "HTTP server listening");

    axum::serve(listener, api::router(state, &config.static_dir))
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    if let Some(pool) = pool {
        pool.close().await;
        info!("Database connection closed");
    }

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c().await.expect("failed to install Ctrl+C handler");
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
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
