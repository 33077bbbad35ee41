use std::{process::ExitCode, sync::Arc};

use tokio::signal::{self, ctrl_c};
use tracing_subscriber::{fmt, EnvFilter};

use recipe_api::{
    actions::PgStore, config::Config, error::Error, jwt::SessionKeys, memory::MemoryStore,
    routes, store::Store,
};

#[tokio::main]
async fn main() -> ExitCode {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    match run().await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            log::error!("{e}");
            ExitCode::FAILURE
        }
    }
}

async fn run() -> Result<(), Error> {
    let config = Config::load()?;

    let store: Arc<dyn Store> = match &config.database_url {
        Some(url) => {
            log::info!("Connecting to database...");
            let store = PgStore::connect(url, config.max_connections).await?;
            store.migrate().await?;
            Arc::new(store)
        }
        None => {
            log::warn!("DATABASE_URL not set, data is kept in memory only");
            Arc::new(MemoryStore::new())
        }
    };

    let keys = Arc::new(SessionKeys::new(
        config.session_secret.as_bytes(),
        config.session_lifetime,
    )?);

    let (address, server) = warp::serve(routes::api(store, keys))
        .try_bind_with_graceful_shutdown(config.address, shutdown_signal())
        .map_err(|e| Error::Internal(format!("Failed to bind {}: {e}", config.address)))?;
    log::info!("Server running on {address}");

    server.await;
    log::info!("Server shut down");

    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = ctrl_c().await {
            log::error!("Failed to install Ctrl+C handler: {e}");
            std::future::pending::<()>().await;
        }
        log::info!("Received Ctrl+C, shutting down");
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
                log::info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                log::error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
