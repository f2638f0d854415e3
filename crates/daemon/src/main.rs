//! Waitline Daemon - Main Entry Point
//! Serves the shared waiting queue over JSON-RPC

mod config;
mod logging;

use anyhow::{Context, Result};
use std::sync::Arc;
use tracing::info;

use config::DaemonConfig;
use waitline_api_rpc::{RpcHandler, RpcServer, RpcServerConfig};
use waitline_core::application::QueueService;
use waitline_core::port::time_provider::SystemTimeProvider;
use waitline_infra_sqlite::{
    create_pool, run_migrations, SqliteQueueRepository, SqliteServiceCatalog,
    SqliteUserDirectory,
};

const VERSION: &str = env!("CARGO_PKG_VERSION");

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Load configuration
    let config = DaemonConfig::from_env().context("Invalid configuration")?;

    // 2. Initialize logging
    let _log_guard = logging::init(config.log_format, config.log_dir.as_deref())?;

    info!("Waitline daemon v{} starting...", VERSION);
    info!(
        db_path = %config.db_path.display(),
        staff_ids = config.staff_ids.len(),
        "Initializing database..."
    );

    // 3. Initialize database
    if let Some(parent) = config.db_path.parent() {
        std::fs::create_dir_all(parent)
            .with_context(|| format!("Failed to create {}", parent.display()))?;
    }
    let db_url = config.db_path.to_string_lossy();
    let pool = create_pool(&db_url)
        .await
        .map_err(|e| anyhow::anyhow!("DB pool creation failed: {}", e))?;
    run_migrations(&pool)
        .await
        .map_err(|e| anyhow::anyhow!("Migration failed: {}", e))?;

    // 4. Setup dependencies (DI wiring)
    let time_provider = Arc::new(SystemTimeProvider);
    let queue_repo = Arc::new(SqliteQueueRepository::new(pool.clone()));
    let queue = Arc::new(QueueService::new(
        queue_repo.clone(),
        queue_repo,
        time_provider.clone(),
    ));
    let directory = Arc::new(SqliteUserDirectory::new(pool.clone(), time_provider.clone()));
    let catalog = Arc::new(SqliteServiceCatalog::new(pool.clone(), time_provider.clone()));

    // 5. Report the queue state left by the previous run
    match queue.verify_integrity().await {
        Ok(report) => info!(
            waiting = report.waiting,
            completed = report.completed,
            cancelled = report.cancelled,
            "Queue integrity verified"
        ),
        Err(e) => tracing::error!(error = %e, "Queue integrity check failed at startup"),
    }

    // 6. Start JSON-RPC server
    let handler = RpcHandler::new(
        queue,
        directory,
        catalog,
        time_provider,
        config.staff_ids.iter().copied(),
    );
    let rpc_config = RpcServerConfig {
        host: config.rpc_host.clone(),
        port: config.rpc_port,
    };
    let (addr, rpc_handle) = RpcServer::new(rpc_config, handler)
        .start()
        .await
        .map_err(|e| anyhow::anyhow!("RPC server start failed: {}", e))?;

    info!(addr = %addr, "System ready. Press Ctrl+C to shutdown");

    // 7. Wait for shutdown signal
    tokio::signal::ctrl_c().await?;

    info!("Shutdown signal received. Exiting gracefully...");

    // 8. Graceful shutdown
    rpc_handle
        .stop()
        .map_err(|e| anyhow::anyhow!("RPC server stop failed: {}", e))?;
    rpc_handle.stopped().await;
    pool.close().await;

    info!("Shutdown complete.");

    Ok(())
}
