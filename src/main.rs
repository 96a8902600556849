use anyhow::Result;
use pc_monitor::*;
use std::sync::Arc;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    let app_config = config::AppConfig::load()?;

    let computer_repo = Arc::new(
        computer_repo::ComputerRepo::connect(
            &app_config.database.path,
            app_config.database.max_pool_size,
        )
        .await?,
    );
    computer_repo.init().await?;

    let registry = Arc::new(registry::ConnectionRegistry::new());
    let notifier = notifier::TelegramNotifier::new(app_config.telegram.as_ref());
    if !notifier.is_enabled() {
        tracing::info!("Telegram notifications disabled (no [telegram] section)");
    }

    let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel();
    let worker_handle = worker::spawn(
        worker::WorkerDeps {
            registry: registry.clone(),
            computer_repo: computer_repo.clone(),
            notifier: notifier.clone(),
            shutdown_rx,
        },
        worker::WorkerConfig {
            cleanup_interval_secs: app_config.agents.cleanup_interval_secs,
            stale_after_secs: app_config.agents.stale_after_secs,
        },
    );

    let app = routes::app(registry, computer_repo, notifier, app_config.clone());
    let addr = format!("{}:{}", app_config.server.host, app_config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("Listening on http://{}", addr);

    tokio::select! {
        result = axum::serve(listener, app) => {
            result?;
        }
        _ = shutdown_signal() => {
            tracing::info!("Received shutdown signal");
            let _ = shutdown_tx.send(());
            let _ = worker_handle.await;
        }
    }

    Ok(())
}

async fn shutdown_signal() {
    #[cfg(unix)]
    {
        let mut sigterm =
            match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
                Ok(s) => s,
                Err(_) => {
                    let _ = tokio::signal::ctrl_c().await;
                    return;
                }
            };
        tokio::select! {
            _ = tokio::signal::ctrl_c() => {}
            _ = sigterm.recv() => {}
        }
    }
    #[cfg(not(unix))]
    {
        let _ = tokio::signal::ctrl_c().await;
    }
}
