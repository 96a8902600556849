// Headless dashboard: polls a pc-monitor server and keeps an HTML page file current.

use anyhow::Result;
use pc_monitor::config::AppConfig;
use pc_monitor::dashboard::{FilePage, HttpStatusSource, Renderer, StatusPoller};
use pc_monitor::telemetry;

#[tokio::main]
async fn main() -> Result<()> {
    telemetry::init();

    let app_config = AppConfig::load()?;
    let dashboard = &app_config.dashboard;
    let renderer = Renderer::for_locale(&dashboard.locale)?;
    let source = HttpStatusSource::new(&dashboard.base_url);
    tracing::info!(url = source.url(), output = %dashboard.output_path, "Polling status");

    let mut poller = StatusPoller::new(source, FilePage::new(&dashboard.output_path), renderer);
    poller.start();

    tokio::signal::ctrl_c().await?;
    tracing::info!("Received shutdown signal");
    poller.stop().await;
    Ok(())
}
