//! Symbion OLED Status - dashboard daemon for single-board hosts
//!
//! Shows on a 128x64 SSD1306:
//! - Primary interface IPv4 address
//! - CPU and RAM load (rolling average)
//! - Tailscale mesh latency
//! - Uptime

use anyhow::{Context, Result};
use symbion_oled_status::display::TextDisplay;
use symbion_oled_status::render::Layout;
use symbion_oled_status::{DashboardConfig, Intervals, MetricStore, Sources, Supervisor};
use tracing::info;
use tracing_subscriber::EnvFilter;

#[cfg(all(target_os = "linux", feature = "ssd1306"))]
fn open_display(config: &DashboardConfig) -> Result<Box<dyn TextDisplay>> {
    let display = symbion_oled_status::display::Ssd1306Display::open(&config.display)
        .context("Failed to open SSD1306 display")?;
    Ok(Box::new(display))
}

#[cfg(not(all(target_os = "linux", feature = "ssd1306")))]
fn open_display(config: &DashboardConfig) -> Result<Box<dyn TextDisplay>> {
    tracing::warn!("Built without SSD1306 support, frames go to the debug log");
    Ok(Box::new(symbion_oled_status::display::BufferDisplay::new(
        config.display.width,
        config.display.height,
    )))
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("symbion_oled_status=info")),
        )
        .init();

    info!("Symbion OLED status v{} starting...", env!("CARGO_PKG_VERSION"));

    let config = DashboardConfig::load()
        .await
        .context("Failed to load configuration")?;
    let display = open_display(&config)?;

    let layout = Layout {
        margin_x: config.display.margin_x,
        uptime_width: config.display.uptime_width,
    };

    let mut supervisor = Supervisor::new(MetricStore::new());
    supervisor.spawn_all(
        Sources::system(&config),
        display,
        layout,
        Intervals::from_config(&config),
    );

    supervisor.run().await.context("Dashboard stopped")?;
    Ok(())
}
