//! # HITL Bridge
//!
//! Fly an autopilot against the IL-2 flight simulator.
//!
//! This application relays control outputs to IL-2 over UDP and feeds the
//! simulated flight state back into the autopilot's telemetry objects.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing::info;

use hitl_bridge::bridge::Bridge;
use hitl_bridge::config::Config;
use hitl_bridge::logging::init_logging;
use hitl_bridge::net::UdpLink;
use hitl_bridge::telemetry::MemoryStore;

/// Configuration file used when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Main entry point for the HITL bridge application
///
/// # Control Flow
///
/// 1. **Initialization**
///    - Load configuration from the path in the first argument
///    - Set up logging (console, plus rolling file if configured)
///    - Bind the UDP link to the simulator
///
/// 2. **Main Loop**
///    - Run the bridge on its own task
///    - Log every connection notification it emits
///
/// 3. **Graceful Shutdown**
///    - Ctrl+C stops the bridge, which reports both peers disconnected
///    - Log final packet counters
///
/// # Errors
///
/// Returns error if:
/// - The configuration file is missing or invalid
/// - The simulator host does not resolve or the local port is taken
///
/// # Examples
///
/// ```bash
/// cargo run --release -- config/default.toml
/// ```
///
/// Expected output:
/// ```text
/// INFO hitl_bridge::net: UDP link bound to 0.0.0.0:40412, simulator at 127.0.0.1:1100
/// INFO hitl_bridge::bridge: Bridge started: simulator 127.0.0.1:1100, ...
/// INFO hitl_bridge::bridge: simulator connected
/// ```
#[tokio::main]
async fn main() -> Result<()> {
    let path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());

    let config = Config::load(&path)
        .with_context(|| format!("Failed to load configuration from {}", path))?;

    let _logging = init_logging(&config.logging).context("Failed to initialize logging")?;

    info!("HITL Bridge v{} starting...", env!("CARGO_PKG_VERSION"));

    let bridge_config = config.bridge_config()?;
    let link = UdpLink::bind(&bridge_config)
        .await
        .context("Failed to open simulator link")?;

    let store = Arc::new(MemoryStore::new());
    let (bridge, mut handle) = Bridge::new(bridge_config, store, link)?;

    info!("Press Ctrl+C to exit");
    let task = tokio::spawn(bridge.run(async {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("Received Ctrl+C, shutting down...");
        }
    }));

    while let Some(notification) = handle.next_notification().await {
        info!("Bridge event: {}", notification);
    }

    let stats = task.await.context("Bridge task failed")?;
    info!(
        "Total packets sent: {}, received: {}",
        stats.packets_sent, stats.packets_received
    );

    Ok(())
}
