//! Admin panel server.
//!
//! ```text
//!     Client Request
//!     ──────────────▶ axum server (user, timeout, request ID, trace layers)
//!                         │
//!                         ▼
//!                     AdminKernel ──▶ RouteTable (match)
//!                         │
//!                         ▼
//!                     AdminRouterSubscriber::on_request ──▶ AdminContext
//!                         │
//!                         ▼
//!                     HandlerRegistry ──▶ on_controller (delegation)
//!                         │
//!     Client Response     ▼
//!     ◀────────────── CRUD page / dashboard page / application handler (JSON)
//! ```
//!
//! Usage: `admin-panel [config.toml]`. Without a path the built-in defaults are used.

use std::path::PathBuf;

use admin_panel::config::{load_config, AppConfig};
use admin_panel::observability::{logging, metrics};
use admin_panel::AdminApp;
use tokio::net::TcpListener;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config_path = std::env::args().nth(1).map(PathBuf::from);
    let config = match &config_path {
        Some(path) => load_config(path)?,
        None => AppConfig::default(),
    };

    logging::init_tracing(&logging::default_filter(&config.observability.log_level));

    tracing::info!(version = env!("CARGO_PKG_VERSION"), "admin-panel starting");
    tracing::info!(
        config = ?config_path,
        bind_address = %config.listener.bind_address,
        dashboards = config.dashboards.len(),
        cruds = config.cruds.len(),
        request_timeout_secs = config.timeouts.request_secs,
        "Configuration loaded"
    );

    // Validate eagerly: backend config warm-up and route generation
    let app = AdminApp::from_config(&config)?;

    if config.observability.metrics_enabled {
        match config.observability.metrics_address.parse() {
            Ok(addr) => metrics::init_metrics(addr),
            Err(e) => tracing::error!(
                metrics_address = %config.observability.metrics_address,
                error = %e,
                "Failed to parse metrics address"
            ),
        }
    }

    let listener = TcpListener::bind(&config.listener.bind_address).await?;
    tracing::info!(address = %listener.local_addr()?, "Listening for connections");

    app.server(config).run(listener).await?;

    tracing::info!("Shutdown complete");
    Ok(())
}
