//! Relay Gateway Server entry point
//!
//! Run with:
//! ```bash
//! cargo run -p relay-gateway
//! ```
//!
//! Configuration is loaded from environment variables.

use relay_common::{try_init_tracing_for, AppConfig, AppResult};
use tracing::{error, info};

#[tokio::main]
async fn main() {
    if let Err(e) = run().await {
        error!(error = %e, code = e.error_code(), "Gateway failed to start");
        eprintln!("Error: {e}");
        std::process::exit(1);
    }
}

async fn run() -> AppResult<()> {
    // Load configuration first so the log format follows APP_ENV
    let config = AppConfig::from_env()?;

    if let Err(e) = try_init_tracing_for(config.app.env) {
        eprintln!("Warning: Failed to initialize tracing: {e}");
    }

    info!(
        app = %config.app.name,
        env = ?config.app.env,
        addr = %config.gateway.address(),
        store = if config.database.is_some() { "postgres" } else { "memory" },
        "Configuration loaded"
    );

    relay_gateway::run(config).await
}
