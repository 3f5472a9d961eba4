//! Rolebit HTTP server
//!
//! Run with: cargo run --release --features server --bin rolebit-server [CONFIG]
//!
//! CONFIG defaults to `rolebit.toml`; a missing file means defaults plus `ROLEBIT_*`
//! environment overrides.

use std::sync::Arc;

use rolebit::config::Config;
use rolebit::logging::init_logging;
use rolebit::server::{router, AppState};
use rolebit::Store;

#[tokio::main]
async fn main() {
    let path = std::env::args().nth(1).unwrap_or_else(|| "rolebit.toml".to_string());
    if let Err(e) = run(&path).await {
        eprintln!("rolebit-server: {e}");
        std::process::exit(1);
    }
}

async fn run(config_path: &str) -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load(Some(config_path))?;
    init_logging(&config.logging)?;

    let store = Arc::new(Store::open_with(&config.store)?);
    let app = router(AppState::new(store));

    let addr = config.http_address();
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!(%addr, version = env!("CARGO_PKG_VERSION"), "rolebit-server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
