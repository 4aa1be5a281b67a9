//! ping command - check that the key-value server answers

use std::sync::Arc;
use std::time::Instant;

use anyhow::{Context, Result};
use console::style;
use matkv_store::{ObjectStore, RespClient};

use crate::config::CliConfig;

/// Connect to the configured server and round-trip a PING
pub async fn execute(config: &CliConfig) -> Result<()> {
    let addr = &config.client.addr;
    let start = Instant::now();

    let client = RespClient::connect(&config.client)
        .await
        .with_context(|| format!("Failed to connect to {}. Is the server running?", addr))?;
    let connect_time = start.elapsed();

    let store = ObjectStore::new(Arc::new(client), config.store.clone());
    let ping_start = Instant::now();
    store.ping().await.context("Server did not answer PING")?;
    let ping_time = ping_start.elapsed();

    tracing::debug!(addr = %addr, ?connect_time, ?ping_time, "ping ok");
    println!(
        "{} {} connect {:.2}ms, ping {:.2}ms",
        style("[OK]").green(),
        style(addr).cyan(),
        connect_time.as_secs_f64() * 1000.0,
        ping_time.as_secs_f64() * 1000.0
    );
    Ok(())
}
