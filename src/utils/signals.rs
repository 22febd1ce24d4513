//! Signal handling for graceful shutdown

use anyhow::Context;
use futures::stream::StreamExt;
use signal_hook_tokio::Signals;
use tracing::info;

/// Wait for a shutdown signal (SIGTERM, SIGINT) and return its number
pub async fn shutdown_signal() -> anyhow::Result<i32> {
    let mut signals = Signals::new([
        signal_hook::consts::SIGTERM,
        signal_hook::consts::SIGINT,
    ])
    .context("Failed to create signal handler")?;

    let signal = signals
        .next()
        .await
        .context("Signal stream ended unexpectedly")?;
    info!("Received signal: {}", signal);
    Ok(signal)
}
