use tokio::signal;
use tracing::{info, warn};

/// 等待 Ctrl+C（Unix 下同时监听 SIGTERM）
pub async fn wait_for_shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal as unix_signal};

        let mut term = match unix_signal(SignalKind::terminate()) {
            Ok(term) => term,
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                wait_ctrl_c().await;
                return;
            }
        };

        tokio::select! {
            _ = wait_ctrl_c() => {}
            _ = term.recv() => {
                info!("SIGTERM received, shutting down...");
            }
        }
    }

    #[cfg(not(unix))]
    wait_ctrl_c().await;
}

async fn wait_ctrl_c() {
    match signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received, shutting down..."),
        Err(e) => warn!(
            "Failed to listen for Ctrl+C: {}. Proceeding with shutdown anyway.",
            e
        ),
    }
}
