// SPDX-FileCopyrightText: 2026 Wagate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `wagate serve` command implementation.
//!
//! Wires storage, the session manager, the dispatcher, the attendance
//! recorder, and the HTTP gateway together, then parks on the shutdown
//! token. The transport is injected by the caller so the same wiring
//! serves both the real binding and the test harness.

use std::sync::Arc;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use wagate_attendance::AttendanceService;
use wagate_config::WagateConfig;
use wagate_core::{WaTransport, WagateError};
use wagate_gateway::{GatewayState, ServerConfig, start_server};
use wagate_storage::Database;
use wagate_whatsapp::{Dispatcher, SessionManager};

/// Runs the `wagate serve` command until the cancellation token fires.
pub async fn run_serve(
    config: WagateConfig,
    transport: Arc<dyn WaTransport>,
    cancel: CancellationToken,
) -> Result<(), WagateError> {
    init_tracing(&config.gateway.log_level);

    info!("starting wagate serve");

    let api_key = config.gateway.api_key.clone().ok_or_else(|| {
        error!("gateway.api_key is not configured");
        eprintln!(
            "error: API key required. Set gateway.api_key in wagate.toml or WAGATE_GATEWAY_API_KEY."
        );
        WagateError::Config("gateway.api_key is required for serve".into())
    })?;

    let db = Database::open(&config.storage).await?;
    info!(path = config.storage.database_path.as_str(), "storage ready");

    let session = SessionManager::new(transport, &config.whatsapp);
    let dispatcher = Dispatcher::new(Arc::clone(&session));
    let attendance = Arc::new(AttendanceService::new(
        db.clone(),
        dispatcher.clone(),
        api_key.clone(),
        config.whatsapp.bot_name.clone(),
    ));

    // Open the device session. A failure here is not fatal: the gateway
    // still serves attendance, and /disconnect or a restart retries.
    if let Err(e) = Arc::clone(&session).start().await {
        warn!(error = %e, "initial connection failed");
    }

    let state = GatewayState {
        session: Arc::clone(&session),
        dispatcher,
        attendance,
        api_key: Some(api_key),
    };
    let server_config = ServerConfig {
        host: config.gateway.host.clone(),
        port: config.gateway.port,
    };

    let server_task = tokio::spawn(async move {
        if let Err(e) = start_server(&server_config, state).await {
            error!(error = %e, "gateway server error");
        }
    });

    cancel.cancelled().await;
    info!("shutdown signal received");

    server_task.abort();
    db.close().await?;

    info!("wagate serve shutdown complete");
    Ok(())
}

/// Installs signal handlers for SIGTERM and SIGINT.
///
/// Returns a [`CancellationToken`] that is cancelled when either signal
/// is received.
pub fn install_signal_handler() -> CancellationToken {
    let token = CancellationToken::new();
    let token_clone = token.clone();

    tokio::spawn(async move {
        let ctrl_c = tokio::signal::ctrl_c();

        #[cfg(unix)]
        {
            use tokio::signal::unix::{SignalKind, signal};
            let mut sigterm =
                signal(SignalKind::terminate()).expect("failed to install SIGTERM handler");

            tokio::select! {
                _ = ctrl_c => {
                    info!("received SIGINT (Ctrl+C), initiating shutdown");
                }
                _ = sigterm.recv() => {
                    info!("received SIGTERM, initiating shutdown");
                }
            }
        }

        #[cfg(not(unix))]
        {
            let _ = ctrl_c.await;
            info!("received Ctrl+C, initiating shutdown");
        }

        token_clone.cancel();
        debug!("shutdown signal handler completed");
    });

    token
}

/// Initializes the tracing subscriber with the given log level.
///
/// Uses `try_init` so repeated calls (tests, doctor after serve) are a
/// no-op instead of a panic.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("wagate={log_level},warn")));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .try_init();
}
