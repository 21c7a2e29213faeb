pub mod api;
pub mod config;
pub mod core_state;
pub mod models;
pub mod monitor;
pub mod roster;
pub mod scheduler;

use std::sync::Arc;

use tracing_subscriber::EnvFilter;

use crate::config::AppConfig;
use crate::core_state::CoreState;

/// Initialize tracing. `RUST_LOG` overrides the default filter.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config::default_log_filter())),
        )
        .try_init();
}

/// Run the monitor until Ctrl-C: start the evaluation scheduler and the
/// HTTP server, then shut both down.
pub async fn run(config: AppConfig) -> Result<(), String> {
    tracing::info!("{} starting v{}", config::APP_NAME, config::APP_VERSION);
    tracing::info!(
        bind_addr = %config.bind_addr,
        alert_capacity = config.monitor.alert_capacity,
        critical_window_secs = config.monitor.windows.critical.num_seconds(),
        warning_window_secs = config.monitor.windows.warning.num_seconds(),
        reevaluate_secs = config.monitor.reevaluate_interval.as_secs(),
        combine_trends = config.monitor.combine_trends,
        "Configuration loaded"
    );

    let core = Arc::new(CoreState::new(config.monitor));
    core.start_monitoring().await;

    let server = api::start_api_server(core.clone(), config.bind_addr).await?;
    tracing::info!(addr = %server.session.server_addr, "Listening");
    *core.api_server.lock().await = Some(server);

    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!(error = %e, "Failed to listen for shutdown signal");
    }

    tracing::info!("Shutting down");
    core.shutdown().await;
    Ok(())
}
