use std::sync::Arc;

use anyhow::{Context, Result};
use journal_stream::JournalWebSocket;
use notification_service::{NotificationConfig, NotificationService};
use scanner_core::{Scanner, SettingsStore};
use tower_http::{cors::CorsLayer, trace::TraceLayer};

mod config;
mod processor;
mod routes;
mod sink;
mod state;

use config::ScannerConfig;
use processor::Processor;
use sink::{BroadcastSink, ErrorReporter};
use state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok();

    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new("info"));
    let json_logging = std::env::var("RUST_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);
    if json_logging {
        tracing_subscriber::fmt().json().with_env_filter(env_filter).init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }

    tracing::info!("Starting momentum scanner");

    let config = ScannerConfig::from_env()?;
    tracing::info!("  Listening on: {}", config.bind_addr);
    tracing::info!("  Settings file: {}", config.settings_path.display());
    tracing::info!("  Visible rows: {}", config.max_rows);
    tracing::info!(
        "  New-stock notifications: {}, error reports: {}",
        config.notify_new_stocks,
        config.report_errors
    );

    // Seed defaults on first run. An unreadable file means no filtering.
    let store = SettingsStore::new(&config.settings_path);
    let settings = match store.ensure_default() {
        Ok(settings) => Some(settings),
        Err(e) => {
            tracing::warn!("Could not load filter settings, filtering disabled: {}", e);
            None
        }
    };

    let state = AppState::new(Scanner::with_capacity(config.max_rows), store, settings);
    let notifications = NotificationService::new(&NotificationConfig::from_env());

    let mut processor = Processor::new(
        state.clone(),
        Arc::new(BroadcastSink::new(&state)),
        Arc::new(ErrorReporter::new(notifications.clone(), config.report_errors)),
    );
    if config.notify_new_stocks {
        processor = processor.with_notifications(notifications);
    }

    let (stream, rx) = JournalWebSocket::new(config.ws_url.clone(), config.stream_buffer);
    let stream_shutdown = stream.shutdown_handle();
    let processor_task = tokio::spawn(processor.run(rx));
    let stream_task = tokio::spawn(async move {
        if let Err(e) = stream.run().await {
            tracing::error!("Journal stream stopped: {}", e);
        }
    });

    let app = routes::api_routes()
        .with_state(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let listener = tokio::net::TcpListener::bind(config.bind_addr)
        .await
        .with_context(|| format!("failed to bind {}", config.bind_addr))?;
    tracing::info!("Scanner view at http://{}", config.bind_addr);

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = tokio::signal::ctrl_c().await;
            tracing::info!("Shutdown signal received");
            stream_shutdown.notify_one();
        })
        .await
        .context("HTTP server failed")?;

    let _ = stream_task.await;
    let _ = processor_task.await;
    tracing::info!("Momentum scanner stopped");
    Ok(())
}
