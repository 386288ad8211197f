use std::sync::Arc;
use std::time::Duration;

use metrics_exporter_prometheus::PrometheusBuilder;
use tokio::net::TcpListener;
use tracing::{info, warn};

mod analysis;
mod api;
mod config;
mod error;
mod gemini;
mod i18n;
mod ingestion;
mod service;

use crate::api::AppState;
use crate::config::load_static_config;
use crate::gemini::GeminiClient;
use crate::i18n::I18n;
use crate::ingestion::PdfiumSource;
use crate::service::AnalysisService;

const METRICS_UPKEEP_INTERVAL: Duration = Duration::from_secs(5);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    init_logging();

    info!(
        "Starting Claribot analysis service v{}",
        env!("CARGO_PKG_VERSION")
    );

    let static_config = load_static_config()?;

    info!(
        host = %static_config.server.host,
        port = static_config.server.port,
        line_tolerance = static_config.reading_order.line_tolerance,
        "Configuration loaded"
    );

    // Ensure upload directory exists
    std::fs::create_dir_all(&static_config.upload.dir)?;

    let metrics = match PrometheusBuilder::new().install_recorder() {
        Ok(handle) => {
            // Histograms are only drained by upkeep when no HTTP listener is used
            let upkeep = handle.clone();
            tokio::spawn(async move {
                let mut interval = tokio::time::interval(METRICS_UPKEEP_INTERVAL);
                loop {
                    interval.tick().await;
                    upkeep.run_upkeep();
                }
            });
            Some(handle)
        }
        Err(e) => {
            warn!(error = %e, "Prometheus recorder unavailable, /metrics will be empty");
            None
        }
    };

    let gemini = GeminiClient::new(static_config.gemini.clone())?;
    if !gemini.is_configured() {
        warn!("GEMINI_API_KEY is not set, analysis requests will fail");
    }

    let service = Arc::new(AnalysisService::new(
        Arc::new(PdfiumSource::new()),
        Arc::new(gemini),
        static_config.reading_order.clone(),
        static_config.retry.clone(),
    ));

    let state = Arc::new(AppState::new(
        service,
        Arc::new(I18n::new()),
        static_config.upload.clone(),
        metrics,
    ));
    let app = api::router(state);

    // Start the server
    let addr = format!(
        "{}:{}",
        static_config.server.host, static_config.server.port
    );
    let listener = TcpListener::bind(&addr).await?;
    info!("Listening on {}", addr);

    axum::serve(listener, app).await?;

    Ok(())
}

fn init_logging() {
    use tracing_subscriber::{EnvFilter, fmt, prelude::*};

    let format = fmt::format()
        .with_target(true)
        .with_thread_ids(true)
        .compact();

    // Use RUST_LOG if set, otherwise default to info level for our crate
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("claribot_service=info"));

    tracing_subscriber::registry()
        .with(fmt::layer().event_format(format))
        .with(filter)
        .init();
}
