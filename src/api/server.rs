use axum::{
    routing::{delete, get, post},
    Router,
};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use super::handlers::{
    acknowledge_alert, active_alerts, alert_counts, alert_log, aqi_category, create_system_alert,
    dismiss_alert, health_check, ingest_reading, latest_reading, list_alerts, post_forecast,
    post_reading, recent_readings, stats, AppState,
};
use crate::alerts::{AlertConfig, AlertEngine, LogObserver, WebhookObserver};
use crate::sim::Simulator;
use crate::storage::{AlertLog, ReadingStore};

/// Server configuration
#[derive(Debug, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Run the built-in sensor simulator instead of waiting for ingest
    pub demo: bool,
    pub demo_interval_secs: u64,
    /// Optional webhook URL for alert notifications
    pub webhook_url: Option<String>,
    pub alert_config: AlertConfig,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
            demo: false,
            demo_interval_secs: 3,
            webhook_url: None,
            alert_config: AlertConfig::default(),
        }
    }
}

/// Build the application router
pub fn build_router(state: Arc<AppState>) -> Router {
    Router::new()
        // Health check
        .route("/health", get(health_check))
        // Readings
        .route("/api/readings", post(post_reading))
        .route("/api/readings", get(recent_readings))
        .route("/api/latest", get(latest_reading))
        .route("/api/stats", get(stats))
        .route("/api/aqi/category", get(aqi_category))
        // Forecasts
        .route("/api/forecast", post(post_forecast))
        // Alerts
        .route("/api/alerts", get(list_alerts))
        .route("/api/alerts/active", get(active_alerts))
        .route("/api/alerts/counts", get(alert_counts))
        .route("/api/alerts/log", get(alert_log))
        .route("/api/alerts/system", post(create_system_alert))
        .route("/api/alerts/:id/acknowledge", post(acknowledge_alert))
        .route("/api/alerts/:id/dismiss", post(dismiss_alert))
        .route("/api/alerts/:id/dismiss", delete(dismiss_alert))
        // Middleware
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

/// Run the HTTP server
pub async fn run_server(config: ServerConfig) -> Result<(), Box<dyn std::error::Error>> {
    // Wire the engine: log observer always, webhook if configured, and the
    // in-memory alert log as the persistence sink.
    let engine = Arc::new(AlertEngine::new(config.alert_config.clone()));
    let store = Arc::new(ReadingStore::new());
    let alert_log = Arc::new(AlertLog::new());

    engine.register_observer(Arc::new(LogObserver));
    engine.set_sink(alert_log.clone());

    let mut webhook_handle = None;
    if let Some(url) = &config.webhook_url {
        let (observer, handle) = WebhookObserver::spawn(url.clone(), Default::default());
        engine.register_observer(observer);
        webhook_handle = Some(handle);
        tracing::info!(url = %url, "Webhook notifications enabled");
    }

    let state = Arc::new(AppState {
        engine,
        store,
        alert_log,
    });

    // Start the demo simulator if requested
    let simulator = Arc::new(Simulator::new(Duration::from_secs(
        config.demo_interval_secs,
    )));
    let sim_handle = if config.demo {
        let sim_state = Arc::clone(&state);
        Some(Arc::clone(&simulator).start(move |reading| {
            let (stored, alerts) = ingest_reading(&sim_state, reading);
            tracing::info!(
                aqi = stored.aqi,
                temperature = stored.temperature,
                humidity = stored.humidity,
                alerts = alerts.len(),
                "Simulated reading"
            );
        }))
    } else {
        None
    };

    // Build router
    let app = build_router(state);

    // Start server
    let addr: SocketAddr = format!("{}:{}", config.host, config.port).parse()?;
    tracing::info!("Starting airwatch server on {}", addr);

    let listener = TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(Arc::clone(&simulator)))
        .await?;

    if let Some(handle) = sim_handle {
        handle.abort();
    }
    if let Some(handle) = webhook_handle {
        handle.abort();
    }

    tracing::info!("Airwatch server stopped");
    Ok(())
}

async fn shutdown_signal(simulator: Arc<Simulator>) {
    tokio::signal::ctrl_c()
        .await
        .expect("Failed to install CTRL+C signal handler");

    tracing::info!("Shutdown signal received, stopping workers...");
    simulator.stop();
}
