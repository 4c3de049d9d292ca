//! Airwatch Server
//!
//! Run with: cargo run
//!
//! Environment variables:
//! - AIRWATCH_HOST: Bind address (default: 0.0.0.0)
//! - AIRWATCH_PORT: Port number (default: 8080)
//! - AIRWATCH_DEMO: Run the built-in sensor simulator (default: false)
//! - AIRWATCH_DEMO_INTERVAL_SECS: Seconds between simulated readings (default: 3)
//! - AIRWATCH_WEBHOOK_URL: Optional webhook for alert notifications
//! - RUST_LOG: Log level (default: info)

use airwatch::api::{run_server, ServerConfig};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "airwatch=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Parse configuration from environment
    let host = std::env::var("AIRWATCH_HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
    let port: u16 = std::env::var("AIRWATCH_PORT")
        .ok()
        .and_then(|p| p.parse().ok())
        .unwrap_or(8080);
    let demo = std::env::var("AIRWATCH_DEMO")
        .map(|v| v.eq_ignore_ascii_case("true") || v == "1")
        .unwrap_or(false);
    let demo_interval_secs = std::env::var("AIRWATCH_DEMO_INTERVAL_SECS")
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(3);
    let webhook_url = std::env::var("AIRWATCH_WEBHOOK_URL").ok();

    let config = ServerConfig {
        host,
        port,
        demo,
        demo_interval_secs,
        webhook_url,
        ..ServerConfig::default()
    };

    tracing::info!("Airwatch configuration:");
    tracing::info!("  Host: {}:{}", config.host, config.port);
    if config.demo {
        tracing::info!(
            "  Mode: DEMO (simulated readings every {}s)",
            config.demo_interval_secs
        );
    } else {
        tracing::info!("  Mode: LIVE (waiting for readings on POST /api/readings)");
    }
    if config.webhook_url.is_some() {
        tracing::info!("  Webhook notifications: enabled");
    }

    println!(
        r#"
        _                    _       _
   __ _(_)_ ____      ____ _| |_ ___| |__
  / _` | | '__\ \ /\ / / _` | __/ __| '_ \
 | (_| | | |   \ V  V / (_| | || (__| | | |
  \__,_|_|_|    \_/\_/ \__,_|\__\___|_| |_|

 Real-Time Air Quality Monitoring & Alerting
 Version: {}
"#,
        env!("CARGO_PKG_VERSION")
    );

    run_server(config).await
}
