use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::alerts::{AlertCounts, AlertDto, AlertEngine, AlertSeverity};
use crate::data::{AqiBand, Forecast, Reading};
use crate::storage::{AlertLog, ReadingStats, ReadingStore};

/// Application state shared across handlers
pub struct AppState {
    pub engine: Arc<AlertEngine>,
    pub store: Arc<ReadingStore>,
    pub alert_log: Arc<AlertLog>,
}

/// Store a reading and run it through the alert engine
///
/// Shared by the HTTP ingest handler and the demo simulator so both paths
/// behave identically.
pub fn ingest_reading(state: &AppState, reading: Reading) -> (Reading, Vec<AlertDto>) {
    let stored = state.store.insert(reading);
    let alerts: Vec<AlertDto> = state
        .engine
        .process_reading(&stored)
        .iter()
        .map(|a| a.to_dto())
        .collect();

    tracing::debug!(
        reading_id = ?stored.id,
        aqi = stored.aqi,
        alerts = alerts.len(),
        "Reading ingested"
    );

    (stored, alerts)
}

// ============================================================================
// Health Check
// ============================================================================

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub version: &'static str,
}

pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

// ============================================================================
// Readings
// ============================================================================

#[derive(Serialize)]
pub struct IngestResponse {
    pub reading: Reading,
    pub alerts: Vec<AlertDto>,
}

pub async fn post_reading(
    State(state): State<Arc<AppState>>,
    Json(reading): Json<Reading>,
) -> Json<IngestResponse> {
    let (reading, alerts) = ingest_reading(&state, reading);
    Json(IngestResponse { reading, alerts })
}

pub async fn latest_reading(
    State(state): State<Arc<AppState>>,
) -> Result<Json<Reading>, ApiError> {
    state
        .store
        .latest()
        .map(Json)
        .ok_or_else(|| ApiError::NotFound("No readings available".to_string()))
}

#[derive(Deserialize)]
pub struct RecentQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

fn default_limit() -> usize {
    100
}

#[derive(Serialize)]
pub struct ReadingsResponse {
    pub readings: Vec<Reading>,
    pub count: usize,
}

pub async fn recent_readings(
    State(state): State<Arc<AppState>>,
    Query(query): Query<RecentQuery>,
) -> Json<ReadingsResponse> {
    let readings = state.store.recent(query.limit);
    Json(ReadingsResponse {
        count: readings.len(),
        readings,
    })
}

#[derive(Deserialize)]
pub struct StatsQuery {
    #[serde(default = "default_hours")]
    pub hours: i64,
}

fn default_hours() -> i64 {
    24
}

pub async fn stats(
    State(state): State<Arc<AppState>>,
    Query(query): Query<StatsQuery>,
) -> Json<ReadingStats> {
    Json(state.store.stats(query.hours))
}

// ============================================================================
// AQI Category
// ============================================================================

#[derive(Deserialize)]
pub struct CategoryQuery {
    pub aqi: i64,
}

#[derive(Serialize)]
pub struct CategoryResponse {
    pub aqi: i64,
    pub band: AqiBand,
    pub label: &'static str,
    pub color: &'static str,
    pub recommendation: &'static str,
}

pub async fn aqi_category(Query(query): Query<CategoryQuery>) -> Json<CategoryResponse> {
    let band = AqiBand::from_aqi(query.aqi);
    Json(CategoryResponse {
        aqi: query.aqi,
        band,
        label: band.label(),
        color: band.color(),
        recommendation: band.recommendation(),
    })
}

// ============================================================================
// Forecast
// ============================================================================

#[derive(Serialize)]
pub struct ForecastResponse {
    pub points_scanned: usize,
    pub alerts: Vec<AlertDto>,
}

pub async fn post_forecast(
    State(state): State<Arc<AppState>>,
    Json(forecast): Json<Forecast>,
) -> Json<ForecastResponse> {
    let alerts: Vec<AlertDto> = state
        .engine
        .process_forecast(&forecast)
        .iter()
        .map(|a| a.to_dto())
        .collect();

    Json(ForecastResponse {
        points_scanned: forecast.points.len(),
        alerts,
    })
}

// ============================================================================
// Alerts
// ============================================================================

#[derive(Deserialize)]
pub struct AlertsQuery {
    #[serde(default)]
    pub include_acknowledged: bool,
}

#[derive(Serialize)]
pub struct AlertsResponse {
    pub alerts: Vec<AlertDto>,
    pub counts: AlertCounts,
}

pub async fn list_alerts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<AlertsQuery>,
) -> Json<AlertsResponse> {
    Json(AlertsResponse {
        alerts: state.engine.active_alerts(query.include_acknowledged),
        counts: state.engine.counts(),
    })
}

pub async fn active_alerts(State(state): State<Arc<AppState>>) -> Json<AlertsResponse> {
    Json(AlertsResponse {
        alerts: state.engine.active_alerts(false),
        counts: state.engine.counts(),
    })
}

pub async fn alert_counts(State(state): State<Arc<AppState>>) -> Json<AlertCounts> {
    Json(state.engine.counts())
}

#[derive(Deserialize)]
pub struct LogQuery {
    #[serde(default = "default_limit")]
    pub limit: usize,
}

#[derive(Serialize)]
pub struct AlertLogResponse {
    pub alerts: Vec<AlertDto>,
}

pub async fn alert_log(
    State(state): State<Arc<AppState>>,
    Query(query): Query<LogQuery>,
) -> Json<AlertLogResponse> {
    Json(AlertLogResponse {
        alerts: state.alert_log.recent(query.limit),
    })
}

#[derive(Serialize)]
pub struct AlertActionResponse {
    pub success: bool,
    pub alert_id: String,
}

pub async fn acknowledge_alert(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<String>,
) -> Result<Json<AlertActionResponse>, ApiError> {
    if state.engine.acknowledge(&alert_id) {
        Ok(Json(AlertActionResponse {
            success: true,
            alert_id,
        }))
    } else {
        Err(ApiError::NotFound(format!("Alert '{}' not found", alert_id)))
    }
}

pub async fn dismiss_alert(
    State(state): State<Arc<AppState>>,
    Path(alert_id): Path<String>,
) -> Json<AlertActionResponse> {
    // Dismissal is idempotent by design, so this cannot fail.
    state.engine.dismiss(&alert_id);
    Json(AlertActionResponse {
        success: true,
        alert_id,
    })
}

#[derive(Deserialize)]
pub struct SystemAlertRequest {
    #[serde(default = "default_system_title")]
    pub title: String,
    #[serde(default = "default_system_message")]
    pub message: String,
    #[serde(default = "default_system_severity")]
    pub severity: AlertSeverity,
}

fn default_system_title() -> String {
    "System Alert".to_string()
}

fn default_system_message() -> String {
    "Manually created alert".to_string()
}

fn default_system_severity() -> AlertSeverity {
    AlertSeverity::Warning
}

pub async fn create_system_alert(
    State(state): State<Arc<AppState>>,
    Json(request): Json<SystemAlertRequest>,
) -> Json<AlertDto> {
    let alert =
        state
            .engine
            .create_system_alert(&request.title, &request.message, request.severity);
    Json(alert.to_dto())
}

// ============================================================================
// Error Handling
// ============================================================================

#[derive(Debug)]
pub enum ApiError {
    BadRequest(String),
    NotFound(String),
    Internal(String),
}

impl IntoResponse for ApiError {
    fn into_response(self) -> axum::response::Response {
        let (status, message) = match self {
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, msg),
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, msg),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, msg),
        };

        let body = serde_json::json!({
            "error": message
        });

        (status, Json(body)).into_response()
    }
}
