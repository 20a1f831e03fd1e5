use crate::api::AppState;
use crate::error::Result;
use crate::metrics::{self, DashboardSnapshot};
use crate::predictor::{label_legend, Assessment, FormInput, LegendEntry, ModelInsights};
use axum::{
    extract::State,
    http::header,
    response::IntoResponse,
    Json,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Health check endpoint
pub async fn health_check(State(state): State<AppState>) -> Json<HealthResponse> {
    let model_loaded = state.predictor().is_ok();

    Json(HealthResponse {
        status: if model_loaded { "healthy" } else { "degraded" }.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        model_loaded,
        uptime_seconds: state.started_at.elapsed().as_secs(),
    })
}

#[derive(Debug, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub model_loaded: bool,
    pub uptime_seconds: u64,
}

/// Predict the condition of one vehicle's oil filter
pub async fn predict(
    State(state): State<AppState>,
    Json(request): Json<PredictRequest>,
) -> Result<Json<Assessment>> {
    let predictor = state.predictor()?;
    let today = request
        .today
        .unwrap_or_else(|| chrono::Local::now().date_naive());

    let assessment = predictor.assess(&request.form, today)?;
    Ok(Json(assessment))
}

#[derive(Debug, Deserialize)]
pub struct PredictRequest {
    #[serde(flatten)]
    pub form: FormInput,
    /// Reference date for the filter age; defaults to the server's local date
    #[serde(default)]
    pub today: Option<NaiveDate>,
}

/// All condition labels with their presentation
pub async fn list_labels() -> Json<Vec<LegendEntry>> {
    Json(label_legend())
}

/// Model type, training metadata and feature importances
pub async fn model_insights(State(state): State<AppState>) -> Result<Json<ModelInsights>> {
    let predictor = state.predictor()?;
    Ok(Json(predictor.insights()))
}

/// Live prediction tallies
pub async fn dashboard() -> Json<DashboardSnapshot> {
    Json(metrics::dashboard_snapshot())
}

/// Prometheus text exposition
pub async fn prometheus_metrics() -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        metrics::gather_metrics(),
    )
}
