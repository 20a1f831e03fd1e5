//! Prometheus metrics for the prediction service.
//!
//! The prediction tallies double as the dashboard: totals, the average age of
//! predicted filters, the Red alert count and a count per condition label are
//! read straight back from the collectors below. Nothing is persisted, so the
//! numbers cover the life of the current process.
//!
//! # Example
//! ```no_run
//! use oil_filter_predictor::metrics;
//! use oil_filter_predictor::models::ConditionLabel;
//!
//! metrics::init_metrics().unwrap();
//! metrics::record_prediction(ConditionLabel::Yellow, 120);
//! println!("{}", metrics::gather_metrics());
//! ```

use crate::error::AppError;
use crate::models::ConditionLabel;
use axum::{
    extract::{MatchedPath, Request},
    middleware::Next,
    response::Response,
};
use lazy_static::lazy_static;
use once_cell::sync::OnceCell;
use prometheus::{
    CounterVec, GaugeVec, Histogram, HistogramOpts, HistogramVec, Opts, Registry,
};
use serde::Serialize;
use std::collections::BTreeMap;
use std::time::Instant;

const NAMESPACE: &str = "oil_filter_predictor";

lazy_static! {
    /// Global Prometheus registry for all metrics
    pub static ref PROMETHEUS_REGISTRY: Registry = Registry::new();

    // ============================================================================
    // HTTP Metrics
    // ============================================================================

    /// Total number of HTTP requests received
    ///
    /// Labels: method, path, status_code
    pub static ref HTTP_REQUESTS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("http_requests_total", "Total number of HTTP requests")
            .namespace(NAMESPACE),
        &["method", "path", "status_code"]
    ).expect("Failed to create HTTP_REQUESTS_TOTAL metric");

    /// HTTP request duration in seconds
    ///
    /// Labels: method, path
    pub static ref HTTP_REQUEST_DURATION_SECONDS: HistogramVec = HistogramVec::new(
        HistogramOpts::new(
            "http_request_duration_seconds",
            "HTTP request duration in seconds"
        )
        .namespace(NAMESPACE)
        .buckets(vec![0.001, 0.005, 0.01, 0.025, 0.05, 0.1, 0.25, 0.5, 1.0]),
        &["method", "path"]
    ).expect("Failed to create HTTP_REQUEST_DURATION_SECONDS metric");

    // ============================================================================
    // Prediction Metrics
    // ============================================================================

    /// Predictions served
    ///
    /// Labels: condition
    pub static ref PREDICTIONS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("predictions_total", "Total number of condition predictions")
            .namespace(NAMESPACE),
        &["condition"]
    ).expect("Failed to create PREDICTIONS_TOTAL metric");

    /// Filter age of every predicted input, in days
    pub static ref PREDICTED_FILTER_AGE_DAYS: Histogram = Histogram::with_opts(
        HistogramOpts::new(
            "predicted_filter_age_days",
            "Oil filter age of predicted inputs in days"
        )
        .namespace(NAMESPACE)
        .buckets(vec![30.0, 90.0, 180.0, 270.0, 330.0, 400.0, 730.0])
    ).expect("Failed to create PREDICTED_FILTER_AGE_DAYS metric");

    /// Failed predictions
    ///
    /// Labels: error_type
    pub static ref PREDICTION_ERRORS_TOTAL: CounterVec = CounterVec::new(
        Opts::new("prediction_errors_total", "Total number of failed predictions")
            .namespace(NAMESPACE),
        &["error_type"]
    ).expect("Failed to create PREDICTION_ERRORS_TOTAL metric");

    // ============================================================================
    // System Metrics
    // ============================================================================

    /// Loaded model
    ///
    /// Labels: model_type, trained_at
    pub static ref MODEL_INFO: GaugeVec = GaugeVec::new(
        Opts::new("model_info", "Currently loaded model")
            .namespace(NAMESPACE),
        &["model_type", "trained_at"]
    ).expect("Failed to create MODEL_INFO metric");

    /// Application build info
    ///
    /// Labels: version
    pub static ref BUILD_INFO: GaugeVec = GaugeVec::new(
        Opts::new("build_info", "Application build information")
            .namespace(NAMESPACE),
        &["version"]
    ).expect("Failed to create BUILD_INFO metric");
}

static METRICS_INIT: OnceCell<()> = OnceCell::new();

/// Register every collector with [`PROMETHEUS_REGISTRY`].
///
/// Safe to call more than once; registration happens on the first call only.
pub fn init_metrics() -> Result<(), prometheus::Error> {
    METRICS_INIT
        .get_or_try_init(|| {
            PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUESTS_TOTAL.clone()))?;
            PROMETHEUS_REGISTRY.register(Box::new(HTTP_REQUEST_DURATION_SECONDS.clone()))?;

            PROMETHEUS_REGISTRY.register(Box::new(PREDICTIONS_TOTAL.clone()))?;
            PROMETHEUS_REGISTRY.register(Box::new(PREDICTED_FILTER_AGE_DAYS.clone()))?;
            PROMETHEUS_REGISTRY.register(Box::new(PREDICTION_ERRORS_TOTAL.clone()))?;

            PROMETHEUS_REGISTRY.register(Box::new(MODEL_INFO.clone()))?;
            PROMETHEUS_REGISTRY.register(Box::new(BUILD_INFO.clone()))?;

            BUILD_INFO
                .with_label_values(&[env!("CARGO_PKG_VERSION")])
                .set(1.0);

            tracing::info!("Prometheus metrics initialized successfully");
            Ok(())
        })
        .map(|_| ())
}

/// Generate Prometheus text format metrics
pub fn gather_metrics() -> String {
    use prometheus::Encoder;
    let encoder = prometheus::TextEncoder::new();
    let metric_families = PROMETHEUS_REGISTRY.gather();
    let mut buffer = Vec::new();

    if let Err(e) = encoder.encode(&metric_families, &mut buffer) {
        tracing::error!("Failed to encode metrics: {}", e);
        return String::from("# Error encoding metrics\n");
    }

    String::from_utf8(buffer).unwrap_or_else(|e| {
        tracing::error!("Failed to convert metrics to string: {}", e);
        String::from("# Error converting metrics\n")
    })
}

/// Count one served prediction
pub fn record_prediction(label: ConditionLabel, age_days: i64) {
    PREDICTIONS_TOTAL
        .with_label_values(&[&label.to_string()])
        .inc();
    PREDICTED_FILTER_AGE_DAYS.observe(age_days as f64);
}

/// Count one failed prediction, keyed by error code
pub fn record_prediction_error(error: &AppError) {
    PREDICTION_ERRORS_TOTAL
        .with_label_values(&[error.error_code()])
        .inc();
}

/// Publish the loaded model's identity
pub fn record_model_loaded(model_type: &str, trained_at: &str) {
    MODEL_INFO
        .with_label_values(&[model_type, trained_at])
        .set(1.0);
}

/// Live prediction tallies for the dashboard
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DashboardSnapshot {
    pub total_predictions: u64,
    /// Mean filter age of predicted inputs; absent before the first prediction
    pub average_filter_age_days: Option<f64>,
    pub red_alerts: u64,
    pub by_condition: BTreeMap<String, u64>,
}

/// Read the dashboard tallies back from the collectors
pub fn dashboard_snapshot() -> DashboardSnapshot {
    let by_condition: BTreeMap<String, u64> = ConditionLabel::all()
        .into_iter()
        .map(|label| {
            let name = label.to_string();
            let count = PREDICTIONS_TOTAL.with_label_values(&[&name]).get() as u64;
            (name, count)
        })
        .collect();

    let total_predictions = by_condition.values().sum();
    let red_alerts = by_condition
        .get(&ConditionLabel::Red.to_string())
        .copied()
        .unwrap_or(0);

    let observed = PREDICTED_FILTER_AGE_DAYS.get_sample_count();
    let average_filter_age_days = if observed > 0 {
        Some(PREDICTED_FILTER_AGE_DAYS.get_sample_sum() / observed as f64)
    } else {
        None
    };

    DashboardSnapshot {
        total_predictions,
        average_filter_age_days,
        red_alerts,
        by_condition,
    }
}

/// Axum middleware recording request counts and latencies
pub async fn track_http_metrics(req: Request, next: Next) -> Response {
    let method = req.method().to_string();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| req.uri().path().to_string());

    let start = Instant::now();
    let response = next.run(req).await;
    let status = response.status().as_u16().to_string();

    HTTP_REQUESTS_TOTAL
        .with_label_values(&[&method, &path, &status])
        .inc();
    HTTP_REQUEST_DURATION_SECONDS
        .with_label_values(&[&method, &path])
        .observe(start.elapsed().as_secs_f64());

    response
}
