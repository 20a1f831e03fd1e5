/// Prediction surface
///
/// Turns a validated form into a feature record, runs it through the shared
/// pipeline and maps the predicted label to its icon, color and message.
pub mod form;
pub mod insights;

pub use form::FormInput;
pub use insights::ModelInsights;

use crate::error::{AppError, Result};
use crate::metrics;
use crate::ml::TrainedPipeline;
use crate::models::{ConditionLabel, FeatureRecord, Presentation};
use chrono::NaiveDate;
use once_cell::sync::OnceCell;
use serde::Serialize;
use std::path::Path;
use std::str::FromStr;
use std::sync::Arc;
use tracing::{debug, warn};

static SHARED_PIPELINE: OnceCell<Arc<TrainedPipeline>> = OnceCell::new();

/// Process-wide pipeline, loaded from `path` on first use.
///
/// Later calls return the already loaded pipeline whatever path they pass.
/// The first successful load publishes the model info gauge. A failed load
/// leaves the cell empty so the next call retries.
pub fn shared_pipeline(path: &Path) -> Result<Arc<TrainedPipeline>> {
    SHARED_PIPELINE
        .get_or_try_init(|| {
            let pipeline = TrainedPipeline::load(path)?;
            metrics::record_model_loaded(
                &pipeline.model_type().to_string(),
                &pipeline.metadata().trained_at.to_rfc3339(),
            );
            Ok(Arc::new(pipeline))
        })
        .cloned()
}

/// Presentation of a label given as its string form
pub fn present(label: &str) -> Result<(ConditionLabel, Presentation)> {
    let label = ConditionLabel::from_str(label)
        .map_err(|_| AppError::UnknownLabel(label.to_string()))?;
    Ok((label, label.presentation()))
}

/// One row of the label legend
#[derive(Debug, Clone, Serialize)]
pub struct LegendEntry {
    pub label: ConditionLabel,
    #[serde(flatten)]
    pub presentation: Presentation,
}

/// Every label with its presentation, freshest first
pub fn label_legend() -> Vec<LegendEntry> {
    ConditionLabel::all()
        .into_iter()
        .map(|label| LegendEntry {
            label,
            presentation: label.presentation(),
        })
        .collect()
}

/// Outcome of one prediction
#[derive(Debug, Clone, Serialize)]
pub struct Assessment {
    pub label: ConditionLabel,
    pub icon: &'static str,
    pub color: &'static str,
    pub message: &'static str,
    pub oil_filter_age_days: i64,
    pub critical: bool,
}

impl Assessment {
    fn new(label: ConditionLabel, presentation: Presentation, oil_filter_age_days: i64) -> Self {
        Self {
            label,
            icon: presentation.icon,
            color: presentation.color,
            message: presentation.message,
            oil_filter_age_days,
            critical: label.is_critical(),
        }
    }
}

/// Runs single-record predictions against a loaded pipeline
#[derive(Debug, Clone)]
pub struct Predictor {
    pipeline: Arc<TrainedPipeline>,
}

impl Predictor {
    pub fn new(pipeline: Arc<TrainedPipeline>) -> Self {
        Self { pipeline }
    }

    /// Predictor over the process-wide pipeline
    pub fn shared(path: &Path) -> Result<Self> {
        shared_pipeline(path).map(Self::new)
    }

    pub fn pipeline(&self) -> &TrainedPipeline {
        &self.pipeline
    }

    /// Predict the condition of one record
    pub fn predict_record(&self, record: &FeatureRecord) -> Result<ConditionLabel> {
        let labels = self.pipeline.predict(&record.to_table())?;
        let label = match labels.as_slice() {
            [label] => label,
            _ => {
                return Err(AppError::Internal(format!(
                    "expected one prediction, got {}",
                    labels.len()
                )))
            }
        };
        present(label).map(|(label, _)| label)
    }

    /// Validate the form, predict and present; every outcome is tallied
    pub fn assess(&self, form: &FormInput, today: NaiveDate) -> Result<Assessment> {
        let outcome = form
            .to_record(today)
            .and_then(|record| Ok((self.predict_record(&record)?, record.oil_filter_age_days)));

        match outcome {
            Ok((label, age_days)) => {
                metrics::record_prediction(label, age_days);
                debug!(%label, age_days, "Prediction served");
                Ok(Assessment::new(label, label.presentation(), age_days))
            }
            Err(e) => {
                metrics::record_prediction_error(&e);
                warn!(error = %e, "Prediction failed");
                Err(e)
            }
        }
    }

    pub fn insights(&self) -> ModelInsights {
        ModelInsights::from_pipeline(&self.pipeline)
    }
}
