use crate::ml::{FeatureImportance, ModelMetadata, TrainedPipeline};
use serde::Serialize;

/// What the loaded model can say about itself
#[derive(Debug, Clone, Serialize)]
pub struct ModelInsights {
    pub model_type: String,
    pub metadata: ModelMetadata,
    pub classes: Vec<String>,
    /// Transformed-feature importances, highest first
    pub feature_importances: Option<Vec<FeatureImportance>>,
    /// Importances summed per input column, highest first
    pub input_importances: Option<Vec<FeatureImportance>>,
    /// Why importances are missing, when they are
    pub note: Option<String>,
}

impl ModelInsights {
    pub fn from_pipeline(pipeline: &TrainedPipeline) -> Self {
        let feature_importances = pipeline.feature_importances();
        let input_importances = pipeline.input_importances();
        let note = feature_importances.is_none().then(|| {
            format!(
                "Feature importances are unavailable for the {} model",
                pipeline.model_type()
            )
        });

        Self {
            model_type: pipeline.model_type().to_string(),
            metadata: pipeline.metadata().clone(),
            classes: pipeline.classes().to_vec(),
            feature_importances,
            input_importances,
            note,
        }
    }

    pub fn importances_available(&self) -> bool {
        self.feature_importances.is_some()
    }

    /// Human-readable summary for the CLI
    pub fn render(&self) -> String {
        let mut lines = vec![
            format!("Model: {}", self.model_type),
            format!("Trained: {}", self.metadata.trained_at.to_rfc3339()),
            format!(
                "Samples: {} train / {} test",
                self.metadata.n_training_samples, self.metadata.n_test_samples
            ),
        ];
        if let Some(metrics) = &self.metadata.validation_metrics {
            lines.push(format!("Held-out accuracy: {:.3}", metrics.accuracy));
        }

        match &self.input_importances {
            Some(importances) => {
                lines.push("Feature importances:".to_string());
                for item in importances {
                    lines.push(format!("  {:<24} {:.4}", item.feature, item.importance));
                }
            }
            None => {
                if let Some(note) = &self.note {
                    lines.push(note.clone());
                }
            }
        }

        lines.join("\n")
    }
}
