use crate::dataset::FeatureTable;
use crate::error::{AppError, Result};
use crate::ml::classifier::{Classifier, FittedClassifier};
use crate::ml::models::{ModelMetadata, ModelType};
use crate::ml::preprocess::ColumnTransformer;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

/// Version of the on-disk artifact layout
pub const ARTIFACT_FORMAT_VERSION: u32 = 1;

/// Importance of one named feature
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureImportance {
    pub feature: String,
    pub importance: f64,
}

/// Preprocessing + classifier + class names, fitted together
#[derive(Debug, Serialize, Deserialize)]
pub struct TrainedPipeline {
    metadata: ModelMetadata,
    preprocessor: ColumnTransformer,
    classifier: FittedClassifier,
    /// Class name per classifier output index, sorted
    classes: Vec<String>,
}

#[derive(Serialize, Deserialize)]
struct ArtifactEnvelope {
    format_version: u32,
    checksum: String,
    payload: Vec<u8>,
}

fn checksum(bytes: &[u8]) -> String {
    use sha2::{Digest, Sha256};

    let mut hasher = Sha256::new();
    hasher.update(bytes);
    format!("{:x}", hasher.finalize())
}

impl TrainedPipeline {
    pub fn new(
        metadata: ModelMetadata,
        preprocessor: ColumnTransformer,
        classifier: FittedClassifier,
        classes: Vec<String>,
    ) -> Self {
        Self {
            metadata,
            preprocessor,
            classifier,
            classes,
        }
    }

    pub fn metadata(&self) -> &ModelMetadata {
        &self.metadata
    }

    pub fn classes(&self) -> &[String] {
        &self.classes
    }

    pub fn model_type(&self) -> ModelType {
        self.classifier.model_type()
    }

    pub fn preprocessor(&self) -> &ColumnTransformer {
        &self.preprocessor
    }

    /// Predict one class label per row of `table`
    pub fn predict(&self, table: &FeatureTable) -> Result<Vec<String>> {
        let features = self.preprocessor.transform(table)?;
        let indices = self.classifier.predict(&features)?;

        indices
            .into_iter()
            .map(|index| {
                self.classes.get(index).cloned().ok_or_else(|| {
                    AppError::UnknownLabel(format!("class index {} out of range", index))
                })
            })
            .collect()
    }

    /// Importances of the transformed features, highest first
    pub fn feature_importances(&self) -> Option<Vec<FeatureImportance>> {
        let importances = self.classifier.feature_importances()?;
        let mut named: Vec<FeatureImportance> = self
            .preprocessor
            .feature_names_out()
            .into_iter()
            .zip(importances.iter())
            .map(|(feature, &importance)| FeatureImportance {
                feature,
                importance,
            })
            .collect();
        sort_descending(&mut named);
        Some(named)
    }

    /// Importances summed back onto the input columns, highest first
    pub fn input_importances(&self) -> Option<Vec<FeatureImportance>> {
        let importances = self.classifier.feature_importances()?;
        let sources = self.preprocessor.source_columns();

        let mut totals: Vec<FeatureImportance> = self
            .preprocessor
            .schema()
            .iter()
            .map(|(name, _)| FeatureImportance {
                feature: name.clone(),
                importance: 0.0,
            })
            .collect();
        for (source, &importance) in sources.iter().zip(importances.iter()) {
            if let Some(total) = totals.iter_mut().find(|t| t.feature == *source) {
                total.importance += importance;
            }
        }
        sort_descending(&mut totals);
        Some(totals)
    }

    /// Serialize into the checksummed artifact envelope
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let payload = bincode::serialize(self)?;
        let envelope = ArtifactEnvelope {
            format_version: ARTIFACT_FORMAT_VERSION,
            checksum: checksum(&payload),
            payload,
        };
        Ok(bincode::serialize(&envelope)?)
    }

    /// Decode an artifact envelope; any defect is an `ArtifactLoad` error
    pub fn from_bytes(bytes: &[u8]) -> Result<Self> {
        let envelope: ArtifactEnvelope = bincode::deserialize(bytes)
            .map_err(|e| AppError::ArtifactLoad(format!("unreadable artifact: {}", e)))?;

        if envelope.format_version != ARTIFACT_FORMAT_VERSION {
            return Err(AppError::ArtifactLoad(format!(
                "artifact format version {} is not supported (expected {})",
                envelope.format_version, ARTIFACT_FORMAT_VERSION
            )));
        }
        if checksum(&envelope.payload) != envelope.checksum {
            return Err(AppError::ArtifactLoad(
                "artifact checksum mismatch".to_string(),
            ));
        }

        bincode::deserialize(&envelope.payload)
            .map_err(|e| AppError::ArtifactLoad(format!("corrupt pipeline payload: {}", e)))
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let bytes = self.to_bytes()?;
        std::fs::write(path, &bytes)?;
        info!(path = %path.display(), bytes = bytes.len(), "Pipeline saved");
        Ok(())
    }

    pub fn load(path: &Path) -> Result<Self> {
        let bytes = std::fs::read(path).map_err(|e| {
            AppError::ArtifactLoad(format!("cannot read {}: {}", path.display(), e))
        })?;
        let pipeline = Self::from_bytes(&bytes)?;
        info!(
            path = %path.display(),
            model_type = %pipeline.model_type(),
            "Pipeline loaded"
        );
        Ok(pipeline)
    }
}

fn sort_descending(importances: &mut [FeatureImportance]) {
    importances.sort_by(|a, b| {
        b.importance
            .partial_cmp(&a.importance)
            .unwrap_or(std::cmp::Ordering::Equal)
    });
}
