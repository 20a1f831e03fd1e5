use ndarray::Array2;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Model type enumeration
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ModelType {
    /// Random forest (supports feature importances)
    #[default]
    RandomForest,

    /// Single decision tree
    DecisionTree,
}

impl std::fmt::Display for ModelType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ModelType::RandomForest => write!(f, "Random Forest"),
            ModelType::DecisionTree => write!(f, "Decision Tree"),
        }
    }
}

impl std::str::FromStr for ModelType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "random_forest" => Ok(ModelType::RandomForest),
            "decision_tree" => Ok(ModelType::DecisionTree),
            other => Err(format!(
                "unknown model type '{}', expected random_forest or decision_tree",
                other
            )),
        }
    }
}

/// How training rows are weighted per class
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(rename_all = "snake_case")]
pub enum ClassWeight {
    /// Every class contributes as many rows as the most frequent one
    #[default]
    Balanced,

    /// Rows are used as they come
    None,
}

/// Model evaluation metrics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMetrics {
    /// Accuracy
    pub accuracy: f64,

    /// Macro-averaged precision
    pub precision: f64,

    /// Macro-averaged recall
    pub recall: f64,

    /// Macro-averaged F1 score
    pub f1_score: f64,

    /// Support-weighted precision
    pub weighted_precision: f64,

    /// Support-weighted recall
    pub weighted_recall: f64,

    /// Support-weighted F1 score
    pub weighted_f1_score: f64,

    /// Confusion matrix, rows = true class, columns = predicted class
    pub confusion_matrix: Option<Array2<usize>>,

    /// Per-class metrics keyed by class label
    pub per_class_metrics: BTreeMap<String, ClassMetrics>,

    /// Number of evaluated samples
    pub support: usize,
}

/// Per-class evaluation metrics
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1_score: f64,
    pub support: usize,
}

impl ModelMetrics {
    pub fn new() -> Self {
        Self {
            accuracy: 0.0,
            precision: 0.0,
            recall: 0.0,
            f1_score: 0.0,
            weighted_precision: 0.0,
            weighted_recall: 0.0,
            weighted_f1_score: 0.0,
            confusion_matrix: None,
            per_class_metrics: BTreeMap::new(),
            support: 0,
        }
    }
}

impl Default for ModelMetrics {
    fn default() -> Self {
        Self::new()
    }
}

/// Model metadata
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ModelMetadata {
    /// Model name
    pub name: String,

    /// Crate version that produced the model
    pub version: String,

    /// Model type
    pub model_type: ModelType,

    /// Training timestamp
    pub trained_at: chrono::DateTime<chrono::Utc>,

    /// Number of training samples before class balancing
    pub n_training_samples: usize,

    /// Number of held-out samples
    pub n_test_samples: usize,

    /// Number of input columns
    pub n_input_columns: usize,

    /// Number of features after preprocessing
    pub n_features: usize,

    /// Held-out evaluation metrics
    pub validation_metrics: Option<ModelMetrics>,

    /// Hyperparameters
    pub hyperparameters: BTreeMap<String, String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_model_type_display() {
        assert_eq!(ModelType::RandomForest.to_string(), "Random Forest");
        assert_eq!(ModelType::DecisionTree.to_string(), "Decision Tree");
    }

    #[test]
    fn test_model_type_parse() {
        assert_eq!(
            "decision_tree".parse::<ModelType>().unwrap(),
            ModelType::DecisionTree
        );
        assert!("svm".parse::<ModelType>().is_err());
    }

    #[test]
    fn test_defaults() {
        assert_eq!(ModelType::default(), ModelType::RandomForest);
        assert_eq!(ClassWeight::default(), ClassWeight::Balanced);
        let metrics = ModelMetrics::default();
        assert_eq!(metrics.accuracy, 0.0);
        assert!(metrics.confusion_matrix.is_none());
    }

    #[test]
    fn test_class_weight_serde() {
        let json = serde_json::to_string(&ClassWeight::Balanced).unwrap();
        assert_eq!(json, "\"balanced\"");
        let parsed: ClassWeight = serde_json::from_str("\"none\"").unwrap();
        assert_eq!(parsed, ClassWeight::None);
    }
}
