/// Machine learning pipeline for oil filter condition classification
///
/// This module provides:
/// - Standardization and one-hot preprocessing fitted on training rows
/// - Random forest and decision tree classifiers (smartcore)
/// - Permutation feature importances
/// - Held-out evaluation with a classification report
/// - A checksummed, versioned artifact format for the fitted pipeline

pub mod classifier;
pub mod metrics;
pub mod models;
pub mod pipeline;
pub mod preprocess;
pub mod trainer;

pub use classifier::{
    Classifier, ClassifierParams, DecisionTreeModel, FittedClassifier, RandomForestModel,
};
pub use metrics::{calculate_metrics, format_report};
pub use models::{ClassMetrics, ClassWeight, ModelMetadata, ModelMetrics, ModelType};
pub use pipeline::{FeatureImportance, TrainedPipeline, ARTIFACT_FORMAT_VERSION};
pub use preprocess::{ColumnTransformer, OneHotEncoder, StandardScaler};
pub use trainer::{balanced_indices, train_from_config, Trainer, TrainingOutcome};
