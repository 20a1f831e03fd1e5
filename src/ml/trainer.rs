use crate::config::TrainingConfig;
use crate::dataset::schema::{self, DATE_COLUMNS, FEATURE_COLUMNS, TARGET_COLUMN};
use crate::dataset::{FeatureTable, Frame};
use crate::error::{AppError, Result};
use crate::ml::classifier::{ClassifierParams, FittedClassifier};
use crate::ml::metrics::{calculate_metrics, format_report};
use crate::ml::models::{ClassWeight, ModelMetadata, ModelMetrics};
use crate::ml::pipeline::TrainedPipeline;
use crate::ml::preprocess::ColumnTransformer;
use crate::ml::Classifier;
use ndarray::Axis;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use tracing::{debug, info};

/// Result of a training run
#[derive(Debug)]
pub struct TrainingOutcome {
    pub pipeline: TrainedPipeline,
    /// Held-out metrics; absent when no test rows were requested
    pub metrics: Option<ModelMetrics>,
    /// Printable classification report for `metrics`
    pub report: Option<String>,
}

/// Fits a pipeline on the generated dataset
pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &TrainingConfig {
        &self.config
    }

    pub fn train_file(&self, path: &Path) -> Result<TrainingOutcome> {
        info!(path = %path.display(), "Loading training dataset");
        let frame = Frame::read_csv(path)?;
        self.train_frame(frame)
    }

    pub fn train_frame(&self, mut frame: Frame) -> Result<TrainingOutcome> {
        let mut required: Vec<&str> = FEATURE_COLUMNS.iter().map(|spec| spec.name).collect();
        required.extend(DATE_COLUMNS);
        required.push(TARGET_COLUMN);
        frame.require_columns(&required)?;
        frame.drop_columns(&DATE_COLUMNS);

        let targets: Vec<String> = frame
            .column(TARGET_COLUMN)
            .unwrap_or_default()
            .into_iter()
            .map(str::to_string)
            .collect();
        let classes: Vec<String> = targets
            .iter()
            .cloned()
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect();
        if classes.len() < 2 {
            return Err(AppError::FitData(format!(
                "need at least two distinct classes, found {}",
                classes.len()
            )));
        }
        let labels: Vec<usize> = targets
            .iter()
            .map(|t| classes.binary_search(t).unwrap_or_default())
            .collect();

        let features = FeatureTable::from_frame(&frame, FEATURE_COLUMNS.iter())?;

        let (train_idx, test_idx) = self.split(features.n_rows())?;
        let train_table = features.select_rows(&train_idx);
        let train_labels: Vec<usize> = train_idx.iter().map(|&i| labels[i]).collect();

        let distinct_train = train_labels.iter().collect::<BTreeSet<_>>().len();
        if distinct_train < 2 {
            return Err(AppError::FitData(
                "training split holds a single class".to_string(),
            ));
        }

        let preprocessor = ColumnTransformer::fit(&train_table, &schema::feature_schema())?;
        let mut x_train = preprocessor.transform(&train_table)?;
        let mut y_train = train_labels;

        if self.config.class_weight == ClassWeight::Balanced {
            let resampled = balanced_indices(&y_train, self.config.seed);
            debug!(
                before = y_train.len(),
                after = resampled.len(),
                "Balanced training classes by oversampling"
            );
            x_train = x_train.select(Axis(0), &resampled);
            y_train = resampled.iter().map(|&i| y_train[i]).collect();
        }

        let params = ClassifierParams {
            n_trees: self.config.n_trees,
            max_depth: self.config.max_depth,
            seed: self.config.seed,
            importance_sample_size: self.config.importance_sample_size,
        };
        info!(
            model_type = %self.config.model_type,
            rows = x_train.nrows(),
            features = x_train.ncols(),
            "Fitting classifier"
        );
        let classifier = FittedClassifier::fit(self.config.model_type, &x_train, &y_train, &params)?;

        let (metrics, report) = if test_idx.is_empty() {
            (None, None)
        } else {
            let x_test = preprocessor.transform(&features.select_rows(&test_idx))?;
            let y_test: Vec<usize> = test_idx.iter().map(|&i| labels[i]).collect();
            let predictions = classifier.predict(&x_test)?;
            let metrics = calculate_metrics(&y_test, &predictions, &classes);
            let report = format_report(&metrics, &classes);
            info!(
                accuracy = metrics.accuracy,
                macro_f1 = metrics.f1_score,
                weighted_f1 = metrics.weighted_f1_score,
                "Held-out evaluation"
            );
            (Some(metrics), Some(report))
        };

        let metadata = ModelMetadata {
            name: "oil-filter-condition".to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            model_type: self.config.model_type,
            trained_at: chrono::Utc::now(),
            n_training_samples: train_idx.len(),
            n_test_samples: test_idx.len(),
            n_input_columns: FEATURE_COLUMNS.len(),
            n_features: preprocessor.n_features_out(),
            validation_metrics: metrics.clone(),
            hyperparameters: self.hyperparameters(),
        };

        Ok(TrainingOutcome {
            pipeline: TrainedPipeline::new(metadata, preprocessor, classifier, classes),
            metrics,
            report,
        })
    }

    /// Seeded shuffle, then the first `train_size` rows train and the next `test_size` test
    fn split(&self, n_rows: usize) -> Result<(Vec<usize>, Vec<usize>)> {
        let train_size = self.config.train_size;
        let test_size = self.config.test_size;

        if train_size == 0 {
            return Err(AppError::FitData("train_size must be positive".to_string()));
        }
        let needed = train_size.checked_add(test_size).ok_or_else(|| {
            AppError::FitData(format!(
                "train_size {} plus test_size {} overflows",
                train_size, test_size
            ))
        })?;
        if n_rows < needed {
            return Err(AppError::FitData(format!(
                "dataset has {} rows, need {} for training and {} for testing",
                n_rows, train_size, test_size
            )));
        }

        let mut indices: Vec<usize> = (0..n_rows).collect();
        let mut rng = StdRng::seed_from_u64(self.config.seed);
        indices.shuffle(&mut rng);

        let test = indices[train_size..needed].to_vec();
        indices.truncate(train_size);
        Ok((indices, test))
    }

    fn hyperparameters(&self) -> BTreeMap<String, String> {
        let mut params = BTreeMap::new();
        params.insert("n_trees".to_string(), self.config.n_trees.to_string());
        params.insert(
            "max_depth".to_string(),
            self.config
                .max_depth
                .map(|d| d.to_string())
                .unwrap_or_else(|| "none".to_string()),
        );
        params.insert(
            "class_weight".to_string(),
            format!("{:?}", self.config.class_weight).to_lowercase(),
        );
        params.insert("seed".to_string(), self.config.seed.to_string());
        params
    }
}

/// Row indices in which every class appears as often as the most frequent one.
///
/// Each class keeps all of its rows and is topped up by drawing its own rows
/// with replacement.
pub fn balanced_indices(labels: &[usize], seed: u64) -> Vec<usize> {
    let mut by_class: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (i, &label) in labels.iter().enumerate() {
        by_class.entry(label).or_default().push(i);
    }
    let target = by_class.values().map(Vec::len).max().unwrap_or(0);

    let mut rng = StdRng::seed_from_u64(seed);
    let mut indices = Vec::with_capacity(target * by_class.len());
    for rows in by_class.values() {
        indices.extend_from_slice(rows);
        for _ in rows.len()..target {
            indices.push(rows[rng.gen_range(0..rows.len())]);
        }
    }
    indices
}

/// Train per `config`, save the pipeline to `config.model_path`
pub fn train_from_config(config: &TrainingConfig) -> Result<TrainingOutcome> {
    let trainer = Trainer::new(config.clone());
    let outcome = trainer.train_file(&config.dataset_path)?;
    outcome.pipeline.save(&config.model_path)?;
    Ok(outcome)
}
