use crate::error::{AppError, Result};
use crate::ml::metrics::accuracy;
use crate::ml::models::ModelType;
use ndarray::{Array2, Axis};
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};
use smartcore::ensemble::random_forest_classifier::{
    RandomForestClassifier, RandomForestClassifierParameters,
};
use smartcore::linalg::basic::matrix::DenseMatrix;
use smartcore::tree::decision_tree_classifier::{
    DecisionTreeClassifier, DecisionTreeClassifierParameters, SplitCriterion,
};
use tracing::debug;

/// Trait for classifiers over preprocessed feature matrices
pub trait Classifier: Send + Sync {
    /// Predict class indices, one per row
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>>;

    /// Get model type
    fn model_type(&self) -> ModelType;

    /// Number of features the model was fitted on
    fn n_features(&self) -> usize;

    /// Per-feature importances summing to 1, when the model can report them
    fn feature_importances(&self) -> Option<&[f64]> {
        None
    }
}

/// Hyperparameters shared by the classifier implementations
#[derive(Debug, Clone, PartialEq)]
pub struct ClassifierParams {
    pub n_trees: u16,
    pub max_depth: Option<u16>,
    pub seed: u64,
    /// Rows scored when measuring permutation importances
    pub importance_sample_size: usize,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            n_trees: 300,
            max_depth: None,
            seed: 42,
            importance_sample_size: 400,
        }
    }
}

fn ndarray_to_densematrix(arr: &Array2<f64>) -> DenseMatrix<f64> {
    let shape = arr.shape();
    let data: Vec<f64> = arr.iter().copied().collect();
    DenseMatrix::new(shape[0], shape[1], data, false)
}

fn vec_to_labels(vec: &[usize]) -> Vec<i32> {
    vec.iter().map(|&x| x as i32).collect()
}

fn labels_to_vec(labels: &[i32]) -> Vec<usize> {
    labels.iter().map(|&x| x.max(0) as usize).collect()
}

fn check_width(expected: usize, features: &Array2<f64>) -> Result<()> {
    if features.ncols() != expected {
        return Err(AppError::SchemaMismatch(format!(
            "model expects {} features, got {}",
            expected,
            features.ncols()
        )));
    }
    Ok(())
}

fn check_fit_input(features: &Array2<f64>, labels: &[usize]) -> Result<()> {
    if features.nrows() == 0 {
        return Err(AppError::FitData("training set is empty".to_string()));
    }
    if features.nrows() != labels.len() {
        return Err(AppError::FitData(format!(
            "{} feature rows but {} labels",
            features.nrows(),
            labels.len()
        )));
    }
    Ok(())
}

/// Random forest classifier
#[derive(Serialize, Deserialize)]
pub struct RandomForestModel {
    model: RandomForestClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>,
    n_features: usize,
    n_trees: u16,
    importances: Vec<f64>,
}

impl RandomForestModel {
    pub fn fit(features: &Array2<f64>, labels: &[usize], params: &ClassifierParams) -> Result<Self> {
        check_fit_input(features, labels)?;

        let mut parameters = RandomForestClassifierParameters::default()
            .with_n_trees(params.n_trees)
            .with_seed(params.seed);
        if let Some(depth) = params.max_depth {
            parameters = parameters.with_max_depth(depth);
        }

        let x = ndarray_to_densematrix(features);
        let y = vec_to_labels(labels);
        let model = RandomForestClassifier::fit(&x, &y, parameters)
            .map_err(|e| AppError::FitData(format!("Failed to train random forest: {}", e)))?;

        let mut forest = Self {
            model,
            n_features: features.ncols(),
            n_trees: params.n_trees,
            importances: Vec::new(),
        };
        forest.importances = permutation_importances(&forest, features, labels, params)?;
        Ok(forest)
    }

    pub fn n_trees(&self) -> u16 {
        self.n_trees
    }
}

impl Classifier for RandomForestModel {
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        check_width(self.n_features, features)?;
        let x = ndarray_to_densematrix(features);
        let predictions = self
            .model
            .predict(&x)
            .map_err(|e| AppError::Internal(format!("Prediction failed: {}", e)))?;
        Ok(labels_to_vec(&predictions))
    }

    fn model_type(&self) -> ModelType {
        ModelType::RandomForest
    }

    fn n_features(&self) -> usize {
        self.n_features
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        Some(&self.importances)
    }
}

/// Single decision tree; reports no importances
#[derive(Serialize, Deserialize)]
pub struct DecisionTreeModel {
    model: DecisionTreeClassifier<f64, i32, DenseMatrix<f64>, Vec<i32>>,
    n_features: usize,
}

impl DecisionTreeModel {
    pub fn fit(features: &Array2<f64>, labels: &[usize], params: &ClassifierParams) -> Result<Self> {
        check_fit_input(features, labels)?;

        let mut parameters =
            DecisionTreeClassifierParameters::default().with_criterion(SplitCriterion::Gini);
        if let Some(depth) = params.max_depth {
            parameters = parameters.with_max_depth(depth);
        }

        let x = ndarray_to_densematrix(features);
        let y = vec_to_labels(labels);
        let model = DecisionTreeClassifier::fit(&x, &y, parameters)
            .map_err(|e| AppError::FitData(format!("Failed to train decision tree: {}", e)))?;

        Ok(Self {
            model,
            n_features: features.ncols(),
        })
    }
}

impl Classifier for DecisionTreeModel {
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        check_width(self.n_features, features)?;
        let x = ndarray_to_densematrix(features);
        let predictions = self
            .model
            .predict(&x)
            .map_err(|e| AppError::Internal(format!("Prediction failed: {}", e)))?;
        Ok(labels_to_vec(&predictions))
    }

    fn model_type(&self) -> ModelType {
        ModelType::DecisionTree
    }

    fn n_features(&self) -> usize {
        self.n_features
    }
}

/// Mean accuracy drop when each feature column is shuffled, clamped at zero
/// and normalized to sum to 1 (all zeros when no feature matters)
pub fn permutation_importances<C: Classifier + ?Sized>(
    classifier: &C,
    features: &Array2<f64>,
    labels: &[usize],
    params: &ClassifierParams,
) -> Result<Vec<f64>> {
    let mut rng = StdRng::seed_from_u64(params.seed);

    let mut rows: Vec<usize> = (0..features.nrows()).collect();
    rows.shuffle(&mut rng);
    rows.truncate(params.importance_sample_size.max(1));

    let sample = features.select(Axis(0), &rows);
    let truth: Vec<usize> = rows.iter().map(|&i| labels[i]).collect();
    let baseline = accuracy(&truth, &classifier.predict(&sample)?);

    let mut drops = Vec::with_capacity(sample.ncols());
    for j in 0..sample.ncols() {
        let mut column: Vec<f64> = sample.column(j).to_vec();
        column.shuffle(&mut rng);

        let mut permuted = sample.clone();
        for (i, value) in column.into_iter().enumerate() {
            permuted[[i, j]] = value;
        }

        let score = accuracy(&truth, &classifier.predict(&permuted)?);
        drops.push((baseline - score).max(0.0));
    }

    let total: f64 = drops.iter().sum();
    if total > 0.0 {
        for drop in &mut drops {
            *drop /= total;
        }
    }
    debug!(baseline, n_features = drops.len(), "Permutation importances computed");

    Ok(drops)
}

/// A fitted classifier of any supported type
#[derive(Serialize, Deserialize)]
pub enum FittedClassifier {
    RandomForest(RandomForestModel),
    DecisionTree(DecisionTreeModel),
}

impl FittedClassifier {
    /// Fit the classifier selected by `model_type`
    pub fn fit(
        model_type: ModelType,
        features: &Array2<f64>,
        labels: &[usize],
        params: &ClassifierParams,
    ) -> Result<Self> {
        match model_type {
            ModelType::RandomForest => {
                RandomForestModel::fit(features, labels, params).map(FittedClassifier::RandomForest)
            }
            ModelType::DecisionTree => {
                DecisionTreeModel::fit(features, labels, params).map(FittedClassifier::DecisionTree)
            }
        }
    }

    fn inner(&self) -> &dyn Classifier {
        match self {
            FittedClassifier::RandomForest(model) => model,
            FittedClassifier::DecisionTree(model) => model,
        }
    }
}

impl Classifier for FittedClassifier {
    fn predict(&self, features: &Array2<f64>) -> Result<Vec<usize>> {
        self.inner().predict(features)
    }

    fn model_type(&self) -> ModelType {
        self.inner().model_type()
    }

    fn n_features(&self) -> usize {
        self.inner().n_features()
    }

    fn feature_importances(&self) -> Option<&[f64]> {
        self.inner().feature_importances()
    }
}

impl std::fmt::Debug for FittedClassifier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FittedClassifier")
            .field("model_type", &self.model_type())
            .field("n_features", &self.n_features())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    /// Class is decided by the sign of the first feature; the second is noise
    fn separable() -> (Array2<f64>, Vec<usize>) {
        let mut rows = Vec::new();
        let mut labels = Vec::new();
        for i in 0..60 {
            let signal = if i % 2 == 0 { 1.0 } else { -1.0 } * (1.0 + (i % 5) as f64);
            let noise = ((i * 7) % 11) as f64;
            rows.extend_from_slice(&[signal, noise]);
            labels.push(if signal > 0.0 { 1 } else { 0 });
        }
        (Array2::from_shape_vec((60, 2), rows).unwrap(), labels)
    }

    fn small_params() -> ClassifierParams {
        ClassifierParams {
            n_trees: 15,
            importance_sample_size: 60,
            ..ClassifierParams::default()
        }
    }

    #[test]
    fn test_random_forest_learns_separable_data() {
        let (x, y) = separable();
        let forest = RandomForestModel::fit(&x, &y, &small_params()).unwrap();

        assert_eq!(forest.model_type(), ModelType::RandomForest);
        assert_eq!(forest.n_features(), 2);
        assert_eq!(forest.n_trees(), 15);

        let predictions = forest.predict(&x).unwrap();
        assert!(accuracy(&y, &predictions) > 0.9);
    }

    #[test]
    fn test_random_forest_importances() {
        let (x, y) = separable();
        let forest = RandomForestModel::fit(&x, &y, &small_params()).unwrap();

        let importances = forest.feature_importances().unwrap();
        assert_eq!(importances.len(), 2);
        assert!(importances.iter().all(|&v| v >= 0.0));
        assert!((importances.iter().sum::<f64>() - 1.0).abs() < 1e-9);
        assert!(importances[0] > importances[1]);
    }

    #[test]
    fn test_decision_tree_has_no_importances() {
        let (x, y) = separable();
        let tree =
            FittedClassifier::fit(ModelType::DecisionTree, &x, &y, &small_params()).unwrap();

        assert_eq!(tree.model_type(), ModelType::DecisionTree);
        assert!(tree.feature_importances().is_none());
        assert!(accuracy(&y, &tree.predict(&x).unwrap()) > 0.9);
    }

    #[test]
    fn test_predict_rejects_wrong_width() {
        let (x, y) = separable();
        let tree = DecisionTreeModel::fit(&x, &y, &small_params()).unwrap();

        let err = tree.predict(&array![[1.0, 2.0, 3.0]]).unwrap_err();
        assert!(matches!(err, AppError::SchemaMismatch(_)));
    }

    #[test]
    fn test_fit_rejects_empty_input() {
        let x = Array2::<f64>::zeros((0, 2));
        let err = RandomForestModel::fit(&x, &[], &small_params()).err().unwrap();
        assert!(matches!(err, AppError::FitData(_)));
    }

    #[test]
    fn test_fitted_classifier_debug() {
        let (x, y) = separable();
        let tree =
            FittedClassifier::fit(ModelType::DecisionTree, &x, &y, &small_params()).unwrap();
        assert!(format!("{:?}", tree).contains("DecisionTree"));
    }
}
