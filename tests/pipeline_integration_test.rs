/// Integration tests for the generate → train → predict flow
///
/// These tests verify:
/// - The written dataset trains end to end
/// - A saved pipeline reloads with identical predictions
/// - Schema and artifact failures surface as typed errors
/// - Feature importances degrade gracefully for the decision tree
mod common;

use common::*;
use oil_filter_predictor::{
    config::{GeneratorConfig, TrainingConfig},
    dataset::{schema, FeatureTable},
    generator,
    ml::{self, ModelType, TrainedPipeline},
    models::{ConditionLabel, FeatureRecord},
    predictor::Predictor,
    AppError,
};
use std::sync::Arc;

fn sample_records() -> Vec<FeatureRecord> {
    let config = GeneratorConfig {
        rows: 25,
        seed: Some(2024),
        ..GeneratorConfig::default()
    };
    generator::SyntheticGenerator::new(config)
        .generate()
        .unwrap()
        .into_iter()
        .map(|row| row.record)
        .collect()
}

#[test]
fn test_generate_train_save_load_roundtrip() {
    let dir = tempfile::tempdir().unwrap();

    let generator_config = GeneratorConfig {
        rows: 400,
        seed: Some(5),
        output_path: dir.path().join("dataset.csv"),
        ..GeneratorConfig::default()
    };
    generator::generate_dataset(&generator_config).unwrap();

    let training_config = TrainingConfig {
        dataset_path: generator_config.output_path.clone(),
        model_path: dir.path().join("models").join("pipeline.bin"),
        ..small_training_config(ModelType::RandomForest)
    };

    let outcome = ml::train_from_config(&training_config).unwrap();
    let metrics = outcome.metrics.as_ref().unwrap();
    assert_eq!(metrics.support, 80);
    assert!(outcome.report.as_ref().unwrap().contains("precision"));

    let loaded = TrainedPipeline::load(&training_config.model_path).unwrap();
    let batch = FeatureRecord::batch_table(&sample_records());

    assert_eq!(
        loaded.predict(&batch).unwrap(),
        outcome.pipeline.predict(&batch).unwrap()
    );
    assert_eq!(loaded.classes(), outcome.pipeline.classes());
    assert_eq!(loaded.input_importances(), outcome.pipeline.input_importances());
}

#[test]
fn test_predictions_are_known_labels() {
    let pipeline = train_small_pipeline(ModelType::RandomForest);
    let labels = pipeline
        .predict(&FeatureRecord::batch_table(&sample_records()))
        .unwrap();

    assert_eq!(labels.len(), 25);
    for label in labels {
        assert!(label.parse::<ConditionLabel>().is_ok(), "unexpected label {}", label);
    }
}

#[test]
fn test_missing_column_at_inference() {
    let pipeline = train_small_pipeline(ModelType::DecisionTree);

    let mut table: FeatureTable = sample_records()[0].to_table();
    table.remove(schema::KM_AFTER_CHANGE);

    let err = pipeline.predict(&table).unwrap_err();
    assert!(matches!(err, AppError::SchemaMismatch(ref msg) if msg.contains("km_after_change")));
}

#[test]
fn test_predictor_assesses_form() {
    let pipeline = train_small_pipeline(ModelType::RandomForest);
    let predictor = Predictor::new(Arc::new(pipeline));

    let assessment = predictor.assess(&sample_form(), reference_date()).unwrap();
    assert_eq!(assessment.oil_filter_age_days, 12);
    assert_eq!(assessment.icon, assessment.label.presentation().icon);
    assert_eq!(assessment.critical, assessment.label == ConditionLabel::Red);
}

#[test]
fn test_insights_by_model_type() {
    let forest = Predictor::new(Arc::new(train_small_pipeline(ModelType::RandomForest)));
    let insights = forest.insights();
    assert!(insights.importances_available());
    assert_eq!(insights.input_importances.as_ref().unwrap().len(), 13);
    assert!(insights.note.is_none());

    let tree = Predictor::new(Arc::new(train_small_pipeline(ModelType::DecisionTree)));
    let insights = tree.insights();
    assert!(!insights.importances_available());
    assert!(insights.render().contains("unavailable"));
}

#[test]
fn test_truncated_artifact_fails_to_load() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("pipeline.bin");

    let pipeline = train_small_pipeline(ModelType::DecisionTree);
    pipeline.save(&path).unwrap();

    let bytes = std::fs::read(&path).unwrap();
    std::fs::write(&path, &bytes[..bytes.len() / 2]).unwrap();

    let err = TrainedPipeline::load(&path).unwrap_err();
    assert!(matches!(err, AppError::ArtifactLoad(_)));
}
