//! Shared fixtures for integration tests

#![allow(dead_code)]

use chrono::NaiveDate;
use oil_filter_predictor::{
    config::{GeneratorConfig, TrainingConfig},
    generator::{to_frame, SyntheticGenerator},
    ml::{ModelType, TrainedPipeline, Trainer},
    models::{DrivingStyle, FuelType, LoadType, RoadType, VehicleType},
    predictor::FormInput,
};

/// Seeded synthetic dataset of `rows` rows
pub fn synthetic_frame(rows: usize, seed: u64) -> oil_filter_predictor::dataset::Frame {
    let config = GeneratorConfig {
        rows,
        seed: Some(seed),
        ..GeneratorConfig::default()
    };
    let rows = SyntheticGenerator::new(config).generate().unwrap();
    to_frame(&rows).unwrap()
}

/// Small, fast training configuration
pub fn small_training_config(model_type: ModelType) -> TrainingConfig {
    TrainingConfig {
        train_size: 320,
        test_size: 80,
        n_trees: 20,
        importance_sample_size: 80,
        model_type,
        ..TrainingConfig::default()
    }
}

/// Pipeline fitted on a 400-row seeded dataset
pub fn train_small_pipeline(model_type: ModelType) -> TrainedPipeline {
    Trainer::new(small_training_config(model_type))
        .train_frame(synthetic_frame(400, 99))
        .unwrap()
        .pipeline
}

pub fn reference_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2024, 6, 1).unwrap()
}

pub fn sample_form() -> FormInput {
    FormInput {
        vehicle_type: VehicleType::Hatchback,
        engine_capacity_cc: 1400,
        oil_filter_change_date: NaiveDate::from_ymd_opt(2024, 5, 20).unwrap(),
        km_after_change: 800,
        road_type: RoadType::Highway,
        load_type: LoadType::Light,
        avg_oil_temperature: 90.0,
        oil_viscosity_index: 70.0,
        engine_rpm_avg: 2000,
        idling_percentage: 10,
        ambient_temperature: 22.0,
        fuel_type: FuelType::Petrol,
        driving_style: DrivingStyle::Calm,
    }
}
