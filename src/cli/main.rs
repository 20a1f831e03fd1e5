use anyhow::Context;
use chrono::NaiveDate;
use clap::{Parser, Subcommand};
use oil_filter_predictor::{
    config::Config,
    generator,
    ml::{self, ModelType, TrainedPipeline},
    models::{DrivingStyle, FuelType, LoadType, RoadType, VehicleType},
    predictor::{FormInput, Predictor},
    telemetry,
};
use std::path::PathBuf;
use std::sync::Arc;

#[derive(Parser)]
#[command(name = "ofp-cli")]
#[command(about = "Oil filter condition predictor", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Generate a labelled synthetic dataset
    Generate {
        /// Number of rows
        #[arg(short, long)]
        rows: Option<usize>,

        /// Output CSV path
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// RNG seed for a reproducible dataset
        #[arg(short, long)]
        seed: Option<u64>,
    },

    /// Train a model on a generated dataset and save it
    Train {
        /// Input CSV path
        #[arg(short, long)]
        dataset: Option<PathBuf>,

        /// Output model path
        #[arg(short, long)]
        model: Option<PathBuf>,

        #[arg(long)]
        train_size: Option<usize>,

        #[arg(long)]
        test_size: Option<usize>,

        /// Number of trees in the forest
        #[arg(long)]
        trees: Option<u16>,

        /// random_forest or decision_tree
        #[arg(long)]
        model_type: Option<ModelType>,
    },

    /// Predict the condition of one oil filter
    Predict {
        #[arg(long)]
        vehicle_type: VehicleType,

        #[arg(long)]
        engine_capacity_cc: u32,

        /// Date the filter was last changed (YYYY-MM-DD)
        #[arg(long)]
        change_date: NaiveDate,

        #[arg(long)]
        km_after_change: u32,

        #[arg(long)]
        road_type: RoadType,

        #[arg(long)]
        load_type: LoadType,

        #[arg(long)]
        avg_oil_temperature: f64,

        #[arg(long)]
        oil_viscosity_index: f64,

        #[arg(long)]
        engine_rpm_avg: u32,

        #[arg(long)]
        idling_percentage: u32,

        #[arg(long, allow_hyphen_values = true)]
        ambient_temperature: f64,

        #[arg(long)]
        fuel_type: FuelType,

        #[arg(long)]
        driving_style: DrivingStyle,

        /// Reference date for the filter age; defaults to today
        #[arg(long)]
        today: Option<NaiveDate>,

        /// Model path
        #[arg(short, long)]
        model: Option<PathBuf>,
    },

    /// Show model type, metadata and feature importances
    Insights {
        /// Model path
        #[arg(short, long)]
        model: Option<PathBuf>,
    },
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let mut config = Config::load().context("failed to load configuration")?;

    telemetry::init_tracing(&config.observability)
        .map_err(|e| anyhow::anyhow!("failed to initialize tracing: {}", e))?;

    match cli.command {
        Commands::Generate { rows, output, seed } => {
            let generator_config = &mut config.generator;
            if let Some(rows) = rows {
                generator_config.rows = rows;
            }
            if let Some(output) = output {
                generator_config.output_path = output;
            }
            if seed.is_some() {
                generator_config.seed = seed;
            }

            let rows = generator::generate_dataset(generator_config)?;
            println!(
                "Generated {} rows into {}",
                rows.len(),
                generator_config.output_path.display()
            );
        }

        Commands::Train {
            dataset,
            model,
            train_size,
            test_size,
            trees,
            model_type,
        } => {
            let training = &mut config.training;
            if let Some(dataset) = dataset {
                training.dataset_path = dataset;
            }
            if let Some(model) = model {
                training.model_path = model;
            }
            if let Some(train_size) = train_size {
                training.train_size = train_size;
            }
            if let Some(test_size) = test_size {
                training.test_size = test_size;
            }
            if let Some(trees) = trees {
                training.n_trees = trees;
            }
            if let Some(model_type) = model_type {
                training.model_type = model_type;
            }

            let outcome = ml::train_from_config(training).with_context(|| {
                format!("training on {} failed", training.dataset_path.display())
            })?;

            if let Some(report) = &outcome.report {
                println!("{}", report);
            }
            println!("Model saved to {}", training.model_path.display());
        }

        Commands::Predict {
            vehicle_type,
            engine_capacity_cc,
            change_date,
            km_after_change,
            road_type,
            load_type,
            avg_oil_temperature,
            oil_viscosity_index,
            engine_rpm_avg,
            idling_percentage,
            ambient_temperature,
            fuel_type,
            driving_style,
            today,
            model,
        } => {
            let form = FormInput {
                vehicle_type,
                engine_capacity_cc,
                oil_filter_change_date: change_date,
                km_after_change,
                road_type,
                load_type,
                avg_oil_temperature,
                oil_viscosity_index,
                engine_rpm_avg,
                idling_percentage,
                ambient_temperature,
                fuel_type,
                driving_style,
            };
            let today = today.unwrap_or_else(|| chrono::Local::now().date_naive());

            let predictor = load_predictor(model.unwrap_or(config.server.model_path))?;
            let assessment = predictor.assess(&form, today)?;

            println!("Filter age: {} days", assessment.oil_filter_age_days);
            println!("{} {}", assessment.icon, assessment.message);
            println!("Predicted Condition: {}", assessment.label);
        }

        Commands::Insights { model } => {
            let predictor = load_predictor(model.unwrap_or(config.server.model_path))?;
            println!("{}", predictor.insights().render());
        }
    }

    Ok(())
}

fn load_predictor(path: PathBuf) -> anyhow::Result<Predictor> {
    let pipeline = TrainedPipeline::load(&path)
        .with_context(|| format!("cannot load model from {}", path.display()))?;
    Ok(Predictor::new(Arc::new(pipeline)))
}
