use crate::ml::models::{ClassWeight, ModelType};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Main application configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Synthetic dataset generation
    #[serde(default)]
    pub generator: GeneratorConfig,

    /// Training pipeline
    #[serde(default)]
    pub training: TrainingConfig,

    /// Prediction server
    #[serde(default)]
    pub server: ServerConfig,

    /// Observability configuration
    #[serde(default)]
    pub observability: ObservabilityConfig,
}

impl Config {
    /// Load configuration from file and environment
    pub fn load() -> Result<Self, config::ConfigError> {
        let config_path =
            std::env::var("CONFIG_PATH").unwrap_or_else(|_| "config/local.toml".to_string());

        config::Config::builder()
            // Start with default values
            .add_source(config::File::from_str(
                include_str!("../config/default.toml"),
                config::FileFormat::Toml,
            ))
            // Override with config file if it exists
            .add_source(config::File::with_name(&config_path).required(false))
            // Override with environment variables (prefix: OIL_FILTER)
            .add_source(
                config::Environment::with_prefix("OIL_FILTER")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?
            .try_deserialize()
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            generator: GeneratorConfig::default(),
            training: TrainingConfig::default(),
            server: ServerConfig::default(),
            observability: ObservabilityConfig::default(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GeneratorConfig {
    /// Number of rows to generate
    #[serde(default = "default_rows")]
    pub rows: usize,

    /// Destination CSV file
    #[serde(default = "default_dataset_path")]
    pub output_path: PathBuf,

    /// Year of the randomly drawn reference date
    #[serde(default = "default_reference_year")]
    pub reference_year: i32,

    /// Upper bound (inclusive) of days since the filter change
    #[serde(default = "default_max_age_days")]
    pub max_age_days: u32,

    /// RNG seed; entropy-seeded when absent
    #[serde(default)]
    pub seed: Option<u64>,
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        Self {
            rows: default_rows(),
            output_path: default_dataset_path(),
            reference_year: default_reference_year(),
            max_age_days: default_max_age_days(),
            seed: None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    /// Input CSV produced by the generator
    #[serde(default = "default_dataset_path")]
    pub dataset_path: PathBuf,

    /// Destination of the serialized pipeline
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,

    /// Rows used for fitting
    #[serde(default = "default_train_size")]
    pub train_size: usize,

    /// Held-out rows used for evaluation
    #[serde(default = "default_test_size")]
    pub test_size: usize,

    /// Seed for the split shuffle, class balancing and the forest
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default)]
    pub model_type: ModelType,

    /// Number of trees in the forest
    #[serde(default = "default_n_trees")]
    pub n_trees: u16,

    /// Maximum tree depth; unbounded when absent
    #[serde(default)]
    pub max_depth: Option<u16>,

    #[serde(default)]
    pub class_weight: ClassWeight,

    /// Rows used when measuring permutation importances
    #[serde(default = "default_importance_sample_size")]
    pub importance_sample_size: usize,
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            dataset_path: default_dataset_path(),
            model_path: default_model_path(),
            train_size: default_train_size(),
            test_size: default_test_size(),
            seed: default_seed(),
            model_type: ModelType::default(),
            n_trees: default_n_trees(),
            max_depth: None,
            class_weight: ClassWeight::default(),
            importance_sample_size: default_importance_sample_size(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// HTTP server host
    #[serde(default = "default_host")]
    pub host: String,

    /// HTTP server port
    #[serde(default = "default_http_port")]
    pub http_port: u16,

    /// Artifact loaded at startup
    #[serde(default = "default_model_path")]
    pub model_path: PathBuf,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            http_port: default_http_port(),
            model_path: default_model_path(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ObservabilityConfig {
    /// Log level used when RUST_LOG is not set
    #[serde(default = "default_log_level")]
    pub log_level: String,

    #[serde(default)]
    pub log_format: LogFormat,

    /// Enable Prometheus metrics
    #[serde(default = "default_true")]
    pub prometheus_enabled: bool,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            prometheus_enabled: true,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, Default, PartialEq)]
#[serde(rename_all = "snake_case")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

fn default_rows() -> usize {
    2000
}

fn default_dataset_path() -> PathBuf {
    PathBuf::from("oil_filter_dataset_2000.csv")
}

fn default_model_path() -> PathBuf {
    PathBuf::from("oil_filter_model.bin")
}

fn default_reference_year() -> i32 {
    2024
}

fn default_max_age_days() -> u32 {
    400
}

fn default_train_size() -> usize {
    1600
}

fn default_test_size() -> usize {
    400
}

fn default_seed() -> u64 {
    42
}

fn default_n_trees() -> u16 {
    300
}

fn default_importance_sample_size() -> usize {
    400
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_http_port() -> u16 {
    8080
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_true() -> bool {
    true
}
