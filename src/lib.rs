//! Oil filter condition predictor.
//!
//! Generates a labelled synthetic dataset, trains a random forest over it and
//! serves predictions that map each condition label to an icon, a color and
//! an advisory message.

pub mod api;
pub mod config;
pub mod dataset;
pub mod error;
pub mod generator;
pub mod metrics;
pub mod ml;
pub mod models;
pub mod predictor;
pub mod telemetry;

pub use error::{AppError, Result};
