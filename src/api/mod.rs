pub mod handlers;
pub mod routes;

pub use routes::*;

use crate::error::Result;
use crate::predictor::Predictor;
use std::path::PathBuf;
use std::time::Instant;

/// Shared application state
#[derive(Debug, Clone)]
pub struct AppState {
    pub model_path: PathBuf,
    pub started_at: Instant,
    predictor: Option<Predictor>,
}

impl AppState {
    /// State backed by the process-wide pipeline at `model_path`
    pub fn new(model_path: impl Into<PathBuf>) -> Self {
        Self {
            model_path: model_path.into(),
            started_at: Instant::now(),
            predictor: None,
        }
    }

    /// Serve an already loaded predictor instead of the shared pipeline
    pub fn with_predictor(mut self, predictor: Predictor) -> Self {
        self.predictor = Some(predictor);
        self
    }

    /// Predictor for this request; loads the shared pipeline if nothing is loaded yet
    pub fn predictor(&self) -> Result<Predictor> {
        match &self.predictor {
            Some(predictor) => Ok(predictor.clone()),
            None => Predictor::shared(&self.model_path),
        }
    }
}
