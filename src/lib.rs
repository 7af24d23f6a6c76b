//! ETL и классификатор успешности маркетинговых кампаний

pub mod config;
pub mod error;
pub mod extract;
pub mod models;
pub mod pipeline;
pub mod preprocessing;
pub mod server;
pub mod store;
pub mod types;

#[cfg(test)]
mod test_support;

pub use config::{MalformedPolicy, PipelineConfig};
pub use error::{ConfigError, ModelError, PipelineError, StoreError, TransformError};
pub use models::{CampaignClassifier, Trainer, TrainingReport};
pub use pipeline::{run_etl, run_training};
pub use preprocessing::{transform, Transformation};
pub use types::{CampaignTable, Column};
