//! Конфигурация запуска: пути, параметры хранилища и обучения

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Путь к конфигурации по умолчанию
pub const DEFAULT_CONFIG_PATH: &str = "campaign-ml.json";

/// Что делать с некорректной записью при трансформации
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MalformedPolicy {
    /// Прервать весь запуск на первой ошибке
    #[default]
    Abort,
    /// Отбросить строку и записать предупреждение в лог
    Skip,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub source: PathBuf,
    #[serde(default)]
    pub on_malformed: MalformedPolicy,
    #[serde(default)]
    pub store: StoreConfig,
    #[serde(default)]
    pub training: TrainingConfig,
    #[serde(default)]
    pub server: ServerConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default = "default_database")]
    pub database: PathBuf,
    #[serde(default = "default_table")]
    pub table: String,
    #[serde(default = "default_batch_size")]
    pub batch_size: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingConfig {
    #[serde(default = "default_test_size")]
    pub test_size: f64,
    #[serde(default = "default_seed")]
    pub seed: u64,
    #[serde(default = "default_cv_folds")]
    pub cv_folds: usize,
    /// L2-регуляризация логистической регрессии
    #[serde(default = "default_alpha")]
    pub alpha: f64,
    #[serde(default = "default_max_iterations")]
    pub max_iterations: u64,
    #[serde(default = "default_artifact")]
    pub artifact: PathBuf,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_database() -> PathBuf { PathBuf::from("marketing.db") }
fn default_table() -> String { "MarketingCampaignData".to_string() }
fn default_batch_size() -> usize { 500 }
fn default_test_size() -> f64 { 0.2 }
fn default_seed() -> u64 { 42 }
fn default_cv_folds() -> usize { 5 }
fn default_alpha() -> f64 { 1.0 }
fn default_max_iterations() -> u64 { 100 }
fn default_artifact() -> PathBuf { PathBuf::from("campaign_model.json") }
fn default_bind() -> String { "0.0.0.0:8000".to_string() }

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            database: default_database(),
            table: default_table(),
            batch_size: default_batch_size(),
        }
    }
}

impl Default for TrainingConfig {
    fn default() -> Self {
        Self {
            test_size: default_test_size(),
            seed: default_seed(),
            cv_folds: default_cv_folds(),
            alpha: default_alpha(),
            max_iterations: default_max_iterations(),
            artifact: default_artifact(),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { bind: default_bind() }
    }
}

impl PipelineConfig {
    pub fn new(source: impl Into<PathBuf>) -> Self {
        Self {
            source: source.into(),
            on_malformed: MalformedPolicy::default(),
            store: StoreConfig::default(),
            training: TrainingConfig::default(),
            server: ServerConfig::default(),
        }
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config: Self = serde_json::from_str(&raw)?;
        config.validate()?;
        Ok(config)
    }

    /// Путь из первого аргумента командной строки или путь по умолчанию
    pub fn from_args() -> Result<Self, ConfigError> {
        let path = std::env::args()
            .nth(1)
            .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
        Self::load(path)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.store.table.trim().is_empty() {
            return Err(ConfigError::Invalid("store.table must not be empty".into()));
        }
        if self.store.batch_size == 0 {
            return Err(ConfigError::Invalid("store.batch_size must be at least 1".into()));
        }
        let t = &self.training;
        if !(t.test_size > 0.0 && t.test_size < 1.0) {
            return Err(ConfigError::Invalid(format!(
                "training.test_size must be in (0, 1), got {}",
                t.test_size
            )));
        }
        if t.cv_folds < 2 {
            return Err(ConfigError::Invalid(format!(
                "training.cv_folds must be at least 2, got {}",
                t.cv_folds
            )));
        }
        Ok(())
    }
}
