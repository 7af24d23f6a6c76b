//! Ошибки пайплайна

use std::path::PathBuf;

use thiserror::Error;

/// Ошибки процедуры трансформации
#[derive(Debug, Error, Clone, PartialEq)]
pub enum TransformError {
    #[error("missing required column `{0}`")]
    MissingColumn(String),

    #[error("column `{column}` has unexpected type, expected {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    #[error("column `{column}` has {actual} rows, table has {expected}")]
    ColumnLength {
        column: String,
        expected: usize,
        actual: usize,
    },

    #[error("malformed record at row {row}: column `{column}` value {value:?}: {reason}")]
    Malformed {
        row: usize,
        column: String,
        value: String,
        reason: String,
    },
}

impl TransformError {
    pub(crate) fn malformed(
        row: usize,
        column: &str,
        value: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Malformed {
            row,
            column: column.to_string(),
            value: value.into(),
            reason: reason.into(),
        }
    }
}

/// Ошибки загрузки в реляционное хранилище
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("invalid table name {0:?}")]
    InvalidTableName(String),

    #[error("table has no columns")]
    NoColumns,

    #[error("database error: {0}")]
    Database(#[from] rusqlite::Error),
}

/// Ошибки обучения и применения модели
#[derive(Debug, Error)]
pub enum ModelError {
    #[error("empty dataset")]
    EmptyDataset,

    #[error("{0} not fitted")]
    NotFitted(&'static str),

    #[error("missing feature column `{0}`")]
    MissingColumn(String),

    #[error("feature column `{column}` must be {expected}")]
    ColumnType {
        column: String,
        expected: &'static str,
    },

    #[error("missing value in feature column `{column}` at row {row}")]
    MissingValue { column: String, row: usize },

    #[error("feature width mismatch: fitted on {expected} columns, got {actual}")]
    ShapeMismatch { expected: usize, actual: usize },

    #[error("need at least {required} samples, got {actual}")]
    TooFewSamples { required: usize, actual: usize },

    #[error("model fit failed: {0}")]
    Fit(String),

    #[error("artifact {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("artifact serialization: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Ошибки чтения и проверки конфигурации
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Общая ошибка одного запуска пайплайна
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("cannot read {path}: {source}")]
    Extract {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("malformed CSV: {0}")]
    Csv(#[from] csv::Error),

    #[error(transparent)]
    Transform(#[from] TransformError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Model(#[from] ModelError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
