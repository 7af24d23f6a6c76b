//! Сквозные запуски: ETL в хранилище и обучение модели

use crate::config::PipelineConfig;
use crate::error::PipelineError;
use crate::extract::read_csv;
use crate::models::{Trainer, TrainingReport};
use crate::preprocessing::Transformation;
use crate::store::{load_table, SqliteStore};
use crate::types::CampaignTable;

/// Чтение и трансформация исходного CSV
pub fn prepare(config: &PipelineConfig) -> Result<CampaignTable, PipelineError> {
    let raw = read_csv(&config.source)?;
    Ok(Transformation::new(config.on_malformed).apply(&raw)?)
}

/// Extract -> transform -> load. Возвращает число записанных строк.
pub fn run_etl(config: &PipelineConfig) -> Result<usize, PipelineError> {
    let table = prepare(config)?;

    let mut store = SqliteStore::open(&config.store.database, config.store.batch_size)?;
    let written = load_table(&mut store, &config.store.table, &table)?;
    drop(store);

    tracing::info!(
        "ETL finished: {} rows in {}",
        written,
        config.store.database.display()
    );
    Ok(written)
}

/// Extract -> transform -> обучение -> сохранение артефакта
pub fn run_training(config: &PipelineConfig) -> Result<TrainingReport, PipelineError> {
    let table = prepare(config)?;

    let (classifier, report) = Trainer::new(config.training.clone()).train(&table)?;
    classifier.save(&config.training.artifact)?;

    Ok(report)
}
