//! Загрузка трансформированной таблицы в реляционное хранилище

pub mod sqlite;

pub use sqlite::SqliteStore;

use crate::error::StoreError;
use crate::types::{CampaignTable, SqlType};

/// Репозиторий для записи таблицы кампаний
pub trait CampaignStore {
    /// `CREATE TABLE IF NOT EXISTS` с заданными колонками
    fn ensure_table(&mut self, table: &str, schema: &[(&str, SqlType)]) -> Result<(), StoreError>;

    /// Добавление всех строк; возвращает число записанных строк
    fn insert(&mut self, table: &str, data: &CampaignTable) -> Result<usize, StoreError>;
}

/// Схема хранилища по типам колонок: текст -> TEXT, float -> REAL, целое -> INTEGER
pub fn schema_of(data: &CampaignTable) -> Vec<(&str, SqlType)> {
    data.columns().map(|(name, col)| (name, col.sql_type())).collect()
}

/// Создание таблицы при необходимости и запись всех строк
pub fn load_table<S: CampaignStore>(
    store: &mut S,
    table: &str,
    data: &CampaignTable,
) -> Result<usize, StoreError> {
    store.ensure_table(table, &schema_of(data))?;
    let written = store.insert(table, data)?;
    tracing::info!("Loaded {} rows into table {}", written, table);
    Ok(written)
}

/// Идентификатор в двойных кавычках, кавычки внутри удваиваются
pub fn quote_identifier(name: &str) -> String {
    format!("\"{}\"", name.replace('"', "\"\""))
}

pub(crate) fn validate_table_name(name: &str) -> Result<(), StoreError> {
    if name.trim().is_empty() || name.contains('\0') {
        return Err(StoreError::InvalidTableName(name.to_string()));
    }
    Ok(())
}
