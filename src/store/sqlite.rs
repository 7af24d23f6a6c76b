//! SQLite-хранилище

use std::path::Path;

use rusqlite::types::Value;
use rusqlite::{params_from_iter, Connection};

use super::{quote_identifier, validate_table_name, CampaignStore};
use crate::error::StoreError;
use crate::types::{CampaignTable, Column, SqlType};

/// Лимит связанных параметров в одном запросе SQLite
const MAX_BOUND_PARAMS: usize = 999;

/// Одно соединение на время загрузки; закрывается при drop
pub struct SqliteStore {
    conn: Connection,
    batch_size: usize,
}

impl SqliteStore {
    pub fn open(path: impl AsRef<Path>, batch_size: usize) -> Result<Self, StoreError> {
        let conn = Connection::open(path.as_ref())?;
        tracing::debug!("Opened SQLite database {}", path.as_ref().display());
        Ok(Self::with_connection(conn, batch_size))
    }

    pub fn open_in_memory(batch_size: usize) -> Result<Self, StoreError> {
        Ok(Self::with_connection(Connection::open_in_memory()?, batch_size))
    }

    fn with_connection(conn: Connection, batch_size: usize) -> Self {
        Self {
            conn,
            batch_size: batch_size.max(1),
        }
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn row_count(&self, table: &str) -> Result<usize, StoreError> {
        validate_table_name(table)?;
        let sql = format!("SELECT COUNT(*) FROM {}", quote_identifier(table));
        let count: i64 = self.conn.query_row(&sql, [], |row| row.get(0))?;
        Ok(count as usize)
    }

    /// Строк в одном INSERT с учётом лимита параметров
    fn rows_per_statement(&self, n_columns: usize) -> usize {
        self.batch_size.min(MAX_BOUND_PARAMS / n_columns).max(1)
    }
}

impl CampaignStore for SqliteStore {
    fn ensure_table(&mut self, table: &str, schema: &[(&str, SqlType)]) -> Result<(), StoreError> {
        validate_table_name(table)?;
        if schema.is_empty() {
            return Err(StoreError::NoColumns);
        }

        let columns: Vec<String> = schema
            .iter()
            .map(|(name, ty)| format!("{} {}", quote_identifier(name), ty.as_sql()))
            .collect();
        let ddl = format!(
            "CREATE TABLE IF NOT EXISTS {} ({})",
            quote_identifier(table),
            columns.join(", ")
        );
        self.conn.execute_batch(&ddl)?;
        Ok(())
    }

    fn insert(&mut self, table: &str, data: &CampaignTable) -> Result<usize, StoreError> {
        validate_table_name(table)?;
        let n_columns = data.n_columns();
        if n_columns == 0 {
            return Err(StoreError::NoColumns);
        }

        let column_list: Vec<String> = data.column_names().map(quote_identifier).collect();
        let row_placeholder = format!("({})", vec!["?"; n_columns].join(", "));
        let chunk = self.rows_per_statement(n_columns);
        let n_rows = data.n_rows();

        let tx = self.conn.transaction()?;
        for start in (0..n_rows).step_by(chunk) {
            let end = (start + chunk).min(n_rows);
            let sql = format!(
                "INSERT INTO {} ({}) VALUES {}",
                quote_identifier(table),
                column_list.join(", "),
                vec![row_placeholder.as_str(); end - start].join(", ")
            );

            let mut values = Vec::with_capacity((end - start) * n_columns);
            for row in start..end {
                values.extend(data.columns().map(|(_, col)| sql_value(col, row)));
            }

            tx.prepare_cached(&sql)?.execute(params_from_iter(values.iter()))?;
            tracing::debug!("Inserted rows {}..{} into {}", start, end, table);
        }
        tx.commit()?;

        Ok(n_rows)
    }
}

fn sql_value(column: &Column, row: usize) -> Value {
    match column {
        Column::Text(v) => Value::Text(v[row].clone()),
        Column::Float(v) => v[row].map_or(Value::Null, Value::Real),
        Column::Int(v) => Value::Integer(v[row]),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{load_table, schema_of};

    fn sample(rows: usize) -> CampaignTable {
        let mut data = CampaignTable::new();
        data.insert(
            "Gender",
            Column::Text((0..rows).map(|i| format!("g{i}")).collect()),
        )
        .unwrap();
        data.insert(
            "ROI",
            Column::Float((0..rows).map(|i| (i % 2 == 0).then_some(i as f64)).collect()),
        )
        .unwrap();
        data.insert("Is_Successful", Column::Int((0..rows).map(|i| (i % 2) as i64).collect())).unwrap();
        data
    }

    #[test]
    fn creates_table_with_typed_columns() {
        let mut store = SqliteStore::open_in_memory(100).unwrap();
        store.ensure_table("Campaigns", &schema_of(&sample(1))).unwrap();
        store.ensure_table("Campaigns", &schema_of(&sample(1))).unwrap();

        let mut stmt = store
            .connection()
            .prepare("SELECT name, type FROM pragma_table_info('Campaigns')")
            .unwrap();
        let columns: Vec<(String, String)> = stmt
            .query_map([], |row| Ok((row.get(0)?, row.get(1)?)))
            .unwrap()
            .collect::<Result<_, _>>()
            .unwrap();

        assert_eq!(
            columns,
            vec![
                ("Gender".to_string(), "TEXT".to_string()),
                ("ROI".to_string(), "REAL".to_string()),
                ("Is_Successful".to_string(), "INTEGER".to_string()),
            ]
        );
    }

    #[test]
    fn inserts_in_batches_and_keeps_nulls() {
        let mut store = SqliteStore::open_in_memory(2).unwrap();
        let written = load_table(&mut store, "Campaigns", &sample(5)).unwrap();

        assert_eq!(written, 5);
        assert_eq!(store.row_count("Campaigns").unwrap(), 5);

        let nulls: i64 = store
            .connection()
            .query_row("SELECT COUNT(*) FROM Campaigns WHERE ROI IS NULL", [], |r| r.get(0))
            .unwrap();
        assert_eq!(nulls, 2);
    }

    #[test]
    fn repeated_loads_append() {
        let mut store = SqliteStore::open_in_memory(500).unwrap();
        load_table(&mut store, "Campaigns", &sample(3)).unwrap();
        load_table(&mut store, "Campaigns", &sample(3)).unwrap();
        assert_eq!(store.row_count("Campaigns").unwrap(), 6);
    }

    #[test]
    fn values_and_names_are_not_interpolated() {
        let mut data = CampaignTable::new();
        data.insert(
            "Company",
            Column::Text(vec!["Robert'); DROP TABLE Campaigns;--".into()]),
        )
        .unwrap();
        data.insert("odd \"name\"", Column::Int(vec![1])).unwrap();

        let mut store = SqliteStore::open_in_memory(10).unwrap();
        load_table(&mut store, "My Campaigns", &data).unwrap();

        let company: String = store
            .connection()
            .query_row("SELECT Company FROM \"My Campaigns\"", [], |r| r.get(0))
            .unwrap();
        assert_eq!(company, "Robert'); DROP TABLE Campaigns;--");
        assert_eq!(store.row_count("My Campaigns").unwrap(), 1);
    }

    #[test]
    fn wide_tables_stay_under_parameter_limit() {
        let store = SqliteStore::open_in_memory(500).unwrap();
        assert_eq!(store.rows_per_statement(16), 62);
        assert_eq!(store.rows_per_statement(1), 500);
    }

    #[test]
    fn failed_insert_leaves_no_rows() {
        let mut store = SqliteStore::open_in_memory(1).unwrap();
        store
            .ensure_table("Campaigns", &[("Gender", SqlType::Text)])
            .unwrap();

        // колонки ROI нет в таблице
        assert!(matches!(
            store.insert("Campaigns", &sample(3)),
            Err(StoreError::Database(_))
        ));
        assert_eq!(store.row_count("Campaigns").unwrap(), 0);
    }

    #[test]
    fn file_database_persists_after_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("marketing.db");
        {
            let mut store = SqliteStore::open(&path, 100).unwrap();
            load_table(&mut store, "Campaigns", &sample(4)).unwrap();
        }
        let store = SqliteStore::open(&path, 100).unwrap();
        assert_eq!(store.row_count("Campaigns").unwrap(), 4);
    }
}
