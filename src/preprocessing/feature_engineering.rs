//! Feature engineering: таблица кампаний -> матрица признаков
//!
//! Числовые колонки стандартизируются, категориальные кодируются one-hot,
//! результаты склеиваются по горизонтали в этом порядке.

use ndarray::{Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::preprocessing::{DataNormalizer, OneHotEncoder};
use crate::types::{CampaignTable, Column, CATEGORICAL_FEATURES, IS_SUCCESSFUL, NUMERIC_FEATURES};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FeatureEngineer {
    numeric: Vec<String>,
    categorical: Vec<String>,
    normalizer: DataNormalizer,
    encoder: OneHotEncoder,
}

impl FeatureEngineer {
    pub fn new(numeric: &[&str], categorical: &[&str]) -> Self {
        Self {
            numeric: numeric.iter().map(|s| s.to_string()).collect(),
            categorical: categorical.iter().map(|s| s.to_string()).collect(),
            normalizer: DataNormalizer::new(),
            encoder: OneHotEncoder::new(),
        }
    }

    pub fn numeric_columns(&self) -> &[String] {
        &self.numeric
    }

    pub fn categorical_columns(&self) -> &[String] {
        &self.categorical
    }

    /// Ширина матрицы признаков после обучения
    pub fn n_features(&self) -> usize {
        self.normalizer.n_features().unwrap_or(0) + self.encoder.n_outputs()
    }

    pub fn fit(&mut self, table: &CampaignTable) -> Result<(), ModelError> {
        self.fit_transform(table).map(|_| ())
    }

    pub fn fit_transform(&mut self, table: &CampaignTable) -> Result<Array2<f64>, ModelError> {
        if table.is_empty() {
            return Err(ModelError::EmptyDataset);
        }
        let numeric = self.normalizer.fit_transform(&self.numeric_matrix(table)?)?;
        let categorical = self.encoder.fit_transform(&self.categorical_columns_of(table)?)?;
        assemble(numeric, categorical)
    }

    pub fn transform(&self, table: &CampaignTable) -> Result<Array2<f64>, ModelError> {
        let numeric = self.normalizer.transform(&self.numeric_matrix(table)?)?;
        let categorical = self.encoder.transform(&self.categorical_columns_of(table)?)?;
        assemble(numeric, categorical)
    }

    /// Строки, в которых все числовые признаки присутствуют
    pub fn complete_rows(&self, table: &CampaignTable) -> Result<Vec<bool>, ModelError> {
        let mut keep = vec![true; table.n_rows()];
        for name in &self.numeric {
            let column = numeric_column(table, name)?;
            for (row, flag) in keep.iter_mut().enumerate() {
                *flag &= column.numeric(row).is_some();
            }
        }
        Ok(keep)
    }

    fn numeric_matrix(&self, table: &CampaignTable) -> Result<Array2<f64>, ModelError> {
        let mut matrix = Array2::zeros((table.n_rows(), self.numeric.len()));
        for (j, name) in self.numeric.iter().enumerate() {
            let column = numeric_column(table, name)?;
            for row in 0..table.n_rows() {
                matrix[[row, j]] = column.numeric(row).ok_or_else(|| ModelError::MissingValue {
                    column: name.clone(),
                    row,
                })?;
            }
        }
        Ok(matrix)
    }

    fn categorical_columns_of<'a>(&self, table: &'a CampaignTable) -> Result<Vec<&'a [String]>, ModelError> {
        self.categorical
            .iter()
            .map(|name| {
                table
                    .column(name)
                    .ok_or_else(|| ModelError::MissingColumn(name.clone()))?
                    .as_text()
                    .ok_or_else(|| ModelError::ColumnType {
                        column: name.clone(),
                        expected: "text",
                    })
            })
            .collect()
    }
}

impl Default for FeatureEngineer {
    fn default() -> Self {
        Self::new(&NUMERIC_FEATURES, &CATEGORICAL_FEATURES)
    }
}

fn assemble(numeric: Array2<f64>, categorical: Array2<f64>) -> Result<Array2<f64>, ModelError> {
    if categorical.ncols() == 0 {
        return Ok(numeric);
    }
    ndarray::concatenate(Axis(1), &[numeric.view(), categorical.view()]).map_err(|_| {
        ModelError::ShapeMismatch {
            expected: numeric.nrows(),
            actual: categorical.nrows(),
        }
    })
}

fn numeric_column<'a>(table: &'a CampaignTable, name: &str) -> Result<&'a Column, ModelError> {
    match table.column(name) {
        Some(Column::Text(_)) => Err(ModelError::ColumnType {
            column: name.to_string(),
            expected: "numeric",
        }),
        Some(column) => Ok(column),
        None => Err(ModelError::MissingColumn(name.to_string())),
    }
}

/// Целевая переменная `Is_Successful` как метки классов
pub fn extract_labels(table: &CampaignTable) -> Result<Vec<usize>, ModelError> {
    let labels = table
        .column(IS_SUCCESSFUL)
        .ok_or_else(|| ModelError::MissingColumn(IS_SUCCESSFUL.to_string()))?
        .as_int()
        .ok_or_else(|| ModelError::ColumnType {
            column: IS_SUCCESSFUL.to_string(),
            expected: "integer 0/1",
        })?;
    Ok(labels.iter().map(|&v| usize::from(v != 0)).collect())
}
