//! One-hot кодирование категориальных признаков
//!
//! Первая (в лексикографическом порядке) категория каждой колонки
//! отбрасывается и кодируется нулями, чтобы избежать коллинеарности.

use std::collections::BTreeSet;

use ndarray::Array2;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OneHotEncoder {
    categories: Option<Vec<Vec<String>>>,
}

impl OneHotEncoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Категории по колонкам, отсортированные; первая отброшена при кодировании
    pub fn categories(&self) -> Option<&[Vec<String>]> {
        self.categories.as_deref()
    }

    /// Число выходных колонок
    pub fn n_outputs(&self) -> usize {
        self.categories
            .iter()
            .flatten()
            .map(|c| c.len().saturating_sub(1))
            .sum()
    }

    /// `columns[j][i]` - значение j-й категориальной колонки в i-й строке
    pub fn fit(&mut self, columns: &[&[String]]) -> Result<(), ModelError> {
        if columns.iter().any(|c| c.is_empty()) {
            return Err(ModelError::EmptyDataset);
        }

        self.categories = Some(
            columns
                .iter()
                .map(|values| {
                    values
                        .iter()
                        .cloned()
                        .collect::<BTreeSet<_>>()
                        .into_iter()
                        .collect()
                })
                .collect(),
        );
        Ok(())
    }

    /// Неизвестные категории кодируются нулями, как отброшенная
    pub fn transform(&self, columns: &[&[String]]) -> Result<Array2<f64>, ModelError> {
        let categories = self
            .categories
            .as_ref()
            .ok_or(ModelError::NotFitted("one-hot encoder"))?;

        if columns.len() != categories.len() {
            return Err(ModelError::ShapeMismatch {
                expected: categories.len(),
                actual: columns.len(),
            });
        }

        let n_rows = columns.first().map_or(0, |c| c.len());
        let mut encoded = Array2::zeros((n_rows, self.n_outputs()));

        let mut offset = 0;
        for (values, known) in columns.iter().zip(categories) {
            for (row, value) in values.iter().enumerate() {
                if let Ok(idx) = known.binary_search(value) {
                    if idx > 0 {
                        encoded[[row, offset + idx - 1]] = 1.0;
                    }
                }
            }
            offset += known.len().saturating_sub(1);
        }

        Ok(encoded)
    }

    pub fn fit_transform(&mut self, columns: &[&[String]]) -> Result<Array2<f64>, ModelError> {
        self.fit(columns)?;
        self.transform(columns)
    }
}
