//! Нормализация числовых признаков (стандартизация)

#![allow(non_snake_case)]

use ndarray::{Array1, Array2, Axis};
use serde::{Deserialize, Serialize};

use crate::error::ModelError;

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DataNormalizer {
    mean: Option<Array1<f64>>,
    std: Option<Array1<f64>>,
}

impl DataNormalizer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_fitted(&self) -> bool {
        self.mean.is_some() && self.std.is_some()
    }

    pub fn n_features(&self) -> Option<usize> {
        self.mean.as_ref().map(|m| m.len())
    }

    pub fn fit(&mut self, X: &Array2<f64>) -> Result<(), ModelError> {
        if X.nrows() == 0 {
            return Err(ModelError::EmptyDataset);
        }

        // Среднее и стандартное отклонение (ddof = 0) по каждому признаку
        let mean = X.mean_axis(Axis(0)).ok_or(ModelError::EmptyDataset)?;
        let mut std = X.std_axis(Axis(0), 0.0);

        // Избегаем деления на ноль
        for val in std.iter_mut() {
            if *val < 1e-10 {
                *val = 1.0;
            }
        }

        self.mean = Some(mean);
        self.std = Some(std);
        Ok(())
    }

    pub fn transform(&self, X: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        let mean = self.mean.as_ref().ok_or(ModelError::NotFitted("normalizer"))?;
        let std = self.std.as_ref().ok_or(ModelError::NotFitted("normalizer"))?;

        if X.ncols() != mean.len() {
            return Err(ModelError::ShapeMismatch {
                expected: mean.len(),
                actual: X.ncols(),
            });
        }

        // (X - mean) / std
        Ok((X - mean) / std)
    }

    pub fn fit_transform(&mut self, X: &Array2<f64>) -> Result<Array2<f64>, ModelError> {
        self.fit(X)?;
        self.transform(X)
    }
}
