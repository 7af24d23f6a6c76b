//! Классификатор успешности кампании: признаки + логистическая регрессия

#![allow(non_snake_case)]

use std::path::Path;

use chrono::{DateTime, Utc};
use linfa::traits::{Fit, Predict};
use linfa::Dataset;
use linfa_logistic::{FittedLogisticRegression, LogisticRegression};
use ndarray::Array1;
use serde::{Deserialize, Serialize};

use crate::config::TrainingConfig;
use crate::error::ModelError;
use crate::preprocessing::FeatureEngineer;
use crate::types::CampaignTable;

/// Параметры логистической регрессии
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ClassifierParams {
    pub alpha: f64,
    pub max_iterations: u64,
}

impl Default for ClassifierParams {
    fn default() -> Self {
        Self {
            alpha: 1.0,
            max_iterations: 100,
        }
    }
}

impl From<&TrainingConfig> for ClassifierParams {
    fn from(config: &TrainingConfig) -> Self {
        Self {
            alpha: config.alpha,
            max_iterations: config.max_iterations,
        }
    }
}

/// Обученный пайплайн: предобработка и модель. Сохраняется целиком.
#[derive(Debug, Serialize, Deserialize)]
pub struct CampaignClassifier {
    features: FeatureEngineer,
    model: FittedLogisticRegression<f64, usize>,
    trained_at: DateTime<Utc>,
}

impl CampaignClassifier {
    pub fn fit(
        table: &CampaignTable,
        labels: &[usize],
        params: ClassifierParams,
    ) -> Result<Self, ModelError> {
        if table.n_rows() != labels.len() {
            return Err(ModelError::ShapeMismatch {
                expected: table.n_rows(),
                actual: labels.len(),
            });
        }

        let mut features = FeatureEngineer::default();
        let X = features.fit_transform(table)?;
        let dataset = Dataset::new(X, Array1::from(labels.to_vec()));

        let model = LogisticRegression::default()
            .alpha(params.alpha)
            .max_iterations(params.max_iterations)
            .fit(&dataset)
            .map_err(|e| ModelError::Fit(e.to_string()))?;

        tracing::debug!(
            "Fitted logistic regression on {} rows x {} features",
            labels.len(),
            features.n_features()
        );

        Ok(Self {
            features,
            model,
            trained_at: Utc::now(),
        })
    }

    pub fn predict(&self, table: &CampaignTable) -> Result<Vec<usize>, ModelError> {
        if table.is_empty() {
            return Ok(Vec::new());
        }
        let X = self.features.transform(table)?;
        Ok(self.model.predict(&X).to_vec())
    }

    pub fn features(&self) -> &FeatureEngineer {
        &self.features
    }

    pub fn trained_at(&self) -> DateTime<Utc> {
        self.trained_at
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), ModelError> {
        let path = path.as_ref();
        let bytes = serde_json::to_vec_pretty(self)?;
        std::fs::write(path, bytes).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        tracing::info!("Saved trained pipeline to {}", path.display());
        Ok(())
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ModelError> {
        let path = path.as_ref();
        let bytes = std::fs::read(path).map_err(|source| ModelError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::{extract_labels, transform};
    use crate::test_support::campaign_table;

    #[test]
    fn fits_and_predicts_binary_labels() {
        let table = transform(&campaign_table(60)).unwrap();
        let labels = extract_labels(&table).unwrap();

        let classifier = CampaignClassifier::fit(&table, &labels, ClassifierParams::default()).unwrap();
        let predicted = classifier.predict(&table).unwrap();

        assert_eq!(predicted.len(), 60);
        assert!(predicted.iter().all(|&p| p <= 1));
        assert!(classifier.features().n_features() > 7);
    }

    #[test]
    fn saved_pipeline_predicts_the_same() {
        let table = transform(&campaign_table(40)).unwrap();
        let labels = extract_labels(&table).unwrap();
        let classifier = CampaignClassifier::fit(&table, &labels, ClassifierParams::default()).unwrap();

        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("model.json");
        classifier.save(&path).unwrap();
        let restored = CampaignClassifier::load(&path).unwrap();

        assert_eq!(restored.trained_at(), classifier.trained_at());
        assert_eq!(restored.predict(&table).unwrap(), classifier.predict(&table).unwrap());
    }

    #[test]
    fn single_class_cannot_be_fitted() {
        let table = transform(&campaign_table(10)).unwrap();
        let labels = vec![0; 10];
        assert!(matches!(
            CampaignClassifier::fit(&table, &labels, ClassifierParams::default()),
            Err(ModelError::Fit(_))
        ));
    }

    #[test]
    fn label_count_must_match_rows() {
        let table = transform(&campaign_table(10)).unwrap();
        assert!(matches!(
            CampaignClassifier::fit(&table, &[0, 1], ClassifierParams::default()),
            Err(ModelError::ShapeMismatch { .. })
        ));
    }

    #[test]
    fn missing_artifact_is_an_io_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            CampaignClassifier::load(dir.path().join("absent.json")),
            Err(ModelError::Io { .. })
        ));
    }
}
