//! Обучение классификатора на трансформированной таблице

#![allow(non_snake_case)]

use crate::config::TrainingConfig;
use crate::error::ModelError;
use crate::models::classifier::{CampaignClassifier, ClassifierParams};
use crate::models::evaluation::{
    cross_val_score, train_test_split, ClassificationReport, ConfusionMatrix, TrainingReport,
};
use crate::preprocessing::{extract_labels, FeatureEngineer};
use crate::types::{CampaignTable, IS_SUCCESSFUL, TARGET_AUDIENCE};

pub struct Trainer {
    config: TrainingConfig,
}

impl Trainer {
    pub fn new(config: TrainingConfig) -> Self {
        Self { config }
    }

    pub fn train(&self, table: &CampaignTable) -> Result<(CampaignClassifier, TrainingReport), ModelError> {
        let labels = extract_labels(table)?;
        let features = table.without(&[IS_SUCCESSFUL, TARGET_AUDIENCE]);

        // Строки с пропусками в числовых признаках в обучение не попадают
        let complete = FeatureEngineer::default().complete_rows(&features)?;
        let kept: Vec<usize> = complete
            .iter()
            .enumerate()
            .filter_map(|(i, &ok)| ok.then_some(i))
            .collect();
        let n_excluded = table.n_rows() - kept.len();
        if n_excluded > 0 {
            tracing::warn!("Excluded {} rows with missing numeric features", n_excluded);
        }

        let features = features.select_rows(&kept);
        let labels: Vec<usize> = kept.iter().map(|&i| labels[i]).collect();

        let required = self.config.cv_folds.max(2);
        if labels.len() < required {
            return Err(ModelError::TooFewSamples {
                required,
                actual: labels.len(),
            });
        }

        let (train_idx, test_idx) =
            train_test_split(labels.len(), self.config.test_size, self.config.seed);
        let X_train = features.select_rows(&train_idx);
        let X_test = features.select_rows(&test_idx);
        let y_train: Vec<usize> = train_idx.iter().map(|&i| labels[i]).collect();
        let y_test: Vec<usize> = test_idx.iter().map(|&i| labels[i]).collect();

        tracing::info!(
            "Training on {} rows, evaluating on {} rows",
            y_train.len(),
            y_test.len()
        );

        let params = ClassifierParams::from(&self.config);
        let classifier = CampaignClassifier::fit(&X_train, &y_train, params)?;

        let y_pred = classifier.predict(&X_test)?;
        let confusion_matrix = ConfusionMatrix::new(&y_test, &y_pred);
        let classification_report = ClassificationReport::from(&confusion_matrix);

        let cv_scores = cross_val_score(&X_train, &y_train, self.config.cv_folds, |train, y, test| {
            CampaignClassifier::fit(train, y, params)?.predict(test)
        })?;

        let report = TrainingReport {
            n_train: y_train.len(),
            n_test: y_test.len(),
            n_excluded,
            confusion_matrix,
            classification_report,
            cv_scores,
        };
        tracing::info!(
            "Model trained. Test accuracy: {:.4}, mean CV accuracy: {:.4}",
            report.classification_report.accuracy,
            report.cv_mean()
        );

        Ok((classifier, report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::preprocessing::transform;
    use crate::test_support::campaign_table;
    use crate::types::{Column, ROI};

    #[test]
    fn trains_and_reports_all_metrics() {
        let table = transform(&campaign_table(80)).unwrap();
        let (classifier, report) = Trainer::new(TrainingConfig::default()).train(&table).unwrap();

        assert_eq!(report.n_test, 16);
        assert_eq!(report.n_train, 64);
        assert_eq!(report.n_excluded, 0);
        assert_eq!(report.confusion_matrix.total(), 16);
        assert_eq!(report.cv_scores.len(), 5);
        assert!(report.cv_scores.iter().all(|s| (0.0..=1.0).contains(s)));
        assert!((0.0..=1.0).contains(&report.classification_report.accuracy));

        let text = report.to_string();
        assert!(text.contains("Confusion Matrix:"));
        assert!(text.contains("Mean CV Score:"));

        assert_eq!(classifier.predict(&table).unwrap().len(), 80);
    }

    #[test]
    fn same_seed_gives_same_split() {
        let table = transform(&campaign_table(50)).unwrap();
        let trainer = Trainer::new(TrainingConfig::default());
        let (_, first) = trainer.train(&table).unwrap();
        let (_, second) = trainer.train(&table).unwrap();
        assert_eq!(first.confusion_matrix, second.confusion_matrix);
    }

    #[test]
    fn rows_with_missing_roi_are_excluded() {
        let mut table = transform(&campaign_table(60)).unwrap();
        let mut roi = match table.column(ROI) {
            Some(Column::Float(values)) => values.clone(),
            other => panic!("unexpected ROI column {other:?}"),
        };
        roi[3] = None;
        roi[4] = None;
        table.insert(ROI, Column::Float(roi)).unwrap();

        let (_, report) = Trainer::new(TrainingConfig::default()).train(&table).unwrap();
        assert_eq!(report.n_excluded, 2);
        assert_eq!(report.n_train + report.n_test, 58);
    }

    #[test]
    fn too_few_rows_is_an_error() {
        let table = transform(&campaign_table(3)).unwrap();
        assert!(matches!(
            Trainer::new(TrainingConfig::default()).train(&table),
            Err(ModelError::TooFewSamples { required: 5, actual: 3 })
        ));
    }
}
