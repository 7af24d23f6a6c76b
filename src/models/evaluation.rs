//! Оценка классификатора: разбиение, матрица ошибок, отчёт, кросс-валидация

use std::fmt;

use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::SeedableRng;
use serde::{Deserialize, Serialize};

use crate::error::ModelError;
use crate::types::CampaignTable;

/// Перемешивание индексов с фиксированным seed; тест = ceil(n * test_size)
pub fn train_test_split(n: usize, test_size: f64, seed: u64) -> (Vec<usize>, Vec<usize>) {
    let mut indices: Vec<usize> = (0..n).collect();
    let mut rng = StdRng::seed_from_u64(seed);
    indices.shuffle(&mut rng);

    let n_test = ((n as f64 * test_size).ceil() as usize).min(n);
    let train = indices.split_off(n_test);
    (train, indices)
}

/// Доля совпавших меток
pub fn accuracy(y_true: &[usize], y_pred: &[usize]) -> f64 {
    if y_true.is_empty() {
        return 0.0;
    }
    let correct = y_true.iter().zip(y_pred).filter(|(t, p)| t == p).count();
    correct as f64 / y_true.len() as f64
}

/// Матрица ошибок 2x2: строки - истинный класс, столбцы - предсказанный
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ConfusionMatrix {
    pub counts: [[usize; 2]; 2],
}

impl ConfusionMatrix {
    pub fn new(y_true: &[usize], y_pred: &[usize]) -> Self {
        let mut counts = [[0; 2]; 2];
        for (&t, &p) in y_true.iter().zip(y_pred) {
            counts[t.min(1)][p.min(1)] += 1;
        }
        Self { counts }
    }

    pub fn total(&self) -> usize {
        self.counts.iter().flatten().sum()
    }

    pub fn true_positives(&self) -> usize {
        self.counts[1][1]
    }

    pub fn accuracy(&self) -> f64 {
        let total = self.total();
        if total == 0 {
            0.0
        } else {
            (self.counts[0][0] + self.counts[1][1]) as f64 / total as f64
        }
    }
}

impl fmt::Display for ConfusionMatrix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let width = self.total().to_string().len();
        let [[tn, fp], [fn_, tp]] = self.counts;
        writeln!(f, "[[{tn:>width$} {fp:>width$}]")?;
        write!(f, " [{fn_:>width$} {tp:>width$}]]")
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ClassMetrics {
    pub precision: f64,
    pub recall: f64,
    pub f1: f64,
    pub support: usize,
}

/// Precision / recall / F1 по классам 0 и 1, деление на ноль даёт 0
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassificationReport {
    pub classes: [ClassMetrics; 2],
    pub accuracy: f64,
    pub macro_avg: ClassMetrics,
    pub weighted_avg: ClassMetrics,
}

impl From<&ConfusionMatrix> for ClassificationReport {
    fn from(cm: &ConfusionMatrix) -> Self {
        let ratio = |num: usize, den: usize| if den == 0 { 0.0 } else { num as f64 / den as f64 };

        let classes = [0usize, 1].map(|c| {
            let tp = cm.counts[c][c];
            let predicted = cm.counts[0][c] + cm.counts[1][c];
            let support = cm.counts[c][0] + cm.counts[c][1];
            let precision = ratio(tp, predicted);
            let recall = ratio(tp, support);
            let f1 = if precision + recall == 0.0 {
                0.0
            } else {
                2.0 * precision * recall / (precision + recall)
            };
            ClassMetrics { precision, recall, f1, support }
        });

        let total = cm.total();
        let average = |weight: &dyn Fn(&ClassMetrics) -> f64| {
            let norm: f64 = classes.iter().map(weight).sum();
            let avg = |metric: fn(&ClassMetrics) -> f64| {
                if norm == 0.0 {
                    0.0
                } else {
                    classes.iter().map(|c| metric(c) * weight(c)).sum::<f64>() / norm
                }
            };
            ClassMetrics {
                precision: avg(|c| c.precision),
                recall: avg(|c| c.recall),
                f1: avg(|c| c.f1),
                support: total,
            }
        };

        Self {
            classes,
            accuracy: cm.accuracy(),
            macro_avg: average(&|_| 1.0),
            weighted_avg: average(&|c| c.support as f64),
        }
    }
}

impl fmt::Display for ClassificationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "{:>12} {:>9} {:>9} {:>9} {:>9}", "", "precision", "recall", "f1-score", "support")?;
        writeln!(f)?;
        for (label, m) in self.classes.iter().enumerate() {
            writeln!(
                f,
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                label, m.precision, m.recall, m.f1, m.support
            )?;
        }
        writeln!(f)?;
        writeln!(
            f,
            "{:>12} {:>9} {:>9} {:>9.2} {:>9}",
            "accuracy", "", "", self.accuracy, self.macro_avg.support
        )?;
        for (name, m) in [("macro avg", &self.macro_avg), ("weighted avg", &self.weighted_avg)] {
            writeln!(
                f,
                "{:>12} {:>9.2} {:>9.2} {:>9.2} {:>9}",
                name, m.precision, m.recall, m.f1, m.support
            )?;
        }
        Ok(())
    }
}

/// Стратифицированное разбиение на k фолдов без перемешивания.
/// Возвращает индексы тестовой части каждого фолда.
pub fn stratified_folds(labels: &[usize], k: usize) -> Vec<Vec<usize>> {
    let mut folds = vec![Vec::new(); k];
    for class in [0usize, 1] {
        labels
            .iter()
            .enumerate()
            .filter(|&(_, &label)| label.min(1) == class)
            .enumerate()
            .for_each(|(n, (idx, _))| folds[n % k].push(idx));
    }
    for fold in &mut folds {
        fold.sort_unstable();
    }
    folds
}

/// Точность на каждом из k фолдов. `fit_predict` обучается на
/// (таблица, метки) и предсказывает для отложенной таблицы.
pub fn cross_val_score<F>(
    table: &CampaignTable,
    labels: &[usize],
    k: usize,
    fit_predict: F,
) -> Result<Vec<f64>, ModelError>
where
    F: Fn(&CampaignTable, &[usize], &CampaignTable) -> Result<Vec<usize>, ModelError>,
{
    if labels.len() < k {
        return Err(ModelError::TooFewSamples {
            required: k,
            actual: labels.len(),
        });
    }

    let folds = stratified_folds(labels, k);
    let mut scores = Vec::with_capacity(k);

    for (i, test_idx) in folds.iter().enumerate() {
        let train_idx: Vec<usize> = (0..labels.len())
            .filter(|idx| test_idx.binary_search(idx).is_err())
            .collect();

        let train_labels: Vec<usize> = train_idx.iter().map(|&idx| labels[idx]).collect();
        let test_labels: Vec<usize> = test_idx.iter().map(|&idx| labels[idx]).collect();

        let predicted = fit_predict(
            &table.select_rows(&train_idx),
            &train_labels,
            &table.select_rows(test_idx),
        )?;
        let score = accuracy(&test_labels, &predicted);
        tracing::debug!("CV fold {}: accuracy {:.4} on {} rows", i + 1, score, test_idx.len());
        scores.push(score);
    }

    Ok(scores)
}

/// Итог обучения: метрики на отложенной выборке и кросс-валидация
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrainingReport {
    pub n_train: usize,
    pub n_test: usize,
    pub n_excluded: usize,
    pub confusion_matrix: ConfusionMatrix,
    pub classification_report: ClassificationReport,
    pub cv_scores: Vec<f64>,
}

impl TrainingReport {
    pub fn cv_mean(&self) -> f64 {
        if self.cv_scores.is_empty() {
            0.0
        } else {
            self.cv_scores.iter().sum::<f64>() / self.cv_scores.len() as f64
        }
    }
}

impl fmt::Display for TrainingReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Confusion Matrix:")?;
        writeln!(f, "{}", self.confusion_matrix)?;
        writeln!(f)?;
        writeln!(f, "Classification Report:")?;
        writeln!(f, "{}", self.classification_report)?;
        let scores: Vec<String> = self.cv_scores.iter().map(|s| format!("{s:.4}")).collect();
        writeln!(f, "Cross-Validation Scores: [{}]", scores.join(", "))?;
        write!(f, "Mean CV Score: {:.4}", self.cv_mean())
    }
}
