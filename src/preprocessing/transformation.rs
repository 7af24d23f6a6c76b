//! Трансформация сырой таблицы кампаний в обогащённую
//!
//! Шаги выполняются строго по порядку: каждый следующий читает уже
//! преобразованные колонки предыдущих шагов.
//!
//! 1. `Target_Audience` -> `Gender`, `Age_Segment`
//! 2. сырой возрастной токен -> канонический диапазон (`Ages` -> `45+`)
//! 3. `Duration` без `days` -> целое
//! 4. `Duration` -> `Duration_Days`
//! 5. диапазон -> поколение (`25-34` -> `Millennials`)
//! 6. `Acquisition_Cost` без `$` и `,` -> число
//! 7. `ROI`, `Engagement_Score` -> числа, `Is_Successful`

use crate::config::MalformedPolicy;
use crate::error::TransformError;
use crate::types::*;

/// Процедура трансформации. Входная таблица не изменяется.
#[derive(Debug, Clone, Copy, Default)]
pub struct Transformation {
    policy: MalformedPolicy,
}

impl Transformation {
    pub fn new(policy: MalformedPolicy) -> Self {
        Self { policy }
    }

    pub fn policy(&self) -> MalformedPolicy {
        self.policy
    }

    pub fn apply(&self, input: &CampaignTable) -> Result<CampaignTable, TransformError> {
        let mut table = input.clone();
        let mut guard = RowGuard::new(self.policy, table.n_rows());

        // 1-2. Аудитория: пол и нормализованный возрастной диапазон
        let split = split_audience(&mut table, &mut guard)?;
        if split {
            normalize_age_brackets(&mut table, &mut guard)?;
        } else {
            check_existing_segments(&table, &mut guard)?;
        }

        // 3-4. Длительность
        convert_duration(&mut table, &mut guard)?;

        // 5. Поколения
        if split {
            remap_generations(&mut table, &guard)?;
        }

        // 6. Стоимость привлечения
        clean_acquisition_cost(&mut table, &mut guard)?;

        if guard.skipped > 0 {
            let keep: Vec<bool> = guard.rejected.iter().map(|r| !r).collect();
            table = table.filter_rows(&keep);
        }

        // 7. Числовые метрики и целевая переменная
        label_success(&mut table)?;

        tracing::info!(
            "Transformed {} rows ({} skipped as malformed)",
            table.n_rows(),
            guard.skipped
        );
        Ok(table)
    }
}

/// Трансформация с политикой по умолчанию (прерывание на первой ошибке)
pub fn transform(input: &CampaignTable) -> Result<CampaignTable, TransformError> {
    Transformation::default().apply(input)
}

/// Учёт отброшенных строк в зависимости от политики
struct RowGuard {
    policy: MalformedPolicy,
    rejected: Vec<bool>,
    skipped: usize,
}

impl RowGuard {
    fn new(policy: MalformedPolicy, rows: usize) -> Self {
        Self {
            policy,
            rejected: vec![false; rows],
            skipped: 0,
        }
    }

    fn reject(&mut self, row: usize, err: TransformError) -> Result<(), TransformError> {
        match self.policy {
            MalformedPolicy::Abort => Err(err),
            MalformedPolicy::Skip => {
                tracing::warn!("Skipping row: {}", err);
                if !self.rejected[row] {
                    self.rejected[row] = true;
                    self.skipped += 1;
                }
                Ok(())
            }
        }
    }

    fn is_rejected(&self, row: usize) -> bool {
        self.rejected[row]
    }
}

fn require<'a>(table: &'a CampaignTable, name: &str) -> Result<&'a Column, TransformError> {
    table
        .column(name)
        .ok_or_else(|| TransformError::MissingColumn(name.to_string()))
}

fn require_text<'a>(table: &'a CampaignTable, name: &str) -> Result<&'a [String], TransformError> {
    require(table, name)?
        .as_text()
        .ok_or_else(|| TransformError::ColumnType {
            column: name.to_string(),
            expected: "text",
        })
}

/// Шаг 1. Возвращает `false`, если `Target_Audience` уже нет
fn split_audience(table: &mut CampaignTable, guard: &mut RowGuard) -> Result<bool, TransformError> {
    if !table.contains(TARGET_AUDIENCE) {
        return Ok(false);
    }

    let mut genders = Vec::with_capacity(table.n_rows());
    let mut ages = Vec::with_capacity(table.n_rows());
    for (row, value) in require_text(table, TARGET_AUDIENCE)?.iter().enumerate() {
        let tokens: Vec<&str> = value.split_whitespace().collect();
        match tokens.as_slice() {
            [gender, age] => {
                genders.push(gender.to_string());
                ages.push(age.to_string());
            }
            _ => {
                guard.reject(
                    row,
                    TransformError::malformed(
                        row,
                        TARGET_AUDIENCE,
                        value.as_str(),
                        format!("expected `<Gender> <AgeRange>`, got {} tokens", tokens.len()),
                    ),
                )?;
                genders.push(String::new());
                ages.push(String::new());
            }
        }
    }

    table.insert(GENDER, Column::Text(genders))?;
    table.insert(AGE_SEGMENT, Column::Text(ages))?;
    Ok(true)
}

/// Без `Target_Audience` сегменты должны уже быть в итоговом виде
fn check_existing_segments(table: &CampaignTable, guard: &mut RowGuard) -> Result<(), TransformError> {
    if !table.contains(GENDER) || !table.contains(AGE_SEGMENT) {
        return Err(TransformError::MissingColumn(TARGET_AUDIENCE.to_string()));
    }
    require_text(table, GENDER)?;

    for (row, value) in require_text(table, AGE_SEGMENT)?.iter().enumerate() {
        if Generation::from_label(value).is_none() {
            guard.reject(
                row,
                TransformError::malformed(row, AGE_SEGMENT, value.as_str(), "not a generation label"),
            )?;
        }
    }
    Ok(())
}

/// Шаг 2
fn normalize_age_brackets(table: &mut CampaignTable, guard: &mut RowGuard) -> Result<(), TransformError> {
    let mut brackets = Vec::with_capacity(table.n_rows());
    for (row, raw) in require_text(table, AGE_SEGMENT)?.iter().enumerate() {
        if guard.is_rejected(row) {
            brackets.push(String::new());
            continue;
        }
        match AgeBracket::from_raw(raw) {
            Some(bracket) => brackets.push(bracket.as_str().to_string()),
            None => {
                guard.reject(
                    row,
                    TransformError::malformed(row, AGE_SEGMENT, raw.as_str(), "unknown age range"),
                )?;
                brackets.push(String::new());
            }
        }
    }
    table.insert(AGE_SEGMENT, Column::Text(brackets))?;
    Ok(())
}

/// Шаги 3-4
fn convert_duration(table: &mut CampaignTable, guard: &mut RowGuard) -> Result<(), TransformError> {
    let Some(column) = table.column(DURATION) else {
        return match table.column(DURATION_DAYS) {
            Some(Column::Int(_)) => Ok(()),
            Some(_) => Err(TransformError::ColumnType {
                column: DURATION_DAYS.to_string(),
                expected: "integer",
            }),
            None => Err(TransformError::MissingColumn(DURATION.to_string())),
        };
    };

    let mut days = Vec::with_capacity(column.len());
    for row in 0..column.len() {
        let raw = column.render(row);
        match parse_duration(&raw) {
            Ok(value) => days.push(value),
            Err(reason) => {
                guard.reject(row, TransformError::malformed(row, DURATION, raw, reason))?;
                days.push(0);
            }
        }
    }

    table.insert(DURATION, Column::Int(days))?;
    table.remove(DURATION_DAYS);
    table.rename(DURATION, DURATION_DAYS);
    Ok(())
}

fn parse_duration(raw: &str) -> Result<i64, &'static str> {
    if !raw.contains("days") {
        return Err("missing `days` suffix");
    }
    raw.replace("days", "")
        .trim()
        .parse::<u32>()
        .map(i64::from)
        .map_err(|_| "not a non-negative integer")
}

/// Шаг 5
fn remap_generations(table: &mut CampaignTable, guard: &RowGuard) -> Result<(), TransformError> {
    let generations = require_text(table, AGE_SEGMENT)?
        .iter()
        .enumerate()
        .map(|(row, bracket)| {
            if guard.is_rejected(row) {
                return String::new();
            }
            AgeBracket::from_raw(bracket)
                .map(|b| b.generation().as_str().to_string())
                .unwrap_or_default()
        })
        .collect();
    table.insert(AGE_SEGMENT, Column::Text(generations))?;
    Ok(())
}

/// Шаг 6
fn clean_acquisition_cost(table: &mut CampaignTable, guard: &mut RowGuard) -> Result<(), TransformError> {
    let column = require(table, ACQUISITION_COST)?;
    let mut costs = Vec::with_capacity(column.len());

    for row in 0..column.len() {
        let parsed = match column {
            Column::Text(values) => parse_cost(&values[row]),
            Column::Float(_) | Column::Int(_) => column.numeric(row).ok_or("missing value"),
        }
        .and_then(|cost| {
            if cost.is_finite() && cost >= 0.0 {
                Ok(cost)
            } else {
                Err("must be a non-negative number")
            }
        });

        match parsed {
            Ok(cost) => costs.push(Some(cost)),
            Err(reason) => {
                guard.reject(
                    row,
                    TransformError::malformed(row, ACQUISITION_COST, column.render(row), reason),
                )?;
                costs.push(None);
            }
        }
    }

    table.insert(ACQUISITION_COST, Column::Float(costs))?;
    Ok(())
}

fn parse_cost(raw: &str) -> Result<f64, &'static str> {
    raw.replace(['$', ','], "")
        .trim()
        .parse::<f64>()
        .map_err(|_| "not a number after removing currency symbols")
}

/// Мягкое приведение к числу: нечисловые значения становятся `None`
pub fn coerce_numeric(column: &Column) -> Vec<Option<f64>> {
    match column {
        Column::Text(values) => values
            .iter()
            .map(|v| v.trim().parse::<f64>().ok().filter(|x| !x.is_nan()))
            .collect(),
        Column::Float(values) => values.clone(),
        Column::Int(values) => values.iter().map(|&v| Some(v as f64)).collect(),
    }
}

/// Среднее по непустым значениям
pub fn mean_present(values: &[Option<f64>]) -> Option<f64> {
    let present: Vec<f64> = values.iter().flatten().copied().collect();
    if present.is_empty() {
        None
    } else {
        Some(present.iter().sum::<f64>() / present.len() as f64)
    }
}

/// Шаг 7
fn label_success(table: &mut CampaignTable) -> Result<(), TransformError> {
    let roi = coerce_numeric(require(table, ROI)?);
    let engagement = coerce_numeric(require(table, ENGAGEMENT_SCORE)?);

    let mean_roi = mean_present(&roi);
    tracing::debug!("Mean ROI over {} rows: {:?}", table.n_rows(), mean_roi);

    let labels = roi
        .iter()
        .zip(&engagement)
        .map(|(r, e)| match (r, e, mean_roi) {
            (Some(r), Some(e), Some(mean)) => i64::from(*r > mean && *e > ENGAGEMENT_THRESHOLD),
            _ => 0,
        })
        .collect();

    table.insert(ROI, Column::Float(roi))?;
    table.insert(ENGAGEMENT_SCORE, Column::Float(engagement))?;
    table.insert(IS_SUCCESSFUL, Column::Int(labels))?;
    Ok(())
}
