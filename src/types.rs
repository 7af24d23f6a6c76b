/// Типы данных: таблица кампаний, сегменты аудитории, API

use serde::{Deserialize, Serialize};

use crate::error::TransformError;

pub const TARGET_AUDIENCE: &str = "Target_Audience";
pub const GENDER: &str = "Gender";
pub const AGE_SEGMENT: &str = "Age_Segment";
pub const DURATION: &str = "Duration";
pub const DURATION_DAYS: &str = "Duration_Days";
pub const ACQUISITION_COST: &str = "Acquisition_Cost";
pub const ROI: &str = "ROI";
pub const ENGAGEMENT_SCORE: &str = "Engagement_Score";
pub const CONVERSION_RATE: &str = "Conversion_Rate";
pub const IMPRESSIONS: &str = "Impressions";
pub const CLICKS: &str = "Clicks";
pub const LOCATION: &str = "Location";
pub const CHANNEL_USED: &str = "Channel_Used";
pub const CAMPAIGN_TYPE: &str = "Campaign_Type";
pub const CUSTOMER_SEGMENT: &str = "Customer_Segment";
pub const IS_SUCCESSFUL: &str = "Is_Successful";

/// Числовые признаки классификатора
pub const NUMERIC_FEATURES: [&str; 7] = [
    DURATION_DAYS,
    CONVERSION_RATE,
    ACQUISITION_COST,
    ROI,
    ENGAGEMENT_SCORE,
    IMPRESSIONS,
    CLICKS,
];

/// Категориальные признаки классификатора
pub const CATEGORICAL_FEATURES: [&str; 6] = [
    GENDER,
    AGE_SEGMENT,
    LOCATION,
    CHANNEL_USED,
    CAMPAIGN_TYPE,
    CUSTOMER_SEGMENT,
];

/// Порог Engagement_Score для успешной кампании
pub const ENGAGEMENT_THRESHOLD: f64 = 7.0;

/// Тип колонки в реляционном хранилище
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SqlType {
    Text,
    Float,
    Integer,
}

impl SqlType {
    pub fn as_sql(&self) -> &'static str {
        match self {
            SqlType::Text => "TEXT",
            SqlType::Float => "REAL",
            SqlType::Integer => "INTEGER",
        }
    }
}

/// Колонка таблицы. `None` во `Float` - отсутствующее значение.
#[derive(Debug, Clone, PartialEq)]
pub enum Column {
    Text(Vec<String>),
    Float(Vec<Option<f64>>),
    Int(Vec<i64>),
}

impl Column {
    pub fn len(&self) -> usize {
        match self {
            Column::Text(v) => v.len(),
            Column::Float(v) => v.len(),
            Column::Int(v) => v.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn sql_type(&self) -> SqlType {
        match self {
            Column::Text(_) => SqlType::Text,
            Column::Float(_) => SqlType::Float,
            Column::Int(_) => SqlType::Integer,
        }
    }

    pub fn as_text(&self) -> Option<&[String]> {
        match self {
            Column::Text(v) => Some(v),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<&[i64]> {
        match self {
            Column::Int(v) => Some(v),
            _ => None,
        }
    }

    /// Числовое значение ячейки; для текста всегда `None`
    pub fn numeric(&self, row: usize) -> Option<f64> {
        match self {
            Column::Text(_) => None,
            Column::Float(v) => v[row],
            Column::Int(v) => Some(v[row] as f64),
        }
    }

    /// Строковое представление ячейки (пустая строка для `None`)
    pub fn render(&self, row: usize) -> String {
        match self {
            Column::Text(v) => v[row].clone(),
            Column::Float(v) => v[row].map(|x| x.to_string()).unwrap_or_default(),
            Column::Int(v) => v[row].to_string(),
        }
    }

    pub fn take(&self, indices: &[usize]) -> Column {
        match self {
            Column::Text(v) => Column::Text(indices.iter().map(|&i| v[i].clone()).collect()),
            Column::Float(v) => Column::Float(indices.iter().map(|&i| v[i]).collect()),
            Column::Int(v) => Column::Int(indices.iter().map(|&i| v[i]).collect()),
        }
    }
}

/// Таблица кампаний: упорядоченный набор именованных колонок одинаковой длины
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CampaignTable {
    columns: Vec<(String, Column)>,
}

impl CampaignTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn n_rows(&self) -> usize {
        self.columns.first().map(|(_, c)| c.len()).unwrap_or(0)
    }

    pub fn n_columns(&self) -> usize {
        self.columns.len()
    }

    pub fn is_empty(&self) -> bool {
        self.n_rows() == 0
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|(name, _)| name.as_str())
    }

    pub fn columns(&self) -> impl Iterator<Item = (&str, &Column)> {
        self.columns.iter().map(|(name, col)| (name.as_str(), col))
    }

    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, col)| col)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.column(name).is_some()
    }

    /// Существующая колонка заменяется на месте, новая добавляется в конец.
    /// Длина колонки должна совпадать с числом строк таблицы.
    pub fn insert(&mut self, name: impl Into<String>, column: Column) -> Result<(), TransformError> {
        let name = name.into();
        let replaces_only = self.columns.len() == 1 && self.columns[0].0 == name;
        if !self.columns.is_empty() && !replaces_only && column.len() != self.n_rows() {
            return Err(TransformError::ColumnLength {
                column: name,
                expected: self.n_rows(),
                actual: column.len(),
            });
        }
        match self.columns.iter_mut().find(|(n, _)| *n == name) {
            Some((_, slot)) => *slot = column,
            None => self.columns.push((name, column)),
        }
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<Column> {
        let idx = self.columns.iter().position(|(n, _)| n == name)?;
        Some(self.columns.remove(idx).1)
    }

    /// Переименование с сохранением позиции колонки
    pub fn rename(&mut self, from: &str, to: &str) -> bool {
        match self.columns.iter_mut().find(|(n, _)| n == from) {
            Some((name, _)) => {
                *name = to.to_string();
                true
            }
            None => false,
        }
    }

    pub fn select_rows(&self, indices: &[usize]) -> CampaignTable {
        CampaignTable {
            columns: self
                .columns
                .iter()
                .map(|(name, col)| (name.clone(), col.take(indices)))
                .collect(),
        }
    }

    pub fn filter_rows(&self, keep: &[bool]) -> CampaignTable {
        let indices: Vec<usize> = keep
            .iter()
            .enumerate()
            .filter_map(|(i, &k)| k.then_some(i))
            .collect();
        self.select_rows(&indices)
    }

    /// Копия таблицы без указанных колонок
    pub fn without(&self, names: &[&str]) -> CampaignTable {
        CampaignTable {
            columns: self
                .columns
                .iter()
                .filter(|(n, _)| !names.contains(&n.as_str()))
                .cloned()
                .collect(),
        }
    }
}

/// Возрастной диапазон после нормализации сырого токена
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AgeBracket {
    From18To24,
    From25To34,
    From35To44,
    From45,
}

impl AgeBracket {
    /// Нормализация сырого токена из `Target_Audience` ("All Ages" -> "Ages")
    pub fn from_raw(token: &str) -> Option<Self> {
        match token {
            "18-24" => Some(AgeBracket::From18To24),
            "25-34" => Some(AgeBracket::From25To34),
            "35-44" => Some(AgeBracket::From35To44),
            "45+" | "Ages" => Some(AgeBracket::From45),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            AgeBracket::From18To24 => "18-24",
            AgeBracket::From25To34 => "25-34",
            AgeBracket::From35To44 => "35-44",
            AgeBracket::From45 => "45+",
        }
    }

    pub fn generation(&self) -> Generation {
        match self {
            AgeBracket::From18To24 => Generation::GenZ,
            AgeBracket::From25To34 => Generation::Millennials,
            AgeBracket::From35To44 => Generation::GenX,
            AgeBracket::From45 => Generation::BabyBoomers,
        }
    }
}

/// Итоговое значение `Age_Segment`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Generation {
    GenZ,
    Millennials,
    GenX,
    BabyBoomers,
}

impl Generation {
    pub const ALL: [Generation; 4] = [
        Generation::GenZ,
        Generation::Millennials,
        Generation::GenX,
        Generation::BabyBoomers,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Generation::GenZ => "Gen Z",
            Generation::Millennials => "Millennials",
            Generation::GenX => "Gen X",
            Generation::BabyBoomers => "Baby Boomers",
        }
    }

    pub fn from_label(label: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|g| g.as_str() == label)
    }
}

/// Значение, которое может прийти числом или строкой
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RawValue {
    Number(f64),
    Text(String),
}

impl RawValue {
    fn render(&self) -> String {
        match self {
            RawValue::Number(x) => x.to_string(),
            RawValue::Text(s) => s.clone(),
        }
    }
}

/// Сырая запись кампании в запросе на предсказание
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CampaignInput {
    #[serde(rename = "Target_Audience")]
    pub target_audience: String,
    #[serde(rename = "Duration")]
    pub duration: String,
    #[serde(rename = "Acquisition_Cost")]
    pub acquisition_cost: RawValue,
    #[serde(rename = "ROI")]
    pub roi: RawValue,
    #[serde(rename = "Engagement_Score")]
    pub engagement_score: RawValue,
    #[serde(rename = "Conversion_Rate")]
    pub conversion_rate: f64,
    #[serde(rename = "Impressions")]
    pub impressions: i64,
    #[serde(rename = "Clicks")]
    pub clicks: i64,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "Channel_Used")]
    pub channel_used: String,
    #[serde(rename = "Campaign_Type")]
    pub campaign_type: String,
    #[serde(rename = "Customer_Segment")]
    pub customer_segment: String,
}

impl From<&[CampaignInput]> for CampaignTable {
    fn from(records: &[CampaignInput]) -> Self {
        let text = |f: fn(&CampaignInput) -> String| {
            Column::Text(records.iter().map(f).collect())
        };

        // все колонки строятся из одного и того же набора записей
        let columns = vec![
            (TARGET_AUDIENCE, text(|r| r.target_audience.clone())),
            (DURATION, text(|r| r.duration.clone())),
            (ACQUISITION_COST, text(|r| r.acquisition_cost.render())),
            (ROI, text(|r| r.roi.render())),
            (ENGAGEMENT_SCORE, text(|r| r.engagement_score.render())),
            (
                CONVERSION_RATE,
                Column::Float(records.iter().map(|r| Some(r.conversion_rate)).collect()),
            ),
            (IMPRESSIONS, Column::Int(records.iter().map(|r| r.impressions).collect())),
            (CLICKS, Column::Int(records.iter().map(|r| r.clicks).collect())),
            (LOCATION, text(|r| r.location.clone())),
            (CHANNEL_USED, text(|r| r.channel_used.clone())),
            (CAMPAIGN_TYPE, text(|r| r.campaign_type.clone())),
            (CUSTOMER_SEGMENT, text(|r| r.customer_segment.clone())),
        ];
        CampaignTable {
            columns: columns
                .into_iter()
                .map(|(name, column)| (name.to_string(), column))
                .collect(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictRequest {
    pub records: Vec<CampaignInput>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Prediction {
    pub index: usize,
    pub is_successful: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PredictResponse {
    pub predictions: Vec<Prediction>,
}
