/// Модуль предобработки данных

pub mod encoding;
pub mod feature_engineering;
pub mod normalization;
pub mod transformation;

pub use encoding::OneHotEncoder;
pub use feature_engineering::{extract_labels, FeatureEngineer};
pub use normalization::DataNormalizer;
pub use transformation::{transform, Transformation};
