/// ML модели

pub mod classifier;
pub mod evaluation;
pub mod trainer;

pub use classifier::{CampaignClassifier, ClassifierParams};
pub use evaluation::{ClassificationReport, ConfusionMatrix, TrainingReport};
pub use trainer::Trainer;
