pub mod classifier;
pub mod predictor;
pub mod ranking;
pub mod text_cleaning;
pub mod vectorizer;

pub use crate::domain::model::{ClassScore, Decision, HistoryRecord, PredictionResponse, Ticket};
pub use crate::domain::ports::{HistorySink, Storage, TextClassifier};
pub use crate::utils::error::Result;
