use thiserror::Error;

#[derive(Error, Debug)]
pub enum TriageError {
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("Configuration error: {message}")]
    ConfigError { message: String },

    #[error("Invalid value for {field} ({value}): {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Model artifact error: {message}")]
    ModelError { message: String },

    #[error("Prediction error: {message}")]
    PredictionError { message: String },

    #[error("History write error: {message}")]
    HistoryError { message: String },
}

impl TriageError {
    pub fn model(message: impl Into<String>) -> Self {
        Self::ModelError {
            message: message.into(),
        }
    }

    pub fn prediction(message: impl Into<String>) -> Self {
        Self::PredictionError {
            message: message.into(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TriageError>;
