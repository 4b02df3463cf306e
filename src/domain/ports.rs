use crate::domain::model::{Decision, HistoryRecord};
use crate::utils::error::Result;
use async_trait::async_trait;

pub trait Storage: Send + Sync {
    fn read_file(&self, path: &str) -> impl std::future::Future<Output = Result<Vec<u8>>> + Send;
}

/// A trained classifier that maps cleaned text to a label and raw per-class scores.
pub trait TextClassifier: Send + Sync {
    /// Labels in the order the scores from [`TextClassifier::decide`] follow.
    fn classes(&self) -> &[String];

    fn decide(&self, text: &str) -> Result<Decision>;
}

#[async_trait]
pub trait HistorySink: Send + Sync {
    async fn record(&self, record: &HistoryRecord) -> Result<()>;
}
