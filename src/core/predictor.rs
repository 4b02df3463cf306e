use crate::core::ranking::{confidence_of, rank, top_classes};
use crate::core::text_cleaning::clean_text;
use crate::domain::model::{HistoryRecord, PredictionResponse, Ticket};
use crate::domain::ports::{HistorySink, TextClassifier};
use crate::utils::error::Result;
use std::sync::Arc;

/// Runs one ticket through clean → classify → rank, then records history
/// when the ticket carries a user id and a sink is configured.
#[derive(Clone)]
pub struct Predictor {
    classifier: Arc<dyn TextClassifier>,
    history: Option<Arc<dyn HistorySink>>,
}

impl Predictor {
    pub fn new(classifier: Arc<dyn TextClassifier>) -> Self {
        Self {
            classifier,
            history: None,
        }
    }

    pub fn with_history(mut self, history: Option<Arc<dyn HistorySink>>) -> Self {
        self.history = history;
        self
    }

    pub fn classes(&self) -> &[String] {
        self.classifier.classes()
    }

    pub fn history_enabled(&self) -> bool {
        self.history.is_some()
    }

    pub async fn predict(&self, ticket: &Ticket) -> Result<PredictionResponse> {
        let text = clean_text(&ticket.combined_text());
        tracing::debug!("Cleaned ticket text: {} chars", text.len());

        let decision = self.classifier.decide(&text)?;
        let ranked = rank(self.classifier.classes(), &decision.scores)?;
        let confidence = confidence_of(&ranked, &decision.label)?;

        tracing::debug!("Predicted {} ({:.3})", decision.label, confidence);

        match (ticket.owner(), &self.history) {
            (Some(user_id), Some(history)) => {
                let record = HistoryRecord {
                    user_id: user_id.to_string(),
                    subject: ticket.subject.clone(),
                    body: ticket.body.clone(),
                    predicted_category: decision.label.clone(),
                };
                match history.record(&record).await {
                    Ok(()) => tracing::info!("Saved history for user {}", user_id),
                    Err(e) => tracing::error!("History insert failed: {}", e),
                }
            }
            _ => tracing::warn!("History not saved (no user_id or no history store)"),
        }

        Ok(PredictionResponse {
            category: decision.label,
            confidence,
            top_classes: top_classes(&ranked),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::Decision;
    use crate::utils::error::TriageError;
    use async_trait::async_trait;
    use tokio::sync::Mutex;

    struct FixedClassifier {
        classes: Vec<String>,
        scores: Vec<f64>,
    }

    impl FixedClassifier {
        fn new(scores: &[f64]) -> Self {
            Self {
                classes: ["Incident", "Request", "Problem", "Change"]
                    .iter()
                    .map(|s| s.to_string())
                    .collect(),
                scores: scores.to_vec(),
            }
        }
    }

    impl TextClassifier for FixedClassifier {
        fn classes(&self) -> &[String] {
            &self.classes
        }

        fn decide(&self, _text: &str) -> Result<Decision> {
            let best = self
                .scores
                .iter()
                .enumerate()
                .fold(0, |best, (i, s)| if *s > self.scores[best] { i } else { best });
            Ok(Decision {
                label: self.classes[best].clone(),
                scores: self.scores.clone(),
            })
        }
    }

    struct FailingClassifier;

    impl TextClassifier for FailingClassifier {
        fn classes(&self) -> &[String] {
            &[]
        }

        fn decide(&self, _text: &str) -> Result<Decision> {
            Err(TriageError::prediction("vectorizer exploded"))
        }
    }

    #[derive(Default)]
    struct RecordingSink {
        records: Mutex<Vec<HistoryRecord>>,
        fail: bool,
    }

    #[async_trait]
    impl HistorySink for RecordingSink {
        async fn record(&self, record: &HistoryRecord) -> Result<()> {
            self.records.lock().await.push(record.clone());
            if self.fail {
                Err(TriageError::HistoryError {
                    message: "insert rejected".to_string(),
                })
            } else {
                Ok(())
            }
        }
    }

    fn ticket(user_id: Option<&str>) -> Ticket {
        Ticket {
            subject: "VPN down".to_string(),
            body: "Cannot connect since 9am".to_string(),
            user_id: user_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_predict_response_shape() {
        let predictor = Predictor::new(Arc::new(FixedClassifier::new(&[2.0, 0.5, 1.0, -1.0])));
        let response = predictor.predict(&ticket(None)).await.unwrap();

        assert_eq!(response.category, "Incident");
        assert_eq!(response.top_classes.len(), 3);
        assert_eq!(response.top_classes[0].label, response.category);
        assert_eq!(response.top_classes[1].label, "Problem");
        assert_eq!(response.top_classes[2].label, "Request");
        assert!((response.confidence - response.top_classes[0].score).abs() < 1e-12);
        assert!(response.top_classes.windows(2).all(|w| w[0].score >= w[1].score));
    }

    #[tokio::test]
    async fn test_history_written_for_user() {
        let sink = Arc::new(RecordingSink::default());
        let predictor = Predictor::new(Arc::new(FixedClassifier::new(&[0.0, 3.0, 0.0, 0.0])))
            .with_history(Some(sink.clone() as Arc<dyn HistorySink>));

        let response = predictor.predict(&ticket(Some("user-42"))).await.unwrap();

        let records = sink.records.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].user_id, "user-42");
        assert_eq!(records[0].subject, "VPN down");
        assert_eq!(records[0].body, "Cannot connect since 9am");
        assert_eq!(records[0].predicted_category, response.category);
        assert_eq!(response.category, "Request");
    }

    #[tokio::test]
    async fn test_no_history_without_user_id() {
        let sink = Arc::new(RecordingSink::default());
        let predictor = Predictor::new(Arc::new(FixedClassifier::new(&[1.0, 0.0, 0.0, 0.0])))
            .with_history(Some(sink.clone() as Arc<dyn HistorySink>));

        predictor.predict(&ticket(None)).await.unwrap();
        predictor.predict(&ticket(Some(""))).await.unwrap();

        assert!(sink.records.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_history_failure_does_not_fail_prediction() {
        let sink = Arc::new(RecordingSink {
            fail: true,
            ..Default::default()
        });
        let predictor = Predictor::new(Arc::new(FixedClassifier::new(&[0.0, 0.0, 0.0, 4.0])))
            .with_history(Some(sink.clone() as Arc<dyn HistorySink>));

        let response = predictor.predict(&ticket(Some("user-1"))).await.unwrap();
        assert_eq!(response.category, "Change");
        assert_eq!(sink.records.lock().await.len(), 1);
    }

    #[tokio::test]
    async fn test_classifier_error_propagates() {
        let predictor = Predictor::new(Arc::new(FailingClassifier));
        let err = predictor.predict(&ticket(Some("user-1"))).await.unwrap_err();
        assert!(matches!(err, TriageError::PredictionError { .. }));
    }
}
