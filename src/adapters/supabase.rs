//! Prediction history persisted through Supabase's PostgREST endpoint.

use crate::config::HistorySettings;
use crate::core::{HistoryRecord, HistorySink};
use crate::utils::error::{Result, TriageError};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;

pub struct SupabaseHistory {
    client: Client,
    endpoint: String,
    service_key: String,
    schema: String,
}

impl SupabaseHistory {
    pub fn new(settings: &HistorySettings) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_seconds))
            .build()?;

        let endpoint = format!(
            "{}/rest/v1/{}",
            settings.url.trim_end_matches('/'),
            settings.table
        );

        Ok(Self {
            client,
            endpoint,
            service_key: settings.service_key.clone(),
            schema: settings.schema.clone(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl HistorySink for SupabaseHistory {
    async fn record(&self, record: &HistoryRecord) -> Result<()> {
        tracing::debug!("Inserting history row into {}", self.endpoint);

        let response = self
            .client
            .post(&self.endpoint)
            .header("apikey", &self.service_key)
            .bearer_auth(&self.service_key)
            .header("Content-Profile", &self.schema)
            .header("Prefer", "return=minimal")
            .json(record)
            .send()
            .await?;

        let status = response.status();
        if status.is_success() {
            return Ok(());
        }

        let detail = response.text().await.unwrap_or_default();
        Err(TriageError::HistoryError {
            message: format!("insert returned {}: {}", status, detail),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use httpmock::prelude::*;

    fn settings(url: String) -> HistorySettings {
        HistorySettings {
            url,
            service_key: "service-key".to_string(),
            table: "history".to_string(),
            schema: "public".to_string(),
            timeout_seconds: 5,
        }
    }

    fn record() -> HistoryRecord {
        HistoryRecord {
            user_id: "user-7".to_string(),
            subject: "Laptop".to_string(),
            body: "Screen flickers".to_string(),
            predicted_category: "Incident".to_string(),
        }
    }

    #[test]
    fn test_endpoint_trims_trailing_slash() {
        let sink = SupabaseHistory::new(&settings("https://abc.supabase.co/".to_string())).unwrap();
        assert_eq!(sink.endpoint(), "https://abc.supabase.co/rest/v1/history");
    }

    #[tokio::test]
    async fn test_insert_sends_postgrest_headers() {
        let server = MockServer::start_async().await;
        let insert = server
            .mock_async(|when, then| {
                when.method(POST)
                    .path("/rest/v1/history")
                    .header("apikey", "service-key")
                    .header("authorization", "Bearer service-key")
                    .header("content-profile", "public")
                    .header("prefer", "return=minimal")
                    .json_body(serde_json::json!({
                        "user_id": "user-7",
                        "subject": "Laptop",
                        "body": "Screen flickers",
                        "predicted_category": "Incident"
                    }));
                then.status(201);
            })
            .await;

        let sink = SupabaseHistory::new(&settings(server.base_url())).unwrap();
        sink.record(&record()).await.unwrap();

        insert.assert_async().await;
    }

    #[tokio::test]
    async fn test_non_success_status_is_history_error() {
        let server = MockServer::start_async().await;
        server
            .mock_async(|when, then| {
                when.method(POST).path("/rest/v1/history");
                then.status(401).body(r#"{"message":"Invalid API key"}"#);
            })
            .await;

        let sink = SupabaseHistory::new(&settings(server.base_url())).unwrap();
        let err = sink.record(&record()).await.unwrap_err();
        match err {
            TriageError::HistoryError { message } => {
                assert!(message.contains("401"));
                assert!(message.contains("Invalid API key"));
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }
}
