use super::types::{ExtractRequest, SelectRequest};
use super::{post_json, trim_base};
use crate::runtime::{
    BookingExtractor, CandidateSummary, Extraction, PortError, ProviderSelector, Selection,
};
use crate::session::BookingDraft;
use async_trait::async_trait;
use reqwest::Client;
use serde::de::DeserializeOwned;
use std::time::Instant;

const EXTRACTION: &str = "extraction";
const SELECTION: &str = "selection";

/// Client for the extraction/selection service
#[derive(Debug, Clone)]
pub struct HttpAiService {
    client: Client,
    base_url: String,
}

impl HttpAiService {
    pub fn new(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: trim_base(base_url),
        }
    }

    async fn call<B, R>(&self, path: &str, body: &B, port: &'static str) -> Result<R, PortError>
    where
        B: serde::Serialize + Sync,
        R: DeserializeOwned,
    {
        let url = format!("{}{path}", self.base_url);
        let start = Instant::now();
        let result = post_json(&self.client, &url, body, port)
            .await
            .and_then(|bytes| {
                serde_json::from_slice(&bytes).map_err(|e| {
                    PortError::decode(
                        port,
                        format!(
                            "Failed to parse response: {e} - body: {}",
                            String::from_utf8_lossy(&bytes)
                        ),
                    )
                })
            });

        let duration = start.elapsed();
        match &result {
            Ok(_) => tracing::info!(
                port,
                duration_ms = %duration.as_millis(),
                "AI request completed"
            ),
            Err(e) => tracing::error!(
                port,
                duration_ms = %duration.as_millis(),
                error = %e.message,
                "AI request failed"
            ),
        }
        result
    }
}

#[async_trait]
impl BookingExtractor for HttpAiService {
    async fn extract(
        &self,
        transcript: &str,
        existing: &BookingDraft,
    ) -> Result<Extraction, PortError> {
        let body = ExtractRequest {
            transcript,
            existing_booking: existing,
        };
        self.call("/extract", &body, EXTRACTION).await
    }
}

#[async_trait]
impl ProviderSelector for HttpAiService {
    async fn select(
        &self,
        transcript: &str,
        candidates: &[CandidateSummary],
        awaiting_confirmation: bool,
    ) -> Result<Selection, PortError> {
        let body = SelectRequest {
            transcript,
            providers: candidates,
            awaiting_confirmation,
        };
        self.call("/select", &body, SELECTION).await
    }
}
