//! HTTP adapters for the language and speech services
//!
//! `HttpAiService` fronts the extraction/selection service and
//! `KokoroSpeech` an OpenAI-compatible speech endpoint. Both map every
//! transport, status and decoding failure into a `PortError`.

mod client;
mod tts;
mod types;

pub use client::HttpAiService;
pub use tts::KokoroSpeech;

use crate::runtime::PortError;
use reqwest::Client;
use serde::Serialize;
use std::time::Duration;

/// Shared client with the configured request timeout
pub fn http_client(timeout: Duration) -> Result<Client, reqwest::Error> {
    Client::builder().timeout(timeout).build()
}

/// POST `body` as JSON and return the raw response body of a 2xx reply
async fn post_json<B: Serialize + Sync + ?Sized>(
    client: &Client,
    url: &str,
    body: &B,
    port: &'static str,
) -> Result<Vec<u8>, PortError> {
    let response = client
        .post(url)
        .json(body)
        .send()
        .await
        .map_err(|e| PortError::from_reqwest(port, &e))?;

    let status = response.status();
    let bytes = response
        .bytes()
        .await
        .map_err(|e| PortError::network(port, format!("Failed to read response: {e}")))?;

    if !status.is_success() {
        return Err(PortError::status(
            port,
            status.as_u16(),
            &String::from_utf8_lossy(&bytes),
        ));
    }
    Ok(bytes.to_vec())
}

fn trim_base(base_url: &str) -> String {
    base_url.trim_end_matches('/').to_string()
}
