use super::types::SpeechRequest;
use super::{post_json, trim_base};
use crate::config::TtsConfig;
use crate::runtime::{PortError, SpeechSynthesizer};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Instant;

const TTS: &str = "tts";

/// Kokoro (OpenAI-compatible `/v1/audio/speech`) synthesizer
#[derive(Debug, Clone)]
pub struct KokoroSpeech {
    client: Client,
    url: String,
    model: String,
    voice: String,
    speed: f32,
    format: String,
}

impl KokoroSpeech {
    pub fn new(client: Client, config: &TtsConfig) -> Self {
        Self {
            client,
            url: format!("{}/v1/audio/speech", trim_base(&config.base_url)),
            model: config.model.clone(),
            voice: config.voice.clone(),
            speed: config.speed,
            format: config.format.clone(),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for KokoroSpeech {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, PortError> {
        let body = SpeechRequest {
            model: &self.model,
            input: text,
            voice: &self.voice,
            speed: self.speed,
            response_format: &self.format,
        };

        let start = Instant::now();
        let audio = post_json(&self.client, &self.url, &body, TTS).await?;
        tracing::debug!(
            bytes = audio.len(),
            duration_ms = %start.elapsed().as_millis(),
            "Speech synthesized"
        );
        Ok(audio)
    }
}
