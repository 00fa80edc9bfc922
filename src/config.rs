//! Environment-driven configuration

use crate::matcher::{GeoPoint, DEFAULT_ORIGIN};
use crate::profile::UserProfile;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

/// Extraction/selection service
#[derive(Debug, Clone, PartialEq)]
pub struct AiConfig {
    pub base_url: String,
}

/// OpenAI-compatible speech endpoint (Kokoro)
#[derive(Debug, Clone, PartialEq)]
pub struct TtsConfig {
    pub base_url: String,
    pub model: String,
    pub voice: String,
    pub speed: f32,
    pub format: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AppConfig {
    pub port: u16,
    pub ai: AiConfig,
    pub tts: TtsConfig,
    /// `None` uses the embedded catalog
    pub prompts_file: Option<PathBuf>,
    pub providers_file: PathBuf,
    pub session_ttl: Duration,
    pub sweep_interval: Duration,
    pub max_turns: u32,
    pub http_timeout: Duration,
    pub profile: UserProfile,
}

impl AppConfig {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build from any key lookup; unset keys take their defaults
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let string = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());
        let secs = |key: &str, default: u64| Duration::from_secs(positive(&lookup, key, default));

        let default_profile = UserProfile::default();
        let location = match (
            lookup("USER_LAT").map(|v| v.parse::<f64>()),
            lookup("USER_LNG").map(|v| v.parse::<f64>()),
        ) {
            (None, None) => default_profile.location,
            (Some(Ok(lat)), Some(Ok(lng))) => match GeoPoint::new(lat, lng) {
                Ok(point) => Some(point),
                Err(e) => {
                    tracing::warn!(error = %e, "Invalid USER_LAT/USER_LNG, using default origin");
                    Some(DEFAULT_ORIGIN)
                }
            },
            _ => {
                tracing::warn!("USER_LAT and USER_LNG must both be set to numbers, using default origin");
                Some(DEFAULT_ORIGIN)
            }
        };

        Self {
            port: parsed(&lookup, "PORT", 3001),
            ai: AiConfig {
                base_url: string("AI_BASE_URL", "http://localhost:8000"),
            },
            tts: TtsConfig {
                base_url: string("KOKORO_BASE_URL", "http://localhost:8880"),
                model: string("KOKORO_MODEL", "kokoro"),
                voice: string("KOKORO_VOICE", "af_heart"),
                speed: parsed(&lookup, "KOKORO_SPEED", 1.0),
                format: string("KOKORO_FORMAT", "mp3"),
            },
            prompts_file: lookup("PROMPTS_FILE").map(PathBuf::from),
            providers_file: PathBuf::from(string("PROVIDERS_FILE", "data/providers.json")),
            session_ttl: secs("SESSION_TTL_SECS", 30 * 60),
            sweep_interval: secs("SESSION_SWEEP_SECS", 5 * 60),
            max_turns: parsed(&lookup, "MAX_TURNS", 8),
            http_timeout: secs("HTTP_TIMEOUT_SECS", 30),
            profile: UserProfile {
                address: lookup("USER_ADDRESS").unwrap_or(default_profile.address),
                location,
            },
        }
    }
}

/// Like `parsed`, but zero also falls back to the default
fn positive<F>(lookup: &F, key: &str, default: u64) -> u64
where
    F: Fn(&str) -> Option<String>,
{
    match parsed(lookup, key, default) {
        0 => {
            tracing::warn!(key, default, "Setting must be greater than zero, using default");
            default
        }
        value => value,
    }
}

fn parsed<F, T>(lookup: &F, key: &str, default: T) -> T
where
    F: Fn(&str) -> Option<String>,
    T: FromStr + Copy + std::fmt::Display,
{
    match lookup(key) {
        None => default,
        Some(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!(key, value = %raw, default = %default, "Unparseable setting, using default");
            default
        }),
    }
}
