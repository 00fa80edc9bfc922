//! Trait abstractions for runtime I/O
//!
//! Every external collaborator the orchestrator awaits sits behind one of
//! these traits so the executor can be driven by mocks in tests.

use super::error::PortError;
use crate::bookings::{BookingRecord, NewBooking};
use crate::matcher::MatchedProvider;
use crate::profile::UserProfile;
use crate::session::BookingDraft;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

/// Result of the extraction port
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Extraction {
    /// Partial booking fields; absent or null entries carry no information
    #[serde(default)]
    pub booking: BookingDraft,
    #[serde(default)]
    pub missing_fields: Vec<String>,
    #[serde(default)]
    pub clarification_prompt: Option<String>,
}

/// Result of the selection/confirmation port
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct Selection {
    #[serde(default)]
    pub provider_id: Option<String>,
    #[serde(default)]
    pub confirmed: bool,
}

/// What the selection port sees of a candidate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CandidateSummary {
    pub id: String,
    pub name: String,
}

impl CandidateSummary {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
        }
    }
}

impl From<&MatchedProvider> for CandidateSummary {
    fn from(m: &MatchedProvider) -> Self {
        Self::new(m.provider.id.clone(), m.provider.name.clone())
    }
}

/// Extracts booking fields from a transcript
#[async_trait]
pub trait BookingExtractor: Send + Sync {
    async fn extract(
        &self,
        transcript: &str,
        existing: &BookingDraft,
    ) -> Result<Extraction, PortError>;
}

/// Resolves which candidate a transcript refers to, or whether it is a yes
#[async_trait]
pub trait ProviderSelector: Send + Sync {
    async fn select(
        &self,
        transcript: &str,
        candidates: &[CandidateSummary],
        awaiting_confirmation: bool,
    ) -> Result<Selection, PortError>;
}

/// Text-to-speech
#[async_trait]
pub trait SpeechSynthesizer: Send + Sync {
    /// Raw encoded audio for `text`
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, PortError>;
}

/// Durable record of confirmed bookings
#[async_trait]
pub trait BookingLedger: Send + Sync {
    /// Assigns id and creation time
    async fn create_booking(&self, booking: NewBooking) -> Result<BookingRecord, PortError>;

    async fn list_bookings(&self) -> Result<Vec<BookingRecord>, PortError>;

    async fn get_booking(&self, id: &str) -> Result<Option<BookingRecord>, PortError>;
}

/// Registered address and coordinates of the user behind a session
#[async_trait]
pub trait ProfileDirectory: Send + Sync {
    async fn profile(&self, session_id: &str) -> Result<UserProfile, PortError>;
}

/// The full set of collaborators an orchestrator talks to
#[derive(Clone)]
pub struct Ports {
    pub extractor: Arc<dyn BookingExtractor>,
    pub selector: Arc<dyn ProviderSelector>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub ledger: Arc<dyn BookingLedger>,
    pub profiles: Arc<dyn ProfileDirectory>,
}
