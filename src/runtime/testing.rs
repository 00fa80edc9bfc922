//! Mock implementations for testing
//!
//! These mocks enable orchestrator and actor tests without real I/O. Each
//! records its calls and answers from a queue; an empty queue is an error.

use super::executor::MessageOrchestrator;
use super::traits::*;
use super::PortError;
use crate::bookings::{BookingRecord, InMemoryLedger, NewBooking};
use crate::matcher::testing::{matcher, provider, ORIGIN};
use crate::profile::UserProfile;
use crate::prompts::PromptBuilder;
use crate::session::{BookingDraft, SessionStore};
use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Notify;

/// Build an extraction result from string fields and missing field names
pub fn extraction(fields: &[(&str, &str)], missing: &[&str]) -> Extraction {
    let booking: serde_json::Map<String, serde_json::Value> = fields
        .iter()
        .map(|(k, v)| ((*k).to_string(), serde_json::Value::from(*v)))
        .collect();
    Extraction {
        booking: serde_json::from_value(booking.into()).unwrap(),
        missing_fields: missing.iter().map(|m| (*m).to_string()).collect(),
        clarification_prompt: None,
    }
}

pub fn selection(provider_id: Option<&str>, confirmed: bool) -> Selection {
    Selection {
        provider_id: provider_id.map(str::to_string),
        confirmed,
    }
}

// ============================================================================
// Mock Extractor
// ============================================================================

#[derive(Default)]
pub struct MockExtractor {
    responses: Mutex<VecDeque<Result<Extraction, PortError>>>,
    delay: Option<Duration>,
    /// Transcript and the draft it was sent with
    calls: Mutex<Vec<(String, BookingDraft)>>,
}

impl MockExtractor {
    pub fn with_delay(delay: Duration) -> Self {
        Self {
            delay: Some(delay),
            ..Default::default()
        }
    }

    pub fn queue(&self, result: Extraction) {
        self.responses.lock().unwrap().push_back(Ok(result));
    }

    pub fn queue_error(&self, error: PortError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<(String, BookingDraft)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BookingExtractor for MockExtractor {
    async fn extract(
        &self,
        transcript: &str,
        existing: &BookingDraft,
    ) -> Result<Extraction, PortError> {
        self.calls
            .lock()
            .unwrap()
            .push((transcript.to_string(), existing.clone()));
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PortError::unavailable("extraction", "No mock response queued")))
    }
}

// ============================================================================
// Mock Selector
// ============================================================================

#[derive(Default)]
pub struct MockSelector {
    responses: Mutex<VecDeque<Result<Selection, PortError>>>,
    calls: Mutex<Vec<(String, Vec<CandidateSummary>, bool)>>,
}

impl MockSelector {
    pub fn queue(&self, result: Selection) {
        self.responses.lock().unwrap().push_back(Ok(result));
    }

    pub fn queue_error(&self, error: PortError) {
        self.responses.lock().unwrap().push_back(Err(error));
    }

    pub fn calls(&self) -> Vec<(String, Vec<CandidateSummary>, bool)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl ProviderSelector for MockSelector {
    async fn select(
        &self,
        transcript: &str,
        candidates: &[CandidateSummary],
        awaiting_confirmation: bool,
    ) -> Result<Selection, PortError> {
        self.calls.lock().unwrap().push((
            transcript.to_string(),
            candidates.to_vec(),
            awaiting_confirmation,
        ));
        self.responses
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(PortError::unavailable("selection", "No mock response queued")))
    }
}

// ============================================================================
// Mock Synthesizer
// ============================================================================

/// Echoes the text as bytes unless an error is queued
#[derive(Default)]
pub struct MockSynthesizer {
    errors: Mutex<VecDeque<PortError>>,
    calls: Mutex<Vec<String>>,
}

impl MockSynthesizer {
    pub fn queue_error(&self, error: PortError) {
        self.errors.lock().unwrap().push_back(error);
    }

    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl SpeechSynthesizer for MockSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, PortError> {
        self.calls.lock().unwrap().push(text.to_string());
        match self.errors.lock().unwrap().pop_front() {
            Some(error) => Err(error),
            None => Ok(text.as_bytes().to_vec()),
        }
    }
}

/// Synthesizer that takes `delay` per call (for barge-in testing)
pub struct DelayedSynthesizer {
    inner: MockSynthesizer,
    delay: Duration,
    /// Notified when synthesis starts (for test synchronization)
    pub started: Arc<Notify>,
}

impl DelayedSynthesizer {
    pub fn new(delay: Duration) -> Self {
        Self {
            inner: MockSynthesizer::default(),
            delay,
            started: Arc::new(Notify::new()),
        }
    }
}

#[async_trait]
impl SpeechSynthesizer for DelayedSynthesizer {
    async fn synthesize(&self, text: &str) -> Result<Vec<u8>, PortError> {
        self.started.notify_one();
        tokio::time::sleep(self.delay).await;
        self.inner.synthesize(text).await
    }
}

// ============================================================================
// Mock Ledger
// ============================================================================

#[derive(Default)]
pub struct MockLedger {
    inner: InMemoryLedger,
    fail_next: Mutex<Option<PortError>>,
}

impl MockLedger {
    pub fn fail_next(&self, error: PortError) {
        *self.fail_next.lock().unwrap() = Some(error);
    }

    pub fn records(&self) -> Vec<BookingRecord> {
        futures::executor::block_on(self.inner.list_bookings()).unwrap()
    }
}

#[async_trait]
impl BookingLedger for MockLedger {
    async fn create_booking(&self, booking: NewBooking) -> Result<BookingRecord, PortError> {
        let failure = self.fail_next.lock().unwrap().take();
        match failure {
            Some(error) => Err(error),
            None => self.inner.create_booking(booking).await,
        }
    }

    async fn list_bookings(&self) -> Result<Vec<BookingRecord>, PortError> {
        self.inner.list_bookings().await
    }

    async fn get_booking(&self, id: &str) -> Result<Option<BookingRecord>, PortError> {
        self.inner.get_booking(id).await
    }
}

// ============================================================================
// Mock Profiles
// ============================================================================

pub struct MockProfiles {
    pub profile: UserProfile,
    calls: Mutex<usize>,
}

impl Default for MockProfiles {
    fn default() -> Self {
        Self {
            profile: UserProfile {
                address: "14 Test Lane".to_string(),
                location: Some(ORIGIN),
            },
            calls: Mutex::new(0),
        }
    }
}

impl MockProfiles {
    pub fn call_count(&self) -> usize {
        *self.calls.lock().unwrap()
    }
}

#[async_trait]
impl ProfileDirectory for MockProfiles {
    async fn profile(&self, _session_id: &str) -> Result<UserProfile, PortError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.profile.clone())
    }
}

// ============================================================================
// Bundle
// ============================================================================

/// One of each mock, plus the catalog the orchestrator matches against.
///
/// Catalog around `ORIGIN` for 2026-06-01 10:00: `top`, `near`, `mid` qualify
/// in that order; `low` ranks fourth; `far` and `late` never qualify.
pub struct MockPorts {
    pub extractor: Arc<MockExtractor>,
    pub selector: Arc<MockSelector>,
    pub synthesizer: Arc<dyn SpeechSynthesizer>,
    pub ledger: Arc<MockLedger>,
    pub profiles: Arc<MockProfiles>,
}

impl MockPorts {
    pub fn new() -> Self {
        Self::with_synthesizer(Arc::new(MockSynthesizer::default()))
    }

    pub fn with_synthesizer(synthesizer: Arc<dyn SpeechSynthesizer>) -> Self {
        Self {
            extractor: Arc::new(MockExtractor::default()),
            selector: Arc::new(MockSelector::default()),
            synthesizer,
            ledger: Arc::new(MockLedger::default()),
            profiles: Arc::new(MockProfiles::default()),
        }
    }

    pub fn ports(&self) -> Ports {
        Ports {
            extractor: self.extractor.clone(),
            selector: self.selector.clone(),
            synthesizer: self.synthesizer.clone(),
            ledger: self.ledger.clone(),
            profiles: self.profiles.clone(),
        }
    }

    pub fn orchestrator(&self) -> MessageOrchestrator {
        let slot = "2026-06-01T10:00";
        let catalog = matcher(vec![
            provider("low", 3.0, 1.0, &[slot]),
            provider("mid", 4.5, 5.0, &[slot]),
            provider("far", 5.0, 30.0, &[slot]),
            provider("near", 4.5, 1.0, &["2026-06-01T08:00", slot]),
            provider("late", 5.0, 1.0, &["2026-06-01T13:00"]),
            provider("top", 4.9, 10.0, &[slot]),
        ]);
        MessageOrchestrator::new(
            Arc::new(SessionStore::default()),
            catalog,
            PromptBuilder::embedded().unwrap(),
            self.ports(),
            8,
        )
    }
}
