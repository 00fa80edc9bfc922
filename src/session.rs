//! Per-conversation booking context
//!
//! A `Session` is ephemeral: it lives in the `SessionStore` until its sliding
//! TTL lapses and is never persisted beyond process memory.

mod draft;
mod store;

pub use draft::BookingDraft;
pub use store::SessionStore;

use crate::matcher::MatchedProvider;
use crate::state_machine::{transition, BookingState, Event};
use chrono::{DateTime, Utc};

/// Context for one booking conversation
#[derive(Debug, Clone)]
pub struct Session {
    session_id: String,
    state: BookingState,
    turn_count: u32,
    draft: BookingDraft,
    candidates: Vec<MatchedProvider>,
    selected_provider_id: Option<String>,
    confirmed_booking_id: Option<String>,
    last_activity: DateTime<Utc>,
}

impl Session {
    pub fn new(session_id: impl Into<String>, now: DateTime<Utc>) -> Self {
        Self {
            session_id: session_id.into(),
            state: BookingState::Idle,
            turn_count: 0,
            draft: BookingDraft::default(),
            candidates: Vec::new(),
            selected_provider_id: None,
            confirmed_booking_id: None,
            last_activity: now,
        }
    }

    pub fn session_id(&self) -> &str {
        &self.session_id
    }

    pub fn state(&self) -> BookingState {
        self.state
    }

    pub fn turn_count(&self) -> u32 {
        self.turn_count
    }

    pub fn draft(&self) -> &BookingDraft {
        &self.draft
    }

    pub fn candidates(&self) -> &[MatchedProvider] {
        &self.candidates
    }

    pub fn selected_provider_id(&self) -> Option<&str> {
        self.selected_provider_id.as_deref()
    }

    /// The candidate recorded by `select_provider`, if it is still offered
    pub fn selected_candidate(&self) -> Option<&MatchedProvider> {
        let id = self.selected_provider_id.as_deref()?;
        self.candidates.iter().find(|c| c.provider.id == id)
    }

    pub fn confirmed_booking_id(&self) -> Option<&str> {
        self.confirmed_booking_id.as_deref()
    }

    /// Drive the state machine. This is the only way `state` changes.
    ///
    /// Leaving the selection/confirmation phase drops the candidate list.
    pub fn apply(&mut self, event: &Event) -> BookingState {
        let next = transition(self.state, event);
        if next != self.state {
            tracing::debug!(
                session_id = %self.session_id,
                from = %self.state,
                to = %next,
                event = event.name(),
                "Session transition"
            );
        }
        self.state = next;
        if !next.holds_candidates() {
            self.candidates.clear();
        }
        next
    }

    pub fn record_turn(&mut self) {
        self.turn_count = self.turn_count.saturating_add(1);
    }

    pub fn merge_draft(&mut self, partial: BookingDraft) {
        self.draft.merge(partial);
    }

    /// Replace the candidate list. Ignored outside selection/confirmation.
    pub fn set_candidates(&mut self, candidates: Vec<MatchedProvider>) {
        if self.state.holds_candidates() {
            self.candidates = candidates;
            self.selected_provider_id = None;
        }
    }

    pub fn select_provider(&mut self, provider_id: impl Into<String>) {
        self.selected_provider_id = Some(provider_id.into());
    }

    /// Record the booking id. Set once; later calls are ignored.
    pub fn confirm_booking(&mut self, booking_id: impl Into<String>) {
        if self.confirmed_booking_id.is_none() {
            self.confirmed_booking_id = Some(booking_id.into());
        }
    }

    pub(crate) fn touch(&mut self, now: DateTime<Utc>) {
        self.last_activity = now;
    }

    pub(crate) fn is_expired(&self, now: DateTime<Utc>, ttl: chrono::Duration) -> bool {
        now - self.last_activity > ttl
    }
}
