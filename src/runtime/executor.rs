//! Per-turn message handling
//!
//! `MessageOrchestrator::process` runs one inbound input to completion for a
//! session: it dispatches on the session's current state, awaits the
//! collaborator ports it needs, drives the state machine and writes the
//! session back. Callers guarantee that at most one `process` call is in
//! flight per session (see `SessionManager`).

use super::traits::{CandidateSummary, Extraction, Ports, SpeechSynthesizer};
use super::PortError;
use crate::bookings::{BookingRecord, NewBooking};
use crate::matcher::{
    MatchCriteria, MatchedProvider, ProviderMatcher, DEFAULT_DURATION_HOURS, DEFAULT_SERVICE_TYPE,
    DEFAULT_TIME,
};
use crate::prompts::{PromptBuilder, PromptContext};
use crate::session::{BookingDraft, Session, SessionStore};
use crate::state_machine::{BookingState, Event};
use serde::Serialize;
use std::sync::Arc;

/// Candidate id under which the registered address is offered for confirmation
pub const REGISTERED_ADDRESS_ID: &str = "registered-address";

/// One unit of work for a session
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionInput {
    Transcript(String),
    BargeIn,
}

/// Booking data attached to a state update
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum BookingPayload {
    /// Fields gathered so far
    Draft(BookingDraft),
    /// The confirmed booking
    Record(BookingRecord),
}

/// Result of handling one input
#[derive(Debug, Clone, PartialEq)]
pub struct Reply {
    pub state: BookingState,
    pub prompt: String,
    pub providers: Option<Vec<MatchedProvider>>,
    pub booking: Option<BookingPayload>,
    /// Whether `prompt` should be synthesized
    pub speak: bool,
}

impl Reply {
    fn new(state: BookingState, prompt: impl Into<String>) -> Self {
        Self {
            state,
            prompt: prompt.into(),
            providers: None,
            booking: None,
            speak: true,
        }
    }

    fn with_providers(mut self, providers: &[MatchedProvider]) -> Self {
        self.providers = Some(providers.to_vec());
        self
    }

    fn with_draft(mut self, draft: &BookingDraft) -> Self {
        self.booking = Some(BookingPayload::Draft(draft.clone()));
        self
    }

    fn with_record(mut self, record: BookingRecord) -> Self {
        self.booking = Some(BookingPayload::Record(record));
        self
    }

    fn silent(mut self) -> Self {
        self.speak = false;
        self
    }
}

pub struct MessageOrchestrator {
    store: Arc<SessionStore>,
    matcher: ProviderMatcher,
    prompts: PromptBuilder,
    ports: Ports,
    max_turns: u32,
}

impl MessageOrchestrator {
    pub fn new(
        store: Arc<SessionStore>,
        matcher: ProviderMatcher,
        prompts: PromptBuilder,
        ports: Ports,
        max_turns: u32,
    ) -> Self {
        Self {
            store,
            matcher,
            prompts,
            ports,
            max_turns,
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn synthesizer(&self) -> &Arc<dyn SpeechSynthesizer> {
        &self.ports.synthesizer
    }

    /// Handle one input for `session_id`.
    ///
    /// On `Err` the session's state, draft and candidates are exactly as they
    /// were before the call; only the turn counter has advanced.
    pub async fn process(&self, session_id: &str, input: &SessionInput) -> Result<Reply, PortError> {
        match input {
            SessionInput::BargeIn => Ok(self.barge_in(session_id)),
            SessionInput::Transcript(text) => self.transcript(session_id, text).await,
        }
    }

    fn barge_in(&self, session_id: &str) -> Reply {
        let mut session = self.store.get_or_create(session_id);
        let state = session.apply(&Event::BargeIn);

        let mut reply = Reply::new(state, self.prompts.barge_in()).silent();
        if state == BookingState::ProviderSelection {
            reply = reply.with_providers(session.candidates());
        }
        self.store.save(session);
        reply
    }

    async fn transcript(&self, session_id: &str, text: &str) -> Result<Reply, PortError> {
        let session = self.store.get_or_create(session_id);

        if session.turn_count() >= self.max_turns {
            tracing::info!(
                session_id = %session_id,
                turns = session.turn_count(),
                "Turn limit reached, resetting session"
            );
            self.store.delete(session_id);
            return Ok(Reply::new(BookingState::Idle, self.prompts.session_limit()).silent());
        }

        // The turn counts even if a collaborator fails below
        let mut session = self
            .store
            .update(session_id, Session::record_turn)
            .unwrap_or(session);

        let from = session.state();
        let result = match from {
            BookingState::Idle | BookingState::Extracting | BookingState::Clarifying => {
                self.on_extraction(&mut session, text).await
            }
            BookingState::AddressConfirm => self.on_address(&mut session, text).await,
            BookingState::ProviderSelection => self.on_selection(&mut session, text).await,
            BookingState::Confirming => self.on_confirmation(&mut session, text).await,
            BookingState::Booked => Ok(Reply::new(BookingState::Booked, self.prompts.already_booked())),
        };

        match result {
            Ok(reply) => {
                tracing::info!(
                    session_id = %session_id,
                    from = %from,
                    to = %reply.state,
                    turn = session.turn_count(),
                    "Turn handled"
                );
                self.store.save(session);
                Ok(reply)
            }
            Err(e) => {
                tracing::error!(
                    session_id = %session_id,
                    state = %from,
                    error = %e,
                    "Collaborator failed, session left unchanged"
                );
                Err(e)
            }
        }
    }

    async fn on_extraction(&self, session: &mut Session, text: &str) -> Result<Reply, PortError> {
        session.apply(&Event::UserMessage);

        let Extraction {
            booking,
            missing_fields,
            clarification_prompt,
        } = self.ports.extractor.extract(text, session.draft()).await?;

        session.merge_draft(booking);
        let state = session.apply(&Event::extraction_done(missing_fields));

        if state == BookingState::Clarifying {
            let ctx = PromptContext {
                clarification: clarification_prompt.as_deref(),
                ..Default::default()
            };
            return Ok(Reply::new(state, self.prompts.for_state(state, &ctx)).with_draft(session.draft()));
        }

        let profile = self.ports.profiles.profile(session.session_id()).await?;
        let ctx = PromptContext {
            address: Some(&profile.address),
            ..Default::default()
        };
        Ok(Reply::new(state, self.prompts.for_state(state, &ctx)).with_draft(session.draft()))
    }

    async fn on_address(&self, session: &mut Session, text: &str) -> Result<Reply, PortError> {
        let profile = self.ports.profiles.profile(session.session_id()).await?;
        let address = [CandidateSummary::new(REGISTERED_ADDRESS_ID, profile.address.clone())];
        let selection = self.ports.selector.select(text, &address, true).await?;

        // Free text is never geocoded; the registered address is always used
        let state = session.apply(&Event::AddressConfirmed);
        session.merge_draft(BookingDraft {
            location: Some(profile.address),
            ..Default::default()
        });

        let candidates = match MatchCriteria::from_draft(session.draft(), profile.location) {
            Some(criteria) => self.matcher.find(&criteria),
            None => {
                tracing::debug!(session_id = %session.session_id(), "No usable date in draft, nothing to match");
                Vec::new()
            }
        };
        session.set_candidates(candidates);

        let ctx = PromptContext {
            providers: session.candidates(),
            ..Default::default()
        };
        let mut prompt = self.prompts.for_state(state, &ctx);
        if !selection.confirmed {
            prompt = format!("{} {prompt}", self.prompts.address_not_confirmed());
        }

        Ok(Reply::new(state, prompt)
            .with_providers(session.candidates())
            .with_draft(session.draft()))
    }

    async fn on_selection(&self, session: &mut Session, text: &str) -> Result<Reply, PortError> {
        let summaries: Vec<CandidateSummary> =
            session.candidates().iter().map(CandidateSummary::from).collect();
        let selection = self.ports.selector.select(text, &summaries, false).await?;
        let state = session.state();

        let Some(provider_id) = selection.provider_id else {
            let prompt = self.prompts.provider_retry(session.candidates());
            return Ok(Reply::new(state, prompt).with_providers(session.candidates()));
        };

        if !session.candidates().iter().any(|c| c.provider.id == provider_id) {
            tracing::debug!(
                session_id = %session.session_id(),
                provider_id = %provider_id,
                "Selected provider is not a candidate"
            );
            let prompt = self.prompts.provider_not_found(session.candidates());
            return Ok(Reply::new(state, prompt).with_providers(session.candidates()));
        }

        session.select_provider(provider_id);
        let state = session.apply(&Event::ProviderSelected);
        let ctx = PromptContext {
            selected: session.selected_candidate(),
            draft: Some(session.draft()),
            ..Default::default()
        };
        Ok(Reply::new(state, self.prompts.for_state(state, &ctx)).with_draft(session.draft()))
    }

    async fn on_confirmation(&self, session: &mut Session, text: &str) -> Result<Reply, PortError> {
        let state = session.state();
        let Some(selected) = session.selected_candidate().cloned() else {
            tracing::warn!(session_id = %session.session_id(), "Confirming without a selected provider");
            return Ok(Reply::new(state, self.prompts.provider_error()).with_providers(session.candidates()));
        };

        let selection = self
            .ports
            .selector
            .select(text, &[CandidateSummary::from(&selected)], true)
            .await?;
        if !selection.confirmed {
            return Ok(Reply::new(state, self.prompts.confirm_retry()));
        }

        let record = self
            .ports
            .ledger
            .create_booking(new_booking(session.session_id(), &selected, session.draft()))
            .await?;

        let state = session.apply(&Event::Confirmed);
        session.confirm_booking(record.id.clone());
        let ctx = PromptContext {
            booking_id: Some(&record.id),
            ..Default::default()
        };
        let prompt = self.prompts.for_state(state, &ctx);
        Ok(Reply::new(state, prompt).with_record(record))
    }
}

fn new_booking(session_id: &str, selected: &MatchedProvider, draft: &BookingDraft) -> NewBooking {
    NewBooking {
        session_id: session_id.to_string(),
        provider_id: selected.provider.id.clone(),
        provider_name: selected.provider.name.clone(),
        service_type: draft
            .service_type
            .clone()
            .unwrap_or_else(|| DEFAULT_SERVICE_TYPE.to_string()),
        date: draft.date.clone().unwrap_or_default(),
        time: draft.time.clone().unwrap_or_else(|| DEFAULT_TIME.to_string()),
        duration_hours: draft.duration_hours.unwrap_or(DEFAULT_DURATION_HOURS),
        location: draft.location.clone().unwrap_or_default(),
        hourly_rate: selected.provider.hourly_rate,
    }
}
