//! Request bodies for the language and speech services

use crate::runtime::CandidateSummary;
use crate::session::BookingDraft;
use serde::Serialize;

/// `POST /extract`
#[derive(Debug, Serialize)]
pub(super) struct ExtractRequest<'a> {
    pub transcript: &'a str,
    pub existing_booking: &'a BookingDraft,
}

/// `POST /select`
#[derive(Debug, Serialize)]
pub(super) struct SelectRequest<'a> {
    pub transcript: &'a str,
    pub providers: &'a [CandidateSummary],
    pub awaiting_confirmation: bool,
}

/// `POST /v1/audio/speech`
#[derive(Debug, Serialize)]
pub(super) struct SpeechRequest<'a> {
    pub model: &'a str,
    pub input: &'a str,
    pub voice: &'a str,
    pub speed: f32,
    pub response_format: &'a str,
}
