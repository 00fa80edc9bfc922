//! Spoken prompt rendering
//!
//! Every string the user hears comes from a JSON prompt catalog. Templates
//! use `{placeholder}` markers; a marker with no matching value is left in
//! place verbatim so a typo in the catalog is audible rather than silent.

use crate::bookings::total_estimate;
use crate::matcher::{MatchedProvider, DEFAULT_DURATION_HOURS, DEFAULT_SERVICE_TYPE, DEFAULT_TIME};
use crate::session::BookingDraft;
use crate::state_machine::BookingState;
use chrono::{NaiveDate, NaiveTime, Timelike};
use serde::Deserialize;
use std::path::Path;
use thiserror::Error;

const EMBEDDED_PROMPTS: &str = include_str!("../config/prompts.json");

#[derive(Debug, Error)]
pub enum PromptError {
    #[error("Failed to read prompt catalog: {0}")]
    Io(#[from] std::io::Error),
    #[error("Invalid prompt catalog JSON: {0}")]
    Json(#[from] serde_json::Error),
}

/// The prompt catalog. Every key is required.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PromptTemplates {
    pub extracting: String,
    pub clarifying_fallback: String,
    pub address_confirm: String,
    pub address_not_confirmed: String,
    pub no_providers: String,
    pub provider_intro: String,
    pub provider_option: String,
    pub provider_outro: String,
    pub provider_not_found: String,
    pub provider_retry: String,
    pub provider_error: String,
    pub confirm_retry: String,
    pub confirming: String,
    pub booked: String,
    pub idle: String,
    pub barge_in: String,
    pub session_limit: String,
    pub already_booked: String,
    pub currency: String,
}

/// Inputs a state's prompt may draw on
#[derive(Debug, Clone, Copy, Default)]
pub struct PromptContext<'a> {
    /// Clarification question supplied by the extraction service
    pub clarification: Option<&'a str>,
    pub address: Option<&'a str>,
    pub providers: &'a [MatchedProvider],
    pub selected: Option<&'a MatchedProvider>,
    pub draft: Option<&'a BookingDraft>,
    pub booking_id: Option<&'a str>,
}

#[derive(Debug, Clone)]
pub struct PromptBuilder {
    templates: PromptTemplates,
}

impl PromptBuilder {
    pub fn new(templates: PromptTemplates) -> Self {
        Self { templates }
    }

    /// The catalog compiled into the binary
    pub fn embedded() -> Result<Self, PromptError> {
        Self::from_json(EMBEDDED_PROMPTS)
    }

    pub fn from_json(json: &str) -> Result<Self, PromptError> {
        Ok(Self::new(serde_json::from_str(json)?))
    }

    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, PromptError> {
        let raw = std::fs::read_to_string(path)?;
        Self::from_json(&raw)
    }

    /// Load `path` when given, otherwise the embedded catalog
    pub fn from_optional_path(path: Option<&Path>) -> Result<Self, PromptError> {
        match path {
            Some(path) => Self::load(path),
            None => Self::embedded(),
        }
    }

    /// The prompt that announces entry into `state`
    pub fn for_state(&self, state: BookingState, ctx: &PromptContext<'_>) -> String {
        let t = &self.templates;
        match state {
            BookingState::Idle => t.idle.clone(),
            BookingState::Extracting => t.extracting.clone(),
            BookingState::Clarifying => ctx
                .clarification
                .filter(|c| !c.trim().is_empty())
                .map_or_else(|| t.clarifying_fallback.clone(), str::to_string),
            BookingState::AddressConfirm => {
                self.address_confirm(ctx.address.unwrap_or("your registered address"))
            }
            BookingState::ProviderSelection => self.provider_list(ctx.providers),
            BookingState::Confirming => match ctx.selected {
                Some(provider) => self.confirming(provider, ctx.draft.unwrap_or(&BookingDraft::default())),
                None => t.provider_error.clone(),
            },
            BookingState::Booked => self.booked(ctx.booking_id.unwrap_or_default()),
        }
    }

    pub fn address_confirm(&self, address: &str) -> String {
        interpolate(&self.templates.address_confirm, &[("address", address.to_string())])
    }

    pub fn address_not_confirmed(&self) -> &str {
        &self.templates.address_not_confirmed
    }

    /// Numbered candidate list, or the "no providers" prompt when empty
    pub fn provider_list(&self, providers: &[MatchedProvider]) -> String {
        let t = &self.templates;
        if providers.is_empty() {
            return t.no_providers.clone();
        }

        let mut parts = Vec::with_capacity(providers.len() + 2);
        parts.push(interpolate(
            &t.provider_intro,
            &[("count", providers.len().to_string())],
        ));
        for (i, m) in providers.iter().enumerate() {
            parts.push(interpolate(
                &t.provider_option,
                &[
                    ("index", (i + 1).to_string()),
                    ("name", m.provider.name.clone()),
                    ("rating", m.provider.rating.to_string()),
                    ("distance", m.distance_km.to_string()),
                    ("time", format_slot(&m.matched_slot)),
                    ("rate", format_amount(u64::from(m.provider.hourly_rate), &t.currency)),
                ],
            ));
        }
        parts.push(t.provider_outro.clone());
        parts.join(" ")
    }

    /// "Didn't catch that" followed by the restated candidate list
    pub fn provider_retry(&self, providers: &[MatchedProvider]) -> String {
        format!("{} {}", self.templates.provider_retry, self.provider_list(providers))
    }

    /// "No such option" followed by the restated candidate list
    pub fn provider_not_found(&self, providers: &[MatchedProvider]) -> String {
        format!("{} {}", self.templates.provider_not_found, self.provider_list(providers))
    }

    pub fn provider_error(&self) -> &str {
        &self.templates.provider_error
    }

    pub fn confirm_retry(&self) -> &str {
        &self.templates.confirm_retry
    }

    /// Read-back of the full booking with the estimated total
    pub fn confirming(&self, provider: &MatchedProvider, draft: &BookingDraft) -> String {
        let hours = draft.duration_hours.unwrap_or(DEFAULT_DURATION_HOURS);
        let total = total_estimate(provider.provider.hourly_rate, hours);
        let date = draft
            .date
            .as_deref()
            .map_or_else(|| "the requested date".to_string(), format_date);

        interpolate(
            &self.templates.confirming,
            &[
                ("provider", provider.provider.name.clone()),
                (
                    "service",
                    format_service(draft.service_type.as_deref().unwrap_or(DEFAULT_SERVICE_TYPE)),
                ),
                (
                    "location",
                    draft.location.clone().unwrap_or_else(|| "your address".to_string()),
                ),
                ("date", date),
                ("time", format_clock(draft.time.as_deref().unwrap_or(DEFAULT_TIME))),
                ("duration", hours.to_string()),
                ("total", format_amount(total, &self.templates.currency)),
            ],
        )
    }

    pub fn booked(&self, booking_id: &str) -> String {
        interpolate(&self.templates.booked, &[("booking_id", booking_id.to_string())])
    }

    pub fn barge_in(&self) -> &str {
        &self.templates.barge_in
    }

    pub fn session_limit(&self) -> &str {
        &self.templates.session_limit
    }

    pub fn already_booked(&self) -> &str {
        &self.templates.already_booked
    }
}

/// Replace `{key}` markers with their values; unknown markers stay as written
pub fn interpolate(template: &str, vars: &[(&str, String)]) -> String {
    let mut out = String::with_capacity(template.len());
    let mut chars = template.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '{' {
            out.push(c);
            continue;
        }

        let mut key = String::new();
        while let Some(&next) = chars.peek() {
            if next.is_ascii_alphanumeric() || next == '_' {
                key.push(next);
                chars.next();
            } else {
                break;
            }
        }

        let value = vars.iter().find(|(k, _)| *k == key).map(|(_, v)| v);
        match value {
            Some(value) if chars.peek() == Some(&'}') => {
                chars.next();
                out.push_str(value);
            }
            _ => {
                out.push('{');
                out.push_str(&key);
            }
        }
    }
    out
}

/// `2026-06-01T14:00` -> `2 PM`, `...T14:30` -> `2:30 PM`
pub fn format_slot(slot: &str) -> String {
    match slot.split_once('T') {
        Some((_, clock)) => format_clock(clock),
        None => slot.to_string(),
    }
}

/// `14:00` -> `2 PM`; anything unparseable is returned unchanged
pub fn format_clock(clock: &str) -> String {
    let Ok(time) = NaiveTime::parse_from_str(clock, "%H:%M")
        .or_else(|_| NaiveTime::parse_from_str(clock, "%H:%M:%S"))
    else {
        return clock.to_string();
    };

    let (pm, hour) = time.hour12();
    let suffix = if pm { "PM" } else { "AM" };
    match time.minute() {
        0 => format!("{hour} {suffix}"),
        minute => format!("{hour}:{minute:02} {suffix}"),
    }
}

/// `2026-06-01` -> `Monday, June 1`; anything unparseable is returned unchanged
pub fn format_date(date: &str) -> String {
    NaiveDate::parse_from_str(date, "%Y-%m-%d")
        .map_or_else(|_| date.to_string(), |d| d.format("%A, %B %-d").to_string())
}

/// `12500` -> `12,500 KES`
pub fn format_amount(amount: u64, currency: &str) -> String {
    let digits = amount.to_string();
    let mut grouped = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            grouped.push(',');
        }
        grouped.push(c);
    }
    format!("{grouped} {currency}")
}

/// Spoken name for a service tag
pub fn format_service(service: &str) -> String {
    match service {
        "standard" => "standard clean".to_string(),
        "deep" => "deep clean".to_string(),
        "move_in_out" => "move-in move-out clean".to_string(),
        other => other.to_string(),
    }
}
