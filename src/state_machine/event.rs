//! Events that drive the booking state machine

use std::collections::BTreeSet;

/// Events that trigger state transitions
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Event {
    /// A transcript arrived for a session that has not started yet
    UserMessage,

    /// The extraction port answered; `missing_fields` names what is still unknown
    ExtractionDone { missing_fields: BTreeSet<String> },

    /// The registered address was accepted for matching
    AddressConfirmed,

    /// The user picked one of the offered candidates
    ProviderSelected,

    /// The user accepted the booking summary
    Confirmed,

    /// The user spoke over synthesized speech
    BargeIn,
}

impl Event {
    pub fn extraction_done<I, S>(missing_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Event::ExtractionDone {
            missing_fields: missing_fields.into_iter().map(Into::into).collect(),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Event::UserMessage => "USER_MESSAGE",
            Event::ExtractionDone { .. } => "EXTRACTION_DONE",
            Event::AddressConfirmed => "ADDRESS_CONFIRMED",
            Event::ProviderSelected => "PROVIDER_SELECTED",
            Event::Confirmed => "CONFIRMED",
            Event::BargeIn => "BARGE_IN",
        }
    }
}
