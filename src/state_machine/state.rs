//! Booking conversation states

use serde::{Deserialize, Serialize};
use std::fmt;

/// Phase of a booking conversation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BookingState {
    /// Nothing heard yet
    #[default]
    Idle,

    /// First transcript received, extraction in flight
    Extracting,

    /// Booking fields still missing, asking the user for them
    Clarifying,

    /// All fields present, confirming the registered address
    AddressConfirm,

    /// Candidates offered, waiting for the user to pick one
    ProviderSelection,

    /// Provider picked, waiting for a yes/no on the summary
    Confirming,

    /// Booking created (terminal)
    Booked,
}

impl BookingState {
    pub const ALL: [BookingState; 7] = [
        BookingState::Idle,
        BookingState::Extracting,
        BookingState::Clarifying,
        BookingState::AddressConfirm,
        BookingState::ProviderSelection,
        BookingState::Confirming,
        BookingState::Booked,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            BookingState::Idle => "IDLE",
            BookingState::Extracting => "EXTRACTING",
            BookingState::Clarifying => "CLARIFYING",
            BookingState::AddressConfirm => "ADDRESS_CONFIRM",
            BookingState::ProviderSelection => "PROVIDER_SELECTION",
            BookingState::Confirming => "CONFIRMING",
            BookingState::Booked => "BOOKED",
        }
    }

    /// No transition leaves this state
    pub fn is_terminal(self) -> bool {
        matches!(self, BookingState::Booked)
    }

    /// States in which a session may carry provider candidates
    pub fn holds_candidates(self) -> bool {
        matches!(
            self,
            BookingState::ProviderSelection | BookingState::Confirming
        )
    }
}

impl fmt::Display for BookingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
