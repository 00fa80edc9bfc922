//! Pure state transition function

use super::{BookingState, Event};

/// Pure transition function
///
/// Given the same inputs it always produces the same output and performs no
/// I/O. Every (state, event) pair without a row below falls through to the
/// final arm and leaves the state unchanged, so out-of-order or malformed
/// events are absorbed rather than reported.
pub fn transition(state: BookingState, event: &Event) -> BookingState {
    use BookingState as S;

    match (state, event) {
        (S::Idle, Event::UserMessage) => S::Extracting,

        (S::Extracting | S::Clarifying, Event::ExtractionDone { missing_fields }) => {
            if missing_fields.is_empty() {
                S::AddressConfirm
            } else {
                S::Clarifying
            }
        }

        (S::AddressConfirm, Event::AddressConfirmed) => S::ProviderSelection,

        (S::ProviderSelection, Event::ProviderSelected) => S::Confirming,

        (S::Confirming, Event::Confirmed) => S::Booked,

        // Barge-in during confirmation forces a re-selection, never a re-extraction
        (S::Confirming, Event::BargeIn) => S::ProviderSelection,

        // Explicit default: stay put. Covers BOOKED for every event and the
        // barge-in self-loops of CLARIFYING, ADDRESS_CONFIRM and PROVIDER_SELECTION.
        (current, _) => current,
    }
}
