//! Property-based tests for the state machine
//!
//! These tests verify key invariants hold across all possible inputs.

use super::*;
use proptest::prelude::*;

// ============================================================================
// Arbitrary Generators
// ============================================================================

fn arb_state() -> impl Strategy<Value = BookingState> {
    proptest::sample::select(BookingState::ALL.to_vec())
}

fn arb_missing_fields() -> impl Strategy<Value = Vec<String>> {
    proptest::collection::vec(
        prop_oneof![
            Just("service_type".to_string()),
            Just("date".to_string()),
            Just("time".to_string()),
            Just("duration_hours".to_string()),
            Just("location".to_string()),
        ],
        0..4,
    )
}

fn arb_event() -> impl Strategy<Value = Event> {
    prop_oneof![
        Just(Event::UserMessage),
        arb_missing_fields().prop_map(Event::extraction_done),
        Just(Event::AddressConfirmed),
        Just(Event::ProviderSelected),
        Just(Event::Confirmed),
        Just(Event::BargeIn),
    ]
}

/// The rows of the transition table, as (from, event name) pairs
fn is_listed(state: BookingState, event: &Event) -> bool {
    use BookingState as S;
    matches!(
        (state, event),
        (S::Idle, Event::UserMessage)
            | (S::Extracting | S::Clarifying, Event::ExtractionDone { .. })
            | (S::Clarifying | S::AddressConfirm | S::ProviderSelection, Event::BargeIn)
            | (S::AddressConfirm, Event::AddressConfirmed)
            | (S::ProviderSelection, Event::ProviderSelected)
            | (S::Confirming, Event::Confirmed | Event::BargeIn)
    )
}

// ============================================================================
// Properties
// ============================================================================

proptest! {
    #[test]
    fn prop_unlisted_pairs_are_noops(state in arb_state(), event in arb_event()) {
        prop_assume!(!is_listed(state, &event));
        prop_assert_eq!(transition(state, &event), state);
    }

    #[test]
    fn prop_booked_absorbs_everything(event in arb_event()) {
        prop_assert_eq!(transition(BookingState::Booked, &event), BookingState::Booked);
    }

    #[test]
    fn prop_transition_is_deterministic(state in arb_state(), event in arb_event()) {
        prop_assert_eq!(transition(state, &event), transition(state, &event));
    }

    #[test]
    fn prop_barge_in_never_reaches_extraction(state in arb_state()) {
        let next = transition(state, &Event::BargeIn);
        prop_assert!(next != BookingState::Extracting || state == BookingState::Extracting);
        if state == BookingState::Confirming {
            prop_assert_eq!(next, BookingState::ProviderSelection);
        }
    }

    #[test]
    fn prop_any_event_sequence_stays_in_known_states(
        events in proptest::collection::vec(arb_event(), 0..20)
    ) {
        let mut state = BookingState::Idle;
        for event in &events {
            let next = transition(state, event);
            // Once booked, always booked
            if state == BookingState::Booked {
                prop_assert_eq!(next, BookingState::Booked);
            }
            state = next;
        }
        prop_assert!(BookingState::ALL.contains(&state));
    }
}
