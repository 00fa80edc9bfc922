//! Booking conversation state machine
//!
//! A pure `(state, event) -> state` function. The orchestrator is the only
//! caller; sessions never have their state assigned directly.

pub mod event;
pub mod state;
pub(crate) mod transition;

#[cfg(test)]
mod proptests;

pub use event::Event;
pub use state::BookingState;
pub use transition::transition;
