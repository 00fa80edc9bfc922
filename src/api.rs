//! HTTP and WebSocket API
//!
//! `GET /ws` carries the voice conversation; `/bookings` exposes the ledger.

mod handlers;
mod protocol;
mod ws;

pub use handlers::create_router;

use crate::runtime::{BookingLedger, MessageOrchestrator, SessionManager};
use std::sync::Arc;
use std::time::Duration;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub sessions: Arc<SessionManager>,
    pub ledger: Arc<dyn BookingLedger>,
}

impl AppState {
    pub fn new(
        orchestrator: Arc<MessageOrchestrator>,
        ledger: Arc<dyn BookingLedger>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            sessions: Arc::new(SessionManager::new(orchestrator, idle_timeout)),
            ledger,
        }
    }
}
