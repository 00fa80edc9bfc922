//! Runtime for booking conversations
//!
//! `SessionManager` routes each inbound input to its session's actor,
//! spawning one on demand. Actors for different sessions run concurrently;
//! inputs for the same session are handled in arrival order. Barge-in
//! cancels in-flight speech out of band, ahead of the queue.

mod actor;
mod error;
mod executor;
pub mod traits;

#[cfg(test)]
pub mod testing;

pub use error::{PortError, PortErrorKind};
pub use executor::{BookingPayload, MessageOrchestrator, Reply, SessionInput};
pub use traits::*;

use actor::SessionActor;
use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;
use tokio::sync::{mpsc, RwLock};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Events sent back to the connection that submitted a command
#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    StateUpdate(Reply),
    Error { message: String },
    /// Synthesized speech for the preceding state update
    Audio(Vec<u8>),
}

/// An input plus where its replies go
#[derive(Debug)]
pub struct SessionCommand {
    pub input: SessionInput,
    pub reply_tx: mpsc::Sender<SessionEvent>,
}

/// Cancels the speech of whatever turn is currently being delivered
#[derive(Debug, Default)]
pub struct SpeechGate {
    current: Mutex<CancellationToken>,
}

impl SpeechGate {
    /// Start a new turn's speech; earlier tokens are no longer reachable
    pub fn begin(&self) -> CancellationToken {
        let token = CancellationToken::new();
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = token.clone();
        token
    }

    pub fn interrupt(&self) {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .cancel();
    }
}

/// Handle to interact with a running session actor
#[derive(Clone)]
struct SessionHandle {
    commands: mpsc::Sender<SessionCommand>,
    speech: Arc<SpeechGate>,
}

impl SessionHandle {
    async fn send(&self, cmd: SessionCommand) -> Result<(), mpsc::error::SendError<SessionCommand>> {
        if cmd.input == SessionInput::BargeIn {
            self.speech.interrupt();
        }
        self.commands.send(cmd).await
    }
}

/// Manager for all session actors
pub struct SessionManager {
    orchestrator: Arc<MessageOrchestrator>,
    handles: RwLock<HashMap<String, SessionHandle>>,
    idle_timeout: Duration,
}

impl SessionManager {
    /// Actors exit after `idle_timeout` without input
    pub fn new(orchestrator: Arc<MessageOrchestrator>, idle_timeout: Duration) -> Self {
        Self {
            orchestrator,
            handles: RwLock::new(HashMap::new()),
            idle_timeout,
        }
    }

    pub fn orchestrator(&self) -> &Arc<MessageOrchestrator> {
        &self.orchestrator
    }

    /// Queue `input` for `session_id`; replies arrive on `reply_tx`
    pub async fn dispatch(
        &self,
        session_id: &str,
        input: SessionInput,
        reply_tx: mpsc::Sender<SessionEvent>,
    ) {
        let cmd = SessionCommand { input, reply_tx };
        let handle = self.handle_for(session_id).await;

        if let Err(mpsc::error::SendError(cmd)) = handle.send(cmd).await {
            // The actor went idle between lookup and send
            self.forget(session_id, &handle).await;
            let handle = self.handle_for(session_id).await;
            if handle.send(cmd).await.is_err() {
                tracing::error!(session_id = %session_id, "Session actor unavailable, input dropped");
            }
        }
    }

    /// Number of live actors
    pub async fn active_sessions(&self) -> usize {
        self.handles.read().await.len()
    }

    /// Drop handles whose actor has exited
    pub async fn reap_idle(&self) -> usize {
        let mut handles = self.handles.write().await;
        let before = handles.len();
        handles.retain(|_, h| !h.commands.is_closed());
        before - handles.len()
    }

    /// Sweep expired sessions and exited actors
    pub async fn maintain(&self) {
        let swept = self.orchestrator.store().sweep();
        let reaped = self.reap_idle().await;
        if swept > 0 || reaped > 0 {
            tracing::info!(swept, reaped, "Session maintenance");
        }
    }

    async fn handle_for(&self, session_id: &str) -> SessionHandle {
        {
            let handles = self.handles.read().await;
            if let Some(handle) = handles.get(session_id) {
                if !handle.commands.is_closed() {
                    return handle.clone();
                }
            }
        }

        let mut handles = self.handles.write().await;
        if let Some(handle) = handles.get(session_id) {
            if !handle.commands.is_closed() {
                return handle.clone();
            }
        }

        let (commands, rx) = mpsc::channel(32);
        let speech = Arc::new(SpeechGate::default());
        let actor = SessionActor::new(
            session_id.to_string(),
            self.orchestrator.clone(),
            speech.clone(),
            rx,
            self.idle_timeout,
        );
        tokio::spawn(actor.run());

        let handle = SessionHandle { commands, speech };
        handles.insert(session_id.to_string(), handle.clone());
        handle
    }

    async fn forget(&self, session_id: &str, stale: &SessionHandle) {
        let mut handles = self.handles.write().await;
        if handles
            .get(session_id)
            .is_some_and(|h| h.commands.same_channel(&stale.commands))
        {
            handles.remove(session_id);
        }
    }
}

/// Run `SessionManager::maintain` every `every` until `shutdown` fires
pub fn spawn_maintenance(
    manager: Arc<SessionManager>,
    every: Duration,
    shutdown: CancellationToken,
) -> JoinHandle<()> {
    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(every);
        ticker.tick().await;
        loop {
            tokio::select! {
                () = shutdown.cancelled() => break,
                _ = ticker.tick() => manager.maintain().await,
            }
        }
        tracing::info!("Session maintenance stopped");
    })
}
