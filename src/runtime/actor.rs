//! One task per live session
//!
//! The actor owns the receiving end of its session's command queue and
//! handles commands strictly one at a time, so a second frame for the same
//! session never starts before the first has written the session back and
//! finished (or abandoned) its speech.

use super::executor::{MessageOrchestrator, Reply, SessionInput};
use super::{SessionCommand, SessionEvent, SpeechGate};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;

pub(super) struct SessionActor {
    session_id: String,
    orchestrator: Arc<MessageOrchestrator>,
    speech: Arc<SpeechGate>,
    commands: mpsc::Receiver<SessionCommand>,
    idle_timeout: Duration,
}

impl SessionActor {
    pub(super) fn new(
        session_id: String,
        orchestrator: Arc<MessageOrchestrator>,
        speech: Arc<SpeechGate>,
        commands: mpsc::Receiver<SessionCommand>,
        idle_timeout: Duration,
    ) -> Self {
        Self {
            session_id,
            orchestrator,
            speech,
            commands,
            idle_timeout,
        }
    }

    pub(super) async fn run(mut self) {
        tracing::debug!(session_id = %self.session_id, "Session actor started");

        loop {
            match tokio::time::timeout(self.idle_timeout, self.commands.recv()).await {
                Ok(Some(cmd)) => self.handle(cmd).await,
                Ok(None) => break,
                Err(_) => {
                    // Refuse new work, then drain anything that raced in
                    self.commands.close();
                    while let Ok(cmd) = self.commands.try_recv() {
                        self.handle(cmd).await;
                    }
                    break;
                }
            }
        }

        tracing::debug!(session_id = %self.session_id, "Session actor stopped");
    }

    async fn handle(&self, cmd: SessionCommand) {
        let SessionCommand { input, reply_tx } = cmd;

        let token = match input {
            SessionInput::Transcript(_) => Some(self.speech.begin()),
            SessionInput::BargeIn => None,
        };

        match self.orchestrator.process(&self.session_id, &input).await {
            Ok(reply) => self.deliver(reply, &reply_tx, token).await,
            Err(e) => {
                let _ = reply_tx
                    .send(SessionEvent::Error {
                        message: e.to_string(),
                    })
                    .await;
            }
        }
    }

    /// Send the state update, then speak it unless a barge-in cancels first
    async fn deliver(
        &self,
        reply: Reply,
        reply_tx: &mpsc::Sender<SessionEvent>,
        token: Option<CancellationToken>,
    ) {
        let speech = reply.speak.then(|| reply.prompt.clone());
        if reply_tx.send(SessionEvent::StateUpdate(reply)).await.is_err() {
            return;
        }
        let (Some(text), Some(token)) = (speech, token) else {
            return;
        };

        let synthesizer = self.orchestrator.synthesizer();
        tokio::select! {
            () = token.cancelled() => {
                tracing::debug!(session_id = %self.session_id, "Speech cancelled by barge-in");
            }
            result = synthesizer.synthesize(&text) => match result {
                Ok(audio) if !token.is_cancelled() => {
                    let _ = reply_tx.send(SessionEvent::Audio(audio)).await;
                }
                Ok(_) => {}
                Err(e) => {
                    tracing::warn!(
                        session_id = %self.session_id,
                        error = %e,
                        "Speech synthesis failed, sending text only"
                    );
                }
            },
        }
    }
}
