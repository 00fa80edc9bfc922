//! Wire types: WebSocket frames and REST bodies

use crate::matcher::MatchedProvider;
use crate::runtime::{BookingPayload, Reply, SessionEvent, SessionInput};
use crate::state_machine::BookingState;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Client -> server frame
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum InboundFrame {
    Transcript {
        #[serde(rename = "sessionId", default)]
        session_id: Option<String>,
        text: String,
    },
    BargeIn {
        #[serde(rename = "sessionId", default)]
        session_id: Option<String>,
    },
}

impl InboundFrame {
    /// `None` for anything that should be dropped without a reply:
    /// invalid JSON, unknown types, and blank transcripts
    pub fn parse(raw: &str) -> Option<Self> {
        let frame: Self = serde_json::from_str(raw).ok()?;
        match &frame {
            Self::Transcript { text, .. } if text.trim().is_empty() => None,
            _ => Some(frame),
        }
    }

    /// Split into the addressed session (if any) and the work to do
    pub fn into_parts(self) -> (Option<String>, SessionInput) {
        let (session_id, input) = match self {
            Self::Transcript { session_id, text } => (session_id, SessionInput::Transcript(text)),
            Self::BargeIn { session_id } => (session_id, SessionInput::BargeIn),
        };
        (session_id.filter(|id| !id.trim().is_empty()), input)
    }
}

/// Server -> client text frame
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerFrame {
    StateUpdate {
        state: BookingState,
        prompt: String,
        #[serde(skip_serializing_if = "Option::is_none")]
        providers: Option<Vec<MatchedProvider>>,
        #[serde(skip_serializing_if = "Option::is_none")]
        booking: Option<BookingPayload>,
    },
    Error {
        message: String,
    },
}

impl From<Reply> for ServerFrame {
    fn from(reply: Reply) -> Self {
        Self::StateUpdate {
            state: reply.state,
            prompt: reply.prompt,
            providers: reply.providers,
            booking: reply.booking,
        }
    }
}

/// What goes out on the socket for one session event
#[derive(Debug, Clone, PartialEq)]
pub enum Outbound {
    Text(String),
    Binary(Vec<u8>),
}

impl Outbound {
    pub fn encode(event: SessionEvent) -> Result<Self, serde_json::Error> {
        let frame = match event {
            SessionEvent::Audio(audio) => return Ok(Self::Binary(audio)),
            SessionEvent::StateUpdate(reply) => ServerFrame::from(reply),
            SessionEvent::Error { message } => ServerFrame::Error { message },
        };
        Ok(Self::Text(serde_json::to_string(&frame)?))
    }
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}

/// Liveness body
#[derive(Debug, Serialize)]
pub struct HealthResponse {
    pub status: &'static str,
    pub ts: DateTime<Utc>,
}
