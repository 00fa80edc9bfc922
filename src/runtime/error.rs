//! Collaborator (port) error types

use thiserror::Error;

/// Failure reported by an external collaborator
#[derive(Debug, Clone, Error)]
#[error("{port}: {message}")]
pub struct PortError {
    pub kind: PortErrorKind,
    /// Which collaborator failed (`extraction`, `selection`, `tts`, ...)
    pub port: &'static str,
    pub message: String,
}

impl PortError {
    pub fn new(kind: PortErrorKind, port: &'static str, message: impl Into<String>) -> Self {
        Self {
            kind,
            port,
            message: message.into(),
        }
    }

    pub fn network(port: &'static str, message: impl Into<String>) -> Self {
        Self::new(PortErrorKind::Network, port, message)
    }

    pub fn status(port: &'static str, status: u16, body: &str) -> Self {
        Self::new(
            PortErrorKind::Status(status),
            port,
            format!("failed {status}: {body}"),
        )
    }

    pub fn decode(port: &'static str, message: impl Into<String>) -> Self {
        Self::new(PortErrorKind::Decode, port, message)
    }

    pub fn unavailable(port: &'static str, message: impl Into<String>) -> Self {
        Self::new(PortErrorKind::Unavailable, port, message)
    }

    /// Classify a transport-level failure from the HTTP client
    pub fn from_reqwest(port: &'static str, e: &reqwest::Error) -> Self {
        let kind = if e.is_decode() {
            PortErrorKind::Decode
        } else if let Some(status) = e.status() {
            PortErrorKind::Status(status.as_u16())
        } else {
            PortErrorKind::Network
        };
        Self::new(kind, port, e.to_string())
    }
}

/// Error classification
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PortErrorKind {
    /// Connection refused, timeout, DNS
    Network,
    /// Non-success HTTP status
    Status(u16),
    /// Response body did not match the contract
    Decode,
    /// No usable collaborator (not configured, queue empty in tests)
    Unavailable,
}
