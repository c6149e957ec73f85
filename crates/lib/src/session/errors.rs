//! Session management error types.

use thiserror::Error;

use crate::feed::ReconcileReason;

/// Errors that can occur while opening or using a session.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum SessionError {
    /// The decision policy declined every way of opening the vault.
    #[error("Login aborted: {}", describe(.reason))]
    Aborted { reason: ReconcileReason },
}

fn describe(reason: &ReconcileReason) -> &'static str {
    match reason {
        ReconcileReason::NotFound => "no vault found for these credentials",
        ReconcileReason::Unreachable => "the feed store is unreachable",
    }
}

impl SessionError {
    /// Check if the login was abandoned by a negative decision.
    pub fn is_aborted(&self) -> bool {
        matches!(self, SessionError::Aborted { .. })
    }
}

// Conversion from SessionError to the main Error type
impl From<SessionError> for crate::Error {
    fn from(err: SessionError) -> Self {
        crate::Error::Session(err)
    }
}
