//! Error types for the feed protocol and its transports.

use thiserror::Error;

/// Errors that can occur while talking to the feed store.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum FeedError {
    /// Could not reach the feed store at all.
    #[error("Failed to connect to {address}: {reason}")]
    ConnectionFailed { address: String, reason: String },

    /// Other transport-level failure.
    #[error("Network error: {0}")]
    Network(String),

    /// The store or a gateway in front of it answered with a server error.
    #[error("Feed store unavailable ({status}): {reason}")]
    Unavailable { status: u16, reason: String },

    /// The store rejected a write because the epoch was already used.
    #[error("Feed update rejected: epoch level {level} time {time} is stale")]
    StaleEpoch { level: u8, time: u32 },

    /// The store answered with an unexpected non-success status.
    #[error("Feed store returned {status}: {reason}")]
    Rejected { status: u16, reason: String },

    /// The store answered with a body that could not be parsed.
    #[error("Malformed response from feed store: {0}")]
    MalformedResponse(String),

    /// The template describes a different feed than the one requested.
    #[error("Feed template mismatch: expected {expected}, got {actual}")]
    TemplateMismatch { expected: String, actual: String },

    /// The topic name does not fit into 32 bytes.
    #[error("Topic {topic:?} is {length} bytes long; topics are at most 32 bytes")]
    TopicTooLong { topic: String, length: usize },

    /// The gateway URL cannot be used as a base for feed requests.
    #[error("Invalid gateway URL: {url}")]
    InvalidGateway { url: String },

    /// A fetch was requested while another fetch for the session is in flight.
    #[error("A fetch is already in progress")]
    FetchInFlight,

    /// A fetch was requested while a persist for the session is in flight.
    #[error("A save is in progress")]
    PersistInFlight,
}

impl FeedError {
    /// Check if this is a network/connection error.
    pub fn is_network_error(&self) -> bool {
        matches!(
            self,
            FeedError::Network(_)
                | FeedError::ConnectionFailed { .. }
                | FeedError::Unavailable { .. }
        )
    }

    /// Check if the store rejected a write for a stale epoch.
    pub fn is_stale_epoch(&self) -> bool {
        matches!(self, FeedError::StaleEpoch { .. })
    }

    /// Check if this is a protocol error (unexpected status or body).
    pub fn is_protocol_error(&self) -> bool {
        matches!(
            self,
            FeedError::Rejected { .. }
                | FeedError::MalformedResponse(_)
                | FeedError::TemplateMismatch { .. }
        )
    }

    /// Check if the store returned an unparseable body.
    pub fn is_malformed_response(&self) -> bool {
        matches!(self, FeedError::MalformedResponse(_))
    }

    /// Check if this is a configuration error.
    pub fn is_configuration_error(&self) -> bool {
        matches!(
            self,
            FeedError::TopicTooLong { .. } | FeedError::InvalidGateway { .. }
        )
    }

    /// Check if the request overlapped one already in flight.
    pub fn is_in_flight(&self) -> bool {
        matches!(self, FeedError::FetchInFlight | FeedError::PersistInFlight)
    }
}

// Conversion from FeedError to the main Error type
impl From<FeedError> for crate::Error {
    fn from(err: FeedError) -> Self {
        crate::Error::Feed(err)
    }
}
