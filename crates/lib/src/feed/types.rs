//! Feed wire types.

use std::{fmt, str::FromStr};

use serde::{Deserialize, Serialize};

use super::errors::FeedError;
use crate::{
    Result,
    crypto::{Address, FeedSignature},
};

/// Size of a feed topic in bytes
pub const TOPIC_LENGTH: usize = 32;

/// 32-byte feed topic.
///
/// Built from a short name written left-justified and zero-padded.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Topic([u8; TOPIC_LENGTH]);

impl Topic {
    /// Encode a topic name of at most 32 bytes.
    pub fn from_name(name: &str) -> Result<Self> {
        let bytes = name.as_bytes();
        if bytes.len() > TOPIC_LENGTH {
            return Err(FeedError::TopicTooLong {
                topic: name.to_string(),
                length: bytes.len(),
            }
            .into());
        }
        let mut topic = [0u8; TOPIC_LENGTH];
        topic[..bytes.len()].copy_from_slice(bytes);
        Ok(Self(topic))
    }

    /// Wrap raw topic bytes.
    pub const fn from_bytes(bytes: [u8; TOPIC_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw topic bytes.
    pub fn as_bytes(&self) -> &[u8; TOPIC_LENGTH] {
        &self.0
    }

    /// Lowercase hex with a `0x` prefix, as used on the wire.
    pub fn to_hex_prefixed(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_prefixed())
    }
}

impl fmt::Debug for Topic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let end = self.0.iter().position(|b| *b == 0).unwrap_or(TOPIC_LENGTH);
        match std::str::from_utf8(&self.0[..end]) {
            Ok(name) if self.0[end..].iter().all(|b| *b == 0) => write!(f, "Topic({name:?})"),
            _ => write!(f, "Topic({})", self.to_hex_prefixed()),
        }
    }
}

impl FromStr for Topic {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits)
            .map_err(|e| FeedError::MalformedResponse(format!("invalid topic {s:?}: {e}")))?;
        let bytes: [u8; TOPIC_LENGTH] = bytes.try_into().map_err(|v: Vec<u8>| {
            FeedError::MalformedResponse(format!(
                "topic must be {TOPIC_LENGTH} bytes, got {}",
                v.len()
            ))
        })?;
        Ok(Self(bytes))
    }
}

/// Version marker the store assigns to the next write of a feed slot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedEpoch {
    pub level: u8,
    pub time: u32,
}

impl fmt::Display for FeedEpoch {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "level {} time {}", self.level, self.time)
    }
}

/// Identifies a feed slot in the store's JSON.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FeedRef {
    pub topic: String,
    pub user: String,
}

/// Metadata returned by a template fetch: `{feed, epoch, protocolVersion}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedTemplate {
    pub feed: FeedRef,
    pub epoch: FeedEpoch,
    pub protocol_version: u8,
}

impl FeedTemplate {
    pub fn new(topic: &Topic, user: &Address, epoch: FeedEpoch, protocol_version: u8) -> Self {
        Self {
            feed: FeedRef {
                topic: topic.to_hex_prefixed(),
                user: user.to_hex_prefixed(),
            },
            epoch,
            protocol_version,
        }
    }

    /// Check that the template describes the requested feed.
    pub fn ensure_describes(&self, topic: &Topic, user: &Address) -> Result<()> {
        let actual_topic: Topic = self.feed.topic.parse()?;
        let actual_user: Address = self
            .feed
            .user
            .parse()
            .map_err(|e| FeedError::MalformedResponse(format!("invalid user: {e}")))?;
        if actual_topic != *topic || actual_user != *user {
            return Err(FeedError::TemplateMismatch {
                expected: format!("{user}/{topic}"),
                actual: format!("{}/{}", self.feed.user, self.feed.topic),
            }
            .into());
        }
        Ok(())
    }
}

/// A signed write to a feed slot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedUpdate {
    pub topic: Topic,
    pub user: Address,
    pub epoch: FeedEpoch,
    pub signature: FeedSignature,
    /// The JSON-encoded envelope, signed byte for byte.
    pub body: Vec<u8>,
}
