//! Library configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};
use url::Url;

use crate::{
    Result,
    constants::{DEFAULT_GATEWAY_URL, DEFAULT_REQUEST_TIMEOUT_SECS, FEED_TOPIC},
    crypto::KdfParams,
    feed::{FeedError, Topic},
};

/// Settings shared by every session opened through a [`crate::VaultClient`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct VaultConfig {
    /// Base URL of the feed gateway.
    pub gateway_url: Url,
    /// Feed topic name, at most 32 bytes.
    pub topic: String,
    /// scrypt cost parameters. Every device must use the same values.
    pub kdf: KdfParams,
    /// Timeout for one feed request.
    pub request_timeout_secs: u64,
    /// Allow one re-fetch-and-retry when a post is rejected for a stale epoch.
    pub retry_stale_epoch: bool,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            gateway_url: default_gateway_url(),
            topic: FEED_TOPIC.to_string(),
            kdf: KdfParams::default(),
            request_timeout_secs: DEFAULT_REQUEST_TIMEOUT_SECS,
            retry_stale_epoch: true,
        }
    }
}

impl VaultConfig {
    /// Use a different gateway.
    pub fn with_gateway_url(mut self, gateway_url: Url) -> Self {
        self.gateway_url = gateway_url;
        self
    }

    /// Use a different topic name.
    pub fn with_topic(mut self, topic: impl Into<String>) -> Self {
        self.topic = topic.into();
        self
    }

    /// Use different scrypt cost parameters.
    pub fn with_kdf(mut self, kdf: KdfParams) -> Self {
        self.kdf = kdf;
        self
    }

    /// The encoded feed topic.
    pub fn feed_topic(&self) -> Result<Topic> {
        Topic::from_name(&self.topic)
    }

    /// Per-request timeout as a [`Duration`].
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Check the configuration before any session uses it.
    pub fn validate(&self) -> Result<()> {
        self.feed_topic()?;
        self.kdf.to_params()?;
        if self.gateway_url.cannot_be_a_base() {
            return Err(FeedError::InvalidGateway {
                url: self.gateway_url.to_string(),
            }
            .into());
        }
        Ok(())
    }
}

fn default_gateway_url() -> Url {
    // The constant is a well-formed absolute URL.
    Url::parse(DEFAULT_GATEWAY_URL).unwrap_or_else(|_| unreachable!("invalid default gateway"))
}
