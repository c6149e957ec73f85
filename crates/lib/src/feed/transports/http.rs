//! HTTP feed store client.
//!
//! Talks to a feed gateway over its single `/bzz-feed:/` endpoint with reqwest.
//! The slot is selected with `user` and `topic` query parameters; `meta=1` asks
//! for the update template instead of the content.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::{Response, StatusCode, header::CONTENT_TYPE};
use tracing::debug;
use url::Url;

use super::FeedStore;
use crate::{
    Result,
    constants::FEED_PATH,
    crypto::Address,
    feed::{
        errors::FeedError,
        types::{FeedTemplate, FeedUpdate, Topic},
    },
    vault::EncryptedEnvelope,
};

/// Feed store reached through an HTTP gateway.
#[derive(Debug, Clone)]
pub struct HttpFeedStore {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpFeedStore {
    /// Create a client for the gateway at `gateway`.
    pub fn new(gateway: &Url, timeout: Duration) -> Result<Self> {
        if gateway.cannot_be_a_base() {
            return Err(FeedError::InvalidGateway {
                url: gateway.to_string(),
            }
            .into());
        }
        let endpoint = gateway
            .join(FEED_PATH)
            .map_err(|_| FeedError::InvalidGateway {
                url: gateway.to_string(),
            })?;
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FeedError::Network(format!("Failed to build HTTP client: {e}")))?;
        Ok(Self { client, endpoint })
    }

    /// The feed endpoint requests are sent to.
    pub fn endpoint(&self) -> &Url {
        &self.endpoint
    }

    fn connection_failed(&self, err: reqwest::Error) -> FeedError {
        FeedError::ConnectionFailed {
            address: self.endpoint.to_string(),
            reason: err.to_string(),
        }
    }

    /// Classify a non-success response. Server errors mean the store could not be
    /// read or written, the rest are refusals of this particular request.
    async fn rejected(response: Response) -> FeedError {
        let status = response.status();
        let reason = response.text().await.unwrap_or_default();
        if status.is_server_error() {
            FeedError::Unavailable {
                status: status.as_u16(),
                reason,
            }
        } else {
            FeedError::Rejected {
                status: status.as_u16(),
                reason,
            }
        }
    }
}

#[async_trait]
impl FeedStore for HttpFeedStore {
    fn store_type(&self) -> &'static str {
        "http"
    }

    async fn fetch_template(&self, user: &Address, topic: &Topic) -> Result<FeedTemplate> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("user", user.to_hex_prefixed()),
                ("topic", topic.to_hex_prefixed()),
                ("meta", "1".to_string()),
            ])
            .send()
            .await
            .map_err(|e| self.connection_failed(e))?;

        if !response.status().is_success() {
            return Err(Self::rejected(response).await.into());
        }

        let template: FeedTemplate = response
            .json()
            .await
            .map_err(|e| FeedError::MalformedResponse(format!("Failed to parse template: {e}")))?;
        debug!(%user, epoch = %template.epoch, "Fetched feed template");
        Ok(template)
    }

    async fn fetch_content(
        &self,
        user: &Address,
        topic: &Topic,
    ) -> Result<Option<EncryptedEnvelope>> {
        let response = self
            .client
            .get(self.endpoint.clone())
            .query(&[
                ("user", user.to_hex_prefixed()),
                ("topic", topic.to_hex_prefixed()),
            ])
            .send()
            .await
            .map_err(|e| self.connection_failed(e))?;

        if response.status() == StatusCode::NOT_FOUND {
            debug!(%user, "Feed has no content");
            return Ok(None);
        }
        if !response.status().is_success() {
            return Err(Self::rejected(response).await.into());
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| FeedError::Network(format!("Failed to read response: {e}")))?;
        let envelope: EncryptedEnvelope = serde_json::from_slice(&body)
            .map_err(|e| FeedError::MalformedResponse(format!("Failed to parse envelope: {e}")))?;
        Ok(Some(envelope))
    }

    async fn post_update(&self, update: &FeedUpdate) -> Result<()> {
        let response = self
            .client
            .post(self.endpoint.clone())
            .query(&[
                ("topic", update.topic.to_hex_prefixed()),
                ("user", update.user.to_hex_prefixed()),
                ("level", update.epoch.level.to_string()),
                ("time", update.epoch.time.to_string()),
                ("signature", update.signature.to_hex_prefixed()),
            ])
            .header(CONTENT_TYPE, "application/json")
            .body(update.body.clone())
            .send()
            .await
            .map_err(|e| self.connection_failed(e))?;

        match response.status() {
            status if status.is_success() => Ok(()),
            StatusCode::CONFLICT | StatusCode::PRECONDITION_FAILED => Err(FeedError::StaleEpoch {
                level: update.epoch.level,
                time: update.epoch.time,
            }
            .into()),
            _ => Err(Self::rejected(response).await.into()),
        }
    }
}
