//! Remote feed store abstractions.
//!
//! [`FeedSync`](super::FeedSync) talks to the store only through the [`FeedStore`]
//! trait, so sessions can run against a real gateway ([`http::HttpFeedStore`]) or
//! an in-process store ([`memory::InMemoryFeedStore`]) without any change to the
//! protocol logic.

use async_trait::async_trait;

use super::types::{FeedTemplate, FeedUpdate, Topic};
use crate::{Result, crypto::Address, vault::EncryptedEnvelope};

pub mod http;
pub mod memory;

/// Wire contract of a mutable feed store.
#[async_trait]
pub trait FeedStore: Send + Sync {
    /// Short identifier used in logs.
    fn store_type(&self) -> &'static str;

    /// Fetch the metadata needed to build the next update of a feed slot.
    ///
    /// The returned epoch is only valid for the write that immediately follows.
    async fn fetch_template(&self, user: &Address, topic: &Topic) -> Result<FeedTemplate>;

    /// Fetch the latest content of a feed slot.
    ///
    /// # Returns
    /// `Ok(None)` if the slot has never been written.
    async fn fetch_content(
        &self,
        user: &Address,
        topic: &Topic,
    ) -> Result<Option<EncryptedEnvelope>>;

    /// Post a signed update.
    ///
    /// A store rejecting the update because its epoch was already used answers
    /// with [`FeedError::StaleEpoch`](super::FeedError::StaleEpoch).
    async fn post_update(&self, update: &FeedUpdate) -> Result<()>;
}
