//! In-process feed store.
//!
//! Behaves like a verifying gateway: it hands out epochs, rejects updates built on
//! an epoch that was already used, and recovers the signer of every update to check
//! it against the slot owner. Useful for tests and offline use.

use std::{
    collections::HashMap,
    sync::{
        Mutex, PoisonError,
        atomic::{AtomicBool, AtomicUsize, Ordering},
    },
    time::Duration,
};

use async_trait::async_trait;
use tracing::debug;

use super::FeedStore;
use crate::{
    Result,
    crypto::Address,
    feed::{
        digest::{build_digest, digest_hash},
        errors::FeedError,
        types::{FeedEpoch, FeedTemplate, FeedUpdate, Topic},
    },
    vault::EncryptedEnvelope,
};

/// Epoch handed out for the first write of a slot.
const INITIAL_EPOCH: FeedEpoch = FeedEpoch { level: 0, time: 1 };

#[derive(Debug)]
struct FeedSlot {
    next_epoch: FeedEpoch,
    body: Option<Vec<u8>>,
}

impl Default for FeedSlot {
    fn default() -> Self {
        Self {
            next_epoch: INITIAL_EPOCH,
            body: None,
        }
    }
}

/// Verifying feed store kept in memory.
#[derive(Debug)]
pub struct InMemoryFeedStore {
    slots: Mutex<HashMap<(Address, Topic), FeedSlot>>,
    protocol_version: u8,
    offline: AtomicBool,
    latency: Mutex<Option<Duration>>,
    updates: AtomicUsize,
}

impl Default for InMemoryFeedStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryFeedStore {
    /// Create an empty store speaking protocol version 0.
    pub fn new() -> Self {
        Self {
            slots: Mutex::new(HashMap::new()),
            protocol_version: 0,
            offline: AtomicBool::new(false),
            latency: Mutex::new(None),
            updates: AtomicUsize::new(0),
        }
    }

    /// Advertise a different protocol version in templates.
    pub fn with_protocol_version(mut self, protocol_version: u8) -> Self {
        self.protocol_version = protocol_version;
        self
    }

    /// Simulate the store becoming unreachable, or reachable again.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Delay every post by `latency`.
    pub fn set_latency(&self, latency: Option<Duration>) {
        *self.latency.lock().unwrap_or_else(PoisonError::into_inner) = latency;
    }

    /// Raw body of the last accepted update for a slot.
    pub fn raw_body(&self, user: &Address, topic: &Topic) -> Option<Vec<u8>> {
        self.slots
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(&(*user, *topic))
            .and_then(|slot| slot.body.clone())
    }

    /// Replace the content of a slot without signature checks, advancing its epoch.
    ///
    /// Stands in for a write made by another device.
    pub fn overwrite(&self, user: &Address, topic: &Topic, body: Vec<u8>) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry((*user, *topic)).or_default();
        slot.body = Some(body);
        slot.next_epoch.time += 1;
    }

    /// Advance the epoch of a slot without changing its content.
    pub fn bump_epoch(&self, user: &Address, topic: &Topic) {
        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        slots.entry((*user, *topic)).or_default().next_epoch.time += 1;
    }

    /// Number of updates accepted so far.
    pub fn update_count(&self) -> usize {
        self.updates.load(Ordering::SeqCst)
    }

    fn ensure_online(&self) -> Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(FeedError::ConnectionFailed {
                address: "memory".to_string(),
                reason: "store is offline".to_string(),
            }
            .into());
        }
        Ok(())
    }
}

#[async_trait]
impl FeedStore for InMemoryFeedStore {
    fn store_type(&self) -> &'static str {
        "memory"
    }

    async fn fetch_template(&self, user: &Address, topic: &Topic) -> Result<FeedTemplate> {
        self.ensure_online()?;
        let slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let epoch = slots
            .get(&(*user, *topic))
            .map(|slot| slot.next_epoch)
            .unwrap_or(INITIAL_EPOCH);
        Ok(FeedTemplate::new(topic, user, epoch, self.protocol_version))
    }

    async fn fetch_content(
        &self,
        user: &Address,
        topic: &Topic,
    ) -> Result<Option<EncryptedEnvelope>> {
        self.ensure_online()?;
        let Some(body) = self.raw_body(user, topic) else {
            return Ok(None);
        };
        let envelope = serde_json::from_slice(&body)
            .map_err(|e| FeedError::MalformedResponse(format!("Failed to parse envelope: {e}")))?;
        Ok(Some(envelope))
    }

    async fn post_update(&self, update: &FeedUpdate) -> Result<()> {
        self.ensure_online()?;
        let latency = *self.latency.lock().unwrap_or_else(PoisonError::into_inner);
        if let Some(latency) = latency {
            tokio::time::sleep(latency).await;
        }

        let digest = build_digest(
            self.protocol_version,
            &update.topic,
            &update.user,
            update.epoch,
            &update.body,
        );
        let signer = update
            .signature
            .recover_address(&digest_hash(&digest))
            .map_err(|e| FeedError::Rejected {
                status: 401,
                reason: e.to_string(),
            })?;
        if signer != update.user {
            return Err(FeedError::Rejected {
                status: 401,
                reason: format!("signature by {signer} does not match user {}", update.user),
            }
            .into());
        }

        let mut slots = self.slots.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = slots.entry((update.user, update.topic)).or_default();
        if update.epoch != slot.next_epoch {
            return Err(FeedError::StaleEpoch {
                level: update.epoch.level,
                time: update.epoch.time,
            }
            .into());
        }
        slot.body = Some(update.body.clone());
        slot.next_epoch.time += 1;
        self.updates.fetch_add(1, Ordering::SeqCst);
        debug!(user = %update.user, epoch = %update.epoch, "Accepted feed update");
        Ok(())
    }
}
