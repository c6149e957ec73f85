//! Feed synchronization for one session.
//!
//! [`FeedSync`] owns the two state machines of a session's feed slot: fetching the
//! latest content, and persisting a new snapshot. Neither is re-entrant. A second
//! fetch while one is running fails with [`FeedError::FetchInFlight`]. A persist
//! request arriving while another is in flight is coalesced: it replaces the
//! pending snapshot, and the in-flight task posts the most recent pending snapshot
//! once its own post completes.

use std::sync::{
    Arc, Mutex, PoisonError,
    atomic::{AtomicBool, Ordering},
};

use tracing::{Instrument, debug, info, info_span, warn};

use super::{
    digest::{build_digest, digest_hash},
    errors::FeedError,
    transports::FeedStore,
    types::{FeedEpoch, FeedTemplate, FeedUpdate, Topic},
};
use crate::{
    Result,
    crypto::{Address, IdentityKeyPair},
    vault::EncryptedEnvelope,
};

/// Result of a successful [`FeedSync::persist`] call.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PersistOutcome {
    /// The snapshot, or a newer one queued behind it, was accepted at `epoch`.
    Posted { epoch: FeedEpoch },
    /// A persist was already in flight; the snapshot will be posted when it finishes
    /// unless an even newer one replaces it first.
    Coalesced,
}

#[derive(Debug, Default)]
struct PersistSlot {
    in_flight: bool,
    pending: Option<Vec<u8>>,
}

/// Fetch and persist logic for one feed slot topic.
pub struct FeedSync {
    store: Arc<dyn FeedStore>,
    topic: Topic,
    retry_stale_epoch: bool,
    fetching: AtomicBool,
    persist: Mutex<PersistSlot>,
}

impl FeedSync {
    pub fn new(store: Arc<dyn FeedStore>, topic: Topic, retry_stale_epoch: bool) -> Self {
        Self {
            store,
            topic,
            retry_stale_epoch,
            fetching: AtomicBool::new(false),
            persist: Mutex::new(PersistSlot::default()),
        }
    }

    pub fn topic(&self) -> &Topic {
        &self.topic
    }

    /// Whether a persist is currently in flight.
    pub fn is_persisting(&self) -> bool {
        self.lock_persist().in_flight
    }

    /// Fetch the latest envelope stored under `user`.
    ///
    /// # Returns
    /// `Ok(None)` if the feed has never been written. Transport failures are
    /// returned as network errors for the caller's decision policy to handle.
    pub async fn fetch_latest(&self, user: &Address) -> Result<Option<EncryptedEnvelope>> {
        if self.fetching.swap(true, Ordering::SeqCst) {
            return Err(FeedError::FetchInFlight.into());
        }
        let _fetching = FetchGuard(&self.fetching);

        async move {
            debug!(store = self.store.store_type(), "Fetching latest content");
            let content = self.store.fetch_content(user, &self.topic).await;
            match &content {
                Ok(Some(_)) => info!("Fetched vault from feed"),
                Ok(None) => info!("Feed has no content"),
                Err(e) => warn!("Failed to fetch vault from feed: {e}"),
            }
            content
        }
        .instrument(info_span!("fetch_latest", user = %user))
        .await
    }

    /// Fetch the template for the next write to `user`'s slot.
    ///
    /// Never cached: another writer may have advanced the epoch since the last call.
    pub async fn fetch_epoch(&self, user: &Address) -> Result<FeedTemplate> {
        let template = self.store.fetch_template(user, &self.topic).await?;
        template.ensure_describes(&self.topic, user)?;
        debug!(epoch = %template.epoch, version = template.protocol_version, "Fetched epoch");
        Ok(template)
    }

    /// Post `body` as the new content of the identity's slot.
    ///
    /// Dropping the returned future while it is in flight abandons any snapshot
    /// coalesced behind it.
    pub async fn persist(&self, identity: &IdentityKeyPair, body: Vec<u8>) -> Result<PersistOutcome> {
        match self.enqueue(body) {
            Enqueued::Lead(lead) => self.flush(identity, lead).await,
            Enqueued::Coalesced => Ok(PersistOutcome::Coalesced),
        }
    }

    /// Hand a snapshot to the persist state machine without waiting.
    ///
    /// Callers that must keep snapshots in submission order call this while holding
    /// their own ordering lock, then [`flush`](Self::flush) the lead after releasing it.
    pub(crate) fn enqueue(&self, body: Vec<u8>) -> Enqueued<'_> {
        let mut slot = self.lock_persist();
        if slot.in_flight {
            if slot.pending.replace(body).is_some() {
                debug!("Replaced pending snapshot with a newer one");
            } else {
                debug!("Persist in flight, snapshot queued");
            }
            return Enqueued::Coalesced;
        }
        slot.in_flight = true;
        Enqueued::Lead(PersistLead {
            guard: PersistGuard {
                slot: &self.persist,
                released: false,
            },
            body,
        })
    }

    /// Post the lead snapshot, then every snapshot coalesced behind it.
    pub(crate) async fn flush(
        &self,
        identity: &IdentityKeyPair,
        lead: PersistLead<'_>,
    ) -> Result<PersistOutcome> {
        let PersistLead { mut guard, mut body } = lead;
        let user = identity.address();
        async move {
            loop {
                let result = self.persist_once(identity, &body).await;
                let next = {
                    let mut slot = self.lock_persist();
                    match slot.pending.take() {
                        Some(next) => next,
                        None => {
                            slot.in_flight = false;
                            guard.released = true;
                            return result.map(|epoch| PersistOutcome::Posted { epoch });
                        }
                    }
                };
                if let Err(e) = &result {
                    warn!("Superseded snapshot was not posted: {e}");
                }
                debug!("Flushing coalesced snapshot");
                body = next;
            }
        }
        .instrument(info_span!("persist", user = %user))
        .await
    }

    /// One epoch fetch, digest, sign and post sequence, with at most one retry on a
    /// stale epoch.
    async fn persist_once(&self, identity: &IdentityKeyPair, body: &[u8]) -> Result<FeedEpoch> {
        let user = identity.address();
        let mut retried = false;
        loop {
            let template = self.fetch_epoch(&user).await?;
            let digest = build_digest(
                template.protocol_version,
                &self.topic,
                &user,
                template.epoch,
                body,
            );
            let signature = identity.sign(&digest_hash(&digest))?;
            let update = FeedUpdate {
                topic: self.topic,
                user,
                epoch: template.epoch,
                signature,
                body: body.to_vec(),
            };

            match self.store.post_update(&update).await {
                Ok(()) => {
                    info!(epoch = %template.epoch, bytes = body.len(), "Posted feed update");
                    return Ok(template.epoch);
                }
                Err(e) if e.is_stale_epoch() && self.retry_stale_epoch && !retried => {
                    warn!(epoch = %template.epoch, "Epoch went stale, retrying once");
                    retried = true;
                }
                Err(e) => {
                    warn!(epoch = %template.epoch, "Feed update failed: {e}");
                    return Err(e);
                }
            }
        }
    }

    fn lock_persist(&self) -> std::sync::MutexGuard<'_, PersistSlot> {
        self.persist.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for FeedSync {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FeedSync")
            .field("store", &self.store.store_type())
            .field("topic", &self.topic)
            .field("retry_stale_epoch", &self.retry_stale_epoch)
            .finish()
    }
}

struct FetchGuard<'a>(&'a AtomicBool);

impl Drop for FetchGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::SeqCst);
    }
}

/// Result of [`FeedSync::enqueue`].
pub(crate) enum Enqueued<'a> {
    /// The caller owns the persist and must flush it.
    Lead(PersistLead<'a>),
    /// The snapshot is pending behind an in-flight persist.
    Coalesced,
}

/// Exclusive right to run the next persist.
pub(crate) struct PersistLead<'a> {
    guard: PersistGuard<'a>,
    body: Vec<u8>,
}

/// Clears the in-flight marker if a persist is dropped before it finishes.
struct PersistGuard<'a> {
    slot: &'a Mutex<PersistSlot>,
    released: bool,
}

impl Drop for PersistGuard<'_> {
    fn drop(&mut self) {
        if !self.released {
            let mut slot = self.slot.lock().unwrap_or_else(PoisonError::into_inner);
            slot.in_flight = false;
            slot.pending = None;
        }
    }
}
