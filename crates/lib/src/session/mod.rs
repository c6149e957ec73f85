//! Vault sessions.
//!
//! A [`VaultClient`] bundles the configuration and the injected collaborators (feed
//! store, local cache, decision policy). [`VaultClient::unlock`] runs the login flow
//! and returns a [`Session`], the explicit context every vault operation goes
//! through. The session owns the key material; [`Session::close`] or dropping it
//! scrubs the key, the identity and the decrypted entries.
//!
//! Mutations are local-first. Each one is applied to a copy of the store, sealed,
//! written to the local cache and only then committed in memory and handed to the
//! feed. A failed post leaves the local mutation in place.

use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard};

use tokio::sync::Mutex;
use tracing::{Instrument, debug, info, info_span, warn};

use crate::{
    Result, VaultConfig,
    cache::{LocalCache, cache_key},
    crypto::{Address, IdentityKeyPair, SymmetricKey, derive_identity},
    feed::{
        DecisionPolicy, FeedError, FeedStore, FeedSync, HttpFeedStore, PersistOutcome, Prompt,
        ReconcileReason, sync::Enqueued,
    },
    vault::{self, EncryptedEnvelope, LoginEntry, VaultPayload, VaultStore},
};

pub mod deriver;
mod errors;

pub use deriver::KeyDeriver;
pub use errors::SessionError;

/// Where the vault of a freshly opened session came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VaultOrigin {
    /// Decrypted from the feed.
    Remote,
    /// Decrypted from the local cache after the policy accepted it.
    LocalCache,
    /// Started empty after the policy accepted it.
    Empty,
}

/// Result of a vault mutation.
///
/// The mutation itself has been applied locally and cached. `persisted` reports what
/// happened on the feed.
#[derive(Debug)]
#[must_use]
pub struct Mutation<T> {
    pub value: T,
    pub persisted: Result<PersistOutcome>,
}

/// Entry point for opening sessions.
pub struct VaultClient {
    config: VaultConfig,
    store: Arc<dyn FeedStore>,
    cache: Arc<dyn LocalCache>,
    policy: DecisionPolicy,
    deriver: KeyDeriver,
}

impl VaultClient {
    /// Create a client with explicit collaborators.
    ///
    /// The decision policy defaults to [`DecisionPolicy::Abort`].
    pub fn new(
        config: VaultConfig,
        store: Arc<dyn FeedStore>,
        cache: Arc<dyn LocalCache>,
    ) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            config,
            store,
            cache,
            policy: DecisionPolicy::default(),
            deriver: KeyDeriver::new(),
        })
    }

    /// Create a client that talks to the configured HTTP gateway.
    pub fn with_http_store(config: VaultConfig, cache: Arc<dyn LocalCache>) -> Result<Self> {
        let store = HttpFeedStore::new(&config.gateway_url, config.request_timeout())?;
        Self::new(config, Arc::new(store), cache)
    }

    /// Use a different decision policy.
    pub fn with_policy(mut self, policy: DecisionPolicy) -> Self {
        self.policy = policy;
        self
    }

    pub fn config(&self) -> &VaultConfig {
        &self.config
    }

    pub fn policy(&self) -> &DecisionPolicy {
        &self.policy
    }

    /// Derive the feed address for a set of credentials without opening the vault.
    pub async fn address_for(&self, username: &str, password: &str) -> Result<Address> {
        let key = self
            .deriver
            .derive(username, password, self.config.kdf)
            .await?;
        Ok(derive_identity(&key)?.address())
    }

    /// Log in and open the vault.
    pub async fn unlock(&self, username: &str, password: &str) -> Result<Session> {
        Session::open(self, username, password).await
    }
}

impl std::fmt::Debug for VaultClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultClient")
            .field("config", &self.config)
            .field("store", &self.store.store_type())
            .field("policy", &self.policy)
            .finish()
    }
}

/// An unlocked vault.
pub struct Session {
    username: String,
    key: SymmetricKey,
    identity: IdentityKeyPair,
    vault: RwLock<VaultStore>,
    write_lock: Mutex<()>,
    sync: FeedSync,
    cache: Arc<dyn LocalCache>,
    origin: VaultOrigin,
}

impl Session {
    /// Run the login flow.
    ///
    /// Derives the key and identity, fetches the latest envelope and decrypts it. If
    /// the feed has nothing for this identity or cannot be reached, the client's
    /// decision policy picks between the local cache, an empty vault or aborting.
    /// On any error nothing is exposed and the derived key is dropped.
    pub async fn open(client: &VaultClient, username: &str, password: &str) -> Result<Self> {
        let key = client
            .deriver
            .derive(username, password, client.config.kdf)
            .await?;
        let identity = derive_identity(&key)?;
        let address = identity.address();
        let sync = FeedSync::new(
            client.store.clone(),
            client.config.feed_topic()?,
            client.config.retry_stale_epoch,
        );

        async move {
            let (payload, origin) = match sync.fetch_latest(&address).await {
                Ok(Some(envelope)) => (vault::open(&envelope, &key)?, VaultOrigin::Remote),
                Ok(None) => {
                    reconcile(client, username, &key, ReconcileReason::NotFound).await?
                }
                Err(e) if e.is_network_error() => {
                    reconcile(client, username, &key, ReconcileReason::Unreachable).await?
                }
                Err(e) => return Err(e),
            };
            let store = VaultStore::from_payload(payload)?;
            info!(?origin, logins = store.len(), "Vault unlocked");

            Ok(Session {
                username: username.to_string(),
                key,
                identity,
                vault: RwLock::new(store),
                write_lock: Mutex::new(()),
                sync,
                cache: client.cache.clone(),
                origin,
            })
        }
        .instrument(info_span!("unlock", user = %address))
        .await
    }

    pub fn username(&self) -> &str {
        &self.username
    }

    /// The feed address of this vault.
    pub fn address(&self) -> Address {
        self.identity.address()
    }

    pub fn origin(&self) -> VaultOrigin {
        self.origin
    }

    /// All logins, ordered by numeric id.
    pub fn logins(&self) -> Vec<(String, LoginEntry)> {
        self.read()
            .logins()
            .into_iter()
            .map(|(id, entry)| (id.to_string(), entry.clone()))
            .collect()
    }

    pub fn get_login(&self, id: &str) -> Option<LoginEntry> {
        self.read().get(id).cloned()
    }

    /// The id the next created login will receive.
    pub fn next_id(&self) -> u64 {
        self.read().next_id()
    }

    pub fn len(&self) -> usize {
        self.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    /// Whether a persist is currently in flight.
    pub fn is_persisting(&self) -> bool {
        self.sync.is_persisting()
    }

    /// Add a login. The value of the returned mutation is the new id.
    pub async fn create_login(&self, entry: LoginEntry) -> Result<Mutation<String>> {
        self.mutate("create", |store| store.create(entry)).await
    }

    /// Replace a login in full.
    pub async fn update_login(&self, id: &str, entry: LoginEntry) -> Result<Mutation<()>> {
        self.mutate("update", |store| store.update(id, entry)).await
    }

    /// Remove a login. The value of the returned mutation is the removed entry.
    pub async fn delete_login(&self, id: &str) -> Result<Mutation<LoginEntry>> {
        self.mutate("delete", |store| store.delete(id)).await
    }

    /// Reload the vault from the feed.
    ///
    /// # Returns
    /// `true` if remote content was found and replaced the local vault.
    ///
    /// # Errors
    /// [`FeedError::PersistInFlight`] while a persist is running, since the feed
    /// would not yet reflect the latest local state.
    pub async fn refresh(&self) -> Result<bool> {
        let _write = self.write_lock.lock().await;
        if self.sync.is_persisting() {
            return Err(FeedError::PersistInFlight.into());
        }
        let Some(envelope) = self.sync.fetch_latest(&self.address()).await? else {
            return Ok(false);
        };
        let store = VaultStore::from_payload(vault::open(&envelope, &self.key)?)?;
        self.cache
            .set(&cache_key(&self.username), envelope.to_json()?)
            .await?;
        *self.vault.write().unwrap_or_else(PoisonError::into_inner) = store;
        debug!("Vault refreshed from feed");
        Ok(true)
    }

    /// End the session. Key material and decrypted entries are zeroed on drop.
    pub fn close(self) {
        info!(user = %self.address(), "Session closed");
    }

    /// Apply `op` to a copy of the store, seal, cache, commit and persist.
    ///
    /// Mutations are serialized by the write lock up to the point where their
    /// snapshot is handed to the feed, so snapshots reach it in commit order.
    async fn mutate<T>(
        &self,
        action: &'static str,
        op: impl FnOnce(&mut VaultStore) -> Result<T>,
    ) -> Result<Mutation<T>> {
        let write = self.write_lock.lock().await;

        let mut next = self.read().clone();
        let value = op(&mut next)?;
        let envelope = vault::seal(&next.to_payload(), &self.key)?;
        let json = envelope.to_json()?;

        self.cache.set(&cache_key(&self.username), json.clone()).await?;
        *self.vault.write().unwrap_or_else(PoisonError::into_inner) = next;
        debug!(action, "Applied mutation locally");

        let enqueued = self.sync.enqueue(json.into_bytes());
        drop(write);

        let persisted = match enqueued {
            Enqueued::Lead(lead) => self.sync.flush(&self.identity, lead).await,
            Enqueued::Coalesced => Ok(PersistOutcome::Coalesced),
        };
        if let Err(e) = &persisted {
            warn!(action, "Mutation kept locally but not persisted: {e}");
        }
        Ok(Mutation { value, persisted })
    }

    fn read(&self) -> RwLockReadGuard<'_, VaultStore> {
        self.vault.read().unwrap_or_else(PoisonError::into_inner)
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("username", &self.username)
            .field("address", &self.address())
            .field("origin", &self.origin)
            .field("vault", &*self.read())
            .finish_non_exhaustive()
    }
}

/// Offer the local cache or an empty vault when the feed had nothing usable.
async fn reconcile(
    client: &VaultClient,
    username: &str,
    key: &SymmetricKey,
    reason: ReconcileReason,
) -> Result<(VaultPayload, VaultOrigin)> {
    match client.cache.get(&cache_key(username)).await? {
        Some(cached) => {
            let prompt = Prompt::UseLocalCache { reason };
            if !client.policy.decide(&prompt) {
                info!(?reason, "Declined local cache");
                return Err(SessionError::Aborted { reason }.into());
            }
            info!(?reason, "Using local cache");
            let envelope = EncryptedEnvelope::from_json(cached)?;
            Ok((vault::open(&envelope, key)?, VaultOrigin::LocalCache))
        }
        None => {
            let prompt = Prompt::InitializeEmpty { reason };
            if !client.policy.decide(&prompt) {
                info!(?reason, "Declined empty vault");
                return Err(SessionError::Aborted { reason }.into());
            }
            info!(?reason, "Starting empty vault");
            Ok((VaultPayload::default(), VaultOrigin::Empty))
        }
    }
}
