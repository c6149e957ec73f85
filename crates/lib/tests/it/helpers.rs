//! Shared setup for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use feedvault::{
    Session, VaultClient, VaultConfig,
    cache::{LocalCache, MemoryCache},
    crypto::KdfParams,
    feed::{DecisionPolicy, InMemoryFeedStore, Topic},
};

/// Cheap scrypt parameters so tests do not spend seconds per login.
pub const FAST_KDF: KdfParams = KdfParams {
    log_n: 4,
    r: 8,
    p: 1,
};

pub const USERNAME: &str = "alice";
pub const PASSWORD: &str = "secret1";

pub fn test_config() -> VaultConfig {
    VaultConfig::default().with_kdf(FAST_KDF)
}

pub fn test_topic() -> Topic {
    test_config().feed_topic().unwrap()
}

/// One device: a client over a shared feed store with its own cache.
pub struct Device {
    pub client: VaultClient,
    pub cache: Arc<MemoryCache>,
}

impl Device {
    pub fn new(store: &Arc<InMemoryFeedStore>, policy: DecisionPolicy) -> Self {
        Self::with_cache(store, Arc::new(MemoryCache::new()), policy)
    }

    pub fn with_cache(
        store: &Arc<InMemoryFeedStore>,
        cache: Arc<MemoryCache>,
        policy: DecisionPolicy,
    ) -> Self {
        let client = VaultClient::new(test_config(), store.clone(), cache.clone() as Arc<dyn LocalCache>)
            .expect("valid test config")
            .with_policy(policy);
        Self { client, cache }
    }

    pub async fn unlock(&self) -> Session {
        self.client
            .unlock(USERNAME, PASSWORD)
            .await
            .expect("Failed to unlock vault")
    }
}

/// A fresh store and a device that will create an empty vault on first login.
pub fn setup() -> (Arc<InMemoryFeedStore>, Device) {
    let store = Arc::new(InMemoryFeedStore::new());
    let device = Device::new(&store, DecisionPolicy::InitializeEmpty);
    (store, device)
}
