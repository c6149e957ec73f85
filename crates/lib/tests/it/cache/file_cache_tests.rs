use std::sync::Arc;

use feedvault::{
    VaultClient,
    cache::{FileCache, LocalCache, cache_key},
    feed::{DecisionPolicy, InMemoryFeedStore},
    session::VaultOrigin,
    vault::{EncryptedEnvelope, LoginEntry},
};

use crate::helpers::{PASSWORD, USERNAME, test_config};

fn client(store: &Arc<InMemoryFeedStore>, cache: FileCache, policy: DecisionPolicy) -> VaultClient {
    VaultClient::new(test_config(), store.clone(), Arc::new(cache))
        .unwrap()
        .with_policy(policy)
}

#[tokio::test]
async fn test_mutations_are_cached_as_envelopes() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let store = Arc::new(InMemoryFeedStore::new());

    let session = client(&store, FileCache::new(&path), DecisionPolicy::InitializeEmpty)
        .unlock(USERNAME, PASSWORD)
        .await
        .unwrap();
    let created = session
        .create_login(LoginEntry::new("email", "a@x.com", "p1"))
        .await
        .unwrap();
    assert!(created.persisted.is_ok());

    let cached = FileCache::new(&path)
        .get(&cache_key(USERNAME))
        .await
        .unwrap()
        .expect("cache entry");
    let envelope = EncryptedEnvelope::from_json(&cached).unwrap();
    let remote = store.raw_body(&session.address(), &test_config().feed_topic().unwrap());
    assert_eq!(remote, Some(cached.clone().into_bytes()));
    assert!(!cached.contains("a@x.com"));
    assert_eq!(envelope.nonce.len(), 12);
}

#[tokio::test]
async fn test_cache_file_restores_vault_when_offline() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("cache.json");
    let store = Arc::new(InMemoryFeedStore::new());

    let session = client(&store, FileCache::new(&path), DecisionPolicy::InitializeEmpty)
        .unlock(USERNAME, PASSWORD)
        .await
        .unwrap();
    let _ = session
        .create_login(LoginEntry::new("email", "a@x.com", "p1"))
        .await
        .unwrap();
    session.close();

    store.set_offline(true);
    let session = client(&store, FileCache::new(&path), DecisionPolicy::PreferLocalCache)
        .unlock(USERNAME, PASSWORD)
        .await
        .unwrap();
    assert_eq!(session.origin(), VaultOrigin::LocalCache);
    assert_eq!(
        session.get_login("0"),
        Some(LoginEntry::new("email", "a@x.com", "p1"))
    );
}
