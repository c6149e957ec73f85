use std::{sync::Arc, time::Duration};

use feedvault::{
    VaultClient,
    cache::{LocalCache, MemoryCache, cache_key},
    crypto::{derive_identity, derive_key},
    feed::{
        DecisionPolicy, FeedEpoch, FeedStore, FeedSync, FeedUpdate, HttpFeedStore,
        InMemoryFeedStore, PersistOutcome, build_digest, digest_hash,
    },
    session::VaultOrigin,
    vault::{self, LoginEntry, VaultStore},
};

use super::gateway::{spawn_gateway, spawn_unavailable_gateway};
use crate::helpers::{FAST_KDF, PASSWORD, USERNAME, test_config, test_topic};

async fn setup_http() -> (Arc<InMemoryFeedStore>, HttpFeedStore) {
    let backing = Arc::new(InMemoryFeedStore::new());
    let gateway = spawn_gateway(backing.clone()).await;
    let store = HttpFeedStore::new(&gateway, Duration::from_secs(5)).unwrap();
    (backing, store)
}

#[tokio::test]
async fn test_missing_content_is_not_found() {
    let (_backing, store) = setup_http().await;
    let identity = derive_identity(&derive_key(USERNAME, PASSWORD, &FAST_KDF).unwrap()).unwrap();

    let content = store
        .fetch_content(&identity.address(), &test_topic())
        .await
        .unwrap();
    assert!(content.is_none());
}

#[tokio::test]
async fn test_template_round_trip() {
    let (_backing, store) = setup_http().await;
    let identity = derive_identity(&derive_key(USERNAME, PASSWORD, &FAST_KDF).unwrap()).unwrap();

    let template = store
        .fetch_template(&identity.address(), &test_topic())
        .await
        .unwrap();
    assert!(
        template
            .ensure_describes(&test_topic(), &identity.address())
            .is_ok()
    );
    assert_eq!(template.epoch, FeedEpoch { level: 0, time: 1 });
}

#[tokio::test]
async fn test_feed_sync_over_http() {
    let (backing, store) = setup_http().await;
    let identity = derive_identity(&derive_key(USERNAME, PASSWORD, &FAST_KDF).unwrap()).unwrap();
    let sync = FeedSync::new(Arc::new(store), test_topic(), true);

    let body = br#"{"nonce":"AAAAAAAAAAAAAAAA","info":"AA=="}"#.to_vec();
    let outcome = sync.persist(&identity, body.clone()).await.unwrap();
    assert_eq!(
        outcome,
        PersistOutcome::Posted {
            epoch: FeedEpoch { level: 0, time: 1 }
        }
    );
    assert_eq!(backing.update_count(), 1);
    assert_eq!(backing.raw_body(&identity.address(), &test_topic()), Some(body));

    let fetched = sync.fetch_latest(&identity.address()).await.unwrap().unwrap();
    assert_eq!(fetched.nonce, vec![0u8; 12]);
    assert_eq!(fetched.ciphertext, vec![0u8]);
}

#[tokio::test]
async fn test_stale_epoch_maps_to_stale_error() {
    let (_backing, store) = setup_http().await;
    let identity = derive_identity(&derive_key(USERNAME, PASSWORD, &FAST_KDF).unwrap()).unwrap();
    let topic = test_topic();

    let post_at = |epoch: FeedEpoch| {
        let body = b"{}".to_vec();
        let digest = build_digest(0, &topic, &identity.address(), epoch, &body);
        FeedUpdate {
            topic,
            user: identity.address(),
            epoch,
            signature: identity.sign(&digest_hash(&digest)).unwrap(),
            body,
        }
    };

    let first = post_at(FeedEpoch { level: 0, time: 1 });
    store.post_update(&first).await.unwrap();

    let err = store.post_update(&first).await.unwrap_err();
    assert!(err.is_stale_epoch());
}

#[tokio::test]
async fn test_bad_signature_is_rejected() {
    let (_backing, store) = setup_http().await;
    let identity = derive_identity(&derive_key(USERNAME, PASSWORD, &FAST_KDF).unwrap()).unwrap();
    let other = derive_identity(&derive_key("mallory", PASSWORD, &FAST_KDF).unwrap()).unwrap();
    let topic = test_topic();
    let epoch = FeedEpoch { level: 0, time: 1 };
    let body = b"{}".to_vec();
    let digest = build_digest(0, &topic, &identity.address(), epoch, &body);

    let forged = FeedUpdate {
        topic,
        user: identity.address(),
        epoch,
        signature: other.sign(&digest_hash(&digest)).unwrap(),
        body,
    };
    let err = store.post_update(&forged).await.unwrap_err();
    assert!(!err.is_stale_epoch());
    assert!(!err.is_network_error());
    assert!(err.to_string().contains("401"));
}

#[tokio::test]
async fn test_session_over_http() {
    let backing = Arc::new(InMemoryFeedStore::new());
    let gateway = spawn_gateway(backing.clone()).await;
    let config = test_config().with_gateway_url(gateway);

    let client = VaultClient::with_http_store(config.clone(), Arc::new(MemoryCache::new()))
        .unwrap()
        .with_policy(DecisionPolicy::InitializeEmpty);
    let session = client.unlock(USERNAME, PASSWORD).await.unwrap();
    let created = session
        .create_login(LoginEntry::new("email", "a@x.com", "p1"))
        .await
        .unwrap();
    assert_eq!(created.value, "0");
    assert!(created.persisted.is_ok());
    session.close();

    let other_device =
        VaultClient::with_http_store(config, Arc::new(MemoryCache::new())).unwrap();
    let session = other_device.unlock(USERNAME, PASSWORD).await.unwrap();
    assert_eq!(
        session.logins(),
        vec![("0".to_string(), LoginEntry::new("email", "a@x.com", "p1"))]
    );
    assert_eq!(session.next_id(), 1);
}

/// A cache holding one sealed login for the test user.
async fn cache_with_login() -> Arc<MemoryCache> {
    let key = derive_key(USERNAME, PASSWORD, &FAST_KDF).unwrap();
    let mut store = VaultStore::new();
    store.create(LoginEntry::new("email", "a@x.com", "p1")).unwrap();
    let envelope = vault::seal(&store.to_payload(), &key).unwrap();

    let cache = Arc::new(MemoryCache::new());
    cache
        .set(&cache_key(USERNAME), envelope.to_json().unwrap())
        .await
        .unwrap();
    cache
}

#[tokio::test]
async fn test_server_error_is_network_error() {
    let gateway = spawn_unavailable_gateway().await;
    let store = HttpFeedStore::new(&gateway, Duration::from_secs(5)).unwrap();
    let identity = derive_identity(&derive_key(USERNAME, PASSWORD, &FAST_KDF).unwrap()).unwrap();

    let err = store
        .fetch_content(&identity.address(), &test_topic())
        .await
        .unwrap_err();
    assert!(err.is_network_error());
    assert!(err.to_string().contains("503"));

    let err = store
        .fetch_template(&identity.address(), &test_topic())
        .await
        .unwrap_err();
    assert!(err.is_network_error());
}

#[tokio::test]
async fn test_unavailable_gateway_falls_back_to_cache() {
    let gateway = spawn_unavailable_gateway().await;
    let config = test_config().with_gateway_url(gateway);

    let client = VaultClient::with_http_store(config, cache_with_login().await)
        .unwrap()
        .with_policy(DecisionPolicy::PreferLocalCache);
    let session = client.unlock(USERNAME, PASSWORD).await.unwrap();

    assert_eq!(session.origin(), VaultOrigin::LocalCache);
    assert_eq!(
        session.get_login("0"),
        Some(LoginEntry::new("email", "a@x.com", "p1"))
    );
}

#[tokio::test]
async fn test_unavailable_gateway_aborts_when_declined() {
    let gateway = spawn_unavailable_gateway().await;
    let config = test_config().with_gateway_url(gateway);

    let client = VaultClient::with_http_store(config, cache_with_login().await).unwrap();
    let err = client.unlock(USERNAME, PASSWORD).await.unwrap_err();
    assert!(err.is_aborted());
}

#[tokio::test]
async fn test_offline_store_behind_gateway_uses_cache() {
    let backing = Arc::new(InMemoryFeedStore::new());
    let gateway = spawn_gateway(backing.clone()).await;
    let config = test_config().with_gateway_url(gateway);
    let cache = Arc::new(MemoryCache::new());

    let client = VaultClient::with_http_store(config.clone(), cache.clone())
        .unwrap()
        .with_policy(DecisionPolicy::InitializeEmpty);
    let session = client.unlock(USERNAME, PASSWORD).await.unwrap();
    let _ = session
        .create_login(LoginEntry::new("email", "a@x.com", "p1"))
        .await
        .unwrap();
    session.close();

    backing.set_offline(true);
    let client = VaultClient::with_http_store(config, cache)
        .unwrap()
        .with_policy(DecisionPolicy::PreferLocalCache);
    let session = client.unlock(USERNAME, PASSWORD).await.unwrap();

    assert_eq!(session.origin(), VaultOrigin::LocalCache);
    assert_eq!(session.len(), 1);
}
