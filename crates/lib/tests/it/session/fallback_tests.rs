use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use feedvault::{
    feed::{DecisionPolicy, InMemoryFeedStore, Prompt, ReconcileReason},
    session::VaultOrigin,
    vault::LoginEntry,
};

use crate::helpers::{Device, USERNAME, setup};

/// A device with one saved login that is then cut off from the feed store.
async fn offline_device_with_cache() -> (Arc<InMemoryFeedStore>, Device) {
    let (store, device) = setup();
    let session = device.unlock().await;
    let _ = session
        .create_login(LoginEntry::new("email", "a@x.com", "p1"))
        .await
        .unwrap();
    session.close();
    store.set_offline(true);
    (store, device)
}

#[tokio::test]
async fn test_unreachable_uses_cache_when_preferred() {
    let (store, device) = offline_device_with_cache().await;
    let session = Device::with_cache(&store, device.cache.clone(), DecisionPolicy::PreferLocalCache)
        .unlock()
        .await;

    assert_eq!(session.origin(), VaultOrigin::LocalCache);
    assert_eq!(session.len(), 1);
}

#[tokio::test]
async fn test_declined_cache_aborts() {
    let (store, device) = offline_device_with_cache().await;
    for policy in [DecisionPolicy::Abort, DecisionPolicy::InitializeEmpty] {
        let err = Device::with_cache(&store, device.cache.clone(), policy)
            .client
            .unlock(USERNAME, crate::helpers::PASSWORD)
            .await
            .unwrap_err();
        assert!(err.is_aborted());
    }
}

#[tokio::test]
async fn test_unreachable_without_cache() {
    let store = Arc::new(InMemoryFeedStore::new());
    store.set_offline(true);

    let err = Device::new(&store, DecisionPolicy::Abort)
        .client
        .unlock(USERNAME, crate::helpers::PASSWORD)
        .await
        .unwrap_err();
    assert!(err.is_aborted());

    let session = Device::new(&store, DecisionPolicy::InitializeEmpty)
        .unlock()
        .await;
    assert_eq!(session.origin(), VaultOrigin::Empty);
}

#[tokio::test]
async fn test_ask_caller_receives_prompts() {
    let (store, device) = offline_device_with_cache().await;
    let prompts = Arc::new(Mutex::new(Vec::new()));
    let seen = prompts.clone();
    let policy = DecisionPolicy::ask(move |prompt| {
        seen.lock().unwrap().push(*prompt);
        false
    });

    let err = Device::with_cache(&store, device.cache.clone(), policy)
        .client
        .unlock(USERNAME, crate::helpers::PASSWORD)
        .await
        .unwrap_err();
    assert!(err.is_aborted());
    assert_eq!(
        *prompts.lock().unwrap(),
        [Prompt::UseLocalCache {
            reason: ReconcileReason::Unreachable
        }]
    );
}

#[tokio::test]
async fn test_remote_vault_skips_policy() {
    let (store, device) = setup();
    let session = device.unlock().await;
    let _ = session
        .create_login(LoginEntry::new("email", "a@x.com", "p1"))
        .await
        .unwrap();
    session.close();

    let asked = Arc::new(AtomicUsize::new(0));
    let counter = asked.clone();
    let policy = DecisionPolicy::ask(move |_| {
        counter.fetch_add(1, Ordering::SeqCst);
        false
    });
    let session = Device::new(&store, policy).unlock().await;
    assert_eq!(session.origin(), VaultOrigin::Remote);
    assert_eq!(asked.load(Ordering::SeqCst), 0);
}

#[tokio::test]
async fn test_offline_mutations_stay_local_then_sync() {
    let (store, device) = offline_device_with_cache().await;
    let session = Device::with_cache(&store, device.cache.clone(), DecisionPolicy::PreferLocalCache)
        .unlock()
        .await;

    let created = session
        .create_login(LoginEntry::new("bank", "alice", "p2"))
        .await
        .unwrap();
    assert_eq!(created.value, "1");
    assert!(created.persisted.unwrap_err().is_network_error());
    assert_eq!(session.len(), 2);

    store.set_offline(false);
    let created = session
        .create_login(LoginEntry::new("chat", "alice", "p3"))
        .await
        .unwrap();
    assert!(created.persisted.is_ok());

    let fresh = Device::new(&store, DecisionPolicy::Abort).unlock().await;
    assert_eq!(fresh.len(), 3);
    assert_eq!(fresh.next_id(), 3);
}
