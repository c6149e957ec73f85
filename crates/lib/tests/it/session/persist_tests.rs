use std::time::Duration;

use feedvault::{
    feed::{DecisionPolicy, PersistOutcome},
    vault::LoginEntry,
};

use crate::helpers::{Device, setup};

#[tokio::test]
async fn test_mutations_during_persist_are_coalesced() {
    let (store, device) = setup();
    let session = device.unlock().await;
    store.set_latency(Some(Duration::from_millis(100)));

    let first = session.create_login(LoginEntry::new("one", "a", "p"));
    let later = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(session.is_persisting());
        let second = session
            .create_login(LoginEntry::new("two", "a", "p"))
            .await
            .unwrap();
        let third = session
            .create_login(LoginEntry::new("three", "a", "p"))
            .await
            .unwrap();
        (second, third)
    };
    let (first, (second, third)) = tokio::join!(first, later);
    let first = first.unwrap();

    // Every mutation is applied locally right away.
    assert_eq!(
        [first.value.as_str(), second.value.as_str(), third.value.as_str()],
        ["0", "1", "2"]
    );
    assert!(matches!(second.persisted, Ok(PersistOutcome::Coalesced)));
    assert!(matches!(third.persisted, Ok(PersistOutcome::Coalesced)));
    assert!(matches!(first.persisted, Ok(PersistOutcome::Posted { .. })));

    // One post for the first snapshot, one for the latest coalesced snapshot.
    assert_eq!(store.update_count(), 2);
    assert!(!session.is_persisting());

    store.set_latency(None);
    let reopened = Device::new(&store, DecisionPolicy::Abort).unlock().await;
    assert_eq!(reopened.len(), 3);
}

#[tokio::test]
async fn test_refresh_rejected_while_persisting() {
    let (store, device) = setup();
    let session = device.unlock().await;
    store.set_latency(Some(Duration::from_millis(100)));

    let persist = session.create_login(LoginEntry::new("one", "a", "p"));
    let refresh = async {
        tokio::time::sleep(Duration::from_millis(20)).await;
        session.refresh().await
    };
    let (persisted, refreshed) = tokio::join!(persist, refresh);

    assert!(persisted.unwrap().persisted.is_ok());
    assert!(refreshed.unwrap_err().is_concurrency_error());
}
