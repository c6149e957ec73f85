use feedvault::{
    crypto::derive_key,
    vault::{self, EncryptedEnvelope, LoginEntry, VaultStore},
};

use crate::helpers::FAST_KDF;

fn store_with_logins() -> VaultStore {
    let mut store = VaultStore::new();
    store.create(LoginEntry::new("email", "a@x.com", "p1")).unwrap();
    store.create(LoginEntry::new("bank", "alice", "p2")).unwrap();
    store.delete("0").unwrap();
    store
}

#[test]
fn test_store_survives_seal_and_open() {
    let key = derive_key("alice", "secret1", &FAST_KDF).unwrap();
    let store = store_with_logins();

    let envelope = vault::seal(&store.to_payload(), &key).unwrap();
    let reopened = VaultStore::from_payload(vault::open(&envelope, &key).unwrap()).unwrap();

    assert_eq!(reopened, store);
    assert_eq!(reopened.next_id(), 2);
    assert!(reopened.get("0").is_none());
}

#[test]
fn test_wrong_password_cannot_open() {
    let key = derive_key("alice", "secret1", &FAST_KDF).unwrap();
    let wrong = derive_key("alice", "wrong", &FAST_KDF).unwrap();

    let envelope = vault::seal(&store_with_logins().to_payload(), &key).unwrap();
    let err = vault::open(&envelope, &wrong).unwrap_err();
    assert!(err.is_authentication_failure());
    assert_eq!(err.to_string(), "Incorrect username or password");
}

#[test]
fn test_envelope_wire_format() {
    let key = derive_key("alice", "secret1", &FAST_KDF).unwrap();
    let envelope = vault::seal(&store_with_logins().to_payload(), &key).unwrap();

    let json: serde_json::Value = serde_json::from_str(&envelope.to_json().unwrap()).unwrap();
    let object = json.as_object().unwrap();
    assert_eq!(object.len(), 2);
    assert!(object["nonce"].is_string());
    assert!(object["info"].is_string());

    let parsed = EncryptedEnvelope::from_json(envelope.to_json().unwrap()).unwrap();
    assert_eq!(parsed, envelope);
}

#[test]
fn test_payload_wire_format() {
    let payload = store_with_logins().to_payload();
    let json: serde_json::Value =
        serde_json::from_slice(&vault::encode(&payload).unwrap()).unwrap();

    assert_eq!(json["nextLoginID"], 2);
    assert_eq!(json["logins"]["1"]["name"], "bank");
    assert_eq!(json["logins"]["1"]["username"], "alice");
    assert_eq!(json["logins"]["1"]["password"], "p2");
    assert!(json["logins"].get("0").is_none());
}
