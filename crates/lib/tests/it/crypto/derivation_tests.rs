use feedvault::crypto::{
    KdfParams, derive_identity, derive_key, keccak256, salt_for, validate_credentials,
};

use crate::helpers::FAST_KDF;

#[test]
fn test_default_parameters_are_deterministic() {
    let params = KdfParams::default();
    let first = derive_key("alice", "secret1", &params).unwrap();
    let second = derive_key("alice", "secret1", &params).unwrap();
    assert_eq!(first, second);

    let identity = derive_identity(&first).unwrap();
    assert_eq!(identity.address(), derive_identity(&second).unwrap().address());
}

#[test]
fn test_credentials_separate_keys_and_addresses() {
    let alice = derive_key("alice", "secret1", &FAST_KDF).unwrap();
    let wrong = derive_key("alice", "wrong", &FAST_KDF).unwrap();
    let bob = derive_key("bob", "secret1", &FAST_KDF).unwrap();
    assert_ne!(alice, wrong);
    assert_ne!(alice, bob);

    let addresses = [&alice, &wrong, &bob].map(|key| derive_identity(key).unwrap().address());
    assert_ne!(addresses[0], addresses[1]);
    assert_ne!(addresses[0], addresses[2]);
}

#[test]
fn test_cost_parameters_change_the_key() {
    let fast = derive_key("alice", "secret1", &FAST_KDF).unwrap();
    let slower = derive_key(
        "alice",
        "secret1",
        &KdfParams {
            log_n: 5,
            ..FAST_KDF
        },
    )
    .unwrap();
    assert_ne!(fast, slower);
}

#[test]
fn test_validation_happens_before_derivation() {
    // Invalid cost parameters would fail derivation; empty credentials must be
    // reported first.
    let broken = KdfParams {
        log_n: 0,
        r: 0,
        p: 0,
    };
    let err = derive_key("", "secret1", &broken).unwrap_err();
    assert!(err.is_validation_error());
    assert!(validate_credentials("alice", "").unwrap_err().is_validation_error());
    assert!(derive_key("alice", "secret1", &broken).is_err());
}

#[test]
fn test_salt_is_domain_separated() {
    assert_eq!(salt_for("alice"), "alice@password-manager");
}

#[test]
fn test_signature_recovers_owner() {
    let identity = derive_identity(&derive_key("alice", "secret1", &FAST_KDF).unwrap()).unwrap();
    let hash = keccak256(b"feed update digest");

    let signature = identity.sign(&hash).unwrap();
    assert!(signature.is_low_s());
    assert!(signature.as_bytes()[64] <= 1);
    assert_eq!(signature.recover_address(&hash).unwrap(), identity.address());

    let other = keccak256(b"another digest");
    assert_ne!(signature.recover_address(&other).ok(), Some(identity.address()));
}
