//! Feed update digest.
//!
//! The byte layout is a wire contract with the store's verifier:
//!
//! | offset | size | field                         |
//! |--------|------|-------------------------------|
//! | 0      | 1    | protocol version              |
//! | 1      | 7    | reserved, zero                |
//! | 8      | 32   | topic                         |
//! | 40     | 20   | owner address                 |
//! | 60     | 4    | epoch time, little-endian     |
//! | 64     | 1    | epoch level                   |
//! | 65     | n    | update body                   |
//!
//! The concatenation is hashed with Keccak-256 and the hash is what gets signed.

use super::types::{FeedEpoch, TOPIC_LENGTH, Topic};
use crate::crypto::{ADDRESS_LENGTH, Address, keccak256};

const RESERVED_LENGTH: usize = 7;

/// Length of the digest before the body.
pub const DIGEST_HEADER_LENGTH: usize = 1 + RESERVED_LENGTH + TOPIC_LENGTH + ADDRESS_LENGTH + 4 + 1;

/// Assemble the digest for a feed update.
pub fn build_digest(
    protocol_version: u8,
    topic: &Topic,
    address: &Address,
    epoch: FeedEpoch,
    payload: &[u8],
) -> Vec<u8> {
    let mut digest = Vec::with_capacity(DIGEST_HEADER_LENGTH + payload.len());
    digest.push(protocol_version);
    digest.extend_from_slice(&[0u8; RESERVED_LENGTH]);
    digest.extend_from_slice(topic.as_bytes());
    digest.extend_from_slice(address.as_bytes());
    digest.extend_from_slice(&epoch.time.to_le_bytes());
    digest.push(epoch.level);
    digest.extend_from_slice(payload);
    digest
}

/// Keccak-256 of an assembled digest.
pub fn digest_hash(digest: &[u8]) -> [u8; 32] {
    keccak256(digest)
}
