//! Feed synchronization.
//!
//! A vault lives in one mutable feed slot addressed by (owner [`Address`], [`Topic`]).
//! Reads fetch the latest content. Writes follow a fixed sequence that must not be
//! reordered, because the epoch is embedded in what gets signed:
//!
//! 1. fetch the feed template to learn the next [`FeedEpoch`] and protocol version
//! 2. build the fixed-layout digest ([`digest::build_digest`]) and hash it
//! 3. sign the hash with the vault's identity key
//! 4. post the update with the epoch and signature as query parameters
//!
//! There is no locking across devices. A write built on an epoch that another
//! writer has already used is rejected by the store as stale.
//!
//! [`Address`]: crate::crypto::Address

pub mod digest;
pub mod errors;
pub mod policy;
pub mod sync;
pub mod transports;
pub mod types;

pub use digest::{DIGEST_HEADER_LENGTH, build_digest, digest_hash};
pub use errors::FeedError;
pub use policy::{DecisionPolicy, Prompt, ReconcileReason};
pub use sync::{FeedSync, PersistOutcome};
pub use transports::{FeedStore, http::HttpFeedStore, memory::InMemoryFeedStore};
pub use types::{FeedEpoch, FeedRef, FeedTemplate, FeedUpdate, TOPIC_LENGTH, Topic};
