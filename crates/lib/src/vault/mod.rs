//! The vault payload, its codec and its in-memory store.
//!
//! - [`types`]: [`LoginEntry`], [`VaultPayload`] and the sealed [`EncryptedEnvelope`]
//! - [`codec`]: JSON encoding plus AES-256-GCM sealing under a fresh random nonce
//! - [`store`]: [`VaultStore`], CRUD over the entries with a never-reused id counter

pub mod codec;
pub mod errors;
pub mod store;
pub mod types;

pub use codec::{NONCE_LENGTH, decode, decrypt, encode, encrypt, open, seal};
pub use errors::VaultError;
pub use store::VaultStore;
pub use types::{EncryptedEnvelope, LoginEntry, VaultPayload};
