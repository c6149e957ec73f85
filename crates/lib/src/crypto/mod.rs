//! Key and identity derivation.
//!
//! Everything a session needs is derived from the user's credentials alone:
//!
//! - [`kdf`]: username + password → [`SymmetricKey`] (scrypt, username-derived salt)
//! - [`identity`]: [`SymmetricKey`] → secp256k1 [`IdentityKeyPair`] → [`Address`]
//!
//! No salt, key or identity is ever persisted, so opening a vault on a new device
//! requires nothing but the original credentials.

pub mod errors;
pub mod identity;
pub mod kdf;

pub use errors::CryptoError;
pub use identity::{
    ADDRESS_LENGTH, Address, FeedSignature, IdentityKeyPair, SIGNATURE_LENGTH, derive_address,
    derive_identity, keccak256,
};
pub use kdf::{KEY_LENGTH, KdfParams, SymmetricKey, derive_key, salt_for, validate_credentials};
