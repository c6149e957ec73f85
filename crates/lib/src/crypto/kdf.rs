//! Credential stretching.
//!
//! Derives the vault's symmetric key from a username and password with scrypt.
//! The salt is `username` followed by [`SALT_SUFFIX`], so the derivation is a pure
//! function of the credentials and needs no stored state on any device.
//!
//! Derivation is deliberately slow. Callers on a latency-sensitive path should use
//! [`crate::session::KeyDeriver`], which runs it on the blocking pool.

use scrypt::{Params, scrypt};
use serde::{Deserialize, Serialize};
use tracing::debug;
use zeroize::Zeroizing;

use super::errors::CryptoError;
use crate::{Result, constants::SALT_SUFFIX};

/// Length of the derived symmetric key in bytes
pub const KEY_LENGTH: usize = 32;

/// scrypt cost parameters.
///
/// The defaults (N = 2^11, r = 8, p = 1) are part of the vault format: a vault
/// written with one set of parameters can only be opened with the same set.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct KdfParams {
    /// log2 of the work factor N
    pub log_n: u8,
    /// Block size
    pub r: u32,
    /// Parallelism
    pub p: u32,
}

impl Default for KdfParams {
    fn default() -> Self {
        Self {
            log_n: 11,
            r: 8,
            p: 1,
        }
    }
}

impl KdfParams {
    pub(crate) fn to_params(self) -> Result<Params> {
        Params::new(self.log_n, self.r, self.p, KEY_LENGTH).map_err(|e| {
            CryptoError::InvalidKdfParams {
                reason: e.to_string(),
            }
            .into()
        })
    }
}

/// Symmetric vault key.
///
/// Lives only in memory for the duration of a session and is zeroed on drop.
pub struct SymmetricKey(Zeroizing<[u8; KEY_LENGTH]>);

impl SymmetricKey {
    /// Wrap raw key bytes.
    pub fn from_bytes(bytes: [u8; KEY_LENGTH]) -> Self {
        Self(Zeroizing::new(bytes))
    }

    /// Borrow the raw key bytes.
    pub fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.0
    }
}

impl std::fmt::Debug for SymmetricKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("SymmetricKey([REDACTED])")
    }
}

impl PartialEq for SymmetricKey {
    fn eq(&self, other: &Self) -> bool {
        self.0
            .iter()
            .zip(other.0.iter())
            .fold(0u8, |acc, (a, b)| acc | (a ^ b))
            == 0
    }
}

impl Eq for SymmetricKey {}

/// Reject empty credentials.
pub fn validate_credentials(username: &str, password: &str) -> Result<()> {
    if username.is_empty() {
        return Err(CryptoError::EmptyUsername.into());
    }
    if password.is_empty() {
        return Err(CryptoError::EmptyPassword.into());
    }
    Ok(())
}

/// The KDF salt for a username.
pub fn salt_for(username: &str) -> String {
    format!("{username}{SALT_SUFFIX}")
}

/// Derive the vault key from credentials.
///
/// # Arguments
/// * `username` - Used only to build the salt
/// * `password` - The secret input to scrypt
/// * `params` - scrypt cost parameters
///
/// # Returns
/// The 32-byte symmetric key, or `EmptyUsername`/`EmptyPassword` before any
/// work is done if either input is empty.
pub fn derive_key(username: &str, password: &str, params: &KdfParams) -> Result<SymmetricKey> {
    validate_credentials(username, password)?;
    let scrypt_params = params.to_params()?;

    debug!(log_n = params.log_n, r = params.r, p = params.p, "Deriving vault key");

    let mut key = Zeroizing::new([0u8; KEY_LENGTH]);
    scrypt(
        password.as_bytes(),
        salt_for(username).as_bytes(),
        &scrypt_params,
        &mut key[..],
    )
    .map_err(|e| CryptoError::KeyDerivationFailed {
        reason: e.to_string(),
    })?;

    Ok(SymmetricKey(key))
}
