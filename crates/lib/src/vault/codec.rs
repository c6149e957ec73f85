//! Vault payload encoding and authenticated encryption.
//!
//! The payload is serialized as JSON and sealed with AES-256-GCM. Every call to
//! [`encrypt`] draws a fresh 96-bit nonce from the operating system's CSPRNG; no
//! nonce state is kept between calls or across restarts.

use aes_gcm::{Aes256Gcm, KeyInit, Nonce, aead::Aead};
use rand::{RngCore, rngs::OsRng};
use zeroize::Zeroizing;

use super::{
    errors::VaultError,
    types::{EncryptedEnvelope, VaultPayload},
};
use crate::{Result, crypto::SymmetricKey};

/// Nonce length for AES-GCM (12 bytes standard)
pub const NONCE_LENGTH: usize = 12;

/// Serialize a payload to its JSON wire format.
pub fn encode(payload: &VaultPayload) -> Result<Zeroizing<Vec<u8>>> {
    serde_json::to_vec(payload)
        .map(Zeroizing::new)
        .map_err(|e| {
            VaultError::Serialization {
                reason: e.to_string(),
            }
            .into()
        })
}

/// Parse and validate a JSON payload.
pub fn decode(bytes: &[u8]) -> Result<VaultPayload> {
    let payload: VaultPayload =
        serde_json::from_slice(bytes).map_err(|e| VaultError::Serialization {
            reason: format!("invalid vault payload: {e}"),
        })?;
    payload.validate()?;
    Ok(payload)
}

/// Encrypt plaintext under `key` with a freshly generated nonce.
pub fn encrypt(plaintext: &[u8], key: &SymmetricKey) -> Result<EncryptedEnvelope> {
    let cipher =
        Aes256Gcm::new_from_slice(key.as_bytes()).map_err(|e| VaultError::EncryptionFailed {
            reason: format!("Failed to create cipher: {e}"),
        })?;

    let mut nonce = [0u8; NONCE_LENGTH];
    OsRng.fill_bytes(&mut nonce);

    let ciphertext = cipher
        .encrypt(Nonce::from_slice(&nonce), plaintext)
        .map_err(|e| VaultError::EncryptionFailed {
            reason: format!("Encryption failed: {e}"),
        })?;

    Ok(EncryptedEnvelope {
        nonce: nonce.to_vec(),
        ciphertext,
    })
}

/// Decrypt and authenticate a ciphertext.
///
/// Any failure, including a malformed nonce, is reported as
/// [`VaultError::AuthenticationFailure`].
pub fn decrypt(nonce: &[u8], ciphertext: &[u8], key: &SymmetricKey) -> Result<Zeroizing<Vec<u8>>> {
    if nonce.len() != NONCE_LENGTH {
        return Err(VaultError::AuthenticationFailure.into());
    }

    let cipher = Aes256Gcm::new_from_slice(key.as_bytes())
        .map_err(|_| VaultError::AuthenticationFailure)?;

    cipher
        .decrypt(Nonce::from_slice(nonce), ciphertext)
        .map(Zeroizing::new)
        .map_err(|_| VaultError::AuthenticationFailure.into())
}

/// Encode and encrypt a payload.
pub fn seal(payload: &VaultPayload, key: &SymmetricKey) -> Result<EncryptedEnvelope> {
    let plaintext = encode(payload)?;
    encrypt(&plaintext, key)
}

/// Decrypt and decode an envelope.
pub fn open(envelope: &EncryptedEnvelope, key: &SymmetricKey) -> Result<VaultPayload> {
    let plaintext = decrypt(&envelope.nonce, &envelope.ciphertext, key)?;
    decode(&plaintext)
}
