//! Deterministic feed identity.
//!
//! The symmetric vault key is reinterpreted as a secp256k1 private scalar. The
//! resulting keypair signs feed updates, and the low 20 bytes of the Keccak-256
//! hash of its uncompressed public key form the feed [`Address`]. A vault's
//! network location and its encryption key therefore come from the same secret.

use std::{fmt, str::FromStr};

use k256::ecdsa::{RecoveryId, Signature, SigningKey, VerifyingKey};
use sha3::{Digest, Keccak256};

use super::{errors::CryptoError, kdf::SymmetricKey};
use crate::Result;

/// Size of a feed address in bytes
pub const ADDRESS_LENGTH: usize = 20;

/// Size of an encoded feed signature in bytes (r || s || recovery id)
pub const SIGNATURE_LENGTH: usize = 65;

/// Keccak-256 of `data`.
pub fn keccak256(data: &[u8]) -> [u8; 32] {
    Keccak256::digest(data).into()
}

/// 20-byte feed owner address.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Address([u8; ADDRESS_LENGTH]);

impl Address {
    /// Wrap raw address bytes.
    pub const fn from_bytes(bytes: [u8; ADDRESS_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw address bytes.
    pub fn as_bytes(&self) -> &[u8; ADDRESS_LENGTH] {
        &self.0
    }

    /// Lowercase hex with a `0x` prefix, as used on the wire.
    pub fn to_hex_prefixed(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }
}

impl fmt::Display for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex_prefixed())
    }
}

impl fmt::Debug for Address {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Address({})", self.to_hex_prefixed())
    }
}

impl FromStr for Address {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| CryptoError::InvalidAddress {
            reason: e.to_string(),
        })?;
        let bytes: [u8; ADDRESS_LENGTH] =
            bytes
                .try_into()
                .map_err(|v: Vec<u8>| CryptoError::InvalidAddress {
                    reason: format!("expected {ADDRESS_LENGTH} bytes, got {}", v.len()),
                })?;
        Ok(Self(bytes))
    }
}

/// Derive the feed address of a public key.
///
/// Hashes the uncompressed SEC1 encoding without its `0x04` prefix byte and keeps
/// the low 20 bytes.
pub fn derive_address(public_key: &VerifyingKey) -> Address {
    let encoded = public_key.to_encoded_point(false);
    let hash = keccak256(&encoded.as_bytes()[1..]);
    let mut address = [0u8; ADDRESS_LENGTH];
    address.copy_from_slice(&hash[32 - ADDRESS_LENGTH..]);
    Address(address)
}

/// Derive the signing identity from the vault key.
///
/// Fails with `InvalidKeyMaterial` if the key bytes are zero or not below the
/// curve order.
pub fn derive_identity(key: &SymmetricKey) -> Result<IdentityKeyPair> {
    let signing_key =
        SigningKey::from_slice(key.as_bytes()).map_err(|_| CryptoError::InvalidKeyMaterial)?;
    Ok(IdentityKeyPair::from_signing_key(signing_key))
}

/// secp256k1 keypair that owns a vault's feed.
///
/// The secret scalar is zeroed when the keypair is dropped.
pub struct IdentityKeyPair {
    signing_key: SigningKey,
    address: Address,
}

impl IdentityKeyPair {
    fn from_signing_key(signing_key: SigningKey) -> Self {
        let address = derive_address(signing_key.verifying_key());
        Self {
            signing_key,
            address,
        }
    }

    /// The public half of the keypair.
    pub fn public_key(&self) -> &VerifyingKey {
        self.signing_key.verifying_key()
    }

    /// The feed address owned by this identity.
    pub fn address(&self) -> Address {
        self.address
    }

    /// Sign a 32-byte digest hash.
    ///
    /// The signature is normalized to low-s, with the recovery id adjusted to
    /// match, so any verifier recovers the same public key.
    pub fn sign(&self, digest_hash: &[u8; 32]) -> Result<FeedSignature> {
        let (signature, recovery_id) = self
            .signing_key
            .sign_prehash_recoverable(digest_hash)
            .map_err(|e| CryptoError::SigningFailed {
                reason: e.to_string(),
            })?;

        let (signature, recovery_id) = match signature.normalize_s() {
            Some(normalized) => (
                normalized,
                RecoveryId::new(!recovery_id.is_y_odd(), recovery_id.is_x_reduced()),
            ),
            None => (signature, recovery_id),
        };

        let mut bytes = [0u8; SIGNATURE_LENGTH];
        bytes[..64].copy_from_slice(&signature.to_bytes());
        bytes[64] = recovery_id.to_byte();
        Ok(FeedSignature(bytes))
    }
}

impl fmt::Debug for IdentityKeyPair {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("IdentityKeyPair")
            .field("address", &self.address)
            .field("signing_key", &"[REDACTED]")
            .finish()
    }
}

/// 65-byte recoverable ECDSA signature: 32-byte r, 32-byte s, 1-byte recovery id.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct FeedSignature([u8; SIGNATURE_LENGTH]);

impl FeedSignature {
    /// Wrap raw signature bytes.
    pub const fn from_bytes(bytes: [u8; SIGNATURE_LENGTH]) -> Self {
        Self(bytes)
    }

    /// Borrow the raw signature bytes.
    pub fn as_bytes(&self) -> &[u8; SIGNATURE_LENGTH] {
        &self.0
    }

    /// Lowercase hex with a `0x` prefix, as used on the wire.
    pub fn to_hex_prefixed(&self) -> String {
        format!("0x{}", hex::encode(self.0))
    }

    /// Check whether s lies in the lower half of the curve order.
    pub fn is_low_s(&self) -> bool {
        Signature::from_slice(&self.0[..64])
            .map(|signature| signature.normalize_s().is_none())
            .unwrap_or(false)
    }

    /// Recover the address of the key that produced this signature over `digest_hash`.
    pub fn recover_address(&self, digest_hash: &[u8; 32]) -> Result<Address> {
        let signature =
            Signature::from_slice(&self.0[..64]).map_err(|e| CryptoError::InvalidSignature {
                reason: e.to_string(),
            })?;
        let recovery_id =
            RecoveryId::from_byte(self.0[64]).ok_or_else(|| CryptoError::InvalidSignature {
                reason: format!("invalid recovery id {}", self.0[64]),
            })?;
        let public_key = VerifyingKey::recover_from_prehash(digest_hash, &signature, recovery_id)
            .map_err(|e| CryptoError::InvalidSignature {
            reason: e.to_string(),
        })?;
        Ok(derive_address(&public_key))
    }
}

impl fmt::Debug for FeedSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "FeedSignature({})", self.to_hex_prefixed())
    }
}

impl FromStr for FeedSignature {
    type Err = crate::Error;

    fn from_str(s: &str) -> Result<Self> {
        let digits = s.strip_prefix("0x").unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| CryptoError::InvalidSignature {
            reason: e.to_string(),
        })?;
        let bytes: [u8; SIGNATURE_LENGTH] =
            bytes
                .try_into()
                .map_err(|v: Vec<u8>| CryptoError::InvalidSignature {
                    reason: format!("expected {SIGNATURE_LENGTH} bytes, got {}", v.len()),
                })?;
        Ok(Self(bytes))
    }
}
