//! Vault data model and wire formats.

use std::collections::BTreeMap;

use base64ct::{Base64, Encoding};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use zeroize::{Zeroize, ZeroizeOnDrop};

use super::errors::VaultError;
use crate::Result;

/// One stored login.
///
/// Opaque to the crypto layer. The password is redacted from `Debug` output.
#[derive(Clone, Default, PartialEq, Eq, Serialize, Deserialize, Zeroize)]
pub struct LoginEntry {
    pub name: String,
    pub username: String,
    pub password: String,
}

impl LoginEntry {
    pub fn new(
        name: impl Into<String>,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            username: username.into(),
            password: password.into(),
        }
    }
}

impl std::fmt::Debug for LoginEntry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LoginEntry")
            .field("name", &self.name)
            .field("username", &self.username)
            .field("password", &"[REDACTED]")
            .finish()
    }
}

/// The plaintext vault, exactly as it is encrypted.
///
/// Wire format: `{"logins": {"<id>": {...}}, "nextLoginID": n}`.
///
/// Every key in `logins` is a decimal id strictly below `next_login_id`; ids are
/// never reused.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultPayload {
    pub logins: BTreeMap<String, LoginEntry>,
    #[serde(rename = "nextLoginID")]
    pub next_login_id: u64,
}

impl VaultPayload {
    /// Check the id invariant.
    pub fn validate(&self) -> Result<()> {
        for id in self.logins.keys() {
            let in_range = is_canonical_decimal(id)
                && id
                    .parse::<u64>()
                    .is_ok_and(|value| value < self.next_login_id);
            if !in_range {
                return Err(VaultError::InconsistentPayload {
                    id: id.clone(),
                    next_id: self.next_login_id,
                }
                .into());
            }
        }
        Ok(())
    }
}

impl Zeroize for VaultPayload {
    fn zeroize(&mut self) {
        for entry in self.logins.values_mut() {
            entry.zeroize();
        }
        self.logins.clear();
        self.next_login_id = 0;
    }
}

impl Drop for VaultPayload {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for VaultPayload {}

/// Decimal digits without sign or leading zeros ("0" itself is allowed).
fn is_canonical_decimal(id: &str) -> bool {
    !id.is_empty()
        && id.bytes().all(|b| b.is_ascii_digit())
        && (id == "0" || !id.starts_with('0'))
}

/// One sealed vault snapshot.
///
/// Wire format: `{"nonce": "<base64>", "info": "<base64>"}`. This same JSON is the
/// feed update body and the local cache value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EncryptedEnvelope {
    #[serde(with = "base64_bytes")]
    pub nonce: Vec<u8>,
    #[serde(rename = "info", with = "base64_bytes")]
    pub ciphertext: Vec<u8>,
}

impl EncryptedEnvelope {
    /// Encode as the JSON wire format.
    pub fn to_json(&self) -> Result<String> {
        serde_json::to_string(self).map_err(|e| {
            VaultError::Serialization {
                reason: e.to_string(),
            }
            .into()
        })
    }

    /// Parse the JSON wire format.
    pub fn from_json(json: impl AsRef<[u8]>) -> Result<Self> {
        serde_json::from_slice(json.as_ref()).map_err(|e| {
            VaultError::Serialization {
                reason: format!("invalid envelope: {e}"),
            }
            .into()
        })
    }
}

/// Standard padded base64 for byte fields.
mod base64_bytes {
    use super::*;

    pub fn serialize<S: Serializer>(
        bytes: &[u8],
        serializer: S,
    ) -> std::result::Result<S::Ok, S::Error> {
        serializer.serialize_str(&Base64::encode_string(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> std::result::Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        Base64::decode_vec(&encoded).map_err(serde::de::Error::custom)
    }
}
