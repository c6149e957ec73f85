//! In-memory login store.

use std::collections::BTreeMap;

use zeroize::{Zeroize, ZeroizeOnDrop};

use super::{
    errors::VaultError,
    types::{LoginEntry, VaultPayload},
};
use crate::Result;

/// Decrypted logins held for the duration of a session.
///
/// Ids are assigned from a counter that only ever grows, so a deleted id is never
/// handed out again. All entries are zeroed when the store is dropped.
#[derive(Clone, Default, PartialEq, Eq)]
pub struct VaultStore {
    logins: BTreeMap<String, LoginEntry>,
    next_login_id: u64,
}

impl VaultStore {
    /// Create an empty store.
    pub fn new() -> Self {
        Self::default()
    }

    /// Load a decoded payload.
    pub fn from_payload(mut payload: VaultPayload) -> Result<Self> {
        payload.validate()?;
        Ok(Self {
            logins: std::mem::take(&mut payload.logins),
            next_login_id: payload.next_login_id,
        })
    }

    /// Snapshot the store as a payload for sealing.
    pub fn to_payload(&self) -> VaultPayload {
        VaultPayload {
            logins: self.logins.clone(),
            next_login_id: self.next_login_id,
        }
    }

    /// Add a login and return its newly assigned id.
    ///
    /// Fails without touching the store once the counter reaches `u64::MAX`.
    pub fn create(&mut self, entry: LoginEntry) -> Result<String> {
        let next = self
            .next_login_id
            .checked_add(1)
            .ok_or(VaultError::IdSpaceExhausted {
                next_id: self.next_login_id,
            })?;
        let id = self.next_login_id.to_string();
        self.logins.insert(id.clone(), entry);
        self.next_login_id = next;
        Ok(id)
    }

    /// Replace a login in full.
    pub fn update(&mut self, id: &str, entry: LoginEntry) -> Result<()> {
        let slot = self
            .logins
            .get_mut(id)
            .ok_or_else(|| VaultError::LoginNotFound { id: id.to_string() })?;
        *slot = entry;
        Ok(())
    }

    /// Remove a login. The id counter is left untouched.
    pub fn delete(&mut self, id: &str) -> Result<LoginEntry> {
        self.logins
            .remove(id)
            .ok_or_else(|| VaultError::LoginNotFound { id: id.to_string() }.into())
    }

    /// Look up a login by id.
    pub fn get(&self, id: &str) -> Option<&LoginEntry> {
        self.logins.get(id)
    }

    /// All logins, ordered by numeric id.
    pub fn logins(&self) -> Vec<(&str, &LoginEntry)> {
        let mut logins: Vec<_> = self
            .logins
            .iter()
            .map(|(id, entry)| (id.as_str(), entry))
            .collect();
        logins.sort_by_key(|(id, _)| (id.len(), *id));
        logins
    }

    /// The id the next created login will receive.
    pub fn next_id(&self) -> u64 {
        self.next_login_id
    }

    pub fn len(&self) -> usize {
        self.logins.len()
    }

    pub fn is_empty(&self) -> bool {
        self.logins.is_empty()
    }
}

impl std::fmt::Debug for VaultStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("VaultStore")
            .field("logins", &self.logins.len())
            .field("next_login_id", &self.next_login_id)
            .finish()
    }
}

impl Zeroize for VaultStore {
    fn zeroize(&mut self) {
        for entry in self.logins.values_mut() {
            entry.zeroize();
        }
        self.logins.clear();
    }
}

impl Drop for VaultStore {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl ZeroizeOnDrop for VaultStore {}
