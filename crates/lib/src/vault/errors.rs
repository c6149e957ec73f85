//! Error types for the vault codec and store.

use thiserror::Error;

/// Errors that can occur while sealing, opening or editing the vault.
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum VaultError {
    /// Decryption failed its integrity check.
    ///
    /// Covers both a wrong key and tampered data; the two cases are not
    /// distinguished.
    #[error("Incorrect username or password")]
    AuthenticationFailure,

    /// Sealing the payload failed.
    #[error("Encryption failed: {reason}")]
    EncryptionFailed { reason: String },

    /// A payload or envelope is not valid JSON of the expected shape.
    #[error("Malformed vault data: {reason}")]
    Serialization { reason: String },

    /// A decoded payload violates the id invariant.
    #[error("Vault payload contains login id {id:?} which is not below the next id {next_id}")]
    InconsistentPayload { id: String, next_id: u64 },

    /// The id counter cannot advance any further.
    #[error("Login id space exhausted at {next_id}")]
    IdSpaceExhausted { next_id: u64 },

    /// No login with this id exists.
    #[error("Login not found: {id}")]
    LoginNotFound { id: String },
}

impl VaultError {
    /// Check if decryption failed its integrity check.
    pub fn is_authentication_failure(&self) -> bool {
        matches!(self, VaultError::AuthenticationFailure)
    }

    /// Check if this error indicates malformed or corrupted vault data.
    pub fn is_serialization_error(&self) -> bool {
        matches!(
            self,
            VaultError::Serialization { .. } | VaultError::InconsistentPayload { .. }
        )
    }

    /// Check if this error indicates a login was not found.
    pub fn is_not_found(&self) -> bool {
        matches!(self, VaultError::LoginNotFound { .. })
    }

    /// Check if no further login ids can be assigned.
    pub fn is_id_space_exhausted(&self) -> bool {
        matches!(self, VaultError::IdSpaceExhausted { .. })
    }

    /// Get the login id if this error is about a specific login.
    pub fn login_id(&self) -> Option<&str> {
        match self {
            VaultError::LoginNotFound { id } | VaultError::InconsistentPayload { id, .. } => {
                Some(id)
            }
            _ => None,
        }
    }
}

// Conversion from VaultError to the main Error type
impl From<VaultError> for crate::Error {
    fn from(err: VaultError) -> Self {
        crate::Error::Vault(err)
    }
}
