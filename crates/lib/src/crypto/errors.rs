//! Error types for key and identity derivation.

use thiserror::Error;

/// Errors that can occur while deriving keys or producing signatures.
///
/// # Stability
///
/// - New variants may be added in minor versions (enum is `#[non_exhaustive]`)
/// - Helper methods like `is_*()` provide stable APIs
#[non_exhaustive]
#[derive(Debug, Error)]
pub enum CryptoError {
    /// The username was empty. Checked before any derivation work starts.
    #[error("Please enter a username")]
    EmptyUsername,

    /// The password was empty. Checked before any derivation work starts.
    #[error("Please enter a password")]
    EmptyPassword,

    /// The configured scrypt cost parameters are not usable.
    #[error("Invalid KDF parameters: {reason}")]
    InvalidKdfParams { reason: String },

    /// scrypt itself failed.
    #[error("Key derivation failed: {reason}")]
    KeyDerivationFailed { reason: String },

    /// The derived key does not map to a valid secp256k1 private scalar.
    #[error("Derived key is not a valid private key")]
    InvalidKeyMaterial,

    /// A newer derivation request was submitted before this one finished.
    #[error("Key derivation superseded by a newer request")]
    DerivationSuperseded,

    /// The background derivation task went away without reporting a result.
    #[error("Key derivation task failed: {reason}")]
    DerivationTaskFailed { reason: String },

    /// Signing the feed digest failed.
    #[error("Signing failed: {reason}")]
    SigningFailed { reason: String },

    /// A signature could not be parsed or did not recover to a public key.
    #[error("Invalid signature: {reason}")]
    InvalidSignature { reason: String },

    /// A hex-encoded address could not be parsed.
    #[error("Invalid address: {reason}")]
    InvalidAddress { reason: String },
}

impl CryptoError {
    /// Check if this error rejected user input.
    pub fn is_validation_error(&self) -> bool {
        matches!(
            self,
            CryptoError::EmptyUsername | CryptoError::EmptyPassword
        )
    }

    /// Check if the derived key could not be used as a private scalar.
    pub fn is_invalid_key_material(&self) -> bool {
        matches!(self, CryptoError::InvalidKeyMaterial)
    }

    /// Check if this derivation lost to a newer request.
    pub fn is_superseded(&self) -> bool {
        matches!(self, CryptoError::DerivationSuperseded)
    }

    /// Check if this error concerns a signature.
    pub fn is_signature_error(&self) -> bool {
        matches!(
            self,
            CryptoError::SigningFailed { .. } | CryptoError::InvalidSignature { .. }
        )
    }
}

// Conversion from CryptoError to the main Error type
impl From<CryptoError> for crate::Error {
    fn from(err: CryptoError) -> Self {
        crate::Error::Crypto(err)
    }
}
