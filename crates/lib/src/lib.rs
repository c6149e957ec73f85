//!
//! feedvault: a client-held encrypted credential vault that synchronizes across
//! devices through a signed, mutable feed slot on a remote store.
//!
//! ## Core Concepts
//!
//! * **Credentials → key (`crypto::kdf`)**: a username and password are stretched with
//!   scrypt into a symmetric key. The salt is derived from the username, so the same
//!   credentials produce the same key on every device.
//! * **Key → identity (`crypto::identity`)**: the symmetric key doubles as a secp256k1
//!   private scalar. The Keccak-256 hash of the public key yields the 20-byte
//!   [`crypto::Address`] under which the vault's feed lives.
//! * **Vault payload (`vault`)**: the login entries plus a monotonic id counter,
//!   serialized as JSON and sealed with AES-256-GCM under a fresh random nonce.
//! * **Feed sync (`feed`)**: every write fetches the feed's current epoch, hashes a
//!   fixed-layout digest, signs it and posts the sealed envelope. The remote store
//!   rejects writes built on a stale epoch.
//! * **Session (`session`)**: the explicit context that holds the key material, the
//!   decrypted vault and the injected collaborators for the lifetime of one login.

pub mod cache;
pub mod config;
pub mod constants;
pub mod crypto;
pub mod feed;
pub mod session;
pub mod vault;

pub use config::VaultConfig;
pub use session::{Session, VaultClient};

/// Result type used throughout the feedvault library.
pub type Result<T> = std::result::Result<T, Error>;

/// Common error type for the feedvault library.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Structured errors from key and identity derivation
    #[error(transparent)]
    Crypto(crypto::CryptoError),

    /// Structured errors from the vault codec and store
    #[error(transparent)]
    Vault(vault::VaultError),

    /// Structured errors from the feed protocol and its transports
    #[error(transparent)]
    Feed(feed::FeedError),

    /// Structured errors from the local cache
    #[error(transparent)]
    Cache(cache::CacheError),

    /// Structured errors from session management
    #[error(transparent)]
    Session(session::SessionError),
}

impl Error {
    /// Get the originating module for this error.
    pub fn module(&self) -> &'static str {
        match self {
            Error::Crypto(_) => "crypto",
            Error::Vault(_) => "vault",
            Error::Feed(_) => "feed",
            Error::Cache(_) => "cache",
            Error::Session(_) => "session",
            Error::Io(_) => "io",
            Error::Serialize(_) => "serialize",
        }
    }

    /// Check if this error rejected user input before any expensive work.
    pub fn is_validation_error(&self) -> bool {
        match self {
            Error::Crypto(crypto_err) => crypto_err.is_validation_error(),
            _ => false,
        }
    }

    /// Check if the derived key could not be used as a private scalar.
    pub fn is_invalid_key_material(&self) -> bool {
        match self {
            Error::Crypto(crypto_err) => crypto_err.is_invalid_key_material(),
            _ => false,
        }
    }

    /// Check if decryption failed its integrity check.
    ///
    /// Wrong credentials and tampered data are deliberately indistinguishable.
    pub fn is_authentication_failure(&self) -> bool {
        match self {
            Error::Vault(vault_err) => vault_err.is_authentication_failure(),
            _ => false,
        }
    }

    /// Check if this error is a transport failure talking to the feed store.
    pub fn is_network_error(&self) -> bool {
        match self {
            Error::Feed(feed_err) => feed_err.is_network_error(),
            _ => false,
        }
    }

    /// Check if the feed store rejected a write built on an outdated epoch.
    pub fn is_stale_epoch(&self) -> bool {
        match self {
            Error::Feed(feed_err) => feed_err.is_stale_epoch(),
            _ => false,
        }
    }

    /// Check if this error indicates malformed data where well-formed data was expected.
    pub fn is_serialization_error(&self) -> bool {
        match self {
            Error::Serialize(_) => true,
            Error::Vault(vault_err) => vault_err.is_serialization_error(),
            Error::Feed(feed_err) => feed_err.is_malformed_response(),
            Error::Cache(cache_err) => cache_err.is_corrupt(),
            _ => false,
        }
    }

    /// Check if this error indicates a resource was not found.
    pub fn is_not_found(&self) -> bool {
        match self {
            Error::Vault(vault_err) => vault_err.is_not_found(),
            _ => false,
        }
    }

    /// Check if this error is caused by a request overlapping one already in flight.
    pub fn is_concurrency_error(&self) -> bool {
        match self {
            Error::Crypto(crypto_err) => crypto_err.is_superseded(),
            Error::Feed(feed_err) => feed_err.is_in_flight(),
            _ => false,
        }
    }

    /// Check if the login flow was abandoned by a negative decision.
    pub fn is_aborted(&self) -> bool {
        match self {
            Error::Session(session_err) => session_err.is_aborted(),
            _ => false,
        }
    }

    /// Check if this error is I/O related.
    pub fn is_io_error(&self) -> bool {
        match self {
            Error::Io(_) => true,
            Error::Cache(cache_err) => cache_err.is_io_error(),
            _ => false,
        }
    }
}
