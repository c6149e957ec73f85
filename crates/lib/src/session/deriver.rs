//! Background key derivation.
//!
//! scrypt takes on the order of a second with the default parameters, so it runs on
//! tokio's blocking pool and its result comes back over a oneshot channel. Every
//! request takes a new generation number; when a newer request has been submitted
//! by the time a result arrives, that result is discarded.

use std::sync::{
    Arc,
    atomic::{AtomicU64, Ordering},
};

use tokio::sync::oneshot;
use tracing::{debug, info};
use zeroize::Zeroizing;

use crate::{
    Result,
    crypto::{CryptoError, KdfParams, SymmetricKey, derive_key, validate_credentials},
};

/// Runs key derivations off the async executor.
#[derive(Debug, Clone, Default)]
pub struct KeyDeriver {
    generation: Arc<AtomicU64>,
}

impl KeyDeriver {
    pub fn new() -> Self {
        Self::default()
    }

    /// Derive the vault key for a set of credentials.
    ///
    /// Empty credentials are rejected before any work is scheduled.
    ///
    /// # Errors
    /// [`CryptoError::DerivationSuperseded`] if [`derive`](Self::derive) or
    /// [`cancel`](Self::cancel) was called again before this derivation finished.
    pub async fn derive(
        &self,
        username: &str,
        password: &str,
        params: KdfParams,
    ) -> Result<SymmetricKey> {
        validate_credentials(username, password)?;
        let generation = self.generation.fetch_add(1, Ordering::SeqCst) + 1;
        debug!(generation, "Starting key derivation");

        let (tx, rx) = oneshot::channel();
        let username = username.to_string();
        let password = Zeroizing::new(password.to_string());
        tokio::task::spawn_blocking(move || {
            let _ = tx.send(derive_key(&username, &password, &params));
        });

        let key = rx.await.map_err(|_| CryptoError::DerivationTaskFailed {
            reason: "derivation task ended without a result".to_string(),
        })??;

        if self.generation.load(Ordering::SeqCst) != generation {
            debug!(generation, "Discarding superseded key derivation");
            return Err(CryptoError::DerivationSuperseded.into());
        }
        info!("Key derivation finished");
        Ok(key)
    }

    /// Supersede any derivation currently in flight.
    pub fn cancel(&self) {
        self.generation.fetch_add(1, Ordering::SeqCst);
    }
}
