//! Local cache of sealed vault snapshots.
//!
//! Every mutation writes the sealed envelope to the cache before it is posted, so
//! the last local state survives an unreachable feed store. The cache holds one
//! opaque JSON blob per username under [`cache_key`]; it never sees plaintext.

use async_trait::async_trait;

use crate::{Result, constants::CACHE_KEY_PREFIX};

mod errors;
pub mod file;
pub mod memory;

pub use errors::CacheError;
pub use file::FileCache;
pub use memory::MemoryCache;

/// A plain string key-value store.
#[async_trait]
pub trait LocalCache: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<String>>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: String) -> Result<()>;
}

/// Cache key holding a user's last sealed envelope.
pub fn cache_key(username: &str) -> String {
    format!("{CACHE_KEY_PREFIX}{username}")
}
