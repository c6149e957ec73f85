//! JSON file cache.
//!
//! All keys live in one JSON object. The file is read on first access and rewritten
//! in full on every `set`, through a sibling temporary file and a rename so that a
//! crash mid-write leaves the previous contents intact.

use std::{
    collections::BTreeMap,
    path::{Path, PathBuf},
};

use async_trait::async_trait;
use tokio::sync::Mutex;
use tracing::debug;

use super::{LocalCache, errors::CacheError};
use crate::Result;

/// Cache backed by a single JSON file.
#[derive(Debug)]
pub struct FileCache {
    path: PathBuf,
    values: Mutex<Option<BTreeMap<String, String>>>,
}

impl FileCache {
    /// Use the file at `path`. Nothing is read until the first access.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            values: Mutex::new(None),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<BTreeMap<String, String>> {
        match tokio::fs::read_to_string(&self.path).await {
            Ok(json) => serde_json::from_str(&json).map_err(|e| {
                CacheError::Corrupt {
                    path: self.path.clone(),
                    reason: e.to_string(),
                }
                .into()
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(BTreeMap::new()),
            Err(e) => Err(self.io_error(e).into()),
        }
    }

    async fn store(&self, values: &BTreeMap<String, String>) -> Result<()> {
        let json = serde_json::to_string_pretty(values)?;
        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| self.io_error(e))?;
        }
        tokio::fs::write(&tmp, json)
            .await
            .map_err(|e| self.io_error(e))?;
        tokio::fs::rename(&tmp, &self.path)
            .await
            .map_err(|e| self.io_error(e))?;
        debug!(path = %self.path.display(), keys = values.len(), "Wrote cache file");
        Ok(())
    }

    fn io_error(&self, source: std::io::Error) -> CacheError {
        CacheError::Io {
            path: self.path.clone(),
            source,
        }
    }
}

#[async_trait]
impl LocalCache for FileCache {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        let mut values = self.values.lock().await;
        if values.is_none() {
            *values = Some(self.load().await?);
        }
        Ok(values.as_ref().and_then(|v| v.get(key).cloned()))
    }

    async fn set(&self, key: &str, value: String) -> Result<()> {
        let mut values = self.values.lock().await;
        let mut updated = match values.take() {
            Some(loaded) => loaded,
            None => self.load().await?,
        };
        updated.insert(key.to_string(), value);
        let result = self.store(&updated).await;
        *values = Some(updated);
        result
    }
}
