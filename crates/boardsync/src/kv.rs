//! The key-value capability behind which mirror state persists.
//!
//! The workflow platform hosting the mirror provides durable storage; this
//! trait is the narrow seam the mirror needs. [`MemoryStore`] backs tests
//! and single-process runs.

use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};
use thiserror::Error;

#[derive(Debug, Error)]
#[error("key-value store error: {0}")]
pub struct KvError(pub String);

#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError>;
    async fn set(&self, key: &str, value: &str) -> Result<(), KvError>;
}

#[async_trait]
impl<T: KvStore + ?Sized> KvStore for Arc<T> {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        (**self).get(key).await
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        (**self).set(key, value).await
    }
}

/// In-process store; state dies with the process.
#[derive(Debug, Default)]
pub struct MemoryStore {
    values: Mutex<BTreeMap<String, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<String>, KvError> {
        let values = self.values.lock().map_err(|e| KvError(e.to_string()))?;
        Ok(values.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<(), KvError> {
        let mut values = self.values.lock().map_err(|e| KvError(e.to_string()))?;
        values.insert(key.to_string(), value.to_string());
        Ok(())
    }
}
