//! In-memory `Store`, used for tests and for running without a data directory.

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use holdem_shared::EngineError;

use super::Store;

#[derive(Default)]
pub struct MemoryStore {
    data: Mutex<BTreeMap<String, Vec<u8>>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, EngineError> {
        let data = self
            .data
            .lock()
            .map_err(|_| EngineError::Internal("memory store lock poisoned".into()))?;
        Ok(data.get(key).cloned())
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), EngineError> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| EngineError::Internal("memory store lock poisoned".into()))?;
        data.insert(key.to_string(), value);
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), EngineError> {
        let mut data = self
            .data
            .lock()
            .map_err(|_| EngineError::Internal("memory store lock poisoned".into()))?;
        data.remove(key);
        Ok(())
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, EngineError> {
        let data = self
            .data
            .lock()
            .map_err(|_| EngineError::Internal("memory store lock poisoned".into()))?;
        Ok(data
            .range(prefix.to_string()..)
            .take_while(|(k, _)| k.starts_with(prefix))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect())
    }
}
