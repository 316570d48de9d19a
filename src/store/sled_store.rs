//! `sled`-backed `Store`. `sled` itself is synchronous, so every call is run
//! on `spawn_blocking` and bounded by `OP_TIMEOUT` with a single retry.

use async_trait::async_trait;
use holdem_shared::EngineError;

use super::{Store, OP_TIMEOUT};

pub struct SledStore {
    db: sled::Db,
}

impl SledStore {
    pub fn open(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let db = sled::open(path)?;
        Ok(SledStore { db })
    }
}

async fn with_retry<T, F>(f: F) -> Result<T, EngineError>
where
    F: Fn() -> sled::Result<T> + Clone + Send + 'static,
    T: Send + 'static,
{
    for attempt in 0..2 {
        let op = f.clone();
        match tokio::time::timeout(OP_TIMEOUT, tokio::task::spawn_blocking(op)).await {
            Ok(Ok(Ok(value))) => return Ok(value),
            Ok(Ok(Err(e))) => return Err(EngineError::Internal(format!("sled error: {e}"))),
            Ok(Err(_)) => return Err(EngineError::Internal("sled task panicked".into())),
            Err(_) if attempt == 0 => {
                tracing::warn!("sled operation timed out, retrying once");
                continue;
            }
            Err(_) => return Err(EngineError::Transient("sled operation timed out".into())),
        }
    }
    unreachable!()
}

#[async_trait]
impl Store for SledStore {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, EngineError> {
        let db = self.db.clone();
        let key = key.to_string();
        with_retry(move || db.get(&key).map(|v| v.map(|ivec| ivec.to_vec()))).await
    }

    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), EngineError> {
        let db = self.db.clone();
        let key = key.to_string();
        with_retry(move || db.insert(&key, value.clone()).map(|_| ())).await
    }

    async fn delete(&self, key: &str) -> Result<(), EngineError> {
        let db = self.db.clone();
        let key = key.to_string();
        with_retry(move || db.remove(&key).map(|_| ())).await
    }

    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, EngineError> {
        let db = self.db.clone();
        let prefix = prefix.to_string();
        with_retry(move || {
            db.scan_prefix(prefix.as_bytes())
                .map(|entry| {
                    entry.map(|(k, v)| (String::from_utf8_lossy(&k).into_owned(), v.to_vec()))
                })
                .collect::<sled::Result<Vec<_>>>()
        })
        .await
    }
}
