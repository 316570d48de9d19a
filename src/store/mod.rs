//! Key-value persistence: the `Store` trait plus its in-memory and on-disk
//! (`sled`) implementations.

mod memory;
mod sled_store;

pub use memory::MemoryStore;
pub use sled_store::SledStore;

use async_trait::async_trait;
use holdem_shared::EngineError;

/// Async key-value store used by the coordinator to persist `GameEngine`
/// and `LobbyRecord` snapshots keyed by `game:{code}` / `engine:{code}`.
/// Every method maps a backend timeout into `EngineError::Transient` after
/// one retry so callers can decide whether to surface or retry further up.
#[async_trait]
pub trait Store: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, EngineError>;
    async fn put(&self, key: &str, value: Vec<u8>) -> Result<(), EngineError>;
    async fn delete(&self, key: &str) -> Result<(), EngineError>;
    async fn scan_prefix(&self, prefix: &str) -> Result<Vec<(String, Vec<u8>)>, EngineError>;
}

pub(crate) const OP_TIMEOUT: std::time::Duration = std::time::Duration::from_secs(2);
