use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};

use async_trait::async_trait;

use crate::error::{Result, StoreError};

/// Origin-scoped key-value persistence surface.
///
/// The decision cache reads each key once at startup and writes it back
/// on every new decision. Implementations only need string get/set;
/// value shape (a JSON array of ids) is the cache's concern.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Result<Option<String>>;

    async fn set(&self, key: &str, value: &str) -> Result<()>;
}

/// In-memory store for tests and sessions without durable storage.
#[derive(Debug, Default)]
pub struct MemoryKv {
    entries: Mutex<HashMap<String, String>>,
}

impl MemoryKv {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

fn lock_entries<T>(mutex: &Mutex<T>) -> Result<std::sync::MutexGuard<'_, T>> {
    mutex.lock().map_err(|e: PoisonError<_>| StoreError::Poisoned(e.to_string()))
}

#[async_trait]
impl KvStore for MemoryKv {
    async fn get(&self, key: &str) -> Result<Option<String>> {
        Ok(lock_entries(&self.entries)?.get(key).cloned())
    }

    async fn set(&self, key: &str, value: &str) -> Result<()> {
        lock_entries(&self.entries)?.insert(key.to_owned(), value.to_owned());
        Ok(())
    }
}
