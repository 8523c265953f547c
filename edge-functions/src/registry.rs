use chrono::{DateTime, Utc};
use lru::LruCache;
use std::num::NonZeroUsize;
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("connection id must not be empty")]
    InvalidId,
    #[error("connection registry unavailable")]
    Unavailable,
}

pub trait ConnectionRegistry: Send + Sync {
    /// Record `connection_id` as connected. Registering an id twice refreshes it.
    fn register(&self, connection_id: &str) -> Result<(), RegistryError>;

    /// Forget `connection_id`, returning when it was registered if it was present.
    fn unregister(&self, connection_id: &str) -> Result<Option<DateTime<Utc>>, RegistryError>;

    fn contains(&self, connection_id: &str) -> bool;

    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Keeps the most recently connected ids, evicting the oldest beyond capacity.
pub struct InMemoryRegistry {
    connections: Mutex<LruCache<String, DateTime<Utc>>>,
}

impl InMemoryRegistry {
    pub fn new(capacity: NonZeroUsize) -> Self {
        Self {
            connections: Mutex::new(LruCache::new(capacity)),
        }
    }

    fn lock(&self) -> Result<MutexGuard<'_, LruCache<String, DateTime<Utc>>>, RegistryError> {
        self.connections.lock().map_err(|_| RegistryError::Unavailable)
    }
}

impl ConnectionRegistry for InMemoryRegistry {
    fn register(&self, connection_id: &str) -> Result<(), RegistryError> {
        if connection_id.is_empty() {
            return Err(RegistryError::InvalidId);
        }
        self.lock()?.put(connection_id.to_owned(), Utc::now());
        Ok(())
    }

    fn unregister(&self, connection_id: &str) -> Result<Option<DateTime<Utc>>, RegistryError> {
        Ok(self.lock()?.pop(connection_id))
    }

    fn contains(&self, connection_id: &str) -> bool {
        self.lock()
            .map(|cache| cache.contains(connection_id))
            .unwrap_or(false)
    }

    fn len(&self) -> usize {
        self.lock().map(|cache| cache.len()).unwrap_or(0)
    }
}
