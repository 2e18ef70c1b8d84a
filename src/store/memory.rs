use anyhow::Result;
use async_trait::async_trait;
use dashmap::DashMap;

use super::SessionStore;

/// In-process session store backed by a concurrent map.
///
/// Suitable for tests and single-process deployments; sessions do not
/// survive a restart.
#[derive(Debug, Default)]
pub struct MemoryStore {
    records: DashMap<String, Vec<u8>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of persisted records.
    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    /// Whether a record exists for the id.
    pub fn contains(&self, id: &str) -> bool {
        self.records.contains_key(id)
    }
}

#[async_trait]
impl SessionStore for MemoryStore {
    async fn read(&self, id: &str) -> Result<Option<Vec<u8>>> {
        Ok(self.records.get(id).map(|record| record.clone()))
    }

    async fn write(&self, id: &str, bytes: &[u8]) -> Result<()> {
        self.records.insert(id.to_string(), bytes.to_vec());
        Ok(())
    }

    async fn destroy(&self, id: &str) -> Result<()> {
        self.records.remove(id);
        Ok(())
    }
}
