//! Persistence collaborators: the session store and id generation.
//!
//! The core never touches storage directly; everything goes through
//! [`SessionStore`]. Consistency across requests sharing one id is whatever
//! the store provides (typically last-write-wins) — the core assumes at most
//! one active mutator per identifier and adds no locking of its own.

mod file;
mod id;
mod memory;


pub use file::FileStore;
pub use id::{IdGenerator, RandomIdGenerator, UuidIdGenerator};
pub use memory::MemoryStore;

use anyhow::Result;
use async_trait::async_trait;

/// External key/value storage for persisted session bytes.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the persisted bytes for a session id.
    ///
    /// An id that was never written yields `Ok(None)`.
    async fn read(&self, id: &str) -> Result<Option<Vec<u8>>>;

    /// Persist the bytes for a session id, replacing any previous record.
    async fn write(&self, id: &str, bytes: &[u8]) -> Result<()>;

    /// Erase the persisted record. Destroying a missing record is a no-op.
    async fn destroy(&self, id: &str) -> Result<()>;
}
