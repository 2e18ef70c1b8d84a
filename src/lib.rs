//! # session-kit
//!
//! Server-side HTTP session handling with pluggable storage, a compact
//! text codec for session records, and at-most-once flash messages.
//!
//! ## Architecture Overview
//!
//! The crate is organized into a handful of focused modules:
//!
//! - **[`session`]**: The session record and its lifecycle state machine
//! - **[`codec`]**: Encoding and decoding of session records as `key|value` text
//! - **[`flash`]**: Flash messages delivered on the next request, then gone
//! - **[`store`]**: The [`SessionStore`] trait plus in-memory and file backends
//! - **[`manager`]**: Request-boundary wiring: open, run the handler, persist
//! - **[`config`]**: Cookie attributes and other tunables, loadable from TOML
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use session_kit::{MemoryStore, RandomIdGenerator, SessionManager};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let manager = SessionManager::builder()
//!         .store(MemoryStore::new())
//!         .id_generator(RandomIdGenerator::default())
//!         .build()?;
//!
//!     // No cookie on the first request: a fresh session is issued.
//!     let mut session = manager.open(None).await?;
//!     session.set("user", "alice")?;
//!
//!     // Persisting reports what to do with the session cookie.
//!     let cookie = manager.persist(&mut session).await?;
//!     println!("cookie action: {cookie:?}");
//!     Ok(())
//! }
//! ```

/// Session records and their lifecycle state machine.
///
/// A session moves between `Active`, `Stopped`, `Aborted`, and `Destroyed`;
/// data access is only allowed while active.
pub mod session;

/// The session record wire format.
///
/// Each record is a sequence of `key|value` entries where every value is
/// self-delimiting, so records concatenate without separators.
pub mod codec;

/// Flash messages: written once, delivered on the next request, then gone.
pub mod flash;

/// Storage backends and session-id generation.
pub mod store;

/// Request-boundary orchestration around a handler.
pub mod manager;

/// Cookie attributes and other deployment tunables.
pub mod config;

/// The value model stored in session records.
pub mod value;

// Re-export the types most integrations need.
pub use codec::{decode, encode, CodecError};
pub use config::{CookieConfig, SessionConfig};
pub use flash::{FlashBag, FlashEntry};
pub use manager::{ConfigError, CookieAction, SessionManager, SessionManagerBuilder};
pub use session::{Session, SessionError, SessionStatus};
pub use store::{FileStore, IdGenerator, MemoryStore, RandomIdGenerator, SessionStore, UuidIdGenerator};
pub use value::{SessionData, Value};
