//! The session lifecycle state machine.
//!
//! A [`Session`] is the per-request handle to one identifier's data. All
//! state flows through the handle — there is no process-global session, and
//! nothing here performs I/O except `kill`/`rotate`, which call the store
//! collaborator directly.

mod record;

#[cfg(test)]
mod tests;

pub use record::{Session, SessionStatus};

/// Errors from session lifecycle and data operations.
#[derive(Debug, thiserror::Error)]
pub enum SessionError {
    /// Data access or a transition that requires an active session.
    ///
    /// Always surfaced: mutating a stopped/aborted session would silently
    /// diverge from what gets persisted.
    #[error("no active session (status is {status:?})")]
    NotActive { status: SessionStatus },

    /// The session was destroyed; its identifier is gone for good.
    #[error("session has been destroyed")]
    Destroyed,

    /// The store collaborator failed during `kill` or `rotate`.
    #[error("session store failed: {0:#}")]
    Store(anyhow::Error),
}
