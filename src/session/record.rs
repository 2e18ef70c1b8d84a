use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use super::SessionError;
use crate::store::{IdGenerator, SessionStore};
use crate::value::{SessionData, Value};

/// Where a session is in its lifecycle.
///
/// Transitions: `Active → {Stopped, Aborted, Destroyed}`, `Stopped → Active`,
/// `Aborted → Active`. `Destroyed` is terminal for the identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionStatus {
    Active,
    Stopped,
    Aborted,
    Destroyed,
}

/// One identifier's session state for the duration of a request.
///
/// Data access requires the session to be [`SessionStatus::Active`];
/// everything else fails with [`SessionError::NotActive`]. The snapshot
/// taken at load time (and refreshed by [`stop`](Session::stop)) is the
/// commit point that [`abort`](Session::abort) rolls back to.
pub struct Session {
    id: String,
    status: SessionStatus,
    data: SessionData,
    snapshot: SessionData,
    created_at: DateTime<Utc>,
    store: Arc<dyn SessionStore>,
    id_gen: Arc<dyn IdGenerator>,
}

impl Session {
    /// Create an active session from loaded data.
    pub fn new(
        id: impl Into<String>,
        data: SessionData,
        store: Arc<dyn SessionStore>,
        id_gen: Arc<dyn IdGenerator>,
    ) -> Self {
        Self {
            id: id.into(),
            status: SessionStatus::Active,
            snapshot: data.clone(),
            data,
            created_at: Utc::now(),
            store,
            id_gen,
        }
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn status(&self) -> SessionStatus {
        self.status
    }

    pub fn is_active(&self) -> bool {
        self.status == SessionStatus::Active
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    /// The current data, regardless of status.
    ///
    /// This is the persistence view used at response time; request handlers
    /// should go through the guarded accessors instead.
    pub fn data(&self) -> &SessionData {
        &self.data
    }

    fn assert_active(&self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Active => Ok(()),
            status => Err(SessionError::NotActive { status }),
        }
    }

    /// Guarded mutable view for in-crate collaborators (the flash bag).
    pub(crate) fn data_mut(&mut self) -> Result<&mut SessionData, SessionError> {
        self.assert_active()?;
        Ok(&mut self.data)
    }

    // ---- key/value access -------------------------------------------------

    pub fn get(&self, key: &str) -> Result<Option<&Value>, SessionError> {
        self.assert_active()?;
        Ok(self.data.get(key))
    }

    pub fn set(
        &mut self,
        key: impl Into<String>,
        value: impl Into<Value>,
    ) -> Result<(), SessionError> {
        self.assert_active()?;
        self.data.insert(key.into(), value.into());
        Ok(())
    }

    pub fn remove(&mut self, key: &str) -> Result<Option<Value>, SessionError> {
        self.assert_active()?;
        Ok(self.data.remove(key))
    }

    pub fn contains_key(&self, key: &str) -> Result<bool, SessionError> {
        self.assert_active()?;
        Ok(self.data.contains_key(key))
    }

    pub fn keys(&self) -> Result<impl Iterator<Item = &str>, SessionError> {
        self.assert_active()?;
        Ok(self.data.keys().map(String::as_str))
    }

    pub fn len(&self) -> Result<usize, SessionError> {
        self.assert_active()?;
        Ok(self.data.len())
    }

    pub fn is_empty(&self) -> Result<bool, SessionError> {
        self.assert_active()?;
        Ok(self.data.is_empty())
    }

    // ---- lifecycle --------------------------------------------------------

    /// (Re-)enter `Active`.
    ///
    /// Idempotent when already active. From `Stopped` or `Aborted` the data
    /// saved at the last commit point is restored. A destroyed session can
    /// never be started again; a new one must be opened through the manager.
    pub fn start(&mut self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Active => Ok(()),
            SessionStatus::Stopped | SessionStatus::Aborted => {
                self.data = self.snapshot.clone();
                self.status = SessionStatus::Active;
                debug!("Session {} restarted", self.id);
                Ok(())
            }
            SessionStatus::Destroyed => Err(SessionError::Destroyed),
        }
    }

    /// Snapshot the current data as the new commit point and move to
    /// `Stopped`: persist and hand off without ending the logical session.
    ///
    /// Idempotent when already stopped.
    pub fn stop(&mut self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Active => {
                self.snapshot = self.data.clone();
                self.status = SessionStatus::Stopped;
                debug!("Session {} stopped", self.id);
                Ok(())
            }
            SessionStatus::Stopped => Ok(()),
            SessionStatus::Aborted => Err(SessionError::NotActive {
                status: self.status,
            }),
            SessionStatus::Destroyed => Err(SessionError::Destroyed),
        }
    }

    /// Discard every change since the last commit point and move to
    /// `Aborted`. The record keeps the restored snapshot, but it stays
    /// unreachable through the accessors until [`start`](Session::start).
    ///
    /// Idempotent when already aborted.
    pub fn abort(&mut self) -> Result<(), SessionError> {
        match self.status {
            SessionStatus::Active => {
                self.data = self.snapshot.clone();
                self.status = SessionStatus::Aborted;
                debug!("Session {} aborted", self.id);
                Ok(())
            }
            SessionStatus::Aborted => Ok(()),
            SessionStatus::Stopped => Err(SessionError::NotActive {
                status: self.status,
            }),
            SessionStatus::Destroyed => Err(SessionError::Destroyed),
        }
    }

    /// Empty the data in place without changing status.
    pub fn clear(&mut self) -> Result<(), SessionError> {
        self.assert_active()?;
        self.data.clear();
        Ok(())
    }

    /// End the logical session: erase the persisted record, empty the data,
    /// and move to the terminal `Destroyed` state.
    ///
    /// The manager turns a destroyed session into an expire-cookie directive.
    /// If the store fails the session is left untouched.
    pub async fn kill(&mut self) -> Result<(), SessionError> {
        self.assert_active()?;

        self.store
            .destroy(&self.id)
            .await
            .map_err(SessionError::Store)?;

        self.data.clear();
        self.snapshot.clear();
        self.status = SessionStatus::Destroyed;
        info!("Session {} destroyed", self.id);
        Ok(())
    }

    /// Change the identifier without ending the session, dropping all data.
    ///
    /// See [`rotate_with`](Session::rotate_with) to carry data forward.
    pub async fn rotate(&mut self) -> Result<(), SessionError> {
        self.rotate_to(SessionData::new()).await
    }

    /// Change the identifier without ending the session, carrying forward
    /// whatever `copy` selects from the current data.
    ///
    /// Used against session fixation: the persisted record for the old
    /// identifier is destroyed and a fresh identifier is issued, so a
    /// pre-set identifier never survives privilege changes.
    pub async fn rotate_with<F>(&mut self, copy: F) -> Result<(), SessionError>
    where
        F: FnOnce(&SessionData) -> SessionData,
    {
        self.assert_active()?;
        let carried = copy(&self.data);
        self.rotate_to(carried).await
    }

    async fn rotate_to(&mut self, data: SessionData) -> Result<(), SessionError> {
        self.assert_active()?;

        self.store
            .destroy(&self.id)
            .await
            .map_err(SessionError::Store)?;

        let old_id = std::mem::replace(&mut self.id, self.id_gen.new_id());
        self.snapshot = data.clone();
        self.data = data;
        info!("Session {} rotated to {}", old_id, self.id);
        Ok(())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("id", &self.id)
            .field("status", &self.status)
            .field("keys", &self.data.len())
            .finish_non_exhaustive()
    }
}
