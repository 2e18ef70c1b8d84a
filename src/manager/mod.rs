//! Request-boundary wiring: load a session before the handler runs,
//! persist it afterwards.
//!
//! The [`SessionManager`] owns the collaborators (store, id generator,
//! configuration) and translates a session's final status into a
//! [`CookieAction`] for the HTTP adapter. Formatting the actual
//! `Set-Cookie` header stays with the adapter.

mod builder;


pub use builder::{ConfigError, SessionManagerBuilder};

use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use futures::future::BoxFuture;
use tracing::{debug, info, warn};

use crate::codec;
use crate::config::SessionConfig;
use crate::flash::FlashBag;
use crate::session::{Session, SessionStatus};
use crate::store::{IdGenerator, SessionStore};
use crate::value::SessionData;

/// What the HTTP adapter should do with the session cookie after a request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CookieAction {
    /// Set (or refresh) the cookie to this session id.
    Set {
        id: String,
        /// Absolute expiry derived from the configured lifetime; `None`
        /// means a browser-session cookie.
        expires: Option<DateTime<Utc>>,
    },
    /// Expire the cookie: the session was destroyed.
    Expire,
    /// Leave the cookie alone: the session was aborted, nothing persisted.
    Unchanged,
}

/// Loads and stores sessions around request handling.
pub struct SessionManager {
    store: Arc<dyn SessionStore>,
    id_gen: Arc<dyn IdGenerator>,
    config: SessionConfig,
}

impl SessionManager {
    pub fn builder() -> SessionManagerBuilder {
        SessionManagerBuilder::new()
    }

    pub(crate) fn from_parts(
        store: Arc<dyn SessionStore>,
        id_gen: Arc<dyn IdGenerator>,
        config: SessionConfig,
    ) -> Self {
        Self {
            store,
            id_gen,
            config,
        }
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// A flash bag using the configured reserved key.
    pub fn flash_bag(&self) -> FlashBag {
        FlashBag::with_key(self.config.flash_key.clone())
    }

    /// Create or load a session.
    ///
    /// With a client-supplied id the stored bytes are read and decoded —
    /// corrupt bytes surface as an error rather than silently dropping
    /// data. Without one, a fresh id is issued and the session starts
    /// empty. Either way the session comes back `Active`.
    pub async fn open(&self, client_id: Option<&str>) -> Result<Session> {
        let (id, data) = match client_id {
            Some(id) => {
                let data = self.load_data(id).await?;
                (id.to_string(), data)
            }
            None => {
                let id = self.id_gen.new_id();
                debug!("Issued new session id {}", id);
                (id, SessionData::new())
            }
        };

        Ok(Session::new(id, data, self.store.clone(), self.id_gen.clone()))
    }

    async fn load_data(&self, id: &str) -> Result<SessionData> {
        let Some(bytes) = self
            .store
            .read(id)
            .await
            .with_context(|| format!("Failed to read session {id}"))?
        else {
            debug!("No stored record for session {}", id);
            return Ok(SessionData::new());
        };

        let text = String::from_utf8(bytes)
            .with_context(|| format!("Session {id} holds non-UTF-8 bytes"))?;

        codec::decode(&text).map_err(|e| {
            warn!("Corrupt session data for {}: {}", id, e);
            anyhow::Error::new(e).context(format!("Failed to decode session {id}"))
        })
    }

    /// Persist a session and report the cookie consequence.
    ///
    /// Destroyed sessions expire the cookie (their record is already gone),
    /// aborted sessions persist nothing, everything else is stopped,
    /// encoded, and written back.
    pub async fn persist(&self, session: &mut Session) -> Result<CookieAction> {
        match session.status() {
            SessionStatus::Destroyed => {
                info!("Session destroyed, expiring cookie");
                Ok(CookieAction::Expire)
            }
            SessionStatus::Aborted => {
                debug!("Session {} aborted, skipping persistence", session.id());
                Ok(CookieAction::Unchanged)
            }
            SessionStatus::Active | SessionStatus::Stopped => {
                session
                    .stop()
                    .context("Failed to stop session before persisting")?;

                let encoded = codec::encode(session.data());
                self.store
                    .write(session.id(), encoded.as_bytes())
                    .await
                    .with_context(|| format!("Failed to write session {}", session.id()))?;

                debug!(
                    "Persisted {} bytes for session {}",
                    encoded.len(),
                    session.id()
                );

                Ok(CookieAction::Set {
                    id: session.id().to_string(),
                    expires: self.cookie_expiry(),
                })
            }
        }
    }

    /// Run a request handler inside a session scope.
    ///
    /// The session is opened before the handler and persisted after it on
    /// both the success and the error path, so storage never keeps the view
    /// of a half-finished request.
    pub async fn scope<T, F>(&self, client_id: Option<&str>, handler: F) -> Result<(T, CookieAction)>
    where
        F: for<'a> FnOnce(&'a mut Session) -> BoxFuture<'a, Result<T>>,
    {
        let mut session = self.open(client_id).await?;

        match handler(&mut session).await {
            Ok(value) => {
                let cookie = self.persist(&mut session).await?;
                Ok((value, cookie))
            }
            Err(handler_err) => {
                if let Err(persist_err) = self.persist(&mut session).await {
                    warn!(
                        "Failed to persist session {} after handler error: {:#}",
                        session.id(),
                        persist_err
                    );
                }
                Err(handler_err)
            }
        }
    }

    fn cookie_expiry(&self) -> Option<DateTime<Utc>> {
        self.config
            .cookie
            .lifetime_secs
            .map(|secs| Utc::now() + chrono::Duration::seconds(secs as i64))
    }
}
