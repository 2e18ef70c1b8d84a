use std::sync::Arc;

use super::SessionManager;
use crate::config::SessionConfig;
use crate::store::{IdGenerator, SessionStore};

/// Wiring problems caught before any request is processed.
#[derive(Debug, Clone, thiserror::Error)]
pub enum ConfigError {
    #[error("session manager requires a store")]
    MissingStore,

    #[error("session manager cannot generate session ids: no id generator supplied")]
    MissingIdGenerator,
}

/// Builder for [`SessionManager`].
///
/// A store and an id generator are mandatory; a manager that could write
/// sessions but never mint an identifier would only fail at request time,
/// so [`build`](SessionManagerBuilder::build) rejects the wiring up front.
#[derive(Default)]
pub struct SessionManagerBuilder {
    store: Option<Arc<dyn SessionStore>>,
    id_gen: Option<Arc<dyn IdGenerator>>,
    config: Option<SessionConfig>,
}

impl SessionManagerBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn store(mut self, store: impl SessionStore + 'static) -> Self {
        self.store = Some(Arc::new(store));
        self
    }

    /// Use an already-shared store.
    pub fn shared_store(mut self, store: Arc<dyn SessionStore>) -> Self {
        self.store = Some(store);
        self
    }

    pub fn id_generator(mut self, id_gen: impl IdGenerator + 'static) -> Self {
        self.id_gen = Some(Arc::new(id_gen));
        self
    }

    pub fn shared_id_generator(mut self, id_gen: Arc<dyn IdGenerator>) -> Self {
        self.id_gen = Some(id_gen);
        self
    }

    pub fn config(mut self, config: SessionConfig) -> Self {
        self.config = Some(config);
        self
    }

    pub fn build(self) -> Result<SessionManager, ConfigError> {
        let store = self.store.ok_or(ConfigError::MissingStore)?;
        let id_gen = self.id_gen.ok_or(ConfigError::MissingIdGenerator)?;
        let config = self.config.unwrap_or_default();

        Ok(SessionManager::from_parts(store, id_gen, config))
    }
}
