use tracing::warn;

use super::FlashEntry;
use crate::session::{Session, SessionError};
use crate::value::Value;

/// Reserved session key used when none is configured.
pub const DEFAULT_FLASH_KEY: &str = "flash";

/// A per-session view over the flash entries stored under a reserved key.
///
/// A bag is bound to one session at a time. Binding pulls the stored entries
/// into the bag's buffer and removes them from the record, so a logical
/// entry is either in the record (not yet read) or in a buffer (read this
/// request) — never both. Rebinding to a different session re-initializes
/// and discards the buffer; rebinding to the same session is a no-op.
#[derive(Debug, Clone)]
pub struct FlashBag {
    key: String,
    entries: Vec<FlashEntry>,
    bound_to: Option<String>,
}

impl FlashBag {
    pub fn new() -> Self {
        Self::with_key(DEFAULT_FLASH_KEY)
    }

    pub fn with_key(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            entries: Vec::new(),
            bound_to: None,
        }
    }

    /// The reserved session key this bag manages.
    pub fn key(&self) -> &str {
        &self.key
    }

    /// Bind the bag to a session, consuming the stored entries into the
    /// buffer.
    ///
    /// Corrupt flash data never fails the request: a non-list value or
    /// malformed items are logged once and skipped, and the bag starts
    /// empty or partial.
    pub fn bind(&mut self, session: &mut Session) -> Result<(), SessionError> {
        if self.bound_to.as_deref() == Some(session.id()) {
            return Ok(());
        }

        let id = session.id().to_string();
        let data = session.data_mut()?;
        self.entries.clear();
        self.bound_to = Some(id);

        let Some(stored) = data.remove(&self.key) else {
            return Ok(());
        };

        let Value::List(items) = stored else {
            warn!("Invalid flash session data under key {:?}", self.key);
            return Ok(());
        };

        let mut invalid = 0usize;
        for item in &items {
            match FlashEntry::from_value(item) {
                Some(entry) => self.entries.push(entry),
                None => invalid += 1,
            }
        }

        if invalid > 0 {
            warn!(
                "Ignoring {invalid} invalid flash message(s) under key {:?}",
                self.key
            );
        }

        Ok(())
    }

    /// Add a flash message with the default content type.
    ///
    /// The entry goes directly into the session record, not into this bag's
    /// buffer: it becomes readable on the next bind, never in the request
    /// that added it.
    pub fn add(
        &self,
        session: &mut Session,
        kind: &str,
        message: &str,
    ) -> Result<(), SessionError> {
        self.push_raw(session, FlashEntry::new(kind, message))
    }

    /// Add a flash message with an explicit content type.
    pub fn add_with_content_type(
        &self,
        session: &mut Session,
        kind: &str,
        message: &str,
        content_type: &str,
    ) -> Result<(), SessionError> {
        self.push_raw(
            session,
            FlashEntry::with_content_type(kind, message, content_type),
        )
    }

    fn push_raw(&self, session: &mut Session, entry: FlashEntry) -> Result<(), SessionError> {
        let data = session.data_mut()?;
        let record = entry.to_value();

        match data.get_mut(&self.key) {
            Some(Value::List(items)) => items.push(record),
            Some(other) => {
                warn!(
                    "Replacing invalid flash session data under key {:?}",
                    self.key
                );
                *other = Value::List(vec![record]);
            }
            None => {
                data.insert(self.key.clone(), Value::List(vec![record]));
            }
        }

        Ok(())
    }

    /// Entries read from the record at bind time.
    pub fn entries(&self) -> &[FlashEntry] {
        &self.entries
    }

    pub fn iter(&self) -> std::slice::Iter<'_, FlashEntry> {
        self.entries.iter()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Put the buffered entries back for the next request, ahead of anything
    /// queued since, and empty the buffer: "I looked at these, but keep them
    /// for the next request too."
    pub fn reissue(&mut self, session: &mut Session) -> Result<(), SessionError> {
        let data = session.data_mut()?;
        if self.entries.is_empty() {
            return Ok(());
        }

        let mut merged: Vec<Value> = self.entries.iter().map(FlashEntry::to_value).collect();
        match data.remove(&self.key) {
            Some(Value::List(queued)) => merged.extend(queued),
            Some(_) => warn!(
                "Discarding invalid flash session data under key {:?}",
                self.key
            ),
            None => {}
        }

        data.insert(self.key.clone(), Value::List(merged));
        self.entries.clear();
        Ok(())
    }

    /// Drop both the buffered entries and anything queued in the record.
    pub fn clear(&mut self, session: &mut Session) -> Result<(), SessionError> {
        session.data_mut()?.remove(&self.key);
        self.entries.clear();
        Ok(())
    }
}

impl Default for FlashBag {
    fn default() -> Self {
        Self::new()
    }
}

impl<'a> IntoIterator for &'a FlashBag {
    type Item = &'a FlashEntry;
    type IntoIter = std::slice::Iter<'a, FlashEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}
