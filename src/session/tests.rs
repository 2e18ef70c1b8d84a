use std::sync::Arc;

use anyhow::anyhow;
use async_trait::async_trait;

use crate::session::{Session, SessionError, SessionStatus};
use crate::store::{MemoryStore, RandomIdGenerator, SessionStore};
use crate::value::{SessionData, Value};

fn session_with(data: SessionData) -> (Session, Arc<MemoryStore>) {
    let store = Arc::new(MemoryStore::new());
    let session = Session::new(
        "abc",
        data,
        store.clone(),
        Arc::new(RandomIdGenerator::default()),
    );
    (session, store)
}

fn data_with_user() -> SessionData {
    let mut data = SessionData::new();
    data.insert("user".to_string(), Value::Str("alice".into()));
    data
}

#[test]
fn test_new_session_is_active() {
    let (session, _) = session_with(SessionData::new());
    assert_eq!(session.status(), SessionStatus::Active);
    assert!(session.is_active());
    assert_eq!(session.id(), "abc");
}

#[test]
fn test_get_set_remove() {
    let (mut session, _) = session_with(SessionData::new());

    session.set("count", 3i64).unwrap();
    assert_eq!(session.get("count").unwrap(), Some(&Value::Int(3)));
    assert!(session.contains_key("count").unwrap());
    assert_eq!(session.len().unwrap(), 1);

    assert_eq!(session.remove("count").unwrap(), Some(Value::Int(3)));
    assert_eq!(session.get("count").unwrap(), None);
    assert!(session.is_empty().unwrap());
}

#[test]
fn test_access_requires_active() {
    let (mut session, _) = session_with(data_with_user());
    session.stop().unwrap();

    assert!(matches!(
        session.get("user"),
        Err(SessionError::NotActive {
            status: SessionStatus::Stopped
        })
    ));
    assert!(session.set("x", 1i64).is_err());
    assert!(session.remove("user").is_err());
    assert!(session.contains_key("user").is_err());
    assert!(session.clear().is_err());
}

#[test]
fn test_stop_then_start_restores_stop_time_data() {
    let (mut session, _) = session_with(SessionData::new());

    session.set("x", 1i64).unwrap();
    session.stop().unwrap();
    assert_eq!(session.status(), SessionStatus::Stopped);

    session.start().unwrap();
    assert_eq!(session.status(), SessionStatus::Active);
    assert_eq!(session.get("x").unwrap(), Some(&Value::Int(1)));
}

#[test]
fn test_stop_is_idempotent() {
    let (mut session, _) = session_with(SessionData::new());
    session.stop().unwrap();
    session.stop().unwrap();
    assert_eq!(session.status(), SessionStatus::Stopped);
}

#[test]
fn test_start_is_idempotent_when_active() {
    let (mut session, _) = session_with(SessionData::new());
    session.set("x", 1i64).unwrap();
    session.start().unwrap();
    assert_eq!(session.get("x").unwrap(), Some(&Value::Int(1)));
}

#[test]
fn test_abort_restores_load_snapshot() {
    let (mut session, _) = session_with(data_with_user());

    session.set("user", "mallory").unwrap();
    session.set("extra", true).unwrap();
    session.remove("user").unwrap();
    session.abort().unwrap();

    assert_eq!(session.status(), SessionStatus::Aborted);
    assert!(session.get("user").is_err());

    // The record itself holds the pre-modification snapshot.
    assert_eq!(session.data().get("user"), Some(&Value::Str("alice".into())));
    assert_eq!(session.data().get("extra"), None);

    session.start().unwrap();
    assert_eq!(session.get("user").unwrap(), Some(&Value::Str("alice".into())));
}

#[test]
fn test_abort_rolls_back_to_last_stop() {
    let (mut session, _) = session_with(SessionData::new());

    session.set("x", 1i64).unwrap();
    session.stop().unwrap();
    session.start().unwrap();
    session.set("x", 2i64).unwrap();
    session.abort().unwrap();
    session.start().unwrap();

    assert_eq!(session.get("x").unwrap(), Some(&Value::Int(1)));
}

#[test]
fn test_abort_is_idempotent_but_not_from_stopped() {
    let (mut session, _) = session_with(SessionData::new());
    session.abort().unwrap();
    session.abort().unwrap();

    session.start().unwrap();
    session.stop().unwrap();
    assert!(matches!(
        session.abort(),
        Err(SessionError::NotActive { .. })
    ));
}

#[test]
fn test_clear_keeps_session_active() {
    let (mut session, _) = session_with(data_with_user());

    session.clear().unwrap();
    assert!(session.is_active());
    assert!(session.is_empty().unwrap());
}

#[tokio::test]
async fn test_kill_destroys_record_and_session() {
    let (mut session, store) = session_with(data_with_user());
    store.write("abc", b"user|s:5:\"alice\";").await.unwrap();

    session.kill().await.unwrap();

    assert_eq!(session.status(), SessionStatus::Destroyed);
    assert!(!session.is_active());
    assert!(session.data().is_empty());
    assert!(!store.contains("abc"));

    assert!(matches!(session.get("user"), Err(SessionError::NotActive { .. })));
    assert!(matches!(session.start(), Err(SessionError::Destroyed)));
    assert!(matches!(session.stop(), Err(SessionError::Destroyed)));
    assert!(matches!(session.abort(), Err(SessionError::Destroyed)));
}

#[tokio::test]
async fn test_kill_requires_active() {
    let (mut session, _) = session_with(SessionData::new());
    session.stop().unwrap();
    assert!(matches!(
        session.kill().await,
        Err(SessionError::NotActive { .. })
    ));
}

#[tokio::test]
async fn test_rotate_changes_id_and_drops_data() {
    let (mut session, store) = session_with(data_with_user());
    store.write("abc", b"user|s:5:\"alice\";").await.unwrap();

    session.rotate().await.unwrap();

    assert_ne!(session.id(), "abc");
    assert!(!store.contains("abc"));
    assert!(session.is_active());
    assert!(session.is_empty().unwrap());
}

#[tokio::test]
async fn test_rotate_with_carries_selected_data() {
    let (mut session, store) = session_with(data_with_user());
    session.set("csrf", "token").unwrap();

    session
        .rotate_with(|data| {
            let mut carried = SessionData::new();
            if let Some(user) = data.get("user") {
                carried.insert("user".to_string(), user.clone());
            }
            carried
        })
        .await
        .unwrap();

    assert!(!store.contains("abc"));
    assert_eq!(session.get("user").unwrap(), Some(&Value::Str("alice".into())));
    assert_eq!(session.get("csrf").unwrap(), None);
}

#[tokio::test]
async fn test_rotate_resets_commit_point() {
    let (mut session, _) = session_with(data_with_user());

    session.rotate().await.unwrap();
    session.set("fresh", 1i64).unwrap();
    session.abort().unwrap();
    session.start().unwrap();

    // Abort rolls back to the post-rotate snapshot, not the original data.
    assert!(session.is_empty().unwrap());
}

struct BrokenStore;

#[async_trait]
impl SessionStore for BrokenStore {
    async fn read(&self, _id: &str) -> anyhow::Result<Option<Vec<u8>>> {
        Err(anyhow!("backend offline"))
    }

    async fn write(&self, _id: &str, _bytes: &[u8]) -> anyhow::Result<()> {
        Err(anyhow!("backend offline"))
    }

    async fn destroy(&self, _id: &str) -> anyhow::Result<()> {
        Err(anyhow!("backend offline"))
    }
}

#[tokio::test]
async fn test_kill_store_failure_leaves_session_untouched() {
    let mut session = Session::new(
        "abc",
        data_with_user(),
        Arc::new(BrokenStore),
        Arc::new(RandomIdGenerator::default()),
    );

    assert!(matches!(
        session.kill().await,
        Err(SessionError::Store(_))
    ));
    assert!(session.is_active());
    assert_eq!(session.get("user").unwrap(), Some(&Value::Str("alice".into())));
}
