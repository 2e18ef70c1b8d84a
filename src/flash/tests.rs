use std::sync::Arc;

use crate::flash::{FlashBag, FlashEntry};
use crate::session::{Session, SessionError};
use crate::store::{MemoryStore, RandomIdGenerator};
use crate::value::{SessionData, Value};

fn new_session(id: &str, data: SessionData) -> Session {
    Session::new(
        id,
        data,
        Arc::new(MemoryStore::new()),
        Arc::new(RandomIdGenerator::default()),
    )
}

/// The next request sees whatever the previous one left in the record.
fn next_request(session: &Session) -> Session {
    new_session(session.id(), session.data().clone())
}

#[test]
fn test_added_entry_is_not_visible_same_request() {
    let mut session = new_session("abc", SessionData::new());
    let mut bag = FlashBag::new();

    bag.bind(&mut session).unwrap();
    bag.add(&mut session, "notice", "saved").unwrap();

    assert!(bag.is_empty());
    assert!(session.get("flash").unwrap().is_some());
}

#[test]
fn test_entry_is_delivered_exactly_once() {
    // Request A: add.
    let mut session = new_session("abc", SessionData::new());
    let mut bag = FlashBag::new();
    bag.bind(&mut session).unwrap();
    bag.add(&mut session, "notice", "saved").unwrap();

    // Request B: read.
    let mut session = next_request(&session);
    let mut bag = FlashBag::new();
    bag.bind(&mut session).unwrap();

    assert_eq!(bag.len(), 1);
    assert_eq!(bag.entries()[0], FlashEntry::new("notice", "saved"));
    assert_eq!(bag.entries()[0].content_type, "text/plain");
    // Reading moved the entries out of the record.
    assert_eq!(session.get("flash").unwrap(), None);

    // Request C: nothing left.
    let mut session = next_request(&session);
    let mut bag = FlashBag::new();
    bag.bind(&mut session).unwrap();
    assert!(bag.is_empty());
}

#[test]
fn test_bind_same_session_preserves_buffer() {
    let mut session = new_session("abc", SessionData::new());
    let setup = FlashBag::new();
    setup.add(&mut session, "error", "boom").unwrap();

    let mut session = next_request(&session);
    let mut bag = FlashBag::new();
    bag.bind(&mut session).unwrap();
    assert_eq!(bag.len(), 1);

    // Re-binding the same session must not drop the buffered entry.
    bag.bind(&mut session).unwrap();
    assert_eq!(bag.len(), 1);
}

#[test]
fn test_rebinding_different_session_reinitializes() {
    let mut first = new_session("abc", SessionData::new());
    let setup = FlashBag::new();
    setup.add(&mut first, "notice", "for abc").unwrap();

    let mut first = next_request(&first);
    let mut bag = FlashBag::new();
    bag.bind(&mut first).unwrap();
    assert_eq!(bag.len(), 1);

    let mut other = new_session("xyz", SessionData::new());
    bag.bind(&mut other).unwrap();
    assert!(bag.is_empty());
}

#[test]
fn test_reissue_redelivers_until_consumed() {
    let mut session = new_session("abc", SessionData::new());
    let setup = FlashBag::new();
    setup.add(&mut session, "notice", "saved").unwrap();

    // Request B reads and reissues.
    let mut session = next_request(&session);
    let mut bag = FlashBag::new();
    bag.bind(&mut session).unwrap();
    assert_eq!(bag.len(), 1);
    bag.reissue(&mut session).unwrap();
    assert!(bag.is_empty());

    // Request C sees the same entry again.
    let mut session = next_request(&session);
    let mut bag = FlashBag::new();
    bag.bind(&mut session).unwrap();
    assert_eq!(bag.entries()[0].message, "saved");

    // Consumed this time: request D is empty.
    let mut session = next_request(&session);
    let mut bag = FlashBag::new();
    bag.bind(&mut session).unwrap();
    assert!(bag.is_empty());
}

#[test]
fn test_reissue_places_buffer_before_new_entries() {
    let mut session = new_session("abc", SessionData::new());
    let setup = FlashBag::new();
    setup.add(&mut session, "old", "first").unwrap();

    let mut session = next_request(&session);
    let mut bag = FlashBag::new();
    bag.bind(&mut session).unwrap();
    bag.add(&mut session, "new", "second").unwrap();
    bag.reissue(&mut session).unwrap();

    let mut session = next_request(&session);
    let mut bag = FlashBag::new();
    bag.bind(&mut session).unwrap();

    let kinds: Vec<&str> = bag.iter().map(|e| e.kind.as_str()).collect();
    assert_eq!(kinds, vec!["old", "new"]);
}

#[test]
fn test_clear_discards_read_and_unread() {
    let mut session = new_session("abc", SessionData::new());
    let setup = FlashBag::new();
    setup.add(&mut session, "a", "read me").unwrap();

    let mut session = next_request(&session);
    let mut bag = FlashBag::new();
    bag.bind(&mut session).unwrap();
    bag.add(&mut session, "b", "unread").unwrap();

    bag.clear(&mut session).unwrap();

    assert!(bag.is_empty());
    assert_eq!(session.get("flash").unwrap(), None);
}

#[test]
fn test_scalar_flash_data_yields_empty_buffer() {
    let mut data = SessionData::new();
    data.insert("flash".to_string(), Value::Str("not a list".into()));

    let mut session = new_session("abc", data);
    let mut bag = FlashBag::new();

    bag.bind(&mut session).unwrap();
    assert!(bag.is_empty());
    // The corrupt value is gone; the request continues normally.
    assert_eq!(session.get("flash").unwrap(), None);
}

#[test]
fn test_malformed_items_are_skipped() {
    let good = FlashEntry::new("notice", "kept").to_value();
    let missing_message = Value::Map(
        [("type".to_string(), Value::Str("error".into()))]
            .into_iter()
            .collect(),
    );
    let not_a_record = Value::Int(5);

    let mut data = SessionData::new();
    data.insert(
        "flash".to_string(),
        Value::List(vec![missing_message, good, not_a_record]),
    );

    let mut session = new_session("abc", data);
    let mut bag = FlashBag::new();
    bag.bind(&mut session).unwrap();

    assert_eq!(bag.len(), 1);
    assert_eq!(bag.entries()[0].message, "kept");
}

#[test]
fn test_missing_optional_fields_get_defaults() {
    let bare = Value::Map(
        [("message".to_string(), Value::Str("hello".into()))]
            .into_iter()
            .collect(),
    );
    let mut data = SessionData::new();
    data.insert("flash".to_string(), Value::List(vec![bare]));

    let mut session = new_session("abc", data);
    let mut bag = FlashBag::new();
    bag.bind(&mut session).unwrap();

    assert_eq!(bag.entries()[0].kind, "");
    assert_eq!(bag.entries()[0].content_type, "text/plain");
}

#[test]
fn test_add_with_content_type() {
    let mut session = new_session("abc", SessionData::new());
    let bag = FlashBag::new();
    bag.add_with_content_type(&mut session, "notice", "<b>saved</b>", "text/html")
        .unwrap();

    let mut session = next_request(&session);
    let mut bag = FlashBag::new();
    bag.bind(&mut session).unwrap();
    assert_eq!(bag.entries()[0].content_type, "text/html");
}

#[test]
fn test_custom_reserved_key() {
    let mut session = new_session("abc", SessionData::new());
    let bag = FlashBag::with_key("_messages");
    bag.add(&mut session, "notice", "saved").unwrap();

    assert!(session.get("_messages").unwrap().is_some());
    assert_eq!(session.get("flash").unwrap(), None);
}

#[test]
fn test_failed_bind_leaves_bag_unbound() {
    let mut session = new_session("abc", SessionData::new());
    let setup = FlashBag::new();
    setup.add(&mut session, "notice", "saved").unwrap();

    let mut session = next_request(&session);
    session.stop().unwrap();

    let mut bag = FlashBag::new();
    assert!(bag.bind(&mut session).is_err());

    // The rejected bind must not count: once the session is active again,
    // binding still consumes the stored entries.
    session.start().unwrap();
    bag.bind(&mut session).unwrap();
    assert_eq!(bag.len(), 1);
    assert_eq!(bag.entries()[0].message, "saved");
}

#[test]
fn test_flash_operations_require_active_session() {
    let mut session = new_session("abc", SessionData::new());
    session.stop().unwrap();

    let mut bag = FlashBag::new();
    assert!(matches!(
        bag.bind(&mut session),
        Err(SessionError::NotActive { .. })
    ));
    assert!(bag.add(&mut session, "a", "b").is_err());
    assert!(bag.reissue(&mut session).is_err());
    assert!(bag.clear(&mut session).is_err());
}
