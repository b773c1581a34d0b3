use serde_json::json;

use super::*;

// =============================================================
// Folder
// =============================================================

#[test]
fn new_folder_is_empty_and_collapsed() {
    let f = Folder::new("Work");
    assert_eq!(f.name, "Work");
    assert_eq!(f.conversation_count, 0);
    assert!(!f.expanded);
    assert!(!f.id.is_empty());
    assert!(f.created_at > 0);
}

#[test]
fn new_folders_get_distinct_ids() {
    assert_ne!(Folder::new("a").id, Folder::new("a").id);
}

#[test]
fn folder_serializes_camel_case() {
    let f = Folder { id: "f1".into(), name: "Work".into(), created_at: 42, conversation_count: 3, expanded: true };
    let value = serde_json::to_value(&f).unwrap();
    assert_eq!(
        value,
        json!({ "id": "f1", "name": "Work", "createdAt": 42, "conversationCount": 3, "expanded": true })
    );
}

#[test]
fn folder_missing_optional_fields_default() {
    let f: Folder = serde_json::from_value(json!({ "id": "f1", "name": "Old", "createdAt": 1 })).unwrap();
    assert_eq!(f.conversation_count, 0);
    assert!(!f.expanded);
}

// =============================================================
// ConversationRef
// =============================================================

#[test]
fn conversation_ref_serializes_camel_case() {
    let c = ConversationRef { id: "c1".into(), title: "Hi".into(), url: "u".into(), added_at: 7 };
    let value = serde_json::to_value(&c).unwrap();
    assert_eq!(value, json!({ "id": "c1", "title": "Hi", "url": "u", "addedAt": 7 }));
}

// =============================================================
// Container
// =============================================================

#[test]
fn container_folder_id() {
    assert_eq!(Container::Folder("f".into()).folder_id(), Some("f"));
    assert_eq!(Container::Standalone.folder_id(), None);
}

#[test]
fn container_display() {
    assert_eq!(Container::Folder("abc".into()).to_string(), "folder:abc");
    assert_eq!(Container::Standalone.to_string(), "standalone");
}

#[test]
fn now_millis_is_recent() {
    // 2020-01-01T00:00:00Z
    assert!(now_millis() > 1_577_836_800_000);
}
