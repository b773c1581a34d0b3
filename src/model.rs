//! Persisted entity types: folders, conversation references, and the
//! container a conversation list belongs to.
//!
//! Field names serialize in camelCase so the JSON written here is the same
//! shape the rest of the extension reads.

#[cfg(test)]
#[path = "model_test.rs"]
mod model_test;

use std::fmt;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

/// Identifier of a folder.
pub type FolderId = String;

/// Identifier of a conversation hosted by the chat application.
pub type ConversationId = String;

/// A user-created grouping of conversation references.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Folder {
    pub id: FolderId,
    pub name: String,
    /// Creation time, epoch milliseconds.
    pub created_at: i64,
    /// Cached length of this folder's conversation list.
    #[serde(default)]
    pub conversation_count: usize,
    #[serde(default)]
    pub expanded: bool,
}

impl Folder {
    /// A fresh, empty, collapsed folder with a random id.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            name: name.into(),
            created_at: now_millis(),
            conversation_count: 0,
            expanded: false,
        }
    }
}

/// A pointer to a conversation hosted elsewhere. Not the conversation content.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConversationRef {
    pub id: ConversationId,
    pub title: String,
    pub url: String,
    /// Time the reference was first filed, epoch milliseconds.
    pub added_at: i64,
}

impl ConversationRef {
    #[must_use]
    pub fn new(id: impl Into<String>, title: impl Into<String>, url: impl Into<String>) -> Self {
        Self { id: id.into(), title: title.into(), url: url.into(), added_at: now_millis() }
    }
}

/// The list a conversation reference lives in.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Container {
    /// The conversation list of one folder.
    Folder(FolderId),
    /// The single list of unfiled conversations.
    Standalone,
}

impl Container {
    /// The folder id, if this is a folder list.
    #[must_use]
    pub fn folder_id(&self) -> Option<&str> {
        match self {
            Self::Folder(id) => Some(id),
            Self::Standalone => None,
        }
    }
}

impl fmt::Display for Container {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Folder(id) => write!(f, "folder:{id}"),
            Self::Standalone => f.write_str("standalone"),
        }
    }
}

/// Current wall-clock time in epoch milliseconds.
#[must_use]
pub fn now_millis() -> i64 {
    let nanos = OffsetDateTime::now_utc().unix_timestamp_nanos() / 1_000_000;
    i64::try_from(nanos).unwrap_or(i64::MAX)
}
