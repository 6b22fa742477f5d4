//! Comment records — the flat unit persisted by a store and threaded on read.
//!
//! A comment belongs to exactly one entity (a post, an article) and optionally
//! points at a parent comment on that same entity. The `replies` field is
//! derived by [`crate::thread::build_threads`] and is never persisted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ─── Comment ─────────────────────────────────────────────────────────────────

/// A single comment, optionally carrying its threaded replies.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Comment {
  pub id:         String,
  /// `None` marks a root comment attached directly to the entity.
  pub parent_id:  Option<String>,
  pub entity_id:  String,
  pub author_id:  String,
  pub content:    String,
  /// Server-assigned; never changes after creation.
  pub created_at: DateTime<Utc>,
  pub updated_at: DateTime<Utc>,
  /// `true` once the content has been changed after creation.
  pub edited:     bool,
  /// Child comments, populated only by the thread builder.
  #[serde(default)]
  pub replies:    Vec<Comment>,
}

impl Comment {
  pub fn is_root(&self) -> bool { self.parent_id.is_none() }

  /// A copy of this record with no replies attached.
  pub fn detached(&self) -> Self {
    Self {
      id:         self.id.clone(),
      parent_id:  self.parent_id.clone(),
      entity_id:  self.entity_id.clone(),
      author_id:  self.author_id.clone(),
      content:    self.content.clone(),
      created_at: self.created_at,
      updated_at: self.updated_at,
      edited:     self.edited,
      replies:    Vec::new(),
    }
  }

  /// Name of the first required field that is blank, if any.
  ///
  /// `id`, `entity_id` and `content` must be non-empty after trimming.
  pub fn missing_field(&self) -> Option<&'static str> {
    if self.id.trim().is_empty() {
      Some("id")
    } else if self.entity_id.trim().is_empty() {
      Some("entity_id")
    } else if self.content.trim().is_empty() {
      Some("content")
    } else {
      None
    }
  }
}

// ─── NewComment ──────────────────────────────────────────────────────────────

/// Input to [`crate::store::CommentStore::persist_comment`].
/// `id` and the timestamps are always set by the store.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewComment {
  pub entity_id: String,
  pub author_id: String,
  pub content:   String,
  pub parent_id: Option<String>,
}

impl NewComment {
  /// A root-level comment on `entity_id`.
  pub fn root(
    entity_id: impl Into<String>,
    author_id: impl Into<String>,
    content: impl Into<String>,
  ) -> Self {
    Self {
      entity_id: entity_id.into(),
      author_id: author_id.into(),
      content:   content.into(),
      parent_id: None,
    }
  }

  /// A reply to `parent_id` on `entity_id`.
  pub fn reply(
    entity_id: impl Into<String>,
    author_id: impl Into<String>,
    parent_id: impl Into<String>,
    content: impl Into<String>,
  ) -> Self {
    Self {
      parent_id: Some(parent_id.into()),
      ..Self::root(entity_id, author_id, content)
    }
  }
}
