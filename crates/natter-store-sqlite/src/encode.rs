//! Encoding and decoding helpers between Rust domain types and the plain-text
//! representations stored in SQLite columns.
//!
//! All timestamps are stored as RFC 3339 strings.

use chrono::{DateTime, Utc};
use natter_core::comment::Comment;

use crate::{Error, Result};

// ─── DateTime<Utc>
// ────────────────────────────────────────────────────────────

pub fn encode_dt(dt: DateTime<Utc>) -> String { dt.to_rfc3339() }

pub fn decode_dt(s: &str) -> Result<DateTime<Utc>> {
  DateTime::parse_from_rfc3339(s)
    .map(|dt| dt.with_timezone(&Utc))
    .map_err(|e| Error::DateParse(e.to_string()))
}

// ─── Row types ───────────────────────────────────────────────────────────────

/// Column list matching the field order of [`RawComment::from_row`].
pub const COMMENT_COLUMNS: &str = "comment_id, entity_id, parent_id, author_id, \
                                   content, created_at, updated_at, edited";

/// Raw values read directly from a `comments` row.
pub struct RawComment {
  pub comment_id: String,
  pub entity_id:  String,
  pub parent_id:  Option<String>,
  pub author_id:  String,
  pub content:    String,
  pub created_at: String,
  pub updated_at: String,
  pub edited:     bool,
}

impl RawComment {
  pub fn from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<Self> {
    Ok(Self {
      comment_id: row.get(0)?,
      entity_id:  row.get(1)?,
      parent_id:  row.get(2)?,
      author_id:  row.get(3)?,
      content:    row.get(4)?,
      created_at: row.get(5)?,
      updated_at: row.get(6)?,
      edited:     row.get(7)?,
    })
  }

  pub fn into_comment(self) -> Result<Comment> {
    Ok(Comment {
      id:         self.comment_id,
      parent_id:  self.parent_id,
      entity_id:  self.entity_id,
      author_id:  self.author_id,
      content:    self.content,
      created_at: decode_dt(&self.created_at)?,
      updated_at: decode_dt(&self.updated_at)?,
      edited:     self.edited,
      replies:    Vec::new(),
    })
  }
}
