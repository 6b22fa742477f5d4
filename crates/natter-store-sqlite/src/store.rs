//! [`SqliteStore`] — the SQLite implementation of [`CommentStore`].

use std::path::Path;

use chrono::Utc;
use rusqlite::OptionalExtension as _;
use uuid::Uuid;

use natter_core::{
  comment::{Comment, NewComment},
  store::CommentStore,
};

use crate::{
  Error, Result,
  encode::{COMMENT_COLUMNS, RawComment, encode_dt},
  schema::SCHEMA,
};

// ─── Store ───────────────────────────────────────────────────────────────────

/// A Natter comment store backed by a single SQLite file.
///
/// Cloning is cheap — the inner connection is reference-counted.
#[derive(Clone)]
pub struct SqliteStore {
  conn: tokio_rusqlite::Connection,
}

impl SqliteStore {
  /// Open (or create) a store at `path` and run schema initialisation.
  pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open(path).await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  /// Open an in-memory store — useful for testing.
  pub async fn open_in_memory() -> Result<Self> {
    let conn = tokio_rusqlite::Connection::open_in_memory().await?;
    let store = Self { conn };
    store.init_schema().await?;
    Ok(store)
  }

  async fn init_schema(&self) -> Result<()> {
    self
      .conn
      .call(|conn| {
        conn.execute_batch(SCHEMA)?;
        Ok(())
      })
      .await?;
    Ok(())
  }

  /// Insert a fully-built [`Comment`] into the `comments` table.
  ///
  /// For a reply, the parent lookup and the insert share one transaction so
  /// the parent cannot be deleted in between.
  async fn insert_comment(&self, comment: &Comment) -> Result<()> {
    let id_str         = comment.id.clone();
    let entity_id      = comment.entity_id.clone();
    let parent_id      = comment.parent_id.clone();
    let author_id      = comment.author_id.clone();
    let content        = comment.content.clone();
    let created_at_str = encode_dt(comment.created_at);
    let updated_at_str = encode_dt(comment.updated_at);
    let edited         = comment.edited;

    let outcome = self
      .conn
      .call(move |conn| {
        let tx = conn.transaction()?;

        if let Some(parent_id) = &parent_id {
          let parent_entity: Option<String> = tx
            .query_row(
              "SELECT entity_id FROM comments WHERE comment_id = ?1",
              rusqlite::params![parent_id],
              |r| r.get(0),
            )
            .optional()?;
          match parent_entity {
            None => return Ok(Insert::NoParent),
            Some(other) if other != entity_id => {
              return Ok(Insert::ParentOn(other));
            }
            Some(_) => {}
          }
        }

        tx.execute(
          "INSERT INTO comments (
             comment_id, entity_id, parent_id, author_id, content,
             created_at, updated_at, edited
           ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8)",
          rusqlite::params![
            id_str,
            entity_id,
            parent_id,
            author_id,
            content,
            created_at_str,
            updated_at_str,
            edited,
          ],
        )?;
        tx.commit()?;
        Ok(Insert::Done)
      })
      .await?;

    let parent_id = comment.parent_id.clone().unwrap_or_default();
    match outcome {
      Insert::Done => Ok(()),
      Insert::NoParent => {
        Err(natter_core::Error::ParentNotFound(parent_id).into())
      }
      Insert::ParentOn(parent_entity_id) => Err(
        natter_core::Error::EntityMismatch {
          parent_id,
          parent_entity_id,
          entity_id: comment.entity_id.clone(),
        }
        .into(),
      ),
    }
  }
}

/// Result of [`SqliteStore::insert_comment`]'s parent check.
enum Insert {
  Done,
  NoParent,
  ParentOn(String),
}

// ─── CommentStore impl ───────────────────────────────────────────────────────

impl CommentStore for SqliteStore {
  type Error = Error;

  async fn fetch_flat_comments(&self, entity_id: &str) -> Result<Vec<Comment>> {
    let entity_id = entity_id.to_owned();

    let raws: Vec<RawComment> = self
      .conn
      .call(move |conn| {
        let mut stmt = conn.prepare(&format!(
          "SELECT {COMMENT_COLUMNS} FROM comments
           WHERE entity_id = ?1
           ORDER BY rowid"
        ))?;
        let rows = stmt
          .query_map(rusqlite::params![entity_id], RawComment::from_row)?
          .collect::<rusqlite::Result<Vec<_>>>()?;
        Ok(rows)
      })
      .await?;

    raws.into_iter().map(RawComment::into_comment).collect()
  }

  async fn persist_comment(&self, input: NewComment) -> Result<Comment> {
    let content = input.content.trim();
    if content.is_empty() {
      return Err(natter_core::Error::EmptyContent.into());
    }

    let now = Utc::now();
    let comment = Comment {
      id:         Uuid::new_v4().to_string(),
      parent_id:  input.parent_id.clone(),
      entity_id:  input.entity_id.clone(),
      author_id:  input.author_id.clone(),
      content:    content.to_owned(),
      created_at: now,
      updated_at: now,
      edited:     false,
      replies:    Vec::new(),
    };

    self.insert_comment(&comment).await?;
    tracing::debug!(
      comment_id = %comment.id,
      entity_id = %comment.entity_id,
      "persisted comment"
    );
    Ok(comment)
  }

  async fn get_comment(&self, id: &str) -> Result<Option<Comment>> {
    let id_str = id.to_owned();

    let raw: Option<RawComment> = self
      .conn
      .call(move |conn| {
        Ok(
          conn
            .query_row(
              &format!(
                "SELECT {COMMENT_COLUMNS} FROM comments WHERE comment_id = ?1"
              ),
              rusqlite::params![id_str],
              RawComment::from_row,
            )
            .optional()?,
        )
      })
      .await?;

    raw.map(RawComment::into_comment).transpose()
  }

  async fn update_comment(&self, id: &str, content: String) -> Result<Comment> {
    let content = content.trim().to_owned();
    if content.is_empty() {
      return Err(natter_core::Error::EmptyContent.into());
    }

    let id_str         = id.to_owned();
    let updated_at_str = encode_dt(Utc::now());

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "UPDATE comments
           SET content = ?2, updated_at = ?3, edited = 1
           WHERE comment_id = ?1",
          rusqlite::params![id_str, content, updated_at_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(natter_core::Error::CommentNotFound(id.to_owned()).into());
    }

    self
      .get_comment(id)
      .await?
      .ok_or_else(|| natter_core::Error::CommentNotFound(id.to_owned()).into())
  }

  async fn delete_comment(&self, id: &str) -> Result<()> {
    let id_str = id.to_owned();

    let changed = self
      .conn
      .call(move |conn| {
        Ok(conn.execute(
          "DELETE FROM comments WHERE comment_id = ?1",
          rusqlite::params![id_str],
        )?)
      })
      .await?;

    if changed == 0 {
      return Err(natter_core::Error::CommentNotFound(id.to_owned()).into());
    }
    tracing::debug!(comment_id = %id, "deleted comment");
    Ok(())
  }
}
