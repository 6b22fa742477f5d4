//! [`ThreadSession`] — the comments panel for one entity at a time.
//!
//! A session owns the built forest for whichever entity is currently open and
//! routes every mutation through the store before patching that forest. It is
//! an ordinary value: create one per viewer and pass it where it is needed.
//!
//! ```text
//! Closed ──open()──▶ Open ──refresh()──▶ Populated
//!    ▲                 ▲                     │
//!    │                 └── failed rebuild ───┤
//!    └──────────────── close() ──────────────┘
//! ```

use std::sync::Arc;

use crate::{
  Error, Result,
  comment::{Comment, NewComment},
  forest::{insert_comment, patch_comment},
  store::CommentStore,
  thread::{ThreadOptions, build_threads},
};

/// Lifecycle of a [`ThreadSession`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub enum SessionState {
  #[default]
  Closed,
  /// An entity is selected but no forest has been built for it yet.
  Open { entity_id: String },
  Populated {
    entity_id: String,
    forest:    Vec<Comment>,
  },
}

/// Threaded view of one entity's comments, authored as a single user.
pub struct ThreadSession<S: CommentStore> {
  store:     Arc<S>,
  author_id: String,
  options:   ThreadOptions,
  state:     SessionState,
}

impl<S: CommentStore> ThreadSession<S> {
  pub fn new(
    store: Arc<S>,
    author_id: impl Into<String>,
    options: ThreadOptions,
  ) -> Self {
    Self {
      store,
      author_id: author_id.into(),
      options,
      state: SessionState::Closed,
    }
  }

  pub fn state(&self) -> &SessionState { &self.state }

  pub fn options(&self) -> &ThreadOptions { &self.options }

  /// The entity currently open, if any.
  pub fn entity_id(&self) -> Option<&str> {
    match &self.state {
      SessionState::Closed => None,
      SessionState::Open { entity_id }
      | SessionState::Populated { entity_id, .. } => Some(entity_id),
    }
  }

  /// The built forest; empty unless the session is populated.
  pub fn forest(&self) -> &[Comment] {
    match &self.state {
      SessionState::Populated { forest, .. } => forest,
      _ => &[],
    }
  }

  /// Select `entity_id`, discarding any forest built for a previous entity.
  pub fn open(&mut self, entity_id: impl Into<String>) {
    self.state = SessionState::Open {
      entity_id: entity_id.into(),
    };
  }

  pub fn close(&mut self) { self.state = SessionState::Closed; }

  /// Fetch the open entity's comments and rebuild the forest.
  ///
  /// If the batch fails validation the session returns to
  /// [`SessionState::Open`] with no forest: a malformed batch means "no
  /// comments", never a partial thread.
  pub async fn refresh(&mut self) -> Result<&[Comment]> {
    let entity_id = self.require_entity()?.to_owned();

    let flat = self
      .store
      .fetch_flat_comments(&entity_id)
      .await
      .map_err(Error::store)?;

    match build_threads(&flat, &self.options) {
      Ok(forest) => {
        self.state = SessionState::Populated { entity_id, forest };
        Ok(self.forest())
      }
      Err(e) => {
        tracing::warn!(entity_id = %entity_id, error = %e, "discarding malformed comment batch");
        self.state = SessionState::Open { entity_id };
        Err(e)
      }
    }
  }

  /// Post a root-level comment on the open entity.
  pub async fn add_root_comment(
    &mut self,
    content: impl Into<String>,
  ) -> Result<Comment> {
    let entity_id = self.require_entity()?.to_owned();
    let input = NewComment::root(entity_id, self.author_id.clone(), content);
    self.submit(input).await
  }

  /// Post a reply to `parent_id` on the open entity.
  pub async fn add_reply(
    &mut self,
    parent_id: impl Into<String>,
    content: impl Into<String>,
  ) -> Result<Comment> {
    let entity_id = self.require_entity()?.to_owned();
    let input = NewComment::reply(
      entity_id,
      self.author_id.clone(),
      parent_id,
      content,
    );
    self.submit(input).await
  }

  /// Change a comment's content and patch it in place; its replies are kept.
  pub async fn edit_comment(
    &mut self,
    id: &str,
    content: impl Into<String>,
  ) -> Result<Comment> {
    let content = content.into();
    if content.trim().is_empty() {
      return Err(Error::EmptyContent);
    }
    self.require_own_comment(id).await?;

    let updated = self
      .store
      .update_comment(id, content)
      .await
      .map_err(Error::store)?;

    if let SessionState::Populated { forest, .. } = &mut self.state
      && !patch_comment(forest, &updated)
    {
      tracing::debug!(comment_id = %id, "edited comment not in forest");
    }
    Ok(updated)
  }

  /// Delete a comment, then rebuild the forest from the store.
  pub async fn delete_comment(&mut self, id: &str) -> Result<()> {
    self.require_own_comment(id).await?;
    self.store.delete_comment(id).await.map_err(Error::store)?;
    self.resync().await;
    Ok(())
  }

  async fn submit(&mut self, input: NewComment) -> Result<Comment> {
    if input.content.trim().is_empty() {
      return Err(Error::EmptyContent);
    }

    let comment = self
      .store
      .persist_comment(input)
      .await
      .map_err(Error::store)?;

    if let SessionState::Populated { forest, .. } = &mut self.state {
      insert_comment(forest, comment.clone(), &self.options);
      return Ok(comment);
    }

    self.resync().await;
    Ok(comment)
  }

  /// Rebuild after a committed write. The write stands even if the rebuild
  /// fails; the session is then left `Open` with no forest.
  async fn resync(&mut self) {
    if let Err(e) = self.refresh().await {
      tracing::warn!(error = %e, "write committed but forest not rebuilt");
      if let SessionState::Populated { entity_id, .. } = &mut self.state {
        let entity_id = std::mem::take(entity_id);
        self.state = SessionState::Open { entity_id };
      }
    }
  }

  fn require_entity(&self) -> Result<&str> {
    self.entity_id().ok_or(Error::SessionClosed)
  }

  /// Comments on other entities are invisible to this session.
  async fn require_own_comment(&self, id: &str) -> Result<Comment> {
    let entity_id = self.require_entity()?;
    match self.store.get_comment(id).await.map_err(Error::store)? {
      Some(comment) if comment.entity_id == entity_id => Ok(comment),
      _ => Err(Error::CommentNotFound(id.to_owned())),
    }
  }
}
