//! Error types for `natter-core`.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
  /// A record in a build batch is missing a required field.
  #[error("comment at index {index} is missing required field `{field}`")]
  Validation { index: usize, field: &'static str },

  /// Two records in a build batch share an id.
  #[error("comment at index {index} duplicates id {id:?}")]
  DuplicateId { index: usize, id: String },

  #[error("comment not found: {0}")]
  CommentNotFound(String),

  #[error("parent comment not found: {0}")]
  ParentNotFound(String),

  #[error(
    "parent comment {parent_id} belongs to entity {parent_entity_id}, not \
     {entity_id}"
  )]
  EntityMismatch {
    parent_id:        String,
    parent_entity_id: String,
    entity_id:        String,
  },

  #[error("comment content must not be empty")]
  EmptyContent,

  #[error("no entity is open in this session")]
  SessionClosed,

  #[error("store error: {0}")]
  Store(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl Error {
  /// Whether this error rejected a build batch as malformed.
  pub fn is_validation(&self) -> bool {
    matches!(self, Self::Validation { .. } | Self::DuplicateId { .. })
  }

  /// Box a backend error into [`Error::Store`].
  pub fn store<E>(err: E) -> Self
  where
    E: std::error::Error + Send + Sync + 'static,
  {
    Self::Store(Box::new(err))
  }
}

pub type Result<T, E = Error> = std::result::Result<T, E>;

/// Walk `err` and its source chain, returning the first `natter-core` error
/// that is not itself a [`Error::Store`] wrapper.
///
/// Backends wrap domain failures (not found, empty content, ...) in their own
/// error types; this lets callers classify them without knowing the backend.
pub fn find_core_error<'a>(
  err: &'a (dyn std::error::Error + 'static),
) -> Option<&'a Error> {
  let mut current = Some(err);
  while let Some(e) = current {
    if let Some(core) = e.downcast_ref::<Error>()
      && !matches!(core, Error::Store(_))
    {
      return Some(core);
    }
    current = e.source();
  }
  None
}
