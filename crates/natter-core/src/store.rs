//! The `CommentStore` trait.
//!
//! The trait is implemented by storage backends (e.g. `natter-store-sqlite`).
//! Higher layers (`natter-api`, [`crate::session`]) depend on this
//! abstraction, not on any concrete backend.

use std::future::Future;

use crate::comment::{Comment, NewComment};

/// Abstraction over a Natter comment store backend.
///
/// The store deals in flat records only; threading happens on read through
/// [`crate::thread::build_threads`]. Domain failures (unknown comment, empty
/// content, cross-entity reply) should be reported by wrapping the matching
/// [`crate::Error`] variant so callers can classify them with
/// [`crate::error::find_core_error`].
///
/// All methods return `Send` futures so the trait can be used in multi-threaded
/// async runtimes (e.g. tokio with `axum`).
pub trait CommentStore: Send + Sync {
  type Error: std::error::Error + Send + Sync + 'static;

  /// Return every comment on `entity_id`, at any depth, in insertion order.
  fn fetch_flat_comments<'a>(
    &'a self,
    entity_id: &'a str,
  ) -> impl Future<Output = Result<Vec<Comment>, Self::Error>> + Send + 'a;

  /// Persist a new comment and return it with its server-assigned `id`,
  /// `created_at` and `updated_at`.
  ///
  /// Returns an error if the content is blank, if `parent_id` names a comment
  /// that does not exist, or if that parent belongs to another entity.
  fn persist_comment(
    &self,
    input: NewComment,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + '_;

  /// Retrieve a single flat comment by id. Returns `None` if not found.
  fn get_comment<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<Option<Comment>, Self::Error>> + Send + 'a;

  /// Replace a comment's content, marking it edited and advancing
  /// `updated_at`.
  fn update_comment<'a>(
    &'a self,
    id: &'a str,
    content: String,
  ) -> impl Future<Output = Result<Comment, Self::Error>> + Send + 'a;

  /// Remove a single comment. Its replies stay in the store and surface as
  /// roots on the next build.
  fn delete_comment<'a>(
    &'a self,
    id: &'a str,
  ) -> impl Future<Output = Result<(), Self::Error>> + Send + 'a;
}
