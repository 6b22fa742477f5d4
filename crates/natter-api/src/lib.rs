//! JSON REST API for Natter.
//!
//! Exposes an axum [`Router`] backed by any
//! [`natter_core::store::CommentStore`]. Auth, TLS, and transport concerns are
//! the caller's responsibility.
//!
//! # Mounting
//!
//! ```rust,ignore
//! .nest("/api", natter_api::api_router(store.clone()))
//! ```

pub mod comments;
pub mod error;
pub mod threads;

use std::sync::Arc;

use axum::{
  Router,
  routing::{get, post},
};
use natter_core::store::CommentStore;

pub use error::ApiError;

/// Build a fully-materialised API router for `store`.
///
/// The returned `Router<()>` can be nested into any parent router regardless
/// of its own state type.
pub fn api_router<S>(store: Arc<S>) -> Router<()>
where
  S: CommentStore + Send + Sync + 'static,
{
  Router::new()
    // Threads
    .route(
      "/entities/{entity_id}/comments",
      get(threads::get_thread::<S>).post(comments::create::<S>),
    )
    // Single comments
    .route(
      "/comments/{id}",
      get(comments::get_one::<S>)
        .patch(comments::edit::<S>)
        .delete(comments::remove::<S>),
    )
    .route("/comments/{id}/replies", post(comments::reply::<S>))
    .with_state(store)
}
