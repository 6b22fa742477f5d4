//! Handler for `GET /entities/{entity_id}/comments`.
//!
//! Query params select the ordering and depth policy; all are optional and
//! fall back to [`ThreadOptions::default`].

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, Query, State, rejection::QueryRejection},
};
use natter_core::{
  store::CommentStore,
  thread::{CommentThread, ReplyDepth, ThreadOptions, ThreadOrder, build_threads},
};
use serde::Deserialize;

use crate::error::ApiError;

#[derive(Debug, Deserialize, Default)]
pub struct ThreadParams {
  /// Order of root comments: `input`, `oldest_first` or `newest_first`.
  pub order:       Option<ThreadOrder>,
  /// Order of each reply list.
  pub reply_order: Option<ThreadOrder>,
  /// `nested` (any depth) or `flat` (two levels).
  pub depth:       Option<ReplyDepth>,
}

impl ThreadParams {
  pub fn options(&self) -> ThreadOptions {
    let defaults = ThreadOptions::default();
    ThreadOptions {
      roots:   self.order.unwrap_or(defaults.roots),
      replies: self.reply_order.unwrap_or(defaults.replies),
      depth:   self.depth.unwrap_or(defaults.depth),
    }
  }
}

/// `GET /entities/{entity_id}/comments[?order=...][&reply_order=...][&depth=...]`
///
/// A batch that fails validation is logged and served as an empty thread.
pub async fn get_thread<S>(
  State(store): State<Arc<S>>,
  Path(entity_id): Path<String>,
  params: Result<Query<ThreadParams>, QueryRejection>,
) -> Result<Json<CommentThread>, ApiError>
where
  S: CommentStore,
{
  let Query(params) = params?;
  let flat = store
    .fetch_flat_comments(&entity_id)
    .await
    .map_err(ApiError::from_store)?;

  let thread = match build_threads(&flat, &params.options()) {
    Ok(forest) => CommentThread::new(entity_id, forest),
    Err(e) => {
      tracing::warn!(entity_id = %entity_id, error = %e, "serving empty thread for malformed batch");
      CommentThread::empty(entity_id)
    }
  };
  Ok(Json(thread))
}
