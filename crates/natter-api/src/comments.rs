//! Handlers for comment mutations and single-comment reads.
//!
//! | Method   | Path | Notes |
//! |----------|------|-------|
//! | `POST`   | `/entities/{entity_id}/comments` | Body: [`CreateBody`]; returns 201 + stored comment |
//! | `GET`    | `/comments/{id}` | Flat comment, 404 if not found |
//! | `PATCH`  | `/comments/{id}` | Body: `{"content":"..."}` |
//! | `DELETE` | `/comments/{id}` | 204; replies are kept |
//! | `POST`   | `/comments/{id}/replies` | Body: [`ReplyBody`]; returns 201 + stored reply |

use std::sync::Arc;

use axum::{
  Json,
  extract::{Path, State, rejection::JsonRejection},
  http::StatusCode,
  response::IntoResponse,
};
use natter_core::{
  comment::{Comment, NewComment},
  store::CommentStore,
};
use serde::Deserialize;

use crate::error::ApiError;

fn require_content(content: &str) -> Result<(), ApiError> {
  if content.trim().is_empty() {
    return Err(ApiError::BadRequest("content must not be empty".into()));
  }
  Ok(())
}

// ─── Create ───────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /entities/{entity_id}/comments`.
#[derive(Debug, Deserialize)]
pub struct CreateBody {
  pub author_id: String,
  pub content:   String,
  /// Reply to this comment instead of posting at the root.
  pub parent_id: Option<String>,
}

/// `POST /entities/{entity_id}/comments` — returns 201 + the stored comment.
pub async fn create<S>(
  State(store): State<Arc<S>>,
  Path(entity_id): Path<String>,
  body: Result<Json<CreateBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CommentStore,
{
  let Json(body) = body?;
  require_content(&body.content)?;

  let comment = store
    .persist_comment(NewComment {
      entity_id,
      author_id: body.author_id,
      content:   body.content,
      parent_id: body.parent_id,
    })
    .await
    .map_err(ApiError::from_store)?;

  tracing::debug!(comment_id = %comment.id, "created comment");
  Ok((StatusCode::CREATED, Json(comment)))
}

// ─── Reply ────────────────────────────────────────────────────────────────────

/// JSON body accepted by `POST /comments/{id}/replies`.
#[derive(Debug, Deserialize)]
pub struct ReplyBody {
  pub author_id: String,
  pub content:   String,
}

/// `POST /comments/{id}/replies` — the reply lands on the parent's entity.
pub async fn reply<S>(
  State(store): State<Arc<S>>,
  Path(parent_id): Path<String>,
  body: Result<Json<ReplyBody>, JsonRejection>,
) -> Result<impl IntoResponse, ApiError>
where
  S: CommentStore,
{
  let Json(body) = body?;
  require_content(&body.content)?;

  let parent = store
    .get_comment(&parent_id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| {
      ApiError::NotFound(format!("parent comment {parent_id} not found"))
    })?;

  let comment = store
    .persist_comment(NewComment::reply(
      parent.entity_id,
      body.author_id,
      parent.id,
      body.content,
    ))
    .await
    .map_err(ApiError::from_store)?;

  tracing::debug!(comment_id = %comment.id, parent_id = %parent_id, "created reply");
  Ok((StatusCode::CREATED, Json(comment)))
}

// ─── Get one ──────────────────────────────────────────────────────────────────

/// `GET /comments/{id}`
pub async fn get_one<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<Json<Comment>, ApiError>
where
  S: CommentStore,
{
  let comment = store
    .get_comment(&id)
    .await
    .map_err(ApiError::from_store)?
    .ok_or_else(|| ApiError::NotFound(format!("comment {id} not found")))?;
  Ok(Json(comment))
}

// ─── Edit ─────────────────────────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
pub struct EditBody {
  pub content: String,
}

/// `PATCH /comments/{id}` — body: `{"content":"..."}`.
pub async fn edit<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
  body: Result<Json<EditBody>, JsonRejection>,
) -> Result<Json<Comment>, ApiError>
where
  S: CommentStore,
{
  let Json(body) = body?;
  require_content(&body.content)?;

  let comment = store
    .update_comment(&id, body.content)
    .await
    .map_err(ApiError::from_store)?;
  Ok(Json(comment))
}

// ─── Delete ───────────────────────────────────────────────────────────────────

/// `DELETE /comments/{id}`
pub async fn remove<S>(
  State(store): State<Arc<S>>,
  Path(id): Path<String>,
) -> Result<StatusCode, ApiError>
where
  S: CommentStore,
{
  store
    .delete_comment(&id)
    .await
    .map_err(ApiError::from_store)?;
  tracing::debug!(comment_id = %id, "deleted comment");
  Ok(StatusCode::NO_CONTENT)
}
