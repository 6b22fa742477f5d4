//! Natter HTTP server: configuration loading and application assembly.
//!
//! The binary in `main.rs` is a thin wrapper around [`load_config`] and
//! [`app`] so both can be exercised without binding a socket.

use std::{
  path::{Path, PathBuf},
  sync::Arc,
};

use axum::Router;
use natter_core::store::CommentStore;
use serde::Deserialize;
use tower_http::trace::TraceLayer;

// ─── Configuration ────────────────────────────────────────────────────────────

/// Runtime server configuration, deserialised from `config.toml` and
/// `NATTER_*` environment variables.
#[derive(Debug, Deserialize, Clone, PartialEq, Eq)]
pub struct ServerConfig {
  pub host:       String,
  pub port:       u16,
  /// SQLite database file; a leading `~/` expands to `$HOME`.
  pub store_path: PathBuf,
}

/// Read configuration from `path` (optional) layered under the environment.
pub fn load_config(path: &Path) -> Result<ServerConfig, config::ConfigError> {
  config::Config::builder()
    .set_default("host", "127.0.0.1")?
    .set_default("port", 8080)?
    .set_default("store_path", "natter.db")?
    .add_source(config::File::from(path).required(false))
    .add_source(config::Environment::with_prefix("NATTER"))
    .build()?
    .try_deserialize()
}

/// Expand a leading `~` to the user's home directory.
pub fn expand_tilde(path: &Path) -> PathBuf {
  let s = path.to_string_lossy();
  if let Some(rest) = s.strip_prefix("~/")
    && let Ok(home) = std::env::var("HOME")
  {
    return PathBuf::from(home).join(rest);
  }
  path.to_path_buf()
}

// ─── Application ──────────────────────────────────────────────────────────────

/// The full application: the JSON API under `/api`, with request tracing.
pub fn app<S>(store: Arc<S>) -> Router
where
  S: CommentStore + Send + Sync + 'static,
{
  Router::new()
    .nest("/api", natter_api::api_router(store))
    .layer(TraceLayer::new_for_http())
}

#[cfg(test)]
mod tests {
  use super::*;

  use axum::{
    body::Body,
    http::{Request, StatusCode},
  };
  use natter_store_sqlite::SqliteStore;
  use tower::ServiceExt as _;

  fn scratch_file(name: &str) -> PathBuf {
    std::env::temp_dir()
      .join(format!("natter-server-{}-{name}", std::process::id()))
  }

  #[test]
  fn missing_config_file_uses_defaults() {
    let cfg = load_config(&scratch_file("absent.toml")).unwrap();
    assert_eq!(cfg.port, 8080);
    assert_eq!(cfg.store_path, PathBuf::from("natter.db"));
  }

  #[test]
  fn config_file_overrides_defaults() {
    let path = scratch_file("config.toml");
    std::fs::write(&path, "port = 9191\nstore_path = \"/tmp/comments.db\"\n")
      .unwrap();

    let cfg = load_config(&path).unwrap();
    let _ = std::fs::remove_file(&path);

    assert_eq!(cfg.port, 9191);
    assert_eq!(cfg.store_path, PathBuf::from("/tmp/comments.db"));
  }

  #[test]
  fn tilde_expands_only_at_start() {
    let home = std::env::var("HOME").unwrap_or_default();
    if !home.is_empty() {
      assert_eq!(
        expand_tilde(Path::new("~/natter.db")),
        PathBuf::from(&home).join("natter.db")
      );
    }
    assert_eq!(
      expand_tilde(Path::new("/var/lib/~/natter.db")),
      PathBuf::from("/var/lib/~/natter.db")
    );
  }

  #[tokio::test]
  async fn app_serves_api_under_prefix() {
    let store = Arc::new(SqliteStore::open_in_memory().await.unwrap());

    let req = Request::builder()
      .uri("/api/entities/post-1/comments")
      .body(Body::empty())
      .unwrap();
    let resp = app(store.clone()).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);

    let req = Request::builder()
      .uri("/entities/post-1/comments")
      .body(Body::empty())
      .unwrap();
    let resp = app(store).oneshot(req).await.unwrap();
    assert_eq!(resp.status(), StatusCode::NOT_FOUND);
  }
}
