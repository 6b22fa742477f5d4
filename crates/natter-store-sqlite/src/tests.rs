//! Integration tests for `SqliteStore` against an in-memory database.

use natter_core::{
  comment::NewComment,
  forest::count_comments,
  store::CommentStore,
  thread::{ThreadOptions, build_threads},
};

use crate::SqliteStore;

async fn store() -> SqliteStore {
  SqliteStore::open_in_memory()
    .await
    .expect("in-memory store")
}

fn is_core(err: &crate::Error, pred: impl Fn(&natter_core::Error) -> bool) -> bool {
  matches!(err, crate::Error::Core(e) if pred(e))
}

// ─── Persist ─────────────────────────────────────────────────────────────────

#[tokio::test]
async fn persist_assigns_id_and_timestamps() {
  let s = store().await;

  let c = s
    .persist_comment(NewComment::root("post-1", "alice", "  hello  "))
    .await
    .unwrap();

  assert!(!c.id.is_empty());
  assert_eq!(c.entity_id, "post-1");
  assert_eq!(c.author_id, "alice");
  assert_eq!(c.content, "hello");
  assert_eq!(c.created_at, c.updated_at);
  assert!(!c.edited);
  assert!(c.is_root());

  let fetched = s.get_comment(&c.id).await.unwrap().unwrap();
  assert_eq!(fetched, c);
}

#[tokio::test]
async fn persist_reply_records_parent() {
  let s = store().await;
  let root = s
    .persist_comment(NewComment::root("post-1", "alice", "root"))
    .await
    .unwrap();

  let reply = s
    .persist_comment(NewComment::reply("post-1", "bob", &root.id, "new reply"))
    .await
    .unwrap();

  assert_eq!(reply.parent_id.as_deref(), Some(root.id.as_str()));
  assert_ne!(reply.id, root.id);
}

#[tokio::test]
async fn persist_blank_content_errors() {
  let s = store().await;
  let err = s
    .persist_comment(NewComment::root("post-1", "alice", " \t "))
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(e, natter_core::Error::EmptyContent)));
}

#[tokio::test]
async fn persist_reply_to_missing_parent_errors() {
  let s = store().await;
  let err = s
    .persist_comment(NewComment::reply("post-1", "bob", "nope", "hi"))
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(e, natter_core::Error::ParentNotFound(_))));
}

#[tokio::test]
async fn persist_reply_across_entities_errors() {
  let s = store().await;
  let root = s
    .persist_comment(NewComment::root("post-1", "alice", "root"))
    .await
    .unwrap();

  let err = s
    .persist_comment(NewComment::reply("post-2", "bob", &root.id, "wrong post"))
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(
    e,
    natter_core::Error::EntityMismatch { entity_id, .. } if entity_id == "post-2"
  )));
}

#[tokio::test]
async fn rejected_reply_leaves_no_row() {
  let s = store().await;
  let root = s
    .persist_comment(NewComment::root("post-1", "alice", "root"))
    .await
    .unwrap();
  s.delete_comment(&root.id).await.unwrap();

  let err = s
    .persist_comment(NewComment::reply("post-1", "bob", &root.id, "too late"))
    .await
    .unwrap_err();
  assert!(is_core(&err, |e| matches!(e, natter_core::Error::ParentNotFound(id) if id == &root.id)));
  assert!(s.fetch_flat_comments("post-1").await.unwrap().is_empty());

  s.persist_comment(NewComment::root("post-1", "alice", "after"))
    .await
    .unwrap();
  assert_eq!(s.fetch_flat_comments("post-1").await.unwrap().len(), 1);
}

// ─── Fetch ───────────────────────────────────────────────────────────────────

#[tokio::test]
async fn fetch_is_scoped_to_entity_in_insertion_order() {
  let s = store().await;
  let a = s
    .persist_comment(NewComment::root("post-1", "alice", "a"))
    .await
    .unwrap();
  s.persist_comment(NewComment::root("post-2", "alice", "elsewhere"))
    .await
    .unwrap();
  let b = s
    .persist_comment(NewComment::reply("post-1", "bob", &a.id, "b"))
    .await
    .unwrap();

  let flat = s.fetch_flat_comments("post-1").await.unwrap();
  let ids: Vec<&str> = flat.iter().map(|c| c.id.as_str()).collect();
  assert_eq!(ids, [a.id.as_str(), b.id.as_str()]);

  assert!(s.fetch_flat_comments("post-3").await.unwrap().is_empty());
}

#[tokio::test]
async fn fetched_batch_builds_into_thread() {
  let s = store().await;
  let root = s
    .persist_comment(NewComment::root("post-1", "alice", "root"))
    .await
    .unwrap();
  let reply = s
    .persist_comment(NewComment::reply("post-1", "bob", &root.id, "reply"))
    .await
    .unwrap();
  let nested = s
    .persist_comment(NewComment::reply("post-1", "carol", &reply.id, "nested"))
    .await
    .unwrap();

  let flat = s.fetch_flat_comments("post-1").await.unwrap();
  let forest = build_threads(&flat, &ThreadOptions::default()).unwrap();

  assert_eq!(forest.len(), 1);
  assert_eq!(forest[0].id, root.id);
  assert_eq!(forest[0].replies[0].id, reply.id);
  assert_eq!(forest[0].replies[0].replies[0].id, nested.id);
}

#[tokio::test]
async fn get_missing_comment_returns_none() {
  let s = store().await;
  assert!(s.get_comment("missing").await.unwrap().is_none());
}

// ─── Update ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn update_marks_edited_and_advances_timestamp() {
  let s = store().await;
  let c = s
    .persist_comment(NewComment::root("post-1", "alice", "first draft"))
    .await
    .unwrap();

  let updated = s.update_comment(&c.id, "second draft".into()).await.unwrap();

  assert_eq!(updated.id, c.id);
  assert_eq!(updated.content, "second draft");
  assert!(updated.edited);
  assert_eq!(updated.created_at, c.created_at);
  assert!(updated.updated_at >= c.updated_at);
}

#[tokio::test]
async fn update_missing_comment_errors() {
  let s = store().await;
  let err = s.update_comment("missing", "text".into()).await.unwrap_err();
  assert!(is_core(&err, |e| matches!(e, natter_core::Error::CommentNotFound(_))));
}

#[tokio::test]
async fn update_with_blank_content_errors() {
  let s = store().await;
  let c = s
    .persist_comment(NewComment::root("post-1", "alice", "text"))
    .await
    .unwrap();
  let err = s.update_comment(&c.id, "   ".into()).await.unwrap_err();
  assert!(is_core(&err, |e| matches!(e, natter_core::Error::EmptyContent)));
}

// ─── Delete ──────────────────────────────────────────────────────────────────

#[tokio::test]
async fn delete_leaves_replies_to_be_promoted() {
  let s = store().await;
  let root = s
    .persist_comment(NewComment::root("post-1", "alice", "root"))
    .await
    .unwrap();
  let reply = s
    .persist_comment(NewComment::reply("post-1", "bob", &root.id, "reply"))
    .await
    .unwrap();

  s.delete_comment(&root.id).await.unwrap();

  assert!(s.get_comment(&root.id).await.unwrap().is_none());
  let flat = s.fetch_flat_comments("post-1").await.unwrap();
  let forest = build_threads(&flat, &ThreadOptions::default()).unwrap();
  assert_eq!(count_comments(&forest), 1);
  assert_eq!(forest[0].id, reply.id);
}

#[tokio::test]
async fn delete_missing_comment_errors() {
  let s = store().await;
  let err = s.delete_comment("missing").await.unwrap_err();
  assert!(is_core(&err, |e| matches!(e, natter_core::Error::CommentNotFound(_))));
}

// ─── Persistence on disk ─────────────────────────────────────────────────────

#[tokio::test]
async fn reopening_file_store_keeps_comments() {
  let path = std::env::temp_dir().join(format!(
    "natter-store-{}.db",
    uuid::Uuid::new_v4()
  ));

  let id = {
    let s = SqliteStore::open(&path).await.unwrap();
    s.persist_comment(NewComment::root("post-1", "alice", "durable"))
      .await
      .unwrap()
      .id
  };

  let s = SqliteStore::open(&path).await.unwrap();
  let c = s.get_comment(&id).await.unwrap().unwrap();
  assert_eq!(c.content, "durable");

  drop(s);
  let _ = std::fs::remove_file(&path);
}
