//! Thread building: flat comment batches → ordered forests.
//!
//! Steps:
//! 1. Validate every record and index it by id
//! 2. Resolve each record's parent, promoting orphans to root
//! 3. Break parent cycles by demoting the record that closes the loop
//! 4. Group children under parents in input order
//! 5. Assemble the forest bottom-up, sorting each sibling list
//!
//! Hash maps are used for lookup only. Output order is input order refined by
//! a stable sort, so a fixed batch always produces the same forest.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::{Error, Result, comment::Comment, forest::count_comments};

// ─── Options ─────────────────────────────────────────────────────────────────

/// How a list of sibling comments is ordered.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ThreadOrder {
  /// First-seen order of the input batch.
  #[default]
  Input,
  OldestFirst,
  NewestFirst,
}

impl ThreadOrder {
  /// Sort `comments` in place. Ties keep their existing relative order.
  pub fn sort(self, comments: &mut [Comment]) {
    match self {
      Self::Input => {}
      Self::OldestFirst => {
        comments.sort_by(|a, b| a.created_at.cmp(&b.created_at))
      }
      Self::NewestFirst => {
        comments.sort_by(|a, b| b.created_at.cmp(&a.created_at))
      }
    }
  }
}

/// How deep replies are nested below a root.
#[derive(
  Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum ReplyDepth {
  /// Every comment hangs under its own parent, at any depth.
  #[default]
  Nested,
  /// Two levels only: a root's `replies` holds all of its descendants.
  Flat,
}

/// Parameters for [`build_threads`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ThreadOptions {
  pub roots:   ThreadOrder,
  pub replies: ThreadOrder,
  pub depth:   ReplyDepth,
}

impl Default for ThreadOptions {
  /// Newest conversations first, each read top to bottom.
  fn default() -> Self {
    Self {
      roots:   ThreadOrder::NewestFirst,
      replies: ThreadOrder::OldestFirst,
      depth:   ReplyDepth::Nested,
    }
  }
}

// ─── Report ──────────────────────────────────────────────────────────────────

/// Recoverable anomalies corrected during a build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildReport {
  /// Records whose parent was absent from the batch (or on another entity).
  pub orphans: Vec<String>,
  /// Records cut from their parent to break a cycle.
  pub demoted: Vec<String>,
}

// ─── Envelope ────────────────────────────────────────────────────────────────

/// A built forest for one entity, as handed to presentation layers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentThread {
  pub entity_id: String,
  /// Number of comments reachable in `comments`, replies included.
  pub total:     usize,
  pub comments:  Vec<Comment>,
}

impl CommentThread {
  pub fn new(entity_id: impl Into<String>, comments: Vec<Comment>) -> Self {
    Self {
      entity_id: entity_id.into(),
      total: count_comments(&comments),
      comments,
    }
  }

  pub fn empty(entity_id: impl Into<String>) -> Self {
    Self::new(entity_id, Vec::new())
  }

  /// Most recent `created_at` anywhere in the thread.
  pub fn last_activity(&self) -> Option<DateTime<Utc>> {
    crate::forest::walk(&self.comments)
      .map(|(_, c)| c.created_at)
      .max()
  }
}

// ─── Builder ─────────────────────────────────────────────────────────────────

/// Build a forest from a flat batch of comments belonging to one entity.
///
/// Fails if any record is missing a required field or reuses an id; the caller
/// should then treat the entity as having no comments rather than render a
/// partial forest.
pub fn build_threads(
  comments: &[Comment],
  options: &ThreadOptions,
) -> Result<Vec<Comment>> {
  build_threads_with_report(comments, options).map(|(forest, _)| forest)
}

/// Like [`build_threads`], also reporting the orphans and cycles it corrected.
pub fn build_threads_with_report(
  comments: &[Comment],
  options: &ThreadOptions,
) -> Result<(Vec<Comment>, BuildReport)> {
  let mut report = BuildReport::default();
  if comments.is_empty() {
    return Ok((Vec::new(), report));
  }

  let index = index_by_id(comments)?;
  let mut parents = resolve_parents(comments, &index, &mut report);
  break_cycles(comments, &mut parents, &mut report);

  let count = comments.len();
  let mut roots: Vec<usize> = Vec::new();
  let mut children: Vec<Vec<usize>> = vec![Vec::new(); count];
  for (i, parent) in parents.iter().enumerate() {
    match parent {
      Some(p) => children[*p].push(i),
      None => roots.push(i),
    }
  }

  let mut forest = match options.depth {
    ReplyDepth::Nested => assemble_nested(comments, &roots, &children, options),
    ReplyDepth::Flat => assemble_flat(comments, &roots, &children, options),
  };
  options.roots.sort(&mut forest);

  Ok((forest, report))
}

/// Step 1: reject malformed records and map id → position.
fn index_by_id(comments: &[Comment]) -> Result<HashMap<&str, usize>> {
  let mut index: HashMap<&str, usize> = HashMap::with_capacity(comments.len());
  for (i, comment) in comments.iter().enumerate() {
    if let Some(field) = comment.missing_field() {
      return Err(Error::Validation { index: i, field });
    }
    if index.insert(comment.id.as_str(), i).is_some() {
      return Err(Error::DuplicateId {
        index: i,
        id:    comment.id.clone(),
      });
    }
  }
  Ok(index)
}

/// Step 2: map each record to the position of its parent, if usable.
fn resolve_parents(
  comments: &[Comment],
  index: &HashMap<&str, usize>,
  report: &mut BuildReport,
) -> Vec<Option<usize>> {
  comments
    .iter()
    .map(|comment| {
      let parent_id = comment.parent_id.as_deref()?;

      if parent_id == comment.id {
        tracing::warn!(comment_id = %comment.id, "comment is its own parent; treating as root");
        report.demoted.push(comment.id.clone());
        return None;
      }

      match index.get(parent_id) {
        Some(&p) if comments[p].entity_id == comment.entity_id => Some(p),
        _ => {
          tracing::debug!(
            comment_id = %comment.id,
            parent_id,
            "parent not in batch; promoting comment to root"
          );
          report.orphans.push(comment.id.clone());
          None
        }
      }
    })
    .collect()
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Visit {
  Unseen,
  OnPath,
  Done,
}

/// Step 3: cut parent edges that would close a loop.
///
/// Walks the parent chain from each record in input order. When the walk
/// reaches a record already on the current path, the last record pushed (the
/// one whose parent edge closes the loop) becomes a root.
fn break_cycles(
  comments: &[Comment],
  parents: &mut [Option<usize>],
  report: &mut BuildReport,
) {
  let mut state = vec![Visit::Unseen; comments.len()];
  let mut path: Vec<usize> = Vec::new();

  for start in 0..comments.len() {
    let mut cursor = Some(start);
    while let Some(i) = cursor {
      match state[i] {
        Visit::Unseen => {
          state[i] = Visit::OnPath;
          path.push(i);
          cursor = parents[i];
        }
        Visit::OnPath => {
          if let Some(&last) = path.last() {
            tracing::warn!(
              comment_id = %comments[last].id,
              parent_id = %comments[i].id,
              "reply cycle detected; treating comment as root"
            );
            parents[last] = None;
            report.demoted.push(comments[last].id.clone());
          }
          cursor = None;
        }
        Visit::Done => cursor = None,
      }
    }
    for i in path.drain(..) {
      state[i] = Visit::Done;
    }
  }
}

/// Step 5 (nested): attach every record under its parent.
///
/// Builds bottom-up from a preorder listing so that arbitrarily deep threads
/// never recurse.
fn assemble_nested(
  comments: &[Comment],
  roots: &[usize],
  children: &[Vec<usize>],
  options: &ThreadOptions,
) -> Vec<Comment> {
  let mut preorder: Vec<usize> = Vec::with_capacity(comments.len());
  let mut stack: Vec<usize> = roots.iter().rev().copied().collect();
  while let Some(i) = stack.pop() {
    preorder.push(i);
    stack.extend(children[i].iter().rev());
  }

  let mut built: Vec<Option<Comment>> =
    comments.iter().map(|c| Some(c.detached())).collect();

  for &i in preorder.iter().rev() {
    let mut replies: Vec<Comment> =
      children[i].iter().filter_map(|&c| built[c].take()).collect();
    options.replies.sort(&mut replies);
    if let Some(node) = built[i].as_mut() {
      node.replies = replies;
    }
  }

  roots.iter().filter_map(|&r| built[r].take()).collect()
}

/// Step 5 (flat): hang every descendant directly under its root.
fn assemble_flat(
  comments: &[Comment],
  roots: &[usize],
  children: &[Vec<usize>],
  options: &ThreadOptions,
) -> Vec<Comment> {
  roots
    .iter()
    .map(|&r| {
      let mut descendants: Vec<usize> = Vec::new();
      let mut stack: Vec<usize> = children[r].clone();
      while let Some(i) = stack.pop() {
        descendants.push(i);
        stack.extend(children[i].iter());
      }
      descendants.sort_unstable();

      let mut replies: Vec<Comment> =
        descendants.iter().map(|&i| comments[i].detached()).collect();
      options.replies.sort(&mut replies);

      let mut root = comments[r].detached();
      root.replies = replies;
      root
    })
    .collect()
}
