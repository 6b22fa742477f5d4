//! Navigation and local patching of built comment forests.
//!
//! Everything here is iterative; thread depth never grows the call stack.

use crate::{
  comment::Comment,
  thread::{ReplyDepth, ThreadOptions},
};

// ─── Walking ─────────────────────────────────────────────────────────────────

/// Depth-first, pre-order iterator over a forest. Roots have depth 0.
pub struct Walk<'a> {
  stack: Vec<(usize, &'a Comment)>,
}

impl<'a> Iterator for Walk<'a> {
  type Item = (usize, &'a Comment);

  fn next(&mut self) -> Option<Self::Item> {
    let (depth, comment) = self.stack.pop()?;
    self
      .stack
      .extend(comment.replies.iter().rev().map(|r| (depth + 1, r)));
    Some((depth, comment))
  }
}

/// Walk every comment in `forest`, parents before their replies.
pub fn walk(forest: &[Comment]) -> Walk<'_> {
  Walk {
    stack: forest.iter().rev().map(|c| (0, c)).collect(),
  }
}

/// Number of comments reachable from `forest`, replies included.
pub fn count_comments(forest: &[Comment]) -> usize { walk(forest).count() }

// ─── Lookup ──────────────────────────────────────────────────────────────────

pub fn find_comment<'a>(forest: &'a [Comment], id: &str) -> Option<&'a Comment> {
  walk(forest).map(|(_, c)| c).find(|c| c.id == id)
}

pub fn find_comment_mut<'a>(
  forest: &'a mut [Comment],
  id: &str,
) -> Option<&'a mut Comment> {
  let mut stack: Vec<&'a mut Comment> = forest.iter_mut().collect();
  while let Some(node) = stack.pop() {
    if node.id == id {
      return Some(node);
    }
    stack.extend(node.replies.iter_mut());
  }
  None
}

// ─── Incremental insert ──────────────────────────────────────────────────────

/// Where [`insert_comment`] put a comment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Placement {
  /// Appended as a new root; either it has no parent or the parent is not in
  /// the forest.
  Root,
  /// Attached to the `replies` of the comment with this id.
  Reply { under: String },
}

/// Insert a freshly persisted comment into an already-built forest.
///
/// The sibling list that receives the comment is re-sorted with the order
/// configured in `options`, so the result matches what a full rebuild would
/// produce for the same records.
pub fn insert_comment(
  forest: &mut Vec<Comment>,
  mut comment: Comment,
  options: &ThreadOptions,
) -> Placement {
  comment.replies.clear();

  if let Some(parent_id) = comment.parent_id.clone() {
    let host = match options.depth {
      ReplyDepth::Nested => find_comment_mut(forest, &parent_id),
      ReplyDepth::Flat => forest.iter_mut().find(|root| {
        root.id == parent_id || root.replies.iter().any(|r| r.id == parent_id)
      }),
    };

    if let Some(host) = host {
      let under = host.id.clone();
      host.replies.push(comment);
      options.replies.sort(&mut host.replies);
      return Placement::Reply { under };
    }

    tracing::debug!(
      comment_id = %comment.id,
      parent_id = %parent_id,
      "parent not in forest; inserting comment as root"
    );
  }

  forest.push(comment);
  options.roots.sort(forest);
  Placement::Root
}

/// Replace the content of comment `updated.id` in place, keeping its replies.
///
/// Returns `false` if the comment is not in the forest.
pub fn patch_comment(forest: &mut [Comment], updated: &Comment) -> bool {
  match find_comment_mut(forest, &updated.id) {
    Some(node) => {
      node.content = updated.content.clone();
      node.updated_at = updated.updated_at;
      node.edited = updated.edited;
      true
    }
    None => false,
  }
}
