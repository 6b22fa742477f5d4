//! SQL schema for the Natter SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;

-- Flat comment rows. `parent_id` is deliberately not a foreign key: deleting
-- a comment leaves its replies in place and the thread builder promotes them.
CREATE TABLE IF NOT EXISTS comments (
    comment_id  TEXT PRIMARY KEY,
    entity_id   TEXT NOT NULL,
    parent_id   TEXT,
    author_id   TEXT NOT NULL,
    content     TEXT NOT NULL,
    created_at  TEXT NOT NULL,   -- ISO 8601 UTC; server-assigned
    updated_at  TEXT NOT NULL,   -- ISO 8601 UTC; advances on edit
    edited      INTEGER NOT NULL DEFAULT 0,
    CHECK (parent_id IS NULL OR parent_id != comment_id)
);

CREATE INDEX IF NOT EXISTS comments_entity_idx ON comments(entity_id);
CREATE INDEX IF NOT EXISTS comments_parent_idx ON comments(parent_id);

PRAGMA user_version = 1;
";
