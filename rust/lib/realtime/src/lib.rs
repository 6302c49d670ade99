//! Realtime tree: a hierarchical JSON database over a flat KV store.
//!
//! Models the hosted realtime backend the client talks to:
//!
//! - `update(path, fields)` merges children at a path
//! - `set_value(path, value)` / `remove_value(path)` replace a subtree
//! - `read_once(path)` reads a subtree one time
//! - `observe_child_added(path)` streams existing and future children
//! - `child_by_auto_id(path)` allocates a unique, time-ordered child key
//!
//! There are no multi-path transactions. Each call stands alone, and
//! callers that touch several paths must tolerate partial failure.
//!
//! # Path Addressing
//!
//! Paths are `/`-separated: `posts/{postId}/likes`,
//! `user-likes/{uid}/{postId}`. Segments may not be empty or contain
//! `.`, `#`, `$`, `[` or `]`.

pub mod error;
pub mod listener;
pub mod path;
pub mod traits;
pub mod tree;
mod trie;

pub use error::DbError;
pub use listener::{ChildAdded, ChildEvent};
pub use traits::RealtimeDb;
pub use tree::TreeDb;
