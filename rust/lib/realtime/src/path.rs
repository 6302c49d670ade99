use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use lavender_core::new_id;

use crate::error::DbError;

const FORBIDDEN: &[char] = &['.', '#', '$', '[', ']'];

/// Check that `path` is a non-empty sequence of valid segments.
pub fn validate(path: &str) -> Result<(), DbError> {
    if path.is_empty() || !path.split('/').all(is_valid_segment) {
        return Err(DbError::InvalidPath(path.to_string()));
    }
    Ok(())
}

/// Whether a single key may be used as a path segment.
pub fn is_valid_segment(segment: &str) -> bool {
    // `+` alone is reserved for listener patterns.
    !segment.is_empty() && segment != "+" && !segment.contains(FORBIDDEN)
}

/// Join a base path and a child key.
pub fn child(base: &str, key: &str) -> String {
    format!("{}/{}", base, key)
}

/// Split a path into (parent, last segment). Returns None for single-segment paths.
pub fn split_last(path: &str) -> Option<(&str, &str)> {
    path.rsplit_once('/')
}

/// Every proper prefix of a path, shortest first: `a/b/c` → `a`, `a/b`.
pub(crate) fn proper_prefixes(path: &str) -> impl Iterator<Item = &str> {
    path.match_indices('/').map(move |(i, _)| &path[..i])
}

/// Allocate a unique child key that sorts after every key allocated before it.
///
/// Twelve hex digits of milliseconds since the epoch, then a per-process
/// sequence number, then random entropy.
pub fn push_id() -> String {
    static SEQ: AtomicU64 = AtomicU64::new(0);
    let millis = Utc::now().timestamp_millis().max(0) as u64;
    let seq = SEQ.fetch_add(1, Ordering::Relaxed) & 0xffff;
    format!("{:012x}{:04x}{}", millis, seq, &new_id()[..8])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validate_accepts_normal_paths() {
        assert!(validate("posts").is_ok());
        assert!(validate("user-likes/alice/-Nabc123").is_ok());
    }

    #[test]
    fn validate_rejects_bad_paths() {
        for bad in ["", "/posts", "posts/", "a//b", "a/b.c", "a/#", "a/$x", "a/[0]", "a/+"] {
            assert!(validate(bad).is_err(), "{bad:?} should be rejected");
        }
    }

    #[test]
    fn split_and_join() {
        assert_eq!(child("posts", "p1"), "posts/p1");
        assert_eq!(split_last("posts/p1/likes"), Some(("posts/p1", "likes")));
        assert_eq!(split_last("posts"), None);
    }

    #[test]
    fn proper_prefixes_shortest_first() {
        let prefixes: Vec<&str> = proper_prefixes("a/b/c").collect();
        assert_eq!(prefixes, vec!["a", "a/b"]);
        assert_eq!(proper_prefixes("a").count(), 0);
    }

    #[test]
    fn push_id_leads_with_current_millis() {
        let before = Utc::now().timestamp_millis() as u64;
        let id = push_id();
        let stamped = u64::from_str_radix(&id[..12], 16).unwrap();
        assert!(stamped >= before && stamped <= Utc::now().timestamp_millis() as u64);
    }

    #[test]
    fn push_ids_are_unique_and_ordered() {
        let ids: Vec<String> = (0..50).map(|_| push_id()).collect();
        for pair in ids.windows(2) {
            assert!(pair[0] < pair[1], "{} !< {}", pair[0], pair[1]);
        }
        assert!(ids.iter().all(|id| is_valid_segment(id)));
    }
}
