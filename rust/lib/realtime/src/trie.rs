use std::collections::HashMap;
use std::sync::RwLock;

/// A thread-safe trie mapping listener patterns to values.
///
/// Patterns use `/` as the level separator. A `+` segment matches exactly
/// one level, so a child-added listener on `post-likes/p1` registers as
/// `post-likes/p1/+` and matches the topic `post-likes/p1/alice`.
pub(crate) struct PatternTrie<T> {
    root: RwLock<Node<T>>,
}

struct Node<T> {
    children: HashMap<String, Node<T>>,
    wildcard: Option<Box<Node<T>>>,
    values: Vec<T>,
}

impl<T> Default for Node<T> {
    fn default() -> Self {
        Self {
            children: HashMap::new(),
            wildcard: None,
            values: Vec::new(),
        }
    }
}

impl<T: Clone> PatternTrie<T> {
    pub fn new() -> Self {
        Self {
            root: RwLock::new(Node::default()),
        }
    }

    pub fn insert(&self, pattern: &str, value: T) {
        let mut root = self.root.write().unwrap();
        let mut node = &mut *root;
        for segment in pattern.split('/') {
            node = if segment == "+" {
                &mut **node.wildcard.get_or_insert_with(Box::default)
            } else {
                node.children.entry(segment.to_string()).or_default()
            };
        }
        node.values.push(value);
    }

    /// All values whose pattern matches the concrete topic.
    pub fn matches(&self, topic: &str) -> Vec<T> {
        let root = self.root.read().unwrap();
        let segments: Vec<&str> = topic.split('/').collect();
        let mut results = Vec::new();
        root.collect(&segments, &mut results);
        results
    }

    /// Remove values at the exact pattern for which `predicate` holds.
    pub fn remove<F>(&self, pattern: &str, predicate: F) -> bool
    where
        F: Fn(&T) -> bool,
    {
        let mut root = self.root.write().unwrap();
        let mut node = &mut *root;
        for segment in pattern.split('/') {
            let next = if segment == "+" {
                node.wildcard.as_deref_mut()
            } else {
                node.children.get_mut(segment)
            };
            match next {
                Some(child) => node = child,
                None => return false,
            }
        }
        let before = node.values.len();
        node.values.retain(|v| !predicate(v));
        node.values.len() < before
    }
}

impl<T: Clone> Node<T> {
    fn collect(&self, segments: &[&str], results: &mut Vec<T>) {
        let Some((first, rest)) = segments.split_first() else {
            results.extend(self.values.iter().cloned());
            return;
        };
        if let Some(child) = self.children.get(*first) {
            child.collect(rest, results);
        }
        if let Some(wildcard) = &self.wildcard {
            wildcard.collect(rest, results);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn exact_match() {
        let trie = PatternTrie::new();
        trie.insert("posts/p1", 1);
        assert_eq!(trie.matches("posts/p1"), vec![1]);
        assert!(trie.matches("posts/p2").is_empty());
        assert!(trie.matches("posts").is_empty());
    }

    #[test]
    fn wildcard_matches_one_level() {
        let trie = PatternTrie::new();
        trie.insert("post-likes/p1/+", 7);
        assert_eq!(trie.matches("post-likes/p1/alice"), vec![7]);
        assert!(trie.matches("post-likes/p1").is_empty());
        assert!(trie.matches("post-likes/p1/alice/x").is_empty());
        assert!(trie.matches("post-likes/p2/alice").is_empty());
    }

    #[test]
    fn exact_and_wildcard_both_match() {
        let trie = PatternTrie::new();
        trie.insert("a/b", 1);
        trie.insert("a/+", 2);
        trie.insert("+/b", 3);
        let mut got = trie.matches("a/b");
        got.sort();
        assert_eq!(got, vec![1, 2, 3]);
    }

    #[test]
    fn remove_by_predicate() {
        let trie = PatternTrie::new();
        trie.insert("notifications/bob/+", 1);
        trie.insert("notifications/bob/+", 2);

        assert!(trie.remove("notifications/bob/+", |v| *v == 1));
        assert_eq!(trie.matches("notifications/bob/n1"), vec![2]);
        assert!(!trie.remove("notifications/bob/+", |v| *v == 1));
        assert!(!trie.remove("never/+", |_| true));
    }
}
