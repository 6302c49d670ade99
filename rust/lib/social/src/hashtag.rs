/// Hashtags in a caption, in order of first appearance.
///
/// A whitespace-separated word is a hashtag when it starts with `#`. The
/// tag is the word with leading and trailing non-alphanumeric characters
/// stripped; words that strip to nothing are dropped.
pub fn hashtags(caption: &str) -> Vec<String> {
    let mut tags: Vec<String> = Vec::new();
    for word in caption.split_whitespace().filter(|w| w.starts_with('#')) {
        let tag = word.trim_matches(|c: char| !c.is_alphanumeric());
        if !tag.is_empty() && !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }
    tags
}
