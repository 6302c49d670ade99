use url::{ParseError, Url};

use crate::error::BlobError;

/// BlobStore holds post media (images) by key.
///
/// Keys are path-like strings: `post_images/4f1c.jpg`. A post stores the
/// reference it was uploaded under; [`media_key`] turns that reference
/// back into a key.
pub trait BlobStore: Send + Sync {
    /// Store a blob. Overwrites if the key already exists.
    fn put(&self, key: &str, data: &[u8]) -> Result<(), BlobError>;

    /// Retrieve a blob. Returns None if the key does not exist.
    fn get(&self, key: &str) -> Result<Option<Vec<u8>>, BlobError>;

    /// Delete a blob. No-op if the key does not exist.
    fn delete(&self, key: &str) -> Result<(), BlobError>;

    /// Check whether a blob exists.
    fn exists(&self, key: &str) -> Result<bool, BlobError>;
}

/// Resolve a stored media reference to a blob key.
///
/// Accepts either a bare key (`post_images/a.jpg`) or a download URL in
/// the hosted-storage shape
/// `https://host/v0/b/<bucket>/o/post_images%2Fa.jpg?alt=media&token=..`.
/// For URLs the object name after the last `o` segment is percent-decoded;
/// URLs without one fall back to their whole path.
pub fn media_key(reference: &str) -> Result<String, BlobError> {
    let invalid = || BlobError::InvalidReference(reference.to_string());

    let url = match Url::parse(reference) {
        Ok(url) => url,
        Err(ParseError::RelativeUrlWithoutBase) if !reference.is_empty() => {
            return Ok(reference.to_string());
        }
        Err(_) => return Err(invalid()),
    };

    let segments: Vec<&str> = url.path_segments().map(|s| s.collect()).unwrap_or_default();
    let object = match segments.iter().rposition(|s| *s == "o") {
        Some(i) => segments[i + 1..].join("/"),
        None => segments.join("/"),
    };

    let key = urlencoding::decode(&object).map_err(|_| invalid())?;
    if key.is_empty() {
        return Err(invalid());
    }
    Ok(key.into_owned())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bare_key_passes_through() {
        assert_eq!(media_key("post_images/a.jpg").unwrap(), "post_images/a.jpg");
    }

    #[test]
    fn download_url_is_decoded() {
        let url = "https://storage.example.com/v0/b/lavender.app/o/post_images%2Fa1.jpg?alt=media&token=t";
        assert_eq!(media_key(url).unwrap(), "post_images/a1.jpg");
    }

    #[test]
    fn plain_url_uses_path() {
        assert_eq!(
            media_key("file://localhost/post_images/b.jpg").unwrap(),
            "post_images/b.jpg"
        );
    }

    #[test]
    fn empty_and_broken_references_are_rejected() {
        assert!(media_key("").is_err());
        assert!(media_key("https://host").is_err());
        assert!(media_key("https://host/o/bad%ff").is_err());
    }
}
