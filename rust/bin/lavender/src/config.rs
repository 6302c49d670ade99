//! CLI configuration.
//!
//! Reads `lavender.toml` from the working directory unless `--config`
//! points elsewhere. A missing file means defaults.

use std::path::{Path, PathBuf};

use lavender_core::ServiceConfig;
use lavender_social::StorePaths;
use serde::Deserialize;

#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Uid the CLI acts as. Empty means signed out.
    #[serde(default)]
    pub uid: String,

    /// Where the tree and media live.
    #[serde(default)]
    pub storage: ServiceConfig,

    /// Root paths of the social trees.
    #[serde(default)]
    pub paths: StorePaths,
}

impl AppConfig {
    pub fn default_path() -> PathBuf {
        PathBuf::from("lavender.toml")
    }

    /// Load config from disk, or return default if the file doesn't exist.
    pub fn load(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        let config: AppConfig = toml::from_str(&content)
            .map_err(|e| anyhow::anyhow!("invalid config {}: {}", path.display(), e))?;
        config.paths.validate()?;
        Ok(config)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_file_is_default() {
        let tmp = tempfile::TempDir::new().unwrap();
        let config = AppConfig::load(&tmp.path().join("absent.toml")).unwrap();
        assert!(config.uid.is_empty());
        assert_eq!(config.paths, StorePaths::default());
    }

    #[test]
    fn test_full_file() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("lavender.toml");
        std::fs::write(
            &path,
            r#"
uid = "alice"

[storage]
data_dir = "/var/lib/lavender"

[paths]
notifications = "inbox"
"#,
        )
        .unwrap();

        let config = AppConfig::load(&path).unwrap();
        assert_eq!(config.uid, "alice");
        assert_eq!(
            config.storage.resolve_db_path(),
            PathBuf::from("/var/lib/lavender/lavender.redb")
        );
        assert_eq!(config.paths.notifications("bob"), "inbox/bob");
        assert_eq!(config.paths.user_likes, "user-likes");
    }

    #[test]
    fn test_invalid_root_is_rejected() {
        let tmp = tempfile::TempDir::new().unwrap();
        let path = tmp.path().join("lavender.toml");
        std::fs::write(&path, "[paths]\nposts = \"po$ts\"\n").unwrap();
        assert!(AppConfig::load(&path).is_err());
    }
}
