use std::path::PathBuf;

use serde::Deserialize;

/// Storage configuration shared by the Lavender binaries.
///
/// Read from a `[storage]` table in the TOML config file, overlaid with
/// command-line flags, then handed to the storage layer.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Root directory for all local state.
    pub data_dir: Option<PathBuf>,

    /// Path to the redb database backing the realtime tree.
    /// Defaults to `{data_dir}/lavender.redb`.
    pub db_path: Option<PathBuf>,

    /// Directory for media blobs.
    /// Defaults to `{data_dir}/media/`.
    pub blob_dir: Option<PathBuf>,
}

impl ServiceConfig {
    /// Overlay every value set in `other`, typically command-line flags
    /// on top of the config file.
    pub fn merge(&mut self, other: ServiceConfig) {
        if other.data_dir.is_some() {
            self.data_dir = other.data_dir;
        }
        if other.db_path.is_some() {
            self.db_path = other.db_path;
        }
        if other.blob_dir.is_some() {
            self.blob_dir = other.blob_dir;
        }
    }

    /// Resolve the redb database path, falling back to `{data_dir}/lavender.redb`.
    pub fn resolve_db_path(&self) -> PathBuf {
        self.db_path
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("lavender.redb"))
    }

    /// Resolve the media blob directory.
    pub fn resolve_blob_dir(&self) -> PathBuf {
        self.blob_dir
            .clone()
            .unwrap_or_else(|| self.resolve_data_subpath("media"))
    }

    fn resolve_data_subpath(&self, name: &str) -> PathBuf {
        self.data_dir
            .as_ref()
            .map(|d| d.join(name))
            .unwrap_or_else(|| PathBuf::from(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_merge_keeps_unset_values() {
        let mut config = ServiceConfig {
            data_dir: Some(PathBuf::from("/tmp/lavender")),
            blob_dir: Some(PathBuf::from("/srv/media")),
            ..Default::default()
        };
        config.merge(ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        });
        assert_eq!(config.data_dir, Some(PathBuf::from("/data")));
        assert_eq!(config.resolve_blob_dir(), PathBuf::from("/srv/media"));
        assert_eq!(config.db_path, None);
    }

    #[test]
    fn test_resolve_defaults() {
        let config = ServiceConfig {
            data_dir: Some(PathBuf::from("/data")),
            ..Default::default()
        };
        assert_eq!(config.resolve_db_path(), PathBuf::from("/data/lavender.redb"));
        assert_eq!(config.resolve_blob_dir(), PathBuf::from("/data/media"));
    }

    #[test]
    fn test_resolve_without_data_dir() {
        let config = ServiceConfig::default();
        assert_eq!(config.resolve_db_path(), PathBuf::from("lavender.redb"));
    }

    #[test]
    fn test_cli_overrides_file_values() {
        let mut config: ServiceConfig = serde_json::from_value(serde_json::json!({
            "data_dir": "/from/file",
            "db_path": "/from/file/db.redb",
        }))
        .unwrap();
        config.merge(ServiceConfig {
            db_path: Some(PathBuf::from("/from/cli.redb")),
            ..Default::default()
        });
        assert_eq!(config.data_dir, Some(PathBuf::from("/from/file")));
        assert_eq!(config.resolve_db_path(), PathBuf::from("/from/cli.redb"));
    }
}
