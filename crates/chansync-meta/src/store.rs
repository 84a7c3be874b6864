//! Format-agnostic configuration loading

use std::fs;
use std::path::Path;

use serde::de::DeserializeOwned;

use crate::{Error, Result};

/// Largest configuration file the store will read.
pub const MAX_CONFIG_BYTES: u64 = 1024 * 1024;

/// Format-agnostic configuration store.
///
/// Detects the format from the file extension and deserializes
/// transparently:
/// - `.yaml`, `.yml` -> YAML
/// - `.json` -> JSON
/// - `.toml` -> TOML
#[derive(Debug, Clone, Copy)]
pub struct ConfigStore {
    max_bytes: u64,
}

impl Default for ConfigStore {
    fn default() -> Self {
        Self {
            max_bytes: MAX_CONFIG_BYTES,
        }
    }
}

impl ConfigStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that rejects files larger than `max_bytes`.
    pub fn with_max_bytes(max_bytes: u64) -> Self {
        Self { max_bytes }
    }

    /// Load and deserialize a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read, exceeds the size limit,
    /// has an unknown extension, or does not decode into `T`.
    pub fn load<T: DeserializeOwned>(&self, path: &Path) -> Result<T> {
        let content = self.read_text(path)?;
        let extension = path
            .extension()
            .and_then(|ext| ext.to_str())
            .unwrap_or("");

        match extension.to_lowercase().as_str() {
            "yaml" | "yml" => serde_yaml::from_str(&content).map_err(|e| Error::ConfigParse {
                path: path.to_path_buf(),
                format: "YAML".into(),
                message: e.to_string(),
            }),
            "json" => serde_json::from_str(&content).map_err(|e| Error::ConfigParse {
                path: path.to_path_buf(),
                format: "JSON".into(),
                message: e.to_string(),
            }),
            "toml" => toml::from_str(&content).map_err(|e| Error::ConfigParse {
                path: path.to_path_buf(),
                format: "TOML".into(),
                message: e.to_string(),
            }),
            _ => Err(Error::UnsupportedFormat {
                extension: extension.to_string(),
            }),
        }
    }

    fn read_text(&self, path: &Path) -> Result<String> {
        let metadata = fs::metadata(path).map_err(|e| Error::io(path, e))?;
        if metadata.is_dir() {
            return Err(Error::DirectoryNotSupported {
                path: path.to_path_buf(),
            });
        }
        if metadata.len() > self.max_bytes {
            return Err(Error::ConfigTooLarge {
                path: path.to_path_buf(),
                size: metadata.len(),
                max: self.max_bytes,
            });
        }

        tracing::debug!(path = %path.display(), bytes = metadata.len(), "Reading config file");
        fs::read_to_string(path).map_err(|e| Error::io(path, e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde::Deserialize;
    use tempfile::TempDir;

    #[derive(Debug, Deserialize, PartialEq)]
    struct Sample {
        name: String,
    }

    #[test]
    fn test_load_by_extension() {
        let temp = TempDir::new().unwrap();
        let store = ConfigStore::new();

        let yaml = temp.path().join("a.yml");
        fs::write(&yaml, "name: honk\n").unwrap();
        let json = temp.path().join("a.json");
        fs::write(&json, r#"{"name": "honk"}"#).unwrap();
        let toml_path = temp.path().join("a.toml");
        fs::write(&toml_path, "name = \"honk\"\n").unwrap();

        for path in [yaml, json, toml_path] {
            let sample: Sample = store.load(&path).unwrap();
            assert_eq!(sample.name, "honk");
        }
    }

    #[test]
    fn test_unknown_extension_rejected() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("channels.ini");
        fs::write(&path, "name=honk").unwrap();

        let err = ConfigStore::new().load::<Sample>(&path).unwrap_err();
        assert!(matches!(err, Error::UnsupportedFormat { ref extension } if extension == "ini"));
    }

    #[test]
    fn test_size_limit_enforced() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("big.yaml");
        fs::write(&path, "name: a-rather-long-channel-name\n").unwrap();

        let err = ConfigStore::with_max_bytes(8)
            .load::<Sample>(&path)
            .unwrap_err();
        assert!(matches!(err, Error::ConfigTooLarge { max: 8, .. }));
    }

    #[test]
    fn test_directory_rejected() {
        let temp = TempDir::new().unwrap();
        let err = ConfigStore::new().load::<Sample>(temp.path()).unwrap_err();
        assert!(matches!(err, Error::DirectoryNotSupported { .. }));
    }
}
