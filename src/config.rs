use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{AppError, Result};

/// Environment variable pointing at an alternative config file.
pub const CONFIG_ENV: &str = "PREP_PORTAL_CONFIG";

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    #[serde(default = "default_db_path")]
    pub db_path: String,

    #[serde(default = "default_bind_address")]
    pub bind_address: String,

    #[serde(default = "default_max_upload_mb")]
    pub max_upload_mb: usize,

    /// How long a started model-set test stays open for submission.
    #[serde(default = "default_attempt_ttl_hours")]
    pub attempt_ttl_hours: u32,

    pub storage: Option<StorageConfig>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub bucket: String,
    pub access_token: String,

    #[serde(default = "default_upload_url")]
    pub upload_url: String,

    #[serde(default = "default_public_base_url")]
    pub public_base_url: String,
}

fn default_db_path() -> String {
    let data_dir = dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("prep-portal");
    std::fs::create_dir_all(&data_dir).ok();
    data_dir.join("portal.db").to_string_lossy().to_string()
}

fn default_bind_address() -> String {
    "127.0.0.1:8000".to_string()
}

fn default_max_upload_mb() -> usize {
    20
}

fn default_attempt_ttl_hours() -> u32 {
    24
}

fn default_upload_url() -> String {
    "https://storage.googleapis.com/upload/storage/v1".to_string()
}

fn default_public_base_url() -> String {
    "https://storage.googleapis.com".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            db_path: default_db_path(),
            bind_address: default_bind_address(),
            max_upload_mb: default_max_upload_mb(),
            attempt_ttl_hours: default_attempt_ttl_hours(),
            storage: None,
        }
    }
}

impl Config {
    /// Defaults backed by an in-memory database, leaving the data dir alone.
    #[cfg(test)]
    pub fn in_memory() -> Self {
        Self {
            db_path: ":memory:".to_string(),
            bind_address: default_bind_address(),
            max_upload_mb: default_max_upload_mb(),
            attempt_ttl_hours: default_attempt_ttl_hours(),
            storage: None,
        }
    }

    pub fn load() -> Result<Self> {
        Self::load_from(&Self::config_path())
    }

    /// Reads the config at `path`, writing the defaults there first if the
    /// file does not exist yet.
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            let config: Config = toml::from_str(&content)?;
            config.validate()?;
            Ok(config)
        } else {
            let config = Config::default();
            config.save_to(path)?;
            tracing::info!("Wrote default configuration to {}", path.display());
            Ok(config)
        }
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content =
            toml::to_string_pretty(self).map_err(|e| AppError::Config(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        if let Some(path) = std::env::var_os(CONFIG_ENV) {
            return PathBuf::from(path);
        }
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("prep-portal")
            .join("config.toml")
    }

    pub fn max_upload_bytes(&self) -> usize {
        self.max_upload_mb.saturating_mul(1024 * 1024)
    }

    pub fn attempt_ttl(&self) -> chrono::Duration {
        chrono::Duration::hours(i64::from(self.attempt_ttl_hours))
    }

    fn validate(&self) -> Result<()> {
        if self.max_upload_mb == 0 {
            return Err(AppError::Config("max_upload_mb must be at least 1".to_string()));
        }
        if self.attempt_ttl_hours == 0 {
            return Err(AppError::Config(
                "attempt_ttl_hours must be at least 1".to_string(),
            ));
        }
        if let Some(storage) = &self.storage {
            if storage.bucket.trim().is_empty() {
                return Err(AppError::Config("storage.bucket is empty".to_string()));
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio_test::{assert_err, assert_ok};

    #[test]
    fn first_load_writes_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let config = Config::load_from(&path).unwrap();
        assert!(path.exists());
        assert_eq!(config.bind_address, "127.0.0.1:8000");
        assert_eq!(config.max_upload_mb, 20);
        assert_eq!(config.attempt_ttl_hours, 24);
        assert!(config.storage.is_none());

        assert_ok!(Config::load_from(&path));
    }

    #[test]
    fn in_memory_config_keeps_other_defaults() {
        let config = Config::in_memory();
        assert_eq!(config.db_path, ":memory:");
        assert_eq!(config.bind_address, "127.0.0.1:8000");
        assert_eq!(config.max_upload_mb, 20);
        assert_eq!(config.attempt_ttl_hours, 24);
        assert!(config.storage.is_none());
    }

    #[test]
    fn storage_section_fills_in_endpoints() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(
            &path,
            r#"
db_path = "/tmp/portal.db"
max_upload_mb = 5

[storage]
bucket = "loksewa-media"
access_token = "secret"
"#,
        )
        .unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.db_path, "/tmp/portal.db");
        assert_eq!(config.max_upload_bytes(), 5 * 1024 * 1024);
        let storage = config.storage.unwrap();
        assert_eq!(storage.bucket, "loksewa-media");
        assert_eq!(storage.public_base_url, "https://storage.googleapis.com");
        assert!(storage.upload_url.ends_with("/upload/storage/v1"));
    }

    #[test]
    fn rejects_zero_limits_and_bad_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");

        std::fs::write(&path, "attempt_ttl_hours = 0\n").unwrap();
        assert!(matches!(Config::load_from(&path), Err(AppError::Config(_))));

        std::fs::write(&path, "bind_address = [").unwrap();
        assert_err!(Config::load_from(&path));
    }
}
