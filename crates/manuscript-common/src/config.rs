//! Sync configuration: defaults, file loading and environment overrides.

use miette::Result;
use miette::miette;
use serde::{Deserialize, Serialize};

use std::future::Future;
use std::path::Path;
use std::path::PathBuf;

/// Default sync tick interval in milliseconds.
pub const DEFAULT_SYNC_INTERVAL_MS: u64 = 2000;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SyncConfig {
    /// Base URL of the manuscript service.
    pub endpoint: String,
    /// Id of the manuscript being edited, used in the changes URL.
    pub manuscript_id: String,
    /// How often the sync task collects and sends pending changes.
    pub interval_ms: u64,
}

impl SyncConfig {
    /// Loads the configuration from the provided loader.
    pub async fn load(loader: &impl Loader) -> Result<Self> {
        loader
            .load()
            .await
            .map_err(|e| miette!("Failed to load configuration: {e}"))
    }

    /// Saves the configuration using the provided saver.
    pub async fn save(&self, saver: &impl Saver) -> Result<()> {
        saver
            .save(self)
            .await
            .map_err(|e| miette!("Failed to save configuration: {e}"))
    }

    /// Build a config from environment variables, falling back to defaults.
    ///
    /// - `MANUSCRIPT_SYNC_ENDPOINT`
    /// - `MANUSCRIPT_ID`
    /// - `MANUSCRIPT_SYNC_INTERVAL_MS`
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let mut config = Self::default();
        if let Some(endpoint) = lookup("MANUSCRIPT_SYNC_ENDPOINT") {
            config.endpoint = endpoint;
        }
        if let Some(id) = lookup("MANUSCRIPT_ID") {
            config.manuscript_id = id;
        }
        if let Some(interval) = lookup("MANUSCRIPT_SYNC_INTERVAL_MS") {
            config.interval_ms = interval
                .parse()
                .map_err(|e| miette!("MANUSCRIPT_SYNC_INTERVAL_MS={interval:?}: {e}"))?;
        }
        config.validate()?;
        Ok(config)
    }

    /// Reject settings the sync task cannot run with.
    pub fn validate(&self) -> Result<()> {
        if self.interval_ms == 0 {
            return Err(miette!("sync interval must be greater than zero"));
        }
        if self.endpoint.is_empty() {
            return Err(miette!("sync endpoint must not be empty"));
        }
        Ok(())
    }

    /// URL the changes for this manuscript are posted to.
    pub fn changes_url(&self) -> String {
        format!(
            "{}/manuscripts/{}/changes",
            self.endpoint.trim_end_matches('/'),
            self.manuscript_id
        )
    }
}

impl Default for SyncConfig {
    /// Local development server, 2s interval.
    fn default() -> Self {
        Self {
            endpoint: "http://localhost:8080".to_owned(),
            manuscript_id: String::new(),
            interval_ms: DEFAULT_SYNC_INTERVAL_MS,
        }
    }
}

/// The trait for loading configuration data.
pub trait Loader {
    /// Loads the configuration data.
    fn load(
        &self,
    ) -> impl Future<
        Output = core::result::Result<
            SyncConfig,
            Box<dyn std::error::Error + Send + Sync + 'static>,
        >,
    > + Send;
}

/// The trait for saving configuration data.
pub trait Saver {
    /// Saves the configuration data.
    fn save(
        &self,
        config: &SyncConfig,
    ) -> impl Future<
        Output = core::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'static>>,
    > + Send;
}

/// An implementation of [`Loader`] and [`Saver`] that reads and writes a configuration file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    /// Create a new [`FileStore`] with the given path.
    ///
    /// The format is picked from the file extension: `.json` or `.toml`.
    pub fn new(path: impl AsRef<Path>) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }
}

impl Loader for FileStore {
    async fn load(
        &self,
    ) -> core::result::Result<SyncConfig, Box<dyn std::error::Error + Send + Sync + 'static>> {
        let config: SyncConfig = match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => serde_json::from_str(&std::fs::read_to_string(&self.path)?)?,
            Some("toml") => toml::from_str(&std::fs::read_to_string(&self.path)?)?,
            _ => return Err(miette!("Unsupported file format").into()),
        };
        config.validate().map_err(|e| e.to_string())?;
        Ok(config)
    }
}

impl Saver for FileStore {
    async fn save(
        &self,
        config: &SyncConfig,
    ) -> core::result::Result<(), Box<dyn std::error::Error + Send + Sync + 'static>> {
        match self.path.extension().and_then(|ext| ext.to_str()) {
            Some("json") => Ok(std::fs::write(
                &self.path,
                serde_json::to_string_pretty(config)?,
            )?),
            Some("toml") => Ok(std::fs::write(&self.path, toml::to_string_pretty(config)?)?),
            _ => Err(miette!("Unsupported file format").into()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("manuscript-config-{}-{name}", std::process::id()))
    }

    #[test]
    fn test_default_config() {
        let config = SyncConfig::default();
        assert_eq!(config.interval_ms, 2000);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_changes_url_trims_trailing_slash() {
        let config = SyncConfig {
            endpoint: "https://api.example.org/".into(),
            manuscript_id: "ms-42".into(),
            ..Default::default()
        };
        assert_eq!(
            config.changes_url(),
            "https://api.example.org/manuscripts/ms-42/changes"
        );
    }

    #[test]
    fn test_from_lookup_overrides() {
        let config = SyncConfig::from_lookup(|key| match key {
            "MANUSCRIPT_ID" => Some("abc".into()),
            "MANUSCRIPT_SYNC_INTERVAL_MS" => Some("500".into()),
            _ => None,
        })
        .unwrap();
        assert_eq!(config.manuscript_id, "abc");
        assert_eq!(config.interval_ms, 500);
        assert_eq!(config.endpoint, "http://localhost:8080");
    }

    #[test]
    fn test_from_lookup_rejects_bad_interval() {
        assert!(SyncConfig::from_lookup(|key| {
            (key == "MANUSCRIPT_SYNC_INTERVAL_MS").then(|| "soon".to_string())
        })
        .is_err());
        assert!(SyncConfig::from_lookup(|key| {
            (key == "MANUSCRIPT_SYNC_INTERVAL_MS").then(|| "0".to_string())
        })
        .is_err());
    }

    #[tokio::test]
    async fn test_file_store_roundtrip_json_and_toml() {
        let config = SyncConfig {
            endpoint: "https://sync.example.org".into(),
            manuscript_id: "m1".into(),
            interval_ms: 1500,
        };

        for ext in ["json", "toml"] {
            let path = temp_path(&format!("roundtrip.{ext}"));
            let store = FileStore::new(&path);
            config.save(&store).await.unwrap();
            let loaded = SyncConfig::load(&store).await.unwrap();
            assert_eq!(loaded, config);
            let _ = std::fs::remove_file(&path);
        }
    }

    #[tokio::test]
    async fn test_file_store_unsupported_extension() {
        let store = FileStore::new(temp_path("config.yaml"));
        assert!(SyncConfig::load(&store).await.is_err());
    }
}
