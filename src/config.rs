// file: src/config.rs
// description: application configuration management with toml support
// reference: https://docs.rs/config

use crate::error::{Result, TrackError};
use crate::store::history::TOMBSTONE_EXTENSION;
use dotenvy::dotenv;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct Config {
    pub source: SourceConfig,
    pub stores: StoreConfig,
    pub extraction: ExtractionConfig,
    pub notify: NotifyConfig,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SourceConfig {
    pub dir: PathBuf,
    pub file_prefix: String,
    pub extension: String,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct StoreConfig {
    pub content_dir: PathBuf,
    pub history_dir: PathBuf,
    pub cache_dir: PathBuf,
    pub changelog: PathBuf,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ExtractionConfig {
    /// External converter invoked as `command [args..] <document>`, reading
    /// plain text from its stdout. When unset, documents are read as UTF-8.
    pub command: Option<String>,
    #[serde(default)]
    pub args: Vec<String>,
}

#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct NotifyConfig {
    pub command: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl Config {
    pub fn load(path: Option<&Path>) -> Result<Self> {
        dotenv().ok();

        let mut builder = config::Config::builder();

        if let Some(path) = path {
            builder = builder.add_source(config::File::from(path));
        } else {
            builder = builder.add_source(config::File::from(Path::new("config/default.toml")));
        }

        builder = builder.add_source(
            config::Environment::with_prefix("DOC_TRACK")
                .separator("__")
                .try_parsing(true),
        );

        let settings = builder
            .build()
            .map_err(|e| TrackError::Config(e.to_string()))?;

        let config: Config = settings
            .try_deserialize()
            .map_err(|e| TrackError::Config(e.to_string()))?;

        config.validate()?;
        Ok(config)
    }

    pub fn default_config() -> Self {
        Self {
            source: SourceConfig {
                dir: PathBuf::from("./manuals"),
                file_prefix: "HSE".to_string(),
                extension: "docx".to_string(),
            },
            stores: StoreConfig {
                content_dir: PathBuf::from("./data/content"),
                history_dir: PathBuf::from("./data/history"),
                cache_dir: PathBuf::from("./data/content_cache"),
                changelog: PathBuf::from("./data/changelog.txt"),
            },
            extraction: ExtractionConfig {
                command: None,
                args: vec![],
            },
            notify: NotifyConfig {
                command: "gvim".to_string(),
                args: vec!["-d".to_string()],
            },
        }
    }

    fn validate(&self) -> Result<()> {
        if self.source.file_prefix.is_empty() && self.source.extension.is_empty() {
            return Err(TrackError::Config(
                "source pattern is empty: set file_prefix and/or extension".to_string(),
            ));
        }

        if self.source.extension == TOMBSTONE_EXTENSION {
            return Err(TrackError::Config(format!(
                "source extension '{}' collides with the tombstone marker",
                self.source.extension
            )));
        }

        if self.stores.cache_dir == self.stores.content_dir {
            return Err(TrackError::Config(
                "cache_dir must differ from content_dir".to_string(),
            ));
        }

        if self.notify.command.is_empty() {
            return Err(TrackError::Config(
                "notify command must not be empty".to_string(),
            ));
        }

        Ok(())
    }
}
