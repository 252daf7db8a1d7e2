use beamer_cells::converter::HandlerSet;
use beamer_cells::notebook::{LiveReveal, NotebookMeta};
use linked_hash_map::LinkedHashMap;
use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {}", config_path.display())]
    Read {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {}", config_path.display())]
    Parse {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("Macro `{name}` refers to unknown handler `{existing}`")]
    UnknownHandler { name: String, existing: String },
}

/// Conversion settings. Every section and key is optional.
#[derive(Debug, Clone, Default, Deserialize, PartialEq)]
#[serde(default)]
pub struct Config {
    pub notebook: NotebookSettings,
    pub livereveal: LiveReveal,
    /// Document macro name mapped to the name of an existing handler. Entries are applied in file
    /// order, so a macro may refer to one defined above it.
    pub macros: LinkedHashMap<String, String>,
}

#[derive(Debug, Clone, Deserialize, PartialEq)]
#[serde(default)]
pub struct NotebookSettings {
    pub language: String,
    pub celltoolbar: String,
}

impl Default for NotebookSettings {
    fn default() -> Self {
        let meta = NotebookMeta::default();
        NotebookSettings {
            language: meta.language,
            celltoolbar: meta.celltoolbar,
        }
    }
}

impl Config {
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();
        let content =
            std::fs::read_to_string(config_path).map_err(|source| ConfigError::Read {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Self::from_toml(&content).map_err(|source| ConfigError::Parse {
            config_path: config_path.to_path_buf(),
            source,
        })
    }

    pub fn from_toml(content: &str) -> Result<Self, toml::de::Error> {
        toml::from_str(content)
    }

    /// The built-in handlers with the configured macro aliases applied.
    pub fn handlers(&self) -> Result<HandlerSet, ConfigError> {
        let mut handlers = HandlerSet::default();
        for (name, existing) in &self.macros {
            if handlers.alias(name, existing).is_err() {
                return Err(ConfigError::UnknownHandler {
                    name: name.clone(),
                    existing: existing.clone(),
                });
            }
        }
        Ok(handlers)
    }

    pub fn notebook_meta(&self) -> NotebookMeta {
        NotebookMeta {
            language: self.notebook.language.clone(),
            celltoolbar: self.notebook.celltoolbar.clone(),
            livereveal: self.livereveal.clone(),
            ..Default::default()
        }
    }
}
