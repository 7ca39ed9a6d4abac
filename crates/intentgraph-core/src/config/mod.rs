//! Configuration management with file persistence

use anyhow::{Context, anyhow};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};

use crate::ingestion::{ConflictPolicy, IngestionOptions, ResolutionStrategy};
use crate::storage::default_database_path;

/// Environment variable overriding the config directory
pub const CONFIG_DIR_ENV: &str = "INTENTGRAPH_CONFIG_DIR";

/// Default ingestion actor username
pub const DEFAULT_ACTOR: &str = "system";

/// intentgraph configuration
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub database: DatabaseSettings,
    #[serde(default)]
    pub ingestion: IngestionConfig,
    #[serde(default)]
    pub encoding: EncodingConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DatabaseSettings {
    /// SQLite file; the config directory's `intentgraph.db` when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub path: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IngestionConfig {
    /// Username stamped as contributor and validator on ingested records
    pub actor: String,
    pub strategy: ResolutionStrategy,
    pub on_conflict: ConflictPolicy,
}

impl Default for IngestionConfig {
    fn default() -> Self {
        Self {
            actor: DEFAULT_ACTOR.to_string(),
            strategy: ResolutionStrategy::default(),
            on_conflict: ConflictPolicy::default(),
        }
    }
}

impl IngestionConfig {
    pub fn options(&self) -> IngestionOptions {
        IngestionOptions::default()
            .with_strategy(self.strategy)
            .with_conflict_policy(self.on_conflict)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EncodingConfig {
    /// Directory receiving encoding artifacts and exported training sets
    pub output_dir: PathBuf,
    /// Seed for the training-set shuffle; entropy when unset
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shuffle_seed: Option<u64>,
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from("model-output"),
            shuffle_seed: None,
        }
    }
}

impl Config {
    /// Get the config directory path
    pub fn config_dir() -> anyhow::Result<PathBuf> {
        let dir = if let Ok(custom_dir) = env::var(CONFIG_DIR_ENV) {
            PathBuf::from(custom_dir)
        } else {
            dirs::config_dir()
                .ok_or_else(|| anyhow!("Could not determine config directory"))?
                .join("intentgraph")
        };
        Ok(dir)
    }

    /// Get the config file path
    pub fn config_path() -> anyhow::Result<PathBuf> {
        Ok(Self::config_dir()?.join("config.toml"))
    }

    /// Load configuration from file, or the defaults if it doesn't exist
    pub fn load() -> anyhow::Result<Self> {
        Self::load_from(&Self::config_path()?)
    }

    /// Load configuration from a specific file
    pub fn load_from(path: &Path) -> anyhow::Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file: {}", path.display()))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse config file: {}", path.display()))?;
        config.validate()?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save(&self) -> anyhow::Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> anyhow::Result<()> {
        self.validate()?;

        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir)
                .with_context(|| format!("Failed to create config directory: {}", dir.display()))?;
        }

        let contents = toml::to_string_pretty(self).context("Failed to serialize config")?;
        fs::write(path, contents)
            .with_context(|| format!("Failed to write config file: {}", path.display()))?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> anyhow::Result<()> {
        if self.ingestion.actor.trim().is_empty() {
            return Err(anyhow!("ingestion.actor cannot be empty"));
        }
        if self.encoding.output_dir.as_os_str().is_empty() {
            return Err(anyhow!("encoding.output_dir cannot be empty"));
        }
        Ok(())
    }

    /// The database file to open
    pub fn database_path(&self) -> PathBuf {
        if let Some(path) = &self.database.path {
            return path.clone();
        }
        Self::config_dir()
            .map(|dir| dir.join("intentgraph.db"))
            .unwrap_or_else(|_| default_database_path())
    }

    /// Get a configuration value by key
    pub fn get(&self, key: &str) -> anyhow::Result<String> {
        match key {
            "database.path" => Ok(self.database_path().display().to_string()),

            "ingestion.actor" => Ok(self.ingestion.actor.clone()),
            "ingestion.strategy" => Ok(self.ingestion.strategy.as_str().to_string()),
            "ingestion.on_conflict" => Ok(self.ingestion.on_conflict.as_str().to_string()),

            "encoding.output_dir" => Ok(self.encoding.output_dir.display().to_string()),
            "encoding.shuffle_seed" => Ok(match self.encoding.shuffle_seed {
                Some(seed) => seed.to_string(),
                None => "(not set - shuffled from entropy)".to_string(),
            }),

            _ => Err(anyhow!(
                "Unknown configuration key: {}. Use `intentgraph config list` to see available keys.",
                key
            )),
        }
    }

    /// Set a configuration value by key
    pub fn set(&mut self, key: &str, value: &str) -> anyhow::Result<()> {
        match key {
            "database.path" => {
                self.database.path = if value.trim().is_empty() {
                    None
                } else {
                    Some(PathBuf::from(value))
                };
            }

            "ingestion.actor" => {
                let actor = value.trim();
                if actor.is_empty() {
                    return Err(anyhow!("Ingestion actor cannot be empty"));
                }
                self.ingestion.actor = actor.to_string();
            }
            "ingestion.strategy" => {
                self.ingestion.strategy = ResolutionStrategy::parse(value).ok_or_else(|| {
                    anyhow!(
                        "Invalid ingestion strategy: {}. Valid options: two_phase, sequential",
                        value
                    )
                })?;
            }
            "ingestion.on_conflict" => {
                self.ingestion.on_conflict = ConflictPolicy::parse(value).ok_or_else(|| {
                    anyhow!("Invalid conflict policy: {}. Valid options: fail, skip", value)
                })?;
            }

            "encoding.output_dir" => {
                if value.trim().is_empty() {
                    return Err(anyhow!("Output directory cannot be empty"));
                }
                self.encoding.output_dir = PathBuf::from(value);
            }
            "encoding.shuffle_seed" => {
                self.encoding.shuffle_seed = match value.trim() {
                    "" | "none" => None,
                    seed => Some(
                        seed.parse()
                            .with_context(|| format!("Invalid shuffle_seed value: {}", value))?,
                    ),
                };
            }

            _ => {
                return Err(anyhow!(
                    "Unknown configuration key: {}. Use `intentgraph config list` to see available keys.",
                    key
                ));
            }
        }
        Ok(())
    }

    /// List all configuration keys and their values
    pub fn list(&self) -> anyhow::Result<Vec<(String, String)>> {
        let keys = vec![
            "database.path",
            "ingestion.actor",
            "ingestion.strategy",
            "ingestion.on_conflict",
            "encoding.output_dir",
            "encoding.shuffle_seed",
        ];

        keys.into_iter()
            .map(|key| {
                let value = self.get(key)?;
                Ok((key.to_string(), value))
            })
            .collect()
    }

    /// Reset configuration to defaults
    pub fn reset() -> anyhow::Result<()> {
        let path = Self::config_path()?;
        if path.exists() {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove config file: {}", path.display()))?;
        }
        Ok(())
    }
}
