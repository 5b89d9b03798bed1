//! # Configuration
//!
//! TOML configuration for the `itemproto` tool: where the prototype store
//! lives, how to log, who is building, and the catalog entries (weapon
//! types, gases, bodyparts...) that building commands may refer to.
//!
//! ```toml
//! [storage]
//! data_dir = "./data"
//!
//! [logging]
//! level = "info"
//! file = "itemproto.log"
//!
//! [builder]
//! author = "builder"
//! allow_self_approval = true
//!
//! [[catalog]]
//! kind = "armour_type"
//! id = 1
//! name = "leather"
//! ```

use std::path::PathBuf;

use anyhow::{anyhow, Result};
use serde::{Deserialize, Serialize};
use tokio::fs;

use crate::components::catalog::{CatalogKind, InMemoryCatalog};
use crate::components::types::CatalogId;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub storage: StorageConfig,
    pub logging: LoggingConfig,
    #[serde(default)]
    pub builder: BuilderConfig,
    #[serde(default)]
    pub catalog: Vec<CatalogSeed>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    pub data_dir: String,
    /// Sled directory; `<data_dir>/components` when unset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub db_path: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    #[serde(default)]
    pub file: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BuilderConfig {
    #[serde(default = "default_author")]
    pub author: String,
    /// Whether the author of a draft may approve it.
    #[serde(default = "default_allow_self_approval")]
    pub allow_self_approval: bool,
}

fn default_author() -> String {
    "builder".to_string()
}

fn default_allow_self_approval() -> bool {
    true
}

impl Default for BuilderConfig {
    fn default() -> Self {
        Self {
            author: default_author(),
            allow_self_approval: default_allow_self_approval(),
        }
    }
}

/// One catalog entry made available to building commands.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CatalogSeed {
    pub kind: CatalogKind,
    pub id: CatalogId,
    pub name: String,
}

impl Config {
    /// Load configuration from a TOML file
    pub async fn load(path: &str) -> Result<Self> {
        let content = fs::read_to_string(path)
            .await
            .map_err(|e| anyhow!("Failed to read config file {}: {}", path, e))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| anyhow!("Failed to parse config file {}: {}", path, e))?;

        Ok(config)
    }

    /// Write a starter configuration file
    pub async fn create_default(path: &str) -> Result<()> {
        let content = toml::to_string_pretty(&Config::default())
            .map_err(|e| anyhow!("Failed to serialize default config: {}", e))?;

        fs::write(path, content)
            .await
            .map_err(|e| anyhow!("Failed to write config file {}: {}", path, e))?;

        Ok(())
    }

    pub fn db_path(&self) -> PathBuf {
        match &self.storage.db_path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(&self.storage.data_dir).join("components"),
        }
    }

    pub fn build_catalog(&self) -> InMemoryCatalog {
        let mut catalog = InMemoryCatalog::new();
        for seed in &self.catalog {
            catalog.insert(seed.kind, seed.id, seed.name.clone());
        }
        catalog
    }
}

impl Default for Config {
    fn default() -> Self {
        let seed = |kind, id, name: &str| CatalogSeed {
            kind,
            id,
            name: name.to_string(),
        };
        Config {
            storage: StorageConfig {
                data_dir: "./data".to_string(),
                db_path: None,
            },
            logging: LoggingConfig {
                level: "info".to_string(),
                file: Some("itemproto.log".to_string()),
            },
            builder: BuilderConfig::default(),
            catalog: vec![
                seed(CatalogKind::ArmourType, 1, "leather"),
                seed(CatalogKind::ShieldType, 1, "buckler"),
                seed(CatalogKind::WeaponType, 1, "shield bash"),
                seed(CatalogKind::AmmunitionType, 1, "musket ball"),
                seed(CatalogKind::Gas, 1, "breathable air"),
                seed(CatalogKind::Liquid, 1, "water"),
            ],
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::components::catalog::Catalog;

    #[test]
    fn db_path_defaults_under_data_dir() {
        let mut config = Config::default();
        assert_eq!(config.db_path(), PathBuf::from("./data").join("components"));
        config.storage.db_path = Some("/srv/protos".to_string());
        assert_eq!(config.db_path(), PathBuf::from("/srv/protos"));
    }

    #[test]
    fn minimal_file_fills_builder_defaults() {
        let text = r#"
            [storage]
            data_dir = "data"

            [logging]
            level = "debug"

            [[catalog]]
            kind = "gas"
            id = 7
            name = "oxygen"
        "#;
        let config: Config = toml::from_str(text).unwrap();
        assert_eq!(config.builder.author, "builder");
        assert!(config.builder.allow_self_approval);
        assert!(config.logging.file.is_none());

        let catalog = config.build_catalog();
        assert_eq!(catalog.name_of(CatalogKind::Gas, 7).as_deref(), Some("oxygen"));
    }

    #[tokio::test]
    async fn default_file_round_trips() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("itemproto.toml");
        let path = path.to_str().unwrap();
        Config::create_default(path).await.unwrap();
        let loaded = Config::load(path).await.unwrap();
        assert_eq!(loaded.catalog, Config::default().catalog);
        assert_eq!(loaded.storage.data_dir, "./data");
    }
}
