// ⚙️ Configuration - championship.toml
//
//   [data]
//   path = "data/campeonato-brasileiro.csv"
//
//   [server]
//   addr = "0.0.0.0:3000"
//
//   [report]
//   filters = ["round:38"]

use crate::filter::{FilterError, MatchFilter};
use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "championship.toml";

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub data: DataConfig,
    pub server: ServerConfig,
    pub report: ReportConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DataConfig {
    /// Championship file (`;`-delimited, header on first line)
    pub path: PathBuf,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub addr: String,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ReportConfig {
    /// Filters applied when the command line gives none (AND-combined)
    pub filters: Vec<String>,
}

impl Default for DataConfig {
    fn default() -> Self {
        DataConfig {
            path: PathBuf::from("data/campeonato-brasileiro.csv"),
        }
    }
}

impl Default for ServerConfig {
    fn default() -> Self {
        ServerConfig {
            addr: "0.0.0.0:3000".to_string(),
        }
    }
}

impl Config {
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml(&content)
            .with_context(|| format!("Failed to parse config file {}", path.display()))
    }

    /// Load the file if it exists, defaults otherwise
    pub fn load_or_default(path: &Path) -> Result<Self> {
        if path.exists() {
            let config = Self::load(path)?;
            log::debug!("Loaded config from {}", path.display());
            Ok(config)
        } else {
            log::debug!("No config at {}, using defaults", path.display());
            Ok(Config::default())
        }
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    pub fn save(&self, path: &Path) -> Result<()> {
        let content = toml::to_string_pretty(self).context("Failed to serialize config")?;
        std::fs::write(path, content)
            .with_context(|| format!("Failed to write config file {}", path.display()))?;
        Ok(())
    }

    /// Default report filter, AND of every configured entry
    pub fn default_filter(&self) -> std::result::Result<MatchFilter, FilterError> {
        let filters = self
            .report
            .filters
            .iter()
            .map(|f| MatchFilter::parse_list(f))
            .collect::<std::result::Result<Vec<_>, _>>()?;
        Ok(MatchFilter::combine(filters))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = Config::default();
        assert_eq!(config.data.path, PathBuf::from("data/campeonato-brasileiro.csv"));
        assert_eq!(config.server.addr, "0.0.0.0:3000");
        assert_eq!(config.default_filter().unwrap(), MatchFilter::All);
    }

    #[test]
    fn test_partial_file_keeps_defaults() {
        let config = Config::from_toml("[data]\npath = \"brasileirao-2021.csv\"\n").unwrap();
        assert_eq!(config.data.path, PathBuf::from("brasileirao-2021.csv"));
        assert_eq!(config.server, ServerConfig::default());
    }

    #[test]
    fn test_report_filters() {
        let config = Config::from_toml(
            "[report]\nfilters = [\"round:38\", \"state:SP\"]\n",
        )
        .unwrap();

        assert_eq!(
            config.default_filter().unwrap(),
            MatchFilter::And(vec![
                MatchFilter::Round(38),
                MatchFilter::State("SP".to_string())
            ])
        );
    }

    #[test]
    fn test_invalid_filter_in_config() {
        let config = Config::from_toml("[report]\nfilters = [\"round:last\"]\n").unwrap();
        assert!(config.default_filter().is_err());
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(DEFAULT_CONFIG_PATH);

        let mut config = Config::default();
        config.server.addr = "127.0.0.1:8080".to_string();
        config.save(&path).unwrap();

        assert_eq!(Config::load(&path).unwrap(), config);
    }

    #[test]
    fn test_missing_file_uses_defaults() {
        let dir = tempfile::tempdir().unwrap();
        let config = Config::load_or_default(&dir.path().join("missing.toml")).unwrap();
        assert_eq!(config, Config::default());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        assert!(Config::from_toml("[data\npath = 1").is_err());
    }
}
