use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use anyhow::{Result, anyhow};

use crate::api::ApiLatency;
use crate::intent::RuleSet;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(default)]
pub struct Config {
    /// Simulated API round trips
    pub latency: ApiLatency,
    pub tracker_tick_secs: u64,
    pub proactive_alert_secs: u64,
    /// Answer synonyms like "modem" or "visit" too
    pub extended_keywords: bool,
    /// Replaces the built-in keyword table when set
    pub rules: Option<RuleSet>,
}

impl Default for Config {
    fn default() -> Self {
        Self::new()
    }
}

impl Config {
    pub fn new() -> Self {
        Self {
            latency: ApiLatency {
                chat_ms: 1500,
                ..ApiLatency::default()
            },
            tracker_tick_secs: 10,
            proactive_alert_secs: 5,
            extended_keywords: false,
            rules: None,
        }
    }

    /// Load the user's config, writing the defaults out on first run
    pub fn load() -> Result<Self> {
        let config_path = Self::get_config_path()?;
        Self::load_or_create(&config_path)
    }

    pub fn load_or_create(config_path: &Path) -> Result<Self> {
        if config_path.exists() {
            return Self::load_from(config_path);
        }

        let config = Self::new();
        config.save_to(config_path)?;
        tracing::info!("wrote default config to {:?}", config_path);
        Ok(config)
    }

    /// Read a config file, falling back to defaults when it doesn't exist
    pub fn load_from(config_path: &Path) -> Result<Self> {
        if !config_path.exists() {
            return Ok(Self::new());
        }

        let config_content = fs::read_to_string(config_path)?;
        let config: Config = serde_json::from_str(&config_content)
            .map_err(|e| anyhow!("Invalid config {:?}: {}", config_path, e))?;
        Ok(config)
    }

    pub fn save_to(&self, config_path: &Path) -> Result<()> {
        // Create config directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent)?;
        }

        let config_content = serde_json::to_string_pretty(self)?;
        fs::write(config_path, config_content)?;
        Ok(())
    }

    /// The keyword table to answer with
    pub fn rule_set(&self) -> RuleSet {
        match &self.rules {
            Some(rules) => rules.clone(),
            None if self.extended_keywords => RuleSet::extended(),
            None => RuleSet::standard(),
        }
    }

    pub fn get_config_path() -> Result<PathBuf> {
        Ok(Self::get_config_dir()?.join("config.json"))
    }

    pub fn get_config_dir() -> Result<PathBuf> {
        let config_dir = dirs::config_dir()
            .ok_or_else(|| anyhow!("Could not determine config directory"))?;

        Ok(config_dir.join("aura-lite"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::intent::{IntentRule, ResponseKind};
    use tempfile::tempdir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = tempdir().unwrap();
        let config = Config::load_from(&dir.path().join("nope.json")).unwrap();
        assert_eq!(config, Config::new());
        assert_eq!(config.latency.chat_ms, 1500);
        assert_eq!(config.tracker_tick_secs, 10);
    }

    #[test]
    fn test_save_and_load() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("config.json");

        let mut config = Config::new();
        config.extended_keywords = true;
        config.tracker_tick_secs = 2;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded, config);
        assert_eq!(loaded.rule_set(), RuleSet::extended());
    }

    #[test]
    fn test_first_run_writes_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("aura-lite").join("config.json");

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config, Config::new());
        assert!(path.exists());
        assert_eq!(Config::load_from(&path).unwrap(), Config::new());
    }

    #[test]
    fn test_existing_file_is_not_overwritten() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"tracker_tick_secs": 3}"#).unwrap();

        let config = Config::load_or_create(&path).unwrap();
        assert_eq!(config.tracker_tick_secs, 3);
        assert_eq!(fs::read_to_string(&path).unwrap(), r#"{"tracker_tick_secs": 3}"#);
    }

    #[test]
    fn test_partial_file_fills_defaults() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, r#"{"proactive_alert_secs": 1}"#).unwrap();

        let config = Config::load_from(&path).unwrap();
        assert_eq!(config.proactive_alert_secs, 1);
        assert_eq!(config.tracker_tick_secs, 10);
        assert_eq!(config.rule_set(), RuleSet::standard());
    }

    #[test]
    fn test_malformed_file_is_an_error() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.json");
        fs::write(&path, "{ not json").unwrap();
        assert!(Config::load_from(&path).is_err());
    }

    #[test]
    fn test_custom_rules_win() {
        let mut config = Config::new();
        config.extended_keywords = true;
        config.rules = Some(RuleSet::new(
            vec![IntentRule::new("bill", "Billing", ResponseKind::Informational)],
            "?",
        ));
        let rules = config.rule_set();
        assert_eq!(rules.rules().len(), 1);
        assert_eq!(rules.classify("router").text, "?");
    }
}
