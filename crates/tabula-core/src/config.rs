// Rust guideline compliant 2026-02-06

//! Configuration management for the Tabula engine.

use crate::models::SortDirection;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};
use std::path::Path;
use std::time::Duration;

/// Name of the configuration file inside the configuration directory.
pub const CONFIG_FILE: &str = "tabula.toml";

/// Engine-wide configuration shared by all listing types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Page size used when neither request nor listing supply one.
    #[serde(default = "default_page_size")]
    pub default_page_size: usize,

    /// Sort direction used when neither request nor listing supply one.
    #[serde(default)]
    pub default_sort_order: SortDirection,

    /// Whether manual sorting may materialize entities for missing columns.
    #[serde(default = "default_instance_fallback")]
    pub instance_fallback: bool,

    /// `strftime` format used to render dates for searching.
    #[serde(default = "default_date_format_long")]
    pub date_format_long: String,

    /// Absolute base URL used to build entity and link URLs.
    #[serde(default = "default_portal_url")]
    pub portal_url: String,

    /// Workflow states whose entities are ignored when they offer no transitions.
    #[serde(default = "default_skip_states")]
    pub skip_states: BTreeSet<String>,

    /// Ordering weights for transitions without an explicit weight.
    #[serde(default = "default_transition_weights")]
    pub transition_weights: BTreeMap<String, i64>,

    /// Whether transition buttons may be submitted asynchronously.
    #[serde(default)]
    pub enable_ajax_transitions: bool,

    /// Entity types and view names that never submit transitions asynchronously.
    #[serde(default = "default_ajax_transitions_blacklist")]
    pub ajax_transitions_blacklist: Vec<String>,

    /// Per-request deadline for catalog calls in milliseconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub deadline_ms: Option<u64>,
}

fn default_page_size() -> usize {
    50
}

fn default_instance_fallback() -> bool {
    true
}

fn default_date_format_long() -> String {
    "%Y-%m-%d %I:%M %p".to_string()
}

fn default_portal_url() -> String {
    "http://localhost".to_string()
}

fn default_skip_states() -> BTreeSet<String> {
    ["published", "rejected", "retracted"]
        .into_iter()
        .map(String::from)
        .collect()
}

/// Default transition weights, low weights render leftmost.
#[must_use]
pub fn default_transition_weights() -> BTreeMap<String, i64> {
    [
        ("invalidate", 100),
        ("retract", 90),
        ("reject", 90),
        ("remove", 90),
        ("cancel", 80),
        ("deactivate", 70),
        ("unassign", 70),
        ("close", 70),
        ("publish", 60),
        ("republish", 50),
        ("prepublish", 50),
        ("verify", 50),
        ("partition", 40),
        ("assign", 30),
        ("receive", 20),
        ("submit", 10),
    ]
    .into_iter()
    .map(|(id, weight)| (id.to_string(), weight))
    .collect()
}

fn default_ajax_transitions_blacklist() -> Vec<String> {
    [
        "AnalysisServices",
        "Client",
        "Samples",
        "WorksheetFolder",
        "published_results",
        "reports_listing",
        "add_analyses",
        "manage_analyses",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            default_page_size: default_page_size(),
            default_sort_order: SortDirection::default(),
            instance_fallback: default_instance_fallback(),
            date_format_long: default_date_format_long(),
            portal_url: default_portal_url(),
            skip_states: default_skip_states(),
            transition_weights: default_transition_weights(),
            enable_ajax_transitions: false,
            ajax_transitions_blacklist: default_ajax_transitions_blacklist(),
            deadline_ms: None,
        }
    }
}

impl EngineConfig {
    /// Loads configuration from file and environment variables.
    ///
    /// Configuration is loaded in the following order (later overrides earlier):
    /// 1. Default values
    /// 2. Configuration file at `<config_dir>/tabula.toml`
    /// 3. Environment variables with `TABULA_` prefix
    ///
    /// # Arguments
    ///
    /// * `config_dir` - Directory holding `tabula.toml`
    ///
    /// # Returns
    ///
    /// The merged and validated configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - Configuration file exists but cannot be read
    /// - Configuration file contains invalid TOML
    /// - Configuration values fail validation
    pub fn load(config_dir: &Path) -> Result<Self> {
        let mut config = Self::default();

        let config_path = config_dir.join(CONFIG_FILE);
        if config_path.exists() {
            let content = std::fs::read_to_string(&config_path)?;
            config = toml::from_str(&content)
                .map_err(|e| Error::InvalidConfig(format!("Invalid config file: {}", e)))?;
        }

        config.apply_env_overrides()?;
        config.validate()?;

        Ok(config)
    }

    /// Applies environment variable overrides to the configuration.
    ///
    /// Supported environment variables:
    /// - `TABULA_DEFAULT_PAGE_SIZE` - Default page size (> 0)
    /// - `TABULA_DEFAULT_SORT_ORDER` - ascending/descending
    /// - `TABULA_INSTANCE_FALLBACK` - true/false
    /// - `TABULA_PORTAL_URL` - Base URL
    /// - `TABULA_ENABLE_AJAX_TRANSITIONS` - true/false
    /// - `TABULA_DEADLINE_MS` - Catalog deadline in milliseconds
    ///
    /// # Errors
    ///
    /// Returns an error if environment variable values are invalid.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(val) = std::env::var("TABULA_DEFAULT_PAGE_SIZE") {
            self.default_page_size = val.parse().map_err(|_| {
                Error::InvalidConfig("TABULA_DEFAULT_PAGE_SIZE must be a positive number".to_string())
            })?;
        }

        if let Ok(val) = std::env::var("TABULA_DEFAULT_SORT_ORDER") {
            self.default_sort_order = SortDirection::parse(&val).ok_or_else(|| {
                Error::InvalidConfig(
                    "TABULA_DEFAULT_SORT_ORDER must be ascending or descending".to_string(),
                )
            })?;
        }

        if let Ok(val) = std::env::var("TABULA_INSTANCE_FALLBACK") {
            self.instance_fallback = val.parse().map_err(|_| {
                Error::InvalidConfig("TABULA_INSTANCE_FALLBACK must be true or false".to_string())
            })?;
        }

        if let Ok(val) = std::env::var("TABULA_PORTAL_URL") {
            self.portal_url = val;
        }

        if let Ok(val) = std::env::var("TABULA_ENABLE_AJAX_TRANSITIONS") {
            self.enable_ajax_transitions = val.parse().map_err(|_| {
                Error::InvalidConfig(
                    "TABULA_ENABLE_AJAX_TRANSITIONS must be true or false".to_string(),
                )
            })?;
        }

        if let Ok(val) = std::env::var("TABULA_DEADLINE_MS") {
            self.deadline_ms = Some(val.parse().map_err(|_| {
                Error::InvalidConfig("TABULA_DEADLINE_MS must be a number".to_string())
            })?);
        }

        Ok(())
    }

    /// Validates the configuration values.
    ///
    /// # Errors
    ///
    /// Returns an error if:
    /// - default_page_size is zero
    /// - portal_url is empty
    fn validate(&self) -> Result<()> {
        if self.default_page_size == 0 {
            return Err(Error::InvalidConfig(
                "default_page_size must be greater than 0".to_string(),
            ));
        }

        if self.portal_url.trim().is_empty() {
            return Err(Error::InvalidConfig("portal_url cannot be empty".to_string()));
        }

        Ok(())
    }

    /// Returns the configured catalog deadline.
    #[must_use]
    pub fn deadline(&self) -> Option<Duration> {
        self.deadline_ms.map(Duration::from_millis)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Mutex;
    use tempfile::TempDir;

    // Environment variables are process-global.
    static ENV_LOCK: Mutex<()> = Mutex::new(());

    fn clear_all_env_vars() {
        std::env::remove_var("TABULA_DEFAULT_PAGE_SIZE");
        std::env::remove_var("TABULA_DEFAULT_SORT_ORDER");
        std::env::remove_var("TABULA_INSTANCE_FALLBACK");
        std::env::remove_var("TABULA_PORTAL_URL");
        std::env::remove_var("TABULA_ENABLE_AJAX_TRANSITIONS");
        std::env::remove_var("TABULA_DEADLINE_MS");
    }

    #[test]
    fn test_default_config() {
        let config = EngineConfig::default();
        assert_eq!(config.default_page_size, 50);
        assert_eq!(config.default_sort_order, SortDirection::Descending);
        assert!(config.instance_fallback);
        assert!(config.skip_states.contains("retracted"));
        assert_eq!(config.transition_weights.get("invalidate"), Some(&100));
        assert_eq!(config.transition_weights.get("submit"), Some(&10));
        assert!(!config.enable_ajax_transitions);
        assert!(config.deadline().is_none());
    }

    #[test]
    fn test_config_load_missing_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let config = EngineConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config, EngineConfig::default());
    }

    #[test]
    fn test_config_load_from_file() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        let content = r#"
default_page_size = 20
default_sort_order = "ascending"
instance_fallback = false
skip_states = ["published"]
deadline_ms = 1500

[transition_weights]
submit = 1
"#;
        std::fs::write(temp_dir.path().join(CONFIG_FILE), content).unwrap();

        let config = EngineConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.default_page_size, 20);
        assert_eq!(config.default_sort_order, SortDirection::Ascending);
        assert!(!config.instance_fallback);
        assert_eq!(config.skip_states.len(), 1);
        assert_eq!(config.transition_weights.len(), 1);
        assert_eq!(config.deadline(), Some(Duration::from_millis(1500)));
    }

    #[test]
    fn test_config_validation_zero_page_size() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), "default_page_size = 0").unwrap();

        assert!(EngineConfig::load(temp_dir.path()).is_err());
    }

    #[test]
    fn test_config_env_override_page_size() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();

        std::env::set_var("TABULA_DEFAULT_PAGE_SIZE", "10");
        let config = EngineConfig::load(temp_dir.path()).unwrap();
        assert_eq!(config.default_page_size, 10);

        clear_all_env_vars();
    }

    #[test]
    fn test_config_env_invalid_sort_order() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();

        std::env::set_var("TABULA_DEFAULT_SORT_ORDER", "sideways");
        assert!(EngineConfig::load(temp_dir.path()).is_err());

        clear_all_env_vars();
    }

    #[test]
    fn test_config_file_overridden_by_env() {
        let _guard = ENV_LOCK.lock().unwrap();
        clear_all_env_vars();
        let temp_dir = TempDir::new().unwrap();
        std::fs::write(temp_dir.path().join(CONFIG_FILE), "instance_fallback = true").unwrap();

        std::env::set_var("TABULA_INSTANCE_FALLBACK", "false");
        let config = EngineConfig::load(temp_dir.path()).unwrap();
        assert!(!config.instance_fallback);

        clear_all_env_vars();
    }
}
