//! Service configuration.
//!
//! # Responsibility
//! - Describe where entities and policies are loaded from and how logging
//!   is set up.
//! - Overlay environment variables onto defaults or a JSON document.
//!
//! # Invariants
//! - Blank environment values never override a setting.
//! - The application uid is not configurable; it comes from the fixture.

use crate::logging::default_log_level;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub const ENV_ENTITIES: &str = "TINYTODO_ENTITIES";
pub const ENV_POLICIES: &str = "TINYTODO_POLICIES";
pub const ENV_LOG_LEVEL: &str = "TINYTODO_LOG_LEVEL";
pub const ENV_LOG_DIR: &str = "TINYTODO_LOG_DIR";

const DEFAULT_ENTITIES_PATH: &str = "entities.json";
const DEFAULT_POLICIES_PATH: &str = "policies.cedar";

/// Invalid configuration document.
#[derive(Debug)]
pub enum ConfigError {
    Json(serde_json::Error),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Json(err) => write!(f, "invalid service config: {err}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(err) => Some(err),
        }
    }
}

impl From<serde_json::Error> for ConfigError {
    fn from(value: serde_json::Error) -> Self {
        Self::Json(value)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Entity fixture loaded at startup.
    pub entities_path: PathBuf,
    /// Cedar policy file loaded at startup.
    pub policies_path: PathBuf,
    pub log_level: String,
    /// Absolute log directory; logging stays off when unset.
    pub log_dir: Option<String>,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            entities_path: PathBuf::from(DEFAULT_ENTITIES_PATH),
            policies_path: PathBuf::from(DEFAULT_POLICIES_PATH),
            log_level: default_log_level().to_string(),
            log_dir: None,
        }
    }
}

impl ServiceConfig {
    /// Defaults overlaid with `TINYTODO_*` environment variables.
    pub fn from_env() -> Self {
        Self::default().with_overrides(|key| std::env::var(key).ok())
    }

    /// Parses a JSON config document; missing keys keep their defaults.
    pub fn from_json_str(text: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(text)?)
    }

    /// Applies overrides from `lookup`, keyed by the `TINYTODO_*` names.
    #[must_use]
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        let value = |key: &str| {
            lookup(key)
                .map(|raw| raw.trim().to_string())
                .filter(|trimmed| !trimmed.is_empty())
        };

        if let Some(path) = value(ENV_ENTITIES) {
            self.entities_path = PathBuf::from(path);
        }
        if let Some(path) = value(ENV_POLICIES) {
            self.policies_path = PathBuf::from(path);
        }
        if let Some(level) = value(ENV_LOG_LEVEL) {
            self.log_level = level;
        }
        if let Some(dir) = value(ENV_LOG_DIR) {
            self.log_dir = Some(dir);
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::{ServiceConfig, ENV_ENTITIES, ENV_LOG_DIR, ENV_LOG_LEVEL, ENV_POLICIES};
    use crate::authz::policy::{CedarPdp, PolicyError};
    use std::collections::HashMap;
    use std::path::PathBuf;

    #[test]
    fn defaults_point_at_local_fixture_without_logging() {
        let config = ServiceConfig::default();
        assert_eq!(config.entities_path, PathBuf::from("entities.json"));
        assert_eq!(config.policies_path, PathBuf::from("policies.cedar"));
        assert!(config.log_dir.is_none());
        assert!(!config.log_level.is_empty());
    }

    #[test]
    fn overrides_apply_and_blank_values_are_ignored() {
        let env: HashMap<&str, &str> = HashMap::from([
            (ENV_ENTITIES, "/srv/tinytodo/entities.json"),
            (ENV_POLICIES, "/srv/tinytodo/policies.cedar"),
            (ENV_LOG_LEVEL, "   "),
            (ENV_LOG_DIR, " /var/log/tinytodo "),
        ]);
        let config = ServiceConfig::default()
            .with_overrides(|key| env.get(key).map(|value| value.to_string()));

        assert_eq!(
            config.entities_path,
            PathBuf::from("/srv/tinytodo/entities.json")
        );
        assert_eq!(
            config.policies_path,
            PathBuf::from("/srv/tinytodo/policies.cedar")
        );
        assert_eq!(config.log_level, ServiceConfig::default().log_level);
        assert_eq!(config.log_dir.as_deref(), Some("/var/log/tinytodo"));
    }

    #[test]
    fn json_document_fills_missing_keys_with_defaults() {
        let config = ServiceConfig::from_json_str(r#"{"log_level":"warn"}"#)
            .expect("partial config should parse");
        assert_eq!(config.log_level, "warn");
        assert_eq!(config.entities_path, PathBuf::from("entities.json"));

        assert!(ServiceConfig::from_json_str("[1,2]").is_err());
    }

    #[test]
    fn configured_policy_path_that_does_not_exist_fails_to_load() {
        let dir = tempfile::tempdir().expect("temp dir");
        let missing = dir.path().join("absent.cedar");
        let config = ServiceConfig::from_json_str(&format!(
            r#"{{"policies_path":{}}}"#,
            serde_json::to_string(&missing).expect("path json")
        ))
        .expect("config parses");
        assert_eq!(config.policies_path, missing);

        let err = CedarPdp::load(&config.policies_path).expect_err("missing policies");
        assert!(matches!(err, PolicyError::Io { .. }));
    }
}
