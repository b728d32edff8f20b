//! [Registry](crate::registry::Registry) behavior is controlled by [RegistryConfig].
//!
//! By default, the config is created with default values, which can then be overwritten by
//! environment variables prefixed with `WIREUP_` or a `wireup.json` file, when using
//! [RegistryConfig::from_environment].

use config::{Config, ConfigError, Environment, File};
use serde::Deserialize;

const CONFIG_ENV_PREFIX: &str = "WIREUP";

/// Name of the default config file.
pub const CONFIG_FILE: &str = "wireup.json";

/// Strategy for choosing between multiple discovered providers, when none of them is primary.
#[derive(Clone, Copy, Debug, Default, Deserialize, Eq, PartialEq, Hash)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Choose the provider with the highest priority, then with the smallest type name.
    #[default]
    Ordered,
    /// Fail resolution.
    Strict,
}

/// Registry configuration.
#[non_exhaustive]
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RegistryConfig {
    /// Should providers be discovered when no explicit registration exists.
    pub discovery: bool,

    /// Should top-level resolution fall back to default construction when no provider exists.
    pub default_construction: bool,

    /// How to treat multiple discovered providers for the same type.
    pub ambiguity: AmbiguityPolicy,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            discovery: true,
            default_construction: true,
            ambiguity: AmbiguityPolicy::default(),
        }
    }
}

impl From<OptionalRegistryConfig> for RegistryConfig {
    fn from(value: OptionalRegistryConfig) -> Self {
        let default = Self::default();
        Self {
            discovery: value.discovery.unwrap_or(default.discovery),
            default_construction: value
                .default_construction
                .unwrap_or(default.default_construction),
            ambiguity: value.ambiguity.unwrap_or(default.ambiguity),
        }
    }
}

impl RegistryConfig {
    /// Loads the config from [CONFIG_FILE] (if present) and environment variables.
    pub fn from_environment() -> Result<Self, ConfigError> {
        Self::from_file(CONFIG_FILE)
    }

    /// Loads the config from given file (if present) and environment variables.
    pub fn from_file(file_name: &str) -> Result<Self, ConfigError> {
        Config::builder()
            .add_source(File::with_name(file_name).required(false))
            .add_source(Environment::with_prefix(CONFIG_ENV_PREFIX))
            .build()
            .and_then(|config| config.try_deserialize::<OptionalRegistryConfig>())
            .map(|config| config.into())
    }

    pub fn with_discovery(mut self, discovery: bool) -> Self {
        self.discovery = discovery;
        self
    }

    pub fn with_default_construction(mut self, default_construction: bool) -> Self {
        self.default_construction = default_construction;
        self
    }

    pub fn with_ambiguity(mut self, ambiguity: AmbiguityPolicy) -> Self {
        self.ambiguity = ambiguity;
        self
    }
}

#[derive(Deserialize)]
struct OptionalRegistryConfig {
    discovery: Option<bool>,
    default_construction: Option<bool>,
    ambiguity: Option<AmbiguityPolicy>,
}

#[cfg(test)]
mod tests {
    use crate::config::{AmbiguityPolicy, OptionalRegistryConfig, RegistryConfig, CONFIG_FILE};
    use serial_test::serial;
    use std::{env, fs};

    #[test]
    fn should_fill_missing_values_with_defaults() {
        let config: RegistryConfig = OptionalRegistryConfig {
            discovery: None,
            default_construction: Some(false),
            ambiguity: Some(AmbiguityPolicy::Strict),
        }
        .into();

        assert!(config.discovery);
        assert!(!config.default_construction);
        assert_eq!(config.ambiguity, AmbiguityPolicy::Strict);
    }

    #[test]
    #[serial]
    fn should_load_defaults_without_sources() {
        let config = RegistryConfig::from_file("missing-wireup-config.json").unwrap();
        assert_eq!(config, RegistryConfig::default());
    }

    #[test]
    #[serial]
    fn should_load_values_from_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(
            &path,
            r#"{ "discovery": false, "default_construction": false, "ambiguity": "strict" }"#,
        )
        .unwrap();

        let config = RegistryConfig::from_file(path.to_str().unwrap()).unwrap();

        assert!(!config.discovery);
        assert!(!config.default_construction);
        assert_eq!(config.ambiguity, AmbiguityPolicy::Strict);
    }

    #[test]
    #[serial]
    fn should_override_values_from_environment() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(CONFIG_FILE);
        fs::write(&path, r#"{ "default_construction": true }"#).unwrap();

        env::set_var("WIREUP_AMBIGUITY", "strict");
        env::set_var("WIREUP_DEFAULT_CONSTRUCTION", "false");

        let config = RegistryConfig::from_file(path.to_str().unwrap());

        env::remove_var("WIREUP_AMBIGUITY");
        env::remove_var("WIREUP_DEFAULT_CONSTRUCTION");

        let config = config.unwrap();
        assert!(config.discovery);
        assert!(!config.default_construction);
        assert_eq!(config.ambiguity, AmbiguityPolicy::Strict);
    }
}
