//! Application configuration schemas.
//!
//! All configuration structs are deserialized via the `config` crate from
//! an optional base file, an optional environment overlay
//! (`config/{env}`) and `VELPON__`-prefixed environment variables.

pub mod chain;
pub mod logging;
pub mod stack;

use serde::{Deserialize, Serialize};
use validator::Validate;

use self::chain::ChainConfig;
use self::logging::LoggingConfig;
use self::stack::StackConfig;

use crate::error::AppError;

/// Root application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Identifier conventions and resolver behavior.
    #[serde(default)]
    pub chain: ChainConfig,
    /// Where the registration stack is read from.
    #[serde(default)]
    pub stack: StackConfig,
    /// Logging settings.
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl AppConfig {
    /// Load configuration from `path`, overlaid with `config/{env}` and
    /// environment variables prefixed with `VELPON__`.
    ///
    /// Missing files are not an error; the defaults apply.
    pub fn load(path: &str, env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name(path).required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("VELPON")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to build config: {e}")))?;

        let app: Self = config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Failed to deserialize config: {e}")))?;

        app.validate()?;
        Ok(app)
    }

    /// Validate every section.
    pub fn validate(&self) -> Result<(), AppError> {
        self.chain
            .validate()
            .map_err(|e| AppError::configuration(format!("Invalid [chain] section: {e}")))?;

        let pluggable = self.chain.pluggable_suffix.as_str();
        let link = self.chain.link_suffix.as_str();
        if pluggable == link {
            return Err(AppError::configuration(format!(
                "pluggable_suffix and link_suffix must differ (both are '{link}')"
            )));
        }
        if pluggable.ends_with(link) || link.ends_with(pluggable) {
            return Err(AppError::configuration(format!(
                "pluggable_suffix '{pluggable}' and link_suffix '{link}' must not end with one another"
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_match_loader_conventions() {
        let config = AppConfig::default();
        assert_eq!(config.chain.pluggable_suffix, "Pluggable");
        assert_eq!(config.chain.link_suffix, "Velpon");
        assert!(config.chain.hook_points.is_empty());
        assert!(config.chain.memoize);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_missing_file_uses_defaults() {
        let config = AppConfig::load("/nonexistent/velpon", "nonexistent-env").expect("load");
        assert_eq!(config.chain.link_suffix, "Velpon");
        assert_eq!(config.logging.level, "warn");
    }

    #[test]
    fn test_load_from_toml_file() {
        let temp = tempfile::tempdir().expect("tempdir");
        let path = temp.path().join("velpon.toml");
        std::fs::write(
            &path,
            r#"
[chain]
link_suffix = "Next"
hook_points = ["Mailer", "Renderer"]
memoize = false

[stack]
path = "plugins.json"

[logging]
format = "json"
"#,
        )
        .expect("write");

        let config =
            AppConfig::load(path.to_str().expect("utf-8"), "nonexistent-env").expect("load");
        assert_eq!(config.chain.link_suffix, "Next");
        assert_eq!(config.chain.pluggable_suffix, "Pluggable");
        assert_eq!(config.chain.hook_points, vec!["Mailer", "Renderer"]);
        assert!(!config.chain.memoize);
        assert_eq!(config.stack.path.as_deref(), Some("plugins.json"));
        assert_eq!(config.logging.format, "json");
    }

    #[test]
    fn test_validate_rejects_equal_suffixes() {
        let mut config = AppConfig::default();
        config.chain.link_suffix = "Pluggable".to_string();
        let err = config.validate().expect_err("equal suffixes");
        assert!(err.is(crate::error::ErrorKind::Configuration));
    }

    #[test]
    fn test_validate_rejects_overlapping_suffixes() {
        let mut config = AppConfig::default();
        config.chain.pluggable_suffix = "XVelpon".to_string();
        let err = config.validate().expect_err("pluggable suffix ends with link suffix");
        assert!(err.is(crate::error::ErrorKind::Configuration));

        let mut config = AppConfig::default();
        config.chain.link_suffix = "NotPluggable".to_string();
        assert!(config.validate().is_err());

        let mut config = AppConfig::default();
        config.chain.link_suffix = "Next".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_suffix() {
        let mut config = AppConfig::default();
        config.chain.pluggable_suffix = String::new();
        assert!(config.validate().is_err());
    }
}
