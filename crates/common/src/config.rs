use crate::ident::is_plain_identifier;
use anyhow::{Context, Result};
use serde::Deserialize;
use validator::Validate;

pub const DEFAULT_DATABASE: &str = ":memory:";
pub const DEFAULT_WORKING_ALIAS: &str = "current_df";
pub const DEFAULT_LOG_DIRECTIVE: &str = "info";
pub const ENV_PREFIX: &str = "DUCKQUERY";

/// How a bare column name that only registered tables provide is qualified
/// when more than one of them has it.
#[derive(Debug, Deserialize, Clone, Copy, Default, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum AmbiguityPolicy {
    /// Qualify with the first matching table in registration order.
    #[default]
    FirstRegistered,
    /// Reject the select list with an ambiguity error.
    Error,
}

#[derive(Debug, Deserialize, Clone, Default, Validate)]
pub struct SessionConfig {
    #[serde(default)]
    #[validate(nested)]
    pub engine: EngineSettings,
    #[serde(default)]
    #[validate(nested)]
    pub session: SessionSettings,
    #[serde(default)]
    pub logging: LoggingSettings,
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct EngineSettings {
    /// `:memory:` or a path to a DuckDB database file.
    #[serde(default = "default_database")]
    #[validate(length(min = 1))]
    pub database: String,

    #[serde(default)]
    #[validate(range(min = 1, max = 256))]
    pub threads: Option<u32>,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            database: default_database(),
            threads: None,
        }
    }
}

#[derive(Debug, Deserialize, Clone, Validate)]
pub struct SessionSettings {
    #[serde(default = "default_working_alias")]
    #[validate(custom(function = "validate_alias"))]
    pub working_alias: String,

    #[serde(default)]
    pub ambiguity_policy: AmbiguityPolicy,
}

impl Default for SessionSettings {
    fn default() -> Self {
        Self {
            working_alias: default_working_alias(),
            ambiguity_policy: AmbiguityPolicy::default(),
        }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct LoggingSettings {
    /// Filter directive used when `RUST_LOG` is not set.
    #[serde(default = "default_log_directive")]
    pub default_directive: String,

    /// Replace string literals in logged SQL with `'?'`.
    #[serde(default = "default_scrub_sql")]
    pub scrub_sql: bool,
}

impl Default for LoggingSettings {
    fn default() -> Self {
        Self {
            default_directive: default_log_directive(),
            scrub_sql: default_scrub_sql(),
        }
    }
}

fn default_database() -> String {
    DEFAULT_DATABASE.to_string()
}

fn default_working_alias() -> String {
    DEFAULT_WORKING_ALIAS.to_string()
}

fn default_log_directive() -> String {
    DEFAULT_LOG_DIRECTIVE.to_string()
}

fn default_scrub_sql() -> bool {
    true
}

/// The working alias is emitted unquoted in qualified column references, so it
/// must be a plain identifier.
fn validate_alias(alias: &str) -> Result<(), validator::ValidationError> {
    if is_plain_identifier(alias) {
        Ok(())
    } else {
        Err(validator::ValidationError::new("invalid_alias"))
    }
}

impl SessionConfig {
    /// Loads configuration from an optional file plus `DUCKQUERY__*`
    /// environment overrides, e.g. `DUCKQUERY__ENGINE__DATABASE`.
    pub fn from_file(path: &str) -> Result<Self> {
        let builder = config::Config::builder();

        let builder = if std::path::Path::new(path).exists() {
            builder.add_source(config::File::with_name(path))
        } else {
            builder
        };

        let builder = builder.add_source(
            config::Environment::with_prefix(ENV_PREFIX)
                .separator("__")
                .try_parsing(true),
        );

        let cfg = builder.build().context("Failed to build configuration")?;

        let session_config: SessionConfig = cfg
            .try_deserialize()
            .context("Failed to deserialize configuration")?;

        session_config
            .validate()
            .map_err(|e| anyhow::anyhow!("Configuration validation failed: {:?}", e))?;

        Ok(session_config)
    }

    pub fn in_memory() -> Self {
        Self::default()
    }

    pub fn is_in_memory(&self) -> bool {
        self.engine.database == DEFAULT_DATABASE
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_default_config_validates() {
        let config = SessionConfig::default();
        assert!(config.validate().is_ok());
        assert!(config.is_in_memory());
        assert_eq!(config.session.working_alias, "current_df");
        assert_eq!(
            config.session.ambiguity_policy,
            AmbiguityPolicy::FirstRegistered
        );
        assert!(config.logging.scrub_sql);
    }

    #[test]
    fn test_alias_validation() {
        let mut config = SessionConfig::default();
        config.session.working_alias = "current df".to_string();
        assert!(config.validate().is_err());

        config.session.working_alias = "1df".to_string();
        assert!(config.validate().is_err());

        config.session.working_alias = "_work".to_string();
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_thread_range_validation() {
        let mut config = SessionConfig::default();
        config.engine.threads = Some(0);
        assert!(config.validate().is_err());
        config.engine.threads = Some(4);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_from_yaml_file() -> Result<()> {
        let mut file = tempfile::Builder::new().suffix(".yaml").tempfile()?;
        writeln!(
            file,
            "session:\n  ambiguity_policy: error\nengine:\n  threads: 2\nlogging:\n  scrub_sql: false"
        )?;

        let path = file.path().to_str().expect("utf-8 temp path");
        let config = SessionConfig::from_file(path)?;

        assert_eq!(config.session.ambiguity_policy, AmbiguityPolicy::Error);
        assert_eq!(config.engine.threads, Some(2));
        assert!(!config.logging.scrub_sql);
        assert_eq!(config.engine.database, ":memory:");
        Ok(())
    }

    #[test]
    fn test_missing_file_falls_back_to_defaults() -> Result<()> {
        let config = SessionConfig::from_file("/nonexistent/duckquery.yaml")?;
        assert!(config.is_in_memory());
        Ok(())
    }
}
