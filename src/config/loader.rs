//! Configuration loading from disk and command-line overrides.

use std::fs;
use std::path::Path;

use thiserror::Error;

use crate::config::schema::ServiceConfig;
use crate::config::validation::{validate_config, ValidationError};

/// Error type for configuration loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Validation failed: {}", join_errors(.0))]
    Validation(Vec<ValidationError>),
}

fn join_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}

/// Values given on the command line or in the environment.
///
/// Each set field replaces the corresponding file value.
#[derive(Debug, Clone, Default)]
pub struct ConfigOverrides {
    pub domain_suffix: Option<String>,
    pub ref_label: Option<String>,
    pub alias_label: Option<String>,
    pub storage_root: Option<String>,
    pub storage_prefix: Option<String>,
    pub metadata_file: Option<String>,
    pub bind_address: Option<String>,
    pub control_address: Option<String>,
    pub log_level: Option<String>,
}

impl ConfigOverrides {
    pub fn apply(&self, config: &mut ServiceConfig) {
        fn set(target: &mut String, value: &Option<String>) {
            if let Some(value) = value {
                target.clone_from(value);
            }
        }

        set(&mut config.sites.domain_suffix, &self.domain_suffix);
        set(&mut config.sites.ref_label, &self.ref_label);
        set(&mut config.sites.alias_label, &self.alias_label);
        set(&mut config.storage.root, &self.storage_root);
        set(&mut config.storage.prefix, &self.storage_prefix);
        set(&mut config.listener.bind_address, &self.bind_address);
        set(&mut config.listener.control_address, &self.control_address);
        set(&mut config.observability.log_level, &self.log_level);
        if self.metadata_file.is_some() {
            config.storage.metadata_file.clone_from(&self.metadata_file);
        }
    }
}

/// Parse a TOML configuration file without validating it.
pub fn read_config(path: &Path) -> Result<ServiceConfig, ConfigError> {
    let content = fs::read_to_string(path).map_err(ConfigError::Io)?;
    toml::from_str(&content).map_err(ConfigError::Parse)
}

/// Load the file (or defaults), apply overrides, then validate.
pub fn load_config(path: Option<&Path>, overrides: &ConfigOverrides) -> Result<ServiceConfig, ConfigError> {
    let mut config = match path {
        Some(path) => read_config(path)?,
        None => ServiceConfig::default(),
    };
    overrides.apply(&mut config);

    validate_config(&config).map_err(ConfigError::Validation)?;

    Ok(config)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn test_load_defaults_with_overrides() {
        let overrides = ConfigOverrides {
            domain_suffix: Some("example.com".into()),
            metadata_file: Some("aliases.json".into()),
            ..ConfigOverrides::default()
        };
        let config = load_config(None, &overrides).unwrap();
        assert_eq!(config.sites.domain_suffix, "example.com");
        assert_eq!(config.storage.metadata_file.as_deref(), Some("aliases.json"));
        assert_eq!(config.storage.prefix, "site-deployments");
    }

    #[test]
    fn test_overrides_win_over_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(
            file,
            "[sites]\ndomain_suffix = \"file.example\"\nref_label = \"ref\"\n\n[storage]\nprefix = \"deploys\""
        )
        .unwrap();

        let overrides = ConfigOverrides {
            domain_suffix: Some("flag.example".into()),
            ..ConfigOverrides::default()
        };
        let config = load_config(Some(file.path()), &overrides).unwrap();
        assert_eq!(config.sites.domain_suffix, "flag.example");
        assert_eq!(config.sites.ref_label, "ref");
        assert_eq!(config.storage.prefix, "deploys");
    }

    #[test]
    fn test_invalid_file() {
        let mut file = tempfile::NamedTempFile::new().unwrap();
        writeln!(file, "[sites\n").unwrap();
        let err = load_config(Some(file.path()), &ConfigOverrides::default()).unwrap_err();
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_validation_runs_after_overrides() {
        let overrides = ConfigOverrides {
            alias_label: Some("sites".into()),
            ..ConfigOverrides::default()
        };
        let err = load_config(None, &overrides).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(_)));
        assert!(err.to_string().starts_with("Validation failed: "));
    }

    #[test]
    fn test_missing_file() {
        let err = load_config(Some(Path::new("/nonexistent/static-host.toml")), &ConfigOverrides::default())
            .unwrap_err();
        assert!(matches!(err, ConfigError::Io(_)));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn test_validation_message_lists_every_error() {
        let err = ConfigError::Validation(vec![
            ValidationError::Empty { field: "sites.domain_suffix" },
            ValidationError::NoRouteStatus(200),
        ]);
        assert_eq!(
            err.to_string(),
            "Validation failed: sites.domain_suffix must not be empty, \
             no_route_status must be within 400-599, got 200"
        );
        assert!(std::error::Error::source(&err).is_none());
    }
}
