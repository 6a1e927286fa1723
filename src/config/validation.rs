//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, status codes, addresses)
//! - Detect conflicting host labels
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: ServiceConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::net::SocketAddr;

use thiserror::Error;

use crate::config::schema::ServiceConfig;

/// A single semantic problem in the service configuration.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("{field} must not be empty")]
    Empty { field: &'static str },

    #[error("{field} is not a valid socket address: {value}")]
    InvalidAddress { field: &'static str, value: String },

    #[error("ref_label and alias_label must differ (both are {0:?})")]
    DuplicateLabel(String),

    #[error("no_route_status must be within 400-599, got {0}")]
    NoRouteStatus(u16),

    #[error("{field} must be greater than zero")]
    ZeroTimeout { field: &'static str },
}

/// Validate a loaded configuration, collecting every error.
pub fn validate_config(config: &ServiceConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    let required = [
        ("sites.domain_suffix", &config.sites.domain_suffix),
        ("sites.ref_label", &config.sites.ref_label),
        ("sites.alias_label", &config.sites.alias_label),
        ("sites.config_filename", &config.sites.config_filename),
        ("storage.root", &config.storage.root),
    ];
    for (field, value) in required {
        if value.trim().is_empty() {
            errors.push(ValidationError::Empty { field });
        }
    }

    if !config.sites.ref_label.is_empty() && config.sites.ref_label == config.sites.alias_label {
        errors.push(ValidationError::DuplicateLabel(config.sites.ref_label.clone()));
    }

    if !(400..=599).contains(&config.sites.no_route_status) {
        errors.push(ValidationError::NoRouteStatus(config.sites.no_route_status));
    }

    let mut addresses = vec![
        ("listener.bind_address", &config.listener.bind_address),
        ("listener.control_address", &config.listener.control_address),
    ];
    if config.observability.metrics_enabled {
        addresses.push(("observability.metrics_address", &config.observability.metrics_address));
    }
    for (field, value) in addresses {
        if value.parse::<SocketAddr>().is_err() {
            errors.push(ValidationError::InvalidAddress {
                field,
                value: value.clone(),
            });
        }
    }

    if config.storage.timeout_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "storage.timeout_secs" });
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::ZeroTimeout { field: "timeouts.request_secs" });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert_eq!(validate_config(&ServiceConfig::default()), Ok(()));
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = ServiceConfig::default();
        config.sites.domain_suffix = String::new();
        config.sites.alias_label = "sites".into();
        config.sites.no_route_status = 200;
        config.listener.bind_address = "not-an-address".into();
        config.timeouts.request_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 5);
        assert!(errors.contains(&ValidationError::Empty { field: "sites.domain_suffix" }));
        assert!(errors.contains(&ValidationError::DuplicateLabel("sites".into())));
        assert!(errors.contains(&ValidationError::NoRouteStatus(200)));
        assert!(errors.contains(&ValidationError::ZeroTimeout { field: "timeouts.request_secs" }));
    }

    #[test]
    fn test_metrics_address_checked_only_when_enabled() {
        let mut config = ServiceConfig::default();
        config.observability.metrics_address = "nope".into();
        assert!(validate_config(&config).is_ok());

        config.observability.metrics_enabled = true;
        let errors = validate_config(&config).unwrap_err();
        assert!(matches!(
            errors[0],
            ValidationError::InvalidAddress { field: "observability.metrics_address", .. }
        ));
    }
}
