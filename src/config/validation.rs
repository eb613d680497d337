//! Configuration validation.
//!
//! # Responsibilities
//! - Semantic validation (serde handles syntactic)
//! - Validate value ranges (timeouts > 0, port valid)
//! - The request deadline must outlast the upstream one
//! - Check the upstream target is a usable URL
//!
//! # Design Decisions
//! - Returns all validation errors, not just first
//! - Validation is pure function: GatewayConfig → Result<(), Vec<ValidationError>>
//! - Runs before config is accepted into the system

use std::fmt;

use url::Url;

use crate::config::schema::GatewayConfig;

/// A single semantic problem in a configuration.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationError {
    pub field: &'static str,
    pub message: String,
}

impl ValidationError {
    fn new(field: &'static str, message: impl Into<String>) -> Self {
        Self {
            field,
            message: message.into(),
        }
    }
}

impl fmt::Display for ValidationError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Check a resolved configuration.
pub fn validate_config(config: &GatewayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if config.port == 0 {
        errors.push(ValidationError::new("port", "must be greater than 0"));
    }

    match Url::parse(&config.target) {
        Ok(url) => {
            if url.scheme() != "http" {
                errors.push(ValidationError::new(
                    "target",
                    format!("unsupported scheme '{}', only http is supported", url.scheme()),
                ));
            }
            if url.host_str().is_none() {
                errors.push(ValidationError::new("target", "missing host"));
            }
        }
        Err(e) => {
            errors.push(ValidationError::new("target", format!("invalid URL: {}", e)));
        }
    }

    if !config.path.starts_with('/') {
        errors.push(ValidationError::new("path", "must start with '/'"));
    }

    if config.timeouts.connect_secs == 0 {
        errors.push(ValidationError::new("timeouts.connect_secs", "must be greater than 0"));
    }
    if config.timeouts.upstream_secs == 0 {
        errors.push(ValidationError::new("timeouts.upstream_secs", "must be greater than 0"));
    }
    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError::new("timeouts.request_secs", "must be greater than 0"));
    } else if config.timeouts.request_secs <= config.timeouts.upstream_secs {
        errors.push(ValidationError::new(
            "timeouts.request_secs",
            "must be greater than timeouts.upstream_secs",
        ));
    }

    if config.limits.max_body_size == 0 {
        errors.push(ValidationError::new("limits.max_body_size", "must be greater than 0"));
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
        assert!(validate_config(&GatewayConfig::default()).is_ok());
    }

    #[test]
    fn test_collects_all_errors() {
        let mut config = GatewayConfig::default();
        config.target = "not a url".into();
        config.path = "strapi".into();
        config.timeouts.upstream_secs = 0;

        let errors = validate_config(&config).unwrap_err();
        let fields: Vec<_> = errors.iter().map(|e| e.field).collect();
        assert_eq!(fields, vec!["target", "path", "timeouts.upstream_secs"]);
    }

    #[test]
    fn test_rejects_https_target() {
        let mut config = GatewayConfig::default();
        config.target = "https://example.com/api".into();

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].message.contains("https"));
    }

    #[test]
    fn test_request_deadline_must_exceed_upstream() {
        let mut config = GatewayConfig::default();
        config.timeouts.request_secs = 1;
        config.timeouts.upstream_secs = 5;

        let errors = validate_config(&config).unwrap_err();
        assert_eq!(errors.len(), 1);
        assert_eq!(errors[0].field, "timeouts.request_secs");

        config.timeouts.request_secs = 5;
        assert!(validate_config(&config).is_err());

        config.timeouts.request_secs = 6;
        assert!(validate_config(&config).is_ok());
    }
}
