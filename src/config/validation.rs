//! Configuration validation logic.

use std::net::SocketAddr;

use crate::config::loader::Config;
use crate::error::{Error, Result};

/// Minimum length for user agent.
const MIN_USER_AGENT_LENGTH: usize = 20;

/// Upper bound on metadata fetch attempts.
pub const MAX_METADATA_ATTEMPTS: u32 = 2;

/// Validate the entire configuration.
pub fn validate_config(config: &Config) -> Result<()> {
    validate_user_agent(&config.upstream.user_agent)?;
    validate_non_empty("app_id", &config.upstream.app_id)?;
    validate_non_empty("graphql_doc_id", &config.upstream.graphql_doc_id)?;
    validate_positive("metadata_timeout_secs", config.upstream.metadata_timeout_secs)?;
    validate_positive("asset_timeout_secs", config.upstream.asset_timeout_secs)?;
    validate_attempts(config.upstream.max_attempts)?;
    validate_bind_addr(&config.server.bind_addr)?;
    validate_origins(&config.server.allowed_origins)?;

    if config.cache.enabled {
        validate_positive("cache.ttl_secs", config.cache.ttl_secs)?;
        validate_positive("cache.max_entries", config.cache.max_entries as u64)?;
    }

    Ok(())
}

/// Validate the user agent string.
pub fn validate_user_agent(user_agent: &str) -> Result<()> {
    if user_agent.trim().is_empty() {
        return Err(Error::ConfigValidation {
            field: "user_agent".to_string(),
            message: "User agent cannot be empty".to_string(),
        });
    }

    if user_agent.len() < MIN_USER_AGENT_LENGTH {
        return Err(Error::ConfigValidation {
            field: "user_agent".to_string(),
            message: format!(
                "User agent must be at least {} characters (got {})",
                MIN_USER_AGENT_LENGTH,
                user_agent.len()
            ),
        });
    }

    Ok(())
}

/// Validate the metadata attempt cap.
pub fn validate_attempts(attempts: u32) -> Result<()> {
    if attempts == 0 || attempts > MAX_METADATA_ATTEMPTS {
        return Err(Error::ConfigValidation {
            field: "max_attempts".to_string(),
            message: format!(
                "Must be between 1 and {} (got {})",
                MAX_METADATA_ATTEMPTS, attempts
            ),
        });
    }
    Ok(())
}

/// Validate the listen address.
pub fn validate_bind_addr(addr: &str) -> Result<()> {
    addr.parse::<SocketAddr>()
        .map(|_| ())
        .map_err(|e| Error::ConfigValidation {
            field: "bind_addr".to_string(),
            message: format!("'{}' is not a socket address: {}", addr, e),
        })
}

/// Validate CORS origins (`scheme://host[:port]`, no path).
pub fn validate_origins(origins: &[String]) -> Result<()> {
    for origin in origins {
        let parsed = url::Url::parse(origin).ok();
        let valid = parsed.as_ref().is_some_and(|url| {
            matches!(url.scheme(), "http" | "https")
                && url.host_str().is_some()
                && url.path() == "/"
                && !origin.ends_with('/')
        });

        if !valid {
            return Err(Error::ConfigValidation {
                field: "allowed_origins".to_string(),
                message: format!(
                    "'{}' is not a valid origin. Use values like https://example.com",
                    origin
                ),
            });
        }
    }
    Ok(())
}

fn validate_non_empty(field: &str, value: &str) -> Result<()> {
    if value.trim().is_empty() {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: "Value cannot be empty".to_string(),
        });
    }
    Ok(())
}

fn validate_positive(field: &str, value: u64) -> Result<()> {
    if value == 0 {
        return Err(Error::ConfigValidation {
            field: field.to_string(),
            message: "Value must be greater than zero".to_string(),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        assert!(validate_config(&Config::default()).is_ok());
    }

    #[test]
    fn test_attempts_are_capped() {
        assert!(validate_attempts(1).is_ok());
        assert!(validate_attempts(2).is_ok());
        assert!(validate_attempts(0).is_err());
        assert!(validate_attempts(3).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = Config::default();
        config.upstream.metadata_timeout_secs = 0;
        assert!(matches!(
            validate_config(&config),
            Err(Error::ConfigValidation { field, .. }) if field == "metadata_timeout_secs"
        ));
    }

    #[test]
    fn test_cache_limits_ignored_when_disabled() {
        let mut config = Config::default();
        config.cache.ttl_secs = 0;
        assert!(validate_config(&config).is_err());

        config.cache.enabled = false;
        assert!(validate_config(&config).is_ok());
    }

    #[test]
    fn test_bind_addr() {
        assert!(validate_bind_addr("0.0.0.0:8001").is_ok());
        assert!(validate_bind_addr("localhost").is_err());
    }

    #[test]
    fn test_origins() {
        assert!(validate_origins(&["http://localhost:3000".to_string()]).is_ok());
        assert!(validate_origins(&["https://example.com".to_string()]).is_ok());
        assert!(validate_origins(&["example.com".to_string()]).is_err());
        assert!(validate_origins(&["https://example.com/app".to_string()]).is_err());
    }

    #[test]
    fn test_short_user_agent() {
        assert!(validate_user_agent("").is_err());
        assert!(validate_user_agent("curl").is_err());
    }
}
