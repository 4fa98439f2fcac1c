use super::{
    types::{AuthMethod, Config},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - api_key is present when auth method is api_key
/// - Seating geometry is non-degenerate
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    if matches!(config.auth.method, AuthMethod::ApiKey)
        && config.auth.api_key.as_ref().is_none_or(|k| k.is_empty())
    {
        return Err(ConfigError::ValidationError(
            "auth.api_key must be set when auth.method is api_key".to_string(),
        ));
    }

    if config.seating.total_tables == 0 {
        return Err(ConfigError::ValidationError(
            "seating.total_tables must be at least 1".to_string(),
        ));
    }

    if config.seating.seats_per_table == 0 {
        return Err(ConfigError::ValidationError(
            "seating.seats_per_table must be at least 1".to_string(),
        ));
    }

    if config.seating.max_guests == Some(0) {
        return Err(ConfigError::ValidationError(
            "seating.max_guests must be at least 1 when set".to_string(),
        ));
    }

    Ok(())
}
