use super::{
    types::{Config, OperationProfile},
    ConfigError,
};

/// Validate configuration
/// Currently validates:
/// - Server port is not 0
/// - Simulator profile capacities are positive
/// - Client base_url is set
/// - Gate capacities and batch size are positive
pub fn validate_config(config: &Config) -> Result<(), ConfigError> {
    // Server validation
    if config.server.port == 0 {
        return Err(ConfigError::ValidationError(
            "server.port cannot be 0".to_string(),
        ));
    }

    // Simulator validation
    validate_profile("simulator.metadata", &config.simulator.metadata)?;
    validate_profile("simulator.transcript", &config.simulator.transcript)?;
    validate_profile("simulator.update", &config.simulator.update)?;

    // Client validation
    if config.client.base_url.trim().is_empty() {
        return Err(ConfigError::ValidationError(
            "client.base_url cannot be empty".to_string(),
        ));
    }

    // Gates validation
    for (key, value) in [
        ("gates.metadata_capacity", config.gates.metadata_capacity),
        ("gates.transcript_capacity", config.gates.transcript_capacity),
        ("gates.connection_budget", config.gates.connection_budget),
        (
            "gates.classification_capacity",
            config.gates.classification_capacity,
        ),
        ("batch.size", config.batch.size),
    ] {
        if value == 0 {
            return Err(ConfigError::ValidationError(format!(
                "{} must be greater than 0",
                key
            )));
        }
    }

    Ok(())
}

fn validate_profile(key: &str, profile: &OperationProfile) -> Result<(), ConfigError> {
    if profile.capacity == 0 {
        return Err(ConfigError::ValidationError(format!(
            "{}.capacity must be greater than 0",
            key
        )));
    }
    Ok(())
}
