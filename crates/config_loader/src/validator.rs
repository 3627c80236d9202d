//! Configuration validation
//!
//! Rules:
//! - server.bind_addr parses as a socket address
//! - server.admin_secret, if set, is not blank
//! - aggregation.deviation_window_secs is finite and positive
//! - broadcast.subscriber_queue_capacity > 0
//! - broadcast.keep_alive_secs > 0

use std::net::SocketAddr;

use contracts::{ContractError, ServiceBlueprint};

/// Validate a ServiceBlueprint
///
/// Returns the first error found.
pub fn validate(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    validate_server(blueprint)?;
    validate_aggregation(blueprint)?;
    validate_broadcast(blueprint)?;
    Ok(())
}

/// Listener settings
fn validate_server(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    let server = &blueprint.server;

    if server.bind_addr.parse::<SocketAddr>().is_err() {
        return Err(ContractError::config_validation(
            "server.bind_addr",
            format!("'{}' is not a valid socket address", server.bind_addr),
        ));
    }

    if let Some(secret) = &server.admin_secret {
        if secret.trim().is_empty() {
            return Err(ContractError::config_validation(
                "server.admin_secret",
                "admin secret cannot be blank",
            ));
        }
    }

    Ok(())
}

/// Deviation window
fn validate_aggregation(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    let window = blueprint.aggregation.deviation_window_secs;
    if !window.is_finite() || window <= 0.0 {
        return Err(ContractError::config_validation(
            "aggregation.deviation_window_secs",
            format!("deviation_window_secs must be a finite value > 0, got {window}"),
        ));
    }
    Ok(())
}

/// Fan-out settings
fn validate_broadcast(blueprint: &ServiceBlueprint) -> Result<(), ContractError> {
    let broadcast = &blueprint.broadcast;

    if broadcast.subscriber_queue_capacity == 0 {
        return Err(ContractError::config_validation(
            "broadcast.subscriber_queue_capacity",
            "subscriber_queue_capacity must be > 0",
        ));
    }

    if broadcast.keep_alive_secs == 0 {
        return Err(ContractError::config_validation(
            "broadcast.keep_alive_secs",
            "keep_alive_secs must be > 0",
        ));
    }

    Ok(())
}
