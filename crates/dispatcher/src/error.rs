//! Dispatcher error types

use thiserror::Error;

/// Dispatcher-specific errors
#[derive(Debug, Error)]
pub enum DispatcherError {
    /// Payload could not be serialized for the stream
    #[error("failed to serialize broadcast payload: {0}")]
    Serialize(#[from] serde_json::Error),

    /// Delivery error (from contract)
    #[error("delivery error: {0}")]
    Contract(#[from] contracts::ContractError),
}
