//! Layered error definitions
//!
//! Categorized by source: config / payload / delivery

use thiserror::Error;

use crate::SubscriberId;

/// Unified error type
#[derive(Debug, Error)]
pub enum ContractError {
    // ===== Configuration Errors =====
    /// Configuration parse error
    #[error("config parse error: {message}")]
    ConfigParse {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// Configuration validation error
    #[error("config validation error at '{field}': {message}")]
    ConfigValidation { field: String, message: String },

    // ===== Payload Errors =====
    /// Upstream payload could not be decoded
    #[error("{kind} payload decode error: {message}")]
    PayloadDecode { kind: &'static str, message: String },

    // ===== Delivery Errors =====
    /// Subscriber channel is gone
    #[error("subscriber {subscriber} closed")]
    SubscriberClosed { subscriber: SubscriberId },

    /// Subscriber cannot keep up; its queue is full
    #[error("subscriber {subscriber} lagging: queue full at {capacity}")]
    SubscriberLagging {
        subscriber: SubscriberId,
        capacity: usize,
    },

    // ===== General Errors =====
    /// IO error
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl ContractError {
    /// Create configuration parse error
    pub fn config_parse(message: impl Into<String>) -> Self {
        Self::ConfigParse {
            message: message.into(),
            source: None,
        }
    }

    /// Create configuration validation error
    pub fn config_validation(field: impl Into<String>, message: impl Into<String>) -> Self {
        Self::ConfigValidation {
            field: field.into(),
            message: message.into(),
        }
    }

    /// Create payload decode error
    pub fn payload_decode(kind: &'static str, message: impl Into<String>) -> Self {
        Self::PayloadDecode {
            kind,
            message: message.into(),
        }
    }

    /// Whether the error means the subscriber should be dropped from the fan-out set
    pub fn is_delivery_failure(&self) -> bool {
        matches!(
            self,
            Self::SubscriberClosed { .. } | Self::SubscriberLagging { .. }
        )
    }
}
