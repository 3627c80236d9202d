//! Response types for the hub's own endpoints.
//!
//! Ingestion payloads and the snapshot document live in `contracts`.

use serde::{Deserialize, Serialize};

/// GET /health
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub ok: bool,
    pub service: String,
    pub version: String,
    /// Live stream subscribers
    pub subscribers: usize,
    /// Roles with a trajectory buffer
    pub roles: usize,
}

/// Body of every error response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}
