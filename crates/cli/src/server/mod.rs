//! Axum router, shared state and HTTP boundary types.

pub mod admin;
pub mod api_types;
pub mod error;
pub mod routes;
pub mod state;

pub use error::ApiError;
pub use routes::build_router;
pub use state::{AppState, BuildInfo};
