//! # Telemetry Hub
//!
//! HTTP boundary: report and plan ingestion, the SSE stream and snapshot
//! queries.
//!
//! Routes and shared state are exported as a library so the scenario tests
//! under `tests/` can build the router in-process.

pub mod server;

pub use server::{build_router, AppState};
