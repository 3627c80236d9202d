//! # Contracts
//!
//! Frozen interface contracts shared by every crate in the workspace.
//! Business crates depend on this crate only; reverse dependencies are prohibited.
//!
//! ## Time Model
//! - Upstream reports carry fractional Unix seconds (`f64`)
//! - Upstream plans carry `{sec, nanosec}` stamps
//! - Both are normalized to `chrono::DateTime<Utc>` before buffering
//! - Snapshots render timestamps as Unix milliseconds

mod blueprint;
mod error;
mod plan;
mod report;
mod role_name;
mod snapshot;
mod stream;
mod trajectory;
mod wire;

pub use blueprint::*;
pub use error::*;
pub use plan::*;
pub use report::*;
pub use role_name::RoleName;
pub use snapshot::*;
pub use stream::*;
pub use trajectory::*;
