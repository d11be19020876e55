//! HTTP inbound adapter: the `/ai` bridge, the structured document endpoint,
//! and health probes.

pub mod ai;
pub mod error;
pub mod graphql;
pub mod health;
pub mod schemas;
pub mod state;

pub use error::{ApiError, ApiResult};
