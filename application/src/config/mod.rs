//! Application-level configuration.
//!
//! This module provides configuration types that control how use cases behave:
//!
//! - [`GatewayPolicy`]: per-call timeout, retry/backoff and the concurrency ceiling
//! - [`ExplorerParams`]: defaults for hypothesis count, deadline and sampling

pub mod explorer_params;
pub mod gateway_policy;

pub use explorer_params::ExplorerParams;
pub use gateway_policy::GatewayPolicy;
