//! Capabilities: the registrable reasoning strategies ("agent roles") that
//! the explorer fans a query out across.

pub mod entities;
pub mod registry;

pub use entities::{
    Capability, CapabilityId, CapabilityTemplate, QUERY_PLACEHOLDER, builtin_capabilities,
};
pub use registry::CapabilityRegistry;
