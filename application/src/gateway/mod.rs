//! The model gateway: retry, timeout and admission control around providers.

pub mod model_gateway;

pub use model_gateway::{CallTag, ModelGateway};
