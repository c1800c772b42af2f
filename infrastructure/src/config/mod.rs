//! Configuration file loading for superposition
//!
//! This module handles file I/O and merging of configuration from multiple sources.
//! The priority order (highest to lowest):
//!
//! 1. Environment variables `SUPERPOSITION_<SECTION>__<KEY>`
//! 2. `--config <path>` specified file
//! 3. Project root: `./superposition.toml` or `./.superposition.toml`
//! 4. Global: `$XDG_CONFIG_HOME/superposition/config.toml`
//! 5. Default values

mod file_config;
mod loader;

pub use file_config::{
    ConfigValidationError, FileCapabilityConfig, FileConfig, FileConsensusConfig,
    FileExplorerConfig, FileGatewayConfig, FileLoggingConfig, FileProviderConfig,
    build_registry,
};
pub use loader::ConfigLoader;
