//! Reader configuration
//!
//! `ReaderConfig` carries every tunable of the conversion. It can be built
//! in code through `ReaderConfigBuilder` or loaded from a TOML file.

pub mod types;
mod loader;

pub use types::{OutputRole, ReaderConfig, ReaderConfigBuilder, SIMPLE_SPARSE_PIXEL};
pub use loader::load_config;
