//! Common utilities module
//!
//! This module contains shared utilities used across the readout pipeline.

pub mod error;

pub use error::{ReadoutError, Result};
