// Module declarations for the crate's core components
pub mod error;   // Error taxonomy returned by every exchange
pub mod mpp;     // MPP Solar inverter protocol implementation
pub mod options; // Command line options parsing
pub mod prelude; // Common imports and types

// Get the package version from Cargo.toml
pub const CARGO_PKG_VERSION: &str = env!("CARGO_PKG_VERSION");

pub use crate::error::{Error, Result};
pub use crate::mpp::device::{Connection, Device};
