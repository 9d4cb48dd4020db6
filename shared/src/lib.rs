//! # Shared Module for the Device Registry SDK
//!
//! This crate provides the constants, error types, configuration and wire
//! data types used by the registry client and its transport.
//!
//! ## Error classes
//!
//! | Class | Type | Reported |
//! |-------|------|----------|
//! | Malformed call | [`ArgumentError`] | synchronously, before any request |
//! | Operational failure | [`RegistryError`] | by the operation's future |

pub mod config;
pub mod constants;
pub mod error;
pub mod types;

// Re-exports for convenience
pub use config::*;
pub use constants::*;
pub use error::*;
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
