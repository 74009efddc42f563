//! # amoCRM Domain
//!
//! Shared types for the amoCRM client workspace.
//!
//! This crate contains:
//! - Client configuration and identity structures
//! - The error taxonomy surfaced to callers
//! - Protocol constants (expiry margin, default paths)
//!
//! ## Architecture
//! - No dependencies on other workspace crates
//! - No I/O: pure data structures and conversions

pub mod config;
pub mod constants;
pub mod errors;

// Re-export commonly used items
pub use config::*;
pub use errors::*;
