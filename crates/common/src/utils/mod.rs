//! Common utility functions
//!
//! - **[`serde`]**: Serialization helpers for wire and storage types

pub mod serde;

// Re-export commonly used items for convenience
pub use self::serde::lenient_seconds;
