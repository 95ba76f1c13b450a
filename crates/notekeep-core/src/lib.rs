//! # notekeep-core
//!
//! Core types, traits, and note lifecycle rules for notekeep.
//!
//! This crate provides the foundational data structures and storage trait
//! definitions that the other notekeep crates depend on.

pub mod defaults;
pub mod error;
pub mod logging;
#[cfg(any(test, feature = "memory"))]
pub mod memory;
pub mod models;
pub mod traits;
pub mod validation;

// Re-export commonly used types at crate root
pub use error::{Error, Result};
pub use models::*;
pub use traits::*;
