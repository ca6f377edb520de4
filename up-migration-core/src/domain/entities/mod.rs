//! Domain entities and value objects
//!
//! This module contains the core domain entities and value objects
//! that represent the business concepts of a migration.

pub mod asset;
pub mod provider;

// Re-export entities
pub use asset::*;
pub use provider::*;
