//! Domain layer - entities and repositories
//!
//! This module contains the domain model of a migration: assets, statuses,
//! provider descriptors and the data-access seams the core depends on.

pub mod entities;
pub mod repositories;

// Re-export domain components
pub use entities::*;
pub use repositories::*;
