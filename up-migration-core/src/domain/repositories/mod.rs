//! Domain repositories
//!
//! This module contains repository traits for data access
//! following Domain-Driven Design principles.

pub mod holdings_repository;

// Re-export repositories
pub use holdings_repository::*;
