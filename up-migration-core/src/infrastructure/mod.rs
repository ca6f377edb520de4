//! Infrastructure layer - external integrations
//!
//! This module contains the integrations the core talks through: wallet
//! providers and the GraphQL transport of the holdings indexer.

pub mod provider;
pub mod graphql;

// Re-export infrastructure components
pub use provider::*;
pub use graphql::*;
