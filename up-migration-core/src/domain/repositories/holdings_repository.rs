//! Holdings repository
//!
//! Read access to the token holdings of an address.

use async_trait::async_trait;

use crate::domain::entities::TokenAsset;
use crate::shared::error::MigrationError;

/// Source of the assets an address holds
#[async_trait]
pub trait HoldingsRepository: Send + Sync {
    /// Fetch every LSP7 holding and LSP8 collection held by `address`.
    ///
    /// Either the complete set is returned or an error; never a partial result.
    async fn fetch_holdings(&self, address: &str) -> Result<Vec<TokenAsset>, MigrationError>;
}
