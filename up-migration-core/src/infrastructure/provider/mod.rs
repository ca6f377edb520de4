//! EIP-1193 provider capability
//!
//! Every wallet the core talks to, whether announced through discovery or
//! reached over JSON-RPC, satisfies the single `request(method, params)`
//! capability defined here.

pub mod http;

use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;

use crate::shared::error::ProviderError;

pub use http::HttpProvider;

/// Request/response capability shared by all wallet providers
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Eip1193Provider: Send + Sync {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError>;
}

/// Shared reference to a live provider
pub type ProviderHandle = Arc<dyn Eip1193Provider>;
