//! JSON-RPC provider over HTTP
//!
//! Lets the core drive a node, a signing proxy or a wallet bridge that speaks
//! JSON-RPC 2.0 as if it were an injected wallet.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{json, Value};

use super::Eip1193Provider;
use crate::shared::error::{MigrationError, ProviderError};

/// JSON-RPC internal error code, used for transport failures
pub const INTERNAL_ERROR_CODE: i64 = -32603;

pub struct HttpProvider {
    client: Client,
    rpc_url: String,
    next_id: AtomicU64,
}

impl HttpProvider {
    pub fn new(rpc_url: impl Into<String>) -> Self {
        Self {
            client: Client::new(),
            rpc_url: rpc_url.into(),
            next_id: AtomicU64::new(1),
        }
    }

    pub fn with_timeout(rpc_url: impl Into<String>, timeout: Duration) -> Result<Self, MigrationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            rpc_url: rpc_url.into(),
            next_id: AtomicU64::new(1),
        })
    }

    pub fn rpc_url(&self) -> &str {
        &self.rpc_url
    }
}

/// Split a JSON-RPC response into its result or its error object
pub fn parse_rpc_response(resp_json: Value) -> Result<Value, ProviderError> {
    if let Some(error) = resp_json.get("error").filter(|e| !e.is_null()) {
        let code = error.get("code").and_then(Value::as_i64).unwrap_or(INTERNAL_ERROR_CODE);
        let message = error
            .get("message")
            .and_then(Value::as_str)
            .unwrap_or_default()
            .to_string();
        return Err(ProviderError::new(code, message));
    }
    Ok(resp_json.get("result").cloned().unwrap_or(Value::Null))
}

#[async_trait]
impl Eip1193Provider for HttpProvider {
    async fn request(&self, method: &str, params: Value) -> Result<Value, ProviderError> {
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let body = json!({
            "jsonrpc": "2.0",
            "method": method,
            "params": params,
            "id": id
        });
        log::debug!("JSON-RPC {} -> {} (id {})", method, self.rpc_url, id);

        let resp = self
            .client
            .post(&self.rpc_url)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::new(INTERNAL_ERROR_CODE, format!("Failed to reach provider: {}", e)))?;
        let resp_json: Value = resp
            .json()
            .await
            .map_err(|e| ProviderError::new(INTERNAL_ERROR_CODE, format!("Invalid response: {}", e)))?;

        parse_rpc_response(resp_json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_result() {
        let value = parse_rpc_response(json!({"jsonrpc": "2.0", "id": 1, "result": "0x2a"}))
            .expect("Failed to parse result");
        assert_eq!(value, json!("0x2a"));
    }

    #[test]
    fn test_parse_error_object() {
        let err = parse_rpc_response(json!({
            "jsonrpc": "2.0",
            "id": 1,
            "error": {"code": 4902, "message": "Unrecognized chain ID \"0x2a\"."}
        }))
        .expect_err("error object must map to ProviderError");
        assert_eq!(err.code, 4902);
        assert!(err.is_unrecognized_chain());
    }

    #[test]
    fn test_parse_error_without_code() {
        let err = parse_rpc_response(json!({"error": {"message": "boom"}}))
            .expect_err("error object must map to ProviderError");
        assert_eq!(err.code, INTERNAL_ERROR_CODE);
        assert_eq!(err.message, "boom");
    }

    #[test]
    fn test_missing_result_is_null() {
        assert_eq!(parse_rpc_response(json!({"id": 1, "error": null})).unwrap(), Value::Null);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_maps_to_internal_error() {
        let provider = HttpProvider::with_timeout("http://127.0.0.1:9", Duration::from_millis(500))
            .expect("Failed to build provider");
        let err = provider
            .request("eth_chainId", json!([]))
            .await
            .expect_err("nothing listens on the discard port");
        assert_eq!(err.code, INTERNAL_ERROR_CODE);
    }
}
