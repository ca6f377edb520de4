//! GraphQL transport for the holdings indexer
//!
//! One HTTP POST per query with a `{query}` body; the response is `{data, errors?}`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::shared::error::MigrationError;

#[async_trait]
pub trait GraphqlTransport: Send + Sync {
    /// Execute `query` and return its `data` member
    async fn execute(&self, query: &str) -> Result<Value, MigrationError>;
}

#[derive(Debug, Deserialize)]
struct GraphqlResponse {
    #[serde(default)]
    data: Option<Value>,
    #[serde(default)]
    errors: Option<Vec<GraphqlErrorEntry>>,
}

#[derive(Debug, Deserialize)]
struct GraphqlErrorEntry {
    #[serde(default)]
    message: String,
}

/// Extract `data` from a GraphQL response, failing on the first reported error
pub fn parse_graphql_response(body: Value) -> Result<Value, MigrationError> {
    let response: GraphqlResponse = serde_json::from_value(body)
        .map_err(|e| MigrationError::indexer(format!("Malformed indexer response: {}", e)))?;

    if let Some(first) = response.errors.as_ref().and_then(|errors| errors.first()) {
        let message = if first.message.is_empty() {
            "Indexer query failed".to_string()
        } else {
            first.message.clone()
        };
        return Err(MigrationError::indexer(message));
    }

    Ok(response.data.unwrap_or(Value::Null))
}

pub struct HttpGraphqlTransport {
    client: Client,
    endpoint: String,
}

impl HttpGraphqlTransport {
    pub fn new(endpoint: impl Into<String>, timeout: Duration) -> Result<Self, MigrationError> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint: endpoint.into(),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl GraphqlTransport for HttpGraphqlTransport {
    async fn execute(&self, query: &str) -> Result<Value, MigrationError> {
        let resp = self
            .client
            .post(&self.endpoint)
            .json(&json!({ "query": query }))
            .send()
            .await
            .map_err(|e| MigrationError::indexer(format!("Indexer request failed: {}", e)))?;

        let status = resp.status();
        if !status.is_success() {
            return Err(MigrationError::indexer(format!("Indexer returned HTTP {}", status)));
        }

        let body: Value = resp
            .json()
            .await
            .map_err(|e| MigrationError::indexer(format!("Invalid indexer response: {}", e)))?;
        parse_graphql_response(body)
    }
}
