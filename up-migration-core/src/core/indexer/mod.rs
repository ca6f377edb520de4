//! Indexer client
//!
//! Reads LSP7 and LSP8 holdings of an address from the GraphQL indexer and
//! normalizes them into ledger rows. LSP8 holdings come back one row per
//! token id and are grouped into one asset per collection.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use ethers::types::U256;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;

use crate::domain::entities::{AssetKind, TokenAsset};
use crate::domain::repositories::HoldingsRepository;
use crate::infrastructure::graphql::{GraphqlTransport, HttpGraphqlTransport};
use crate::shared::constants::*;
use crate::shared::error::MigrationError;
use crate::shared::settings::MigrationConfig;
use crate::shared::utils::{format_amount, normalize_address, validate_ethereum_address};

#[derive(Debug, Deserialize)]
struct HoldPage<T> {
    #[serde(rename = "Hold", default = "Vec::new")]
    rows: Vec<T>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct AssetRow {
    id: String,
    #[serde(default)]
    lsp4_token_name: Option<String>,
    #[serde(default)]
    lsp4_token_symbol: Option<String>,
    #[serde(default)]
    decimals: Option<Value>,
    #[serde(default)]
    icons: Option<Vec<IconRow>>,
}

#[derive(Debug, Deserialize)]
struct IconRow {
    #[serde(default)]
    url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Lsp7Row {
    #[serde(default)]
    balance: Value,
    #[serde(default)]
    asset: Option<AssetRow>,
}

#[derive(Debug, Deserialize)]
struct Lsp8Row {
    #[serde(default)]
    token: Option<TokenRow>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct TokenRow {
    id: String,
    #[serde(default)]
    base_asset: Option<AssetRow>,
}

impl AssetRow {
    fn display_name(&self) -> String {
        self.lsp4_token_name
            .as_deref()
            .map(str::trim)
            .filter(|n| !n.is_empty())
            .map(str::to_string)
            .unwrap_or_else(|| self.id.clone())
    }

    fn symbol(&self) -> String {
        self.lsp4_token_symbol.as_deref().unwrap_or_default().trim().to_string()
    }

    fn icon_ref(&self) -> Option<String> {
        self.icons
            .as_ref()?
            .iter()
            .filter_map(|icon| icon.url.clone())
            .find(|url| !url.is_empty())
    }

    fn decimals(&self) -> u8 {
        self.decimals
            .as_ref()
            .and_then(|value| quantity_text(value))
            .and_then(|text| text.parse::<u8>().ok())
            .unwrap_or(DEFAULT_LSP7_DECIMALS)
    }
}

/// Integer quantities arrive either as JSON strings or as JSON numbers
fn quantity_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.trim().to_string()),
        Value::Number(n) => n.as_u64().map(|n| n.to_string()),
        _ => None,
    }
}

/// Split `<collection>-<tokenId>` on the first separator and keep the id
fn raw_token_id(compound: &str) -> &str {
    compound
        .split_once(TOKEN_ID_SEPARATOR)
        .map(|(_, id)| id)
        .unwrap_or(compound)
}

fn collection_of(compound: &str) -> &str {
    compound
        .split_once(TOKEN_ID_SEPARATOR)
        .map(|(collection, _)| collection)
        .unwrap_or_default()
}

fn decode_page<T: DeserializeOwned>(data: Value) -> Result<Vec<T>, MigrationError> {
    let page: HoldPage<T> = serde_json::from_value(data)
        .map_err(|e| MigrationError::indexer(format!("Unexpected holdings shape: {}", e)))?;
    Ok(page.rows)
}

pub struct IndexerClient {
    transport: Arc<dyn GraphqlTransport>,
    max_rows: u32,
}

impl IndexerClient {
    pub fn new(transport: Arc<dyn GraphqlTransport>, max_rows: u32) -> Self {
        Self { transport, max_rows }
    }

    /// Client talking HTTP to the configured indexer endpoint
    pub fn from_config(config: &MigrationConfig) -> Result<Self, MigrationError> {
        let transport = HttpGraphqlTransport::new(config.indexer_url.clone(), config.indexer_timeout())?;
        Ok(Self::new(Arc::new(transport), config.max_indexer_rows))
    }

    pub fn max_rows(&self) -> u32 {
        self.max_rows
    }

    pub fn lsp7_query(&self, address: &str) -> String {
        format!(
            r#"query {{
  Hold(
    where: {{profile_id: {{_eq: "{owner}"}}, balance: {{_gt: "0"}}, asset: {{standard: {{_eq: "{standard}"}}}}}}
    limit: {limit}
  ) {{
    balance
    asset {{ id lsp4TokenName lsp4TokenSymbol decimals icons {{ url }} }}
  }}
}}"#,
            owner = normalize_address(address),
            standard = LSP7_STANDARD,
            limit = self.max_rows,
        )
    }

    pub fn lsp8_query(&self, address: &str) -> String {
        format!(
            r#"query {{
  Hold(
    where: {{profile_id: {{_eq: "{owner}"}}, balance: {{_gt: "0"}}, token_id: {{_is_null: false}}, asset: {{standard: {{_eq: "{standard}"}}}}}}
    limit: {limit}
  ) {{
    token {{ id baseAsset {{ id lsp4TokenName lsp4TokenSymbol icons {{ url }} }} }}
  }}
}}"#,
            owner = normalize_address(address),
            standard = LSP8_STANDARD,
            limit = self.max_rows,
        )
    }

    /// Fetch the complete holdings of `address`: LSP7 assets first, then LSP8 collections.
    pub async fn scan(&self, address: &str) -> Result<Vec<TokenAsset>, MigrationError> {
        validate_ethereum_address(address.trim())?;
        let lsp7_query = self.lsp7_query(address);
        let lsp8_query = self.lsp8_query(address);

        log::info!("Scanning holdings of {}", normalize_address(address));
        let (lsp7_data, lsp8_data) = tokio::try_join!(
            self.transport.execute(&lsp7_query),
            self.transport.execute(&lsp8_query)
        )?;

        let mut assets = Self::map_lsp7(decode_page(lsp7_data)?)?;
        let collections = Self::map_lsp8(decode_page(lsp8_data)?);
        log::info!(
            "Found {} LSP7 assets and {} LSP8 collections",
            assets.len(),
            collections.len()
        );
        assets.extend(collections);
        Ok(assets)
    }

    fn map_lsp7(rows: Vec<Lsp7Row>) -> Result<Vec<TokenAsset>, MigrationError> {
        let mut assets = Vec::with_capacity(rows.len());
        for row in rows {
            let Some(asset) = row.asset else {
                log::warn!("Skipping LSP7 holding without asset metadata");
                continue;
            };
            let raw_balance = quantity_text(&row.balance)
                .ok_or_else(|| MigrationError::indexer(format!("Missing balance for {}", asset.id)))?;
            let balance = U256::from_dec_str(&raw_balance)
                .map_err(|_| MigrationError::indexer(format!("Invalid balance {} for {}", raw_balance, asset.id)))?;
            let decimals = asset.decimals();

            assets.push(TokenAsset {
                display_name: asset.display_name(),
                symbol: asset.symbol(),
                kind: AssetKind::Lsp7,
                raw_balance,
                decimals,
                selected: true,
                icon_ref: asset.icon_ref(),
                token_ids: Vec::new(),
                transfer_amount_text: format_amount(balance, decimals),
                contract_address: asset.id,
            });
        }
        Ok(assets)
    }

    fn map_lsp8(rows: Vec<Lsp8Row>) -> Vec<TokenAsset> {
        let mut collections: Vec<TokenAsset> = Vec::new();
        let mut index: HashMap<String, usize> = HashMap::new();

        for token in rows.into_iter().filter_map(|row| row.token) {
            let collection_address = match &token.base_asset {
                Some(base) => base.id.clone(),
                None => collection_of(&token.id).to_string(),
            };
            if collection_address.is_empty() {
                log::warn!("Skipping LSP8 token {} without a collection", token.id);
                continue;
            }
            let token_id = raw_token_id(&token.id).to_string();

            let key = normalize_address(&collection_address);
            if let Some(&position) = index.get(&key) {
                collections[position].token_ids.push(token_id);
                continue;
            }

            let (display_name, symbol, icon_ref) = match &token.base_asset {
                Some(base) => (base.display_name(), base.symbol(), base.icon_ref()),
                None => (collection_address.clone(), String::new(), None),
            };
            index.insert(key, collections.len());
            collections.push(TokenAsset {
                contract_address: collection_address,
                display_name,
                symbol,
                kind: AssetKind::Lsp8,
                raw_balance: String::new(),
                decimals: LSP8_DECIMALS,
                selected: true,
                icon_ref,
                token_ids: vec![token_id],
                transfer_amount_text: LSP8_TRANSFER_AMOUNT_TEXT.to_string(),
            });
        }

        for collection in &mut collections {
            collection.raw_balance = collection.token_ids.len().to_string();
        }
        collections
    }
}

#[async_trait]
impl HoldingsRepository for IndexerClient {
    async fn fetch_holdings(&self, address: &str) -> Result<Vec<TokenAsset>, MigrationError> {
        self.scan(address).await
    }
}
