//! Token asset entity and transfer status value objects
//!
//! A `TokenAsset` is one row of the asset ledger: either an LSP7 holding or a
//! whole LSP8 collection with the ids held in it.

use chrono::{DateTime, Utc};
use ethers::types::U256;
use serde::{Deserialize, Serialize};

use crate::shared::error::MigrationError;
use crate::shared::types::{Address, TransactionHash};
use crate::shared::utils::normalize_address;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Lsp7,
    Lsp8,
}

impl AssetKind {
    pub fn label(&self) -> &'static str {
        match self {
            AssetKind::Lsp7 => "LSP7",
            AssetKind::Lsp8 => "LSP8",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TokenAsset {
    pub contract_address: Address,
    pub display_name: String,
    pub symbol: String,
    pub kind: AssetKind,
    /// Integer string: smallest units for LSP7, held id count for LSP8
    pub raw_balance: String,
    pub decimals: u8,
    pub selected: bool,
    pub icon_ref: Option<String>,
    /// Ordered 32-byte ids, LSP8 only
    pub token_ids: Vec<String>,
    /// Human amount to move, LSP7 only
    pub transfer_amount_text: String,
}

impl TokenAsset {
    /// Ledger key for this asset
    pub fn key(&self) -> String {
        normalize_address(&self.contract_address)
    }

    pub fn is_fungible(&self) -> bool {
        self.kind == AssetKind::Lsp7
    }

    pub fn raw_balance_value(&self) -> Result<U256, MigrationError> {
        U256::from_dec_str(self.raw_balance.trim()).map_err(|_| {
            MigrationError::validation(format!(
                "Invalid balance {} for {}",
                self.raw_balance, self.contract_address
            ))
        })
    }

    /// Number of transactions a transfer of this asset will submit
    pub fn transfer_unit_count(&self) -> usize {
        match self.kind {
            AssetKind::Lsp7 => 1,
            AssetKind::Lsp8 => self.token_ids.len(),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum TransferState {
    Pending,
    Transferring,
    Success,
    Error,
}

impl TransferState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, TransferState::Success | TransferState::Error)
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferStatus {
    pub asset_address: Address,
    pub state: TransferState,
    pub tx_hash: Option<TransactionHash>,
    pub error_message: Option<String>,
    pub updated_at: DateTime<Utc>,
}

impl TransferStatus {
    fn with_state(asset_address: &str, state: TransferState) -> Self {
        Self {
            asset_address: asset_address.to_string(),
            state,
            tx_hash: None,
            error_message: None,
            updated_at: Utc::now(),
        }
    }

    pub fn pending(asset_address: &str) -> Self {
        Self::with_state(asset_address, TransferState::Pending)
    }

    pub fn transferring(asset_address: &str) -> Self {
        Self::with_state(asset_address, TransferState::Transferring)
    }

    pub fn success(asset_address: &str, tx_hash: TransactionHash) -> Self {
        Self {
            tx_hash: Some(tx_hash),
            ..Self::with_state(asset_address, TransferState::Success)
        }
    }

    pub fn error(asset_address: &str, message: impl Into<String>) -> Self {
        Self {
            error_message: Some(message.into()),
            ..Self::with_state(asset_address, TransferState::Error)
        }
    }

    pub fn key(&self) -> String {
        normalize_address(&self.asset_address)
    }
}
