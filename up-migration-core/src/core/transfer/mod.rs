//! Transfer engine
//!
//! Submits one `eth_sendTransaction` per transfer unit through the pinned
//! source provider. Assets are processed strictly one after another so wallet
//! prompts appear one at a time, and a failure on one asset never stops the
//! rest of the batch.

pub mod calldata;
pub mod observer;

use std::fmt;
use std::time::Duration;

use ethers::types::{Address as EthAddress, U256};
use ethers::utils::to_checksum;
use serde_json::{json, Value};

use crate::domain::entities::{AssetKind, TokenAsset, TransferState, TransferStatus};
use crate::infrastructure::provider::ProviderHandle;
use crate::shared::constants::*;
use crate::shared::settings::MigrationConfig;
use crate::shared::types::{Address, TransactionHash};
use crate::shared::utils::{addresses_equal, bytes_to_hex, parse_address, parse_amount, parse_token_id};

pub use calldata::{encode_lsp7_transfer, encode_lsp8_transfer};
pub use observer::{ChannelObserver, FanoutObserver, TransferObserver};

/// Everything a run needs besides the assets
#[derive(Clone)]
pub struct TransferContext {
    pub provider: ProviderHandle,
    pub from: Address,
    pub to: Address,
}

impl fmt::Debug for TransferContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransferContext")
            .field("from", &self.from)
            .field("to", &self.to)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
pub struct TransferReport {
    pub batch_id: String,
    /// Final status per asset, in run order
    pub statuses: Vec<TransferStatus>,
    pub succeeded: usize,
    pub failed: usize,
}

impl TransferReport {
    pub fn all_succeeded(&self) -> bool {
        self.failed == 0
    }
}

/// Check the amount typed for an LSP7 asset and return it in smallest units
pub fn validate_transfer_amount(asset: &TokenAsset) -> Result<U256, &'static str> {
    let amount = parse_amount(&asset.transfer_amount_text, asset.decimals).map_err(|_| MSG_INVALID_AMOUNT)?;
    if amount.is_zero() {
        return Err(MSG_AMOUNT_NOT_POSITIVE);
    }
    let balance = asset.raw_balance_value().map_err(|_| MSG_INVALID_AMOUNT)?;
    if amount > balance {
        return Err(MSG_AMOUNT_EXCEEDS_BALANCE);
    }
    Ok(amount)
}

#[derive(Debug, Clone, Default)]
pub struct TransferEngine {
    submission_timeout: Option<Duration>,
}

impl TransferEngine {
    pub fn new(submission_timeout: Option<Duration>) -> Self {
        Self { submission_timeout }
    }

    pub fn from_config(config: &MigrationConfig) -> Self {
        Self::new(config.submission_timeout())
    }

    pub fn submission_timeout(&self) -> Option<Duration> {
        self.submission_timeout
    }

    /// Transfer every selected asset in `assets`.
    ///
    /// `assets` is the snapshot taken at invocation; edits made while the run
    /// is in flight do not reach it. Returns `None` when nothing was run.
    pub async fn run(
        &self,
        context: &TransferContext,
        assets: Vec<TokenAsset>,
        observer: &mut dyn TransferObserver,
    ) -> Option<TransferReport> {
        let selected: Vec<TokenAsset> = assets.into_iter().filter(|a| a.selected).collect();
        if selected.is_empty() {
            log::info!("No assets selected, nothing to transfer");
            return None;
        }
        if addresses_equal(&context.from, &context.to) {
            log::warn!("Refusing to transfer from {} to itself", context.from);
            return None;
        }
        let (from, to) = match (parse_address(&context.from), parse_address(&context.to)) {
            (Ok(from), Ok(to)) => (from, to),
            (Err(e), _) | (_, Err(e)) => {
                log::error!("Cannot start transfer run: {}", e);
                return None;
            }
        };

        let batch_id = uuid::Uuid::new_v4().to_string();
        log::info!(
            "Transfer batch {} started: {} assets from {} to {}",
            batch_id,
            selected.len(),
            context.from,
            context.to
        );

        for asset in &selected {
            observer.on_status(&TransferStatus::pending(&asset.contract_address));
        }

        let mut statuses = Vec::with_capacity(selected.len());
        for asset in &selected {
            observer.on_status(&TransferStatus::transferring(&asset.contract_address));

            let status = match self.transfer_asset(context, from, to, asset).await {
                Ok(hash) => {
                    log::info!("[{}] {} {} transferred: {}", batch_id, asset.kind.label(), asset.symbol, hash);
                    TransferStatus::success(&asset.contract_address, hash)
                }
                Err(message) => {
                    log::warn!("[{}] {} {} failed: {}", batch_id, asset.kind.label(), asset.symbol, message);
                    TransferStatus::error(&asset.contract_address, message)
                }
            };
            observer.on_status(&status);
            statuses.push(status);
        }

        let succeeded = statuses.iter().filter(|s| s.state == TransferState::Success).count();
        let failed = statuses.len() - succeeded;
        log::info!("Transfer batch {} finished: {} succeeded, {} failed", batch_id, succeeded, failed);

        Some(TransferReport {
            batch_id,
            statuses,
            succeeded,
            failed,
        })
    }

    async fn transfer_asset(
        &self,
        context: &TransferContext,
        from: EthAddress,
        to: EthAddress,
        asset: &TokenAsset,
    ) -> Result<TransactionHash, String> {
        let contract = parse_address(&asset.contract_address).map_err(|_| "Invalid asset address".to_string())?;

        match asset.kind {
            AssetKind::Lsp7 => {
                let amount = validate_transfer_amount(asset)?;
                let data = encode_lsp7_transfer(from, to, amount);
                self.submit(context, contract, data).await
            }
            AssetKind::Lsp8 => {
                if asset.token_ids.is_empty() {
                    return Err("No tokens to transfer".to_string());
                }
                let mut last_hash = None;
                for token_id in &asset.token_ids {
                    let id = parse_token_id(token_id).map_err(|_| format!("Invalid token id {}", token_id))?;
                    let data = encode_lsp8_transfer(from, to, id);
                    let hash = self.submit(context, contract, data).await?;
                    log::debug!("Token {} of {} sent in {}", token_id, asset.contract_address, hash);
                    last_hash = Some(hash);
                }
                last_hash.ok_or_else(|| MSG_TRANSACTION_FAILED.to_string())
            }
        }
    }

    async fn submit(&self, context: &TransferContext, contract: EthAddress, data: Vec<u8>) -> Result<TransactionHash, String> {
        let params = json!([{
            "from": context.from,
            "to": to_checksum(&contract, None),
            "data": bytes_to_hex(&data),
        }]);
        let request = context.provider.request(METHOD_SEND_TRANSACTION, params);

        let result = match self.submission_timeout {
            Some(limit) => tokio::time::timeout(limit, request)
                .await
                .map_err(|_| MSG_REQUEST_TIMED_OUT.to_string())?,
            None => request.await,
        };

        match result {
            Ok(Value::String(hash)) => Ok(hash),
            Ok(other) => {
                log::error!("Provider returned {} instead of a transaction hash", other);
                Err(MSG_TRANSACTION_FAILED.to_string())
            }
            Err(e) => Err(e.short_message().unwrap_or(MSG_TRANSACTION_FAILED).to_string()),
        }
    }
}
