//! Asset ledger
//!
//! In-memory view of the assets found by the last scan together with the
//! per-asset selection, transfer amount and transfer status.

use std::collections::HashMap;

use crate::core::transfer::{validate_transfer_amount, TransferObserver};
use crate::domain::entities::{AssetKind, TokenAsset, TransferState, TransferStatus};
use crate::shared::error::MigrationError;
use crate::shared::types::Address;
use crate::shared::utils::normalize_address;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct LedgerSummary {
    pub total: usize,
    pub selected: usize,
    pub pending: usize,
    pub transferring: usize,
    pub succeeded: usize,
    pub failed: usize,
}

#[derive(Debug, Default)]
pub struct AssetLedger {
    owner: Option<Address>,
    assets: Vec<TokenAsset>,
    statuses: HashMap<String, TransferStatus>,
}

impl AssetLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the whole ledger with the result of a new scan
    pub fn replace_all(&mut self, owner: &str, assets: Vec<TokenAsset>) {
        log::info!("Ledger now holds {} assets for {}", assets.len(), owner);
        self.owner = Some(owner.to_string());
        self.assets = assets;
        self.statuses.clear();
    }

    pub fn clear(&mut self) {
        self.owner = None;
        self.assets.clear();
        self.statuses.clear();
    }

    /// Address whose holdings are currently listed
    pub fn owner(&self) -> Option<&str> {
        self.owner.as_deref()
    }

    pub fn assets(&self) -> &[TokenAsset] {
        &self.assets
    }

    pub fn len(&self) -> usize {
        self.assets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.assets.is_empty()
    }

    pub fn get(&self, contract_address: &str) -> Option<&TokenAsset> {
        let key = normalize_address(contract_address);
        self.assets.iter().find(|a| a.key() == key)
    }

    fn get_mut(&mut self, contract_address: &str) -> Result<&mut TokenAsset, MigrationError> {
        let key = normalize_address(contract_address);
        self.assets
            .iter_mut()
            .find(|a| a.key() == key)
            .ok_or_else(|| MigrationError::validation(format!("Unknown asset {}", contract_address)))
    }

    /// Flip the selection of one asset and return the new value
    pub fn toggle_selection(&mut self, contract_address: &str) -> Result<bool, MigrationError> {
        let asset = self.get_mut(contract_address)?;
        asset.selected = !asset.selected;
        Ok(asset.selected)
    }

    pub fn set_selected(&mut self, contract_address: &str, selected: bool) -> Result<(), MigrationError> {
        self.get_mut(contract_address)?.selected = selected;
        Ok(())
    }

    pub fn select_all(&mut self, selected: bool) {
        for asset in &mut self.assets {
            asset.selected = selected;
        }
    }

    /// Edit the amount of an LSP7 asset. The text is stored as typed and validated at transfer time.
    pub fn set_transfer_amount(&mut self, contract_address: &str, text: &str) -> Result<(), MigrationError> {
        let asset = self.get_mut(contract_address)?;
        if asset.kind != AssetKind::Lsp7 {
            return Err(MigrationError::validation("Only LSP7 assets take a transfer amount"));
        }
        asset.transfer_amount_text = text.to_string();
        Ok(())
    }

    /// Validation message for the current amount of an LSP7 asset, if any
    pub fn amount_error(&self, contract_address: &str) -> Option<&'static str> {
        let asset = self.get(contract_address)?;
        if asset.kind != AssetKind::Lsp7 {
            return None;
        }
        validate_transfer_amount(asset).err()
    }

    /// Snapshot of the selected assets in ledger order
    pub fn selected_assets(&self) -> Vec<TokenAsset> {
        self.assets.iter().filter(|a| a.selected).cloned().collect()
    }

    pub fn status(&self, contract_address: &str) -> Option<&TransferStatus> {
        self.statuses.get(&normalize_address(contract_address))
    }

    /// Statuses in ledger order
    pub fn statuses(&self) -> Vec<&TransferStatus> {
        self.assets
            .iter()
            .filter_map(|a| self.statuses.get(&a.key()))
            .collect()
    }

    pub fn record_status(&mut self, status: TransferStatus) {
        self.statuses.insert(status.key(), status);
    }

    pub fn clear_statuses(&mut self) {
        self.statuses.clear();
    }

    pub fn summary(&self) -> LedgerSummary {
        let mut summary = LedgerSummary {
            total: self.assets.len(),
            selected: self.assets.iter().filter(|a| a.selected).count(),
            ..LedgerSummary::default()
        };
        for status in self.statuses.values() {
            match status.state {
                TransferState::Pending => summary.pending += 1,
                TransferState::Transferring => summary.transferring += 1,
                TransferState::Success => summary.succeeded += 1,
                TransferState::Error => summary.failed += 1,
            }
        }
        summary
    }
}

impl TransferObserver for AssetLedger {
    fn on_status(&mut self, status: &TransferStatus) {
        self.record_status(status.clone());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shared::constants::{MSG_AMOUNT_EXCEEDS_BALANCE, MSG_INVALID_AMOUNT};

    const LYX_TOKEN: &str = "0xabcdefabcdefabcdefabcdefabcdefabcdefabcd";
    const NFT_COLLECTION: &str = "0x2222222222222222222222222222222222222222";

    fn lsp7(address: &str, balance: &str, amount: &str) -> TokenAsset {
        TokenAsset {
            contract_address: address.to_string(),
            display_name: "Wrapped LYX".to_string(),
            symbol: "WLYX".to_string(),
            kind: AssetKind::Lsp7,
            raw_balance: balance.to_string(),
            decimals: 18,
            selected: true,
            icon_ref: None,
            token_ids: Vec::new(),
            transfer_amount_text: amount.to_string(),
        }
    }

    fn lsp8(address: &str) -> TokenAsset {
        TokenAsset {
            contract_address: address.to_string(),
            display_name: "Collection".to_string(),
            symbol: "COL".to_string(),
            kind: AssetKind::Lsp8,
            raw_balance: "1".to_string(),
            decimals: 0,
            selected: true,
            icon_ref: None,
            token_ids: vec![format!("0x{}", "00".repeat(32))],
            transfer_amount_text: "1".to_string(),
        }
    }

    fn ledger() -> AssetLedger {
        let mut ledger = AssetLedger::new();
        ledger.replace_all(
            "0xowner",
            vec![lsp7(LYX_TOKEN, "2000000000000000000", "2"), lsp8(NFT_COLLECTION)],
        );
        ledger
    }

    #[test]
    fn test_toggle_selection_is_case_insensitive() {
        let mut ledger = ledger();
        let upper = LYX_TOKEN.to_uppercase().replacen("0X", "0x", 1);

        assert!(!ledger.toggle_selection(&upper).expect("asset must exist"));
        assert_eq!(ledger.selected_assets().len(), 1);
        assert!(ledger.toggle_selection(LYX_TOKEN).expect("asset must exist"));
    }

    #[test]
    fn test_unknown_asset_is_rejected() {
        let mut ledger = ledger();
        assert!(ledger.toggle_selection("0x3333333333333333333333333333333333333333").is_err());
    }

    #[test]
    fn test_transfer_amount_only_for_lsp7() {
        let mut ledger = ledger();
        ledger.set_transfer_amount(LYX_TOKEN, "1.5").expect("LSP7 accepts an amount");
        assert_eq!(ledger.get(LYX_TOKEN).unwrap().transfer_amount_text, "1.5");
        assert!(ledger.set_transfer_amount(NFT_COLLECTION, "1").is_err());
    }

    #[test]
    fn test_amount_error_feedback() {
        let mut ledger = ledger();
        assert_eq!(ledger.amount_error(LYX_TOKEN), None);

        ledger.set_transfer_amount(LYX_TOKEN, "3").unwrap();
        assert_eq!(ledger.amount_error(LYX_TOKEN), Some(MSG_AMOUNT_EXCEEDS_BALANCE));

        ledger.set_transfer_amount(LYX_TOKEN, "lots").unwrap();
        assert_eq!(ledger.amount_error(LYX_TOKEN), Some(MSG_INVALID_AMOUNT));
        assert_eq!(ledger.amount_error(NFT_COLLECTION), None);
    }

    #[test]
    fn test_selected_assets_keep_ledger_order() {
        let mut ledger = ledger();
        ledger.select_all(false);
        ledger.set_selected(NFT_COLLECTION, true).unwrap();
        ledger.set_selected(LYX_TOKEN, true).unwrap();

        let order: Vec<String> = ledger.selected_assets().into_iter().map(|a| a.contract_address).collect();
        assert_eq!(order, vec![LYX_TOKEN.to_string(), NFT_COLLECTION.to_string()]);
    }

    #[test]
    fn test_statuses_overwrite_and_summarize() {
        let mut ledger = ledger();
        ledger.on_status(&TransferStatus::pending(LYX_TOKEN));
        ledger.on_status(&TransferStatus::pending(NFT_COLLECTION));
        ledger.on_status(&TransferStatus::success(LYX_TOKEN, "0xhash".to_string()));

        assert_eq!(ledger.status(LYX_TOKEN).unwrap().state, TransferState::Success);
        let summary = ledger.summary();
        assert_eq!(summary.total, 2);
        assert_eq!(summary.succeeded, 1);
        assert_eq!(summary.pending, 1);
        assert_eq!(ledger.statuses().len(), 2);
    }

    #[test]
    fn test_replace_all_drops_previous_state() {
        let mut ledger = ledger();
        ledger.record_status(TransferStatus::error(LYX_TOKEN, "Invalid amount"));
        ledger.replace_all("0xowner", vec![lsp8(NFT_COLLECTION)]);

        assert_eq!(ledger.len(), 1);
        assert!(ledger.status(LYX_TOKEN).is_none());
        assert_eq!(ledger.owner(), Some("0xowner"));

        ledger.clear();
        assert!(ledger.is_empty());
        assert!(ledger.owner().is_none());
    }
}
