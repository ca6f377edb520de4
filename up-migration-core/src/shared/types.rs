use serde::{Deserialize, Serialize};

use crate::shared::constants::*;

// Basic types for migration operations
pub type Address = String;
pub type TransactionHash = String;
pub type ChainId = u64;

/// Native currency block of an `wallet_addEthereumChain` request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct NativeCurrency {
    pub name: String,
    pub symbol: String,
    pub decimals: u8,
}

/// Full chain descriptor in the shape wallets expect for `wallet_addEthereumChain`
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ChainDescriptor {
    pub chain_id: String,
    pub chain_name: String,
    pub native_currency: NativeCurrency,
    pub rpc_urls: Vec<String>,
    pub block_explorer_urls: Vec<String>,
}

/// The network every source wallet has to be on before assets can move
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct TargetNetwork {
    pub chain_id: ChainId,
    pub name: String,
    pub rpc_url: String,
    pub explorer_url: String,
}

impl TargetNetwork {
    pub fn lukso_mainnet() -> Self {
        Self {
            chain_id: TARGET_CHAIN_ID,
            name: TARGET_CHAIN_NAME.to_string(),
            rpc_url: DEFAULT_RPC_URL.to_string(),
            explorer_url: DEFAULT_EXPLORER_URL.to_string(),
        }
    }

    pub fn chain_id_hex(&self) -> String {
        format!("0x{:x}", self.chain_id)
    }

    pub fn descriptor(&self) -> ChainDescriptor {
        ChainDescriptor {
            chain_id: self.chain_id_hex(),
            chain_name: self.name.clone(),
            native_currency: NativeCurrency {
                name: NATIVE_CURRENCY_NAME.to_string(),
                symbol: NATIVE_CURRENCY_SYMBOL.to_string(),
                decimals: NATIVE_CURRENCY_DECIMALS,
            },
            rpc_urls: vec![self.rpc_url.clone()],
            block_explorer_urls: vec![self.explorer_url.clone()],
        }
    }

    /// Explorer link for a submitted transaction
    pub fn transaction_url(&self, hash: &str) -> String {
        format!("{}/tx/{}", self.explorer_url.trim_end_matches('/'), hash)
    }
}

impl Default for TargetNetwork {
    fn default() -> Self {
        Self::lukso_mainnet()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_shape() {
        let descriptor = TargetNetwork::lukso_mainnet().descriptor();
        let json = serde_json::to_value(&descriptor).expect("Failed to serialize descriptor");

        assert_eq!(json["chainId"], "0x2a");
        assert_eq!(json["chainName"], "LUKSO Mainnet");
        assert_eq!(json["nativeCurrency"]["symbol"], "LYX");
        assert_eq!(json["nativeCurrency"]["decimals"], 18);
        assert_eq!(json["rpcUrls"].as_array().map(|a| a.len()), Some(1));
        assert_eq!(json["blockExplorerUrls"].as_array().map(|a| a.len()), Some(1));
    }

    #[test]
    fn test_transaction_url() {
        let mut network = TargetNetwork::lukso_mainnet();
        network.explorer_url = "https://explorer.example/".to_string();
        assert_eq!(network.transaction_url("0xabc"), "https://explorer.example/tx/0xabc");
    }
}
