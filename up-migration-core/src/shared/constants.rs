//! Constants for the migration core
//!
//! This module contains all constants used throughout the migration core.

// Target network: LUKSO mainnet
pub const TARGET_CHAIN_ID: u64 = 42;
pub const TARGET_CHAIN_ID_HEX: &str = "0x2a";
pub const TARGET_CHAIN_NAME: &str = "LUKSO Mainnet";
pub const NATIVE_CURRENCY_NAME: &str = "LUKSO";
pub const NATIVE_CURRENCY_SYMBOL: &str = "LYX";
pub const NATIVE_CURRENCY_DECIMALS: u8 = 18;
pub const DEFAULT_RPC_URL: &str = "https://rpc.mainnet.lukso.network";
pub const DEFAULT_EXPLORER_URL: &str = "https://explorer.execution.mainnet.lukso.network";

// Indexer
pub const DEFAULT_INDEXER_URL: &str = "https://envio.lukso-mainnet.universal.tech/v1/graphql";
pub const MAX_INDEXER_ROWS: u32 = 100;
pub const INDEXER_TIMEOUT_SECS: u64 = 30; // seconds
pub const LSP7_STANDARD: &str = "LSP7DigitalAsset";
pub const LSP8_STANDARD: &str = "LSP8IdentifiableDigitalAsset";

// Token defaults
pub const DEFAULT_LSP7_DECIMALS: u8 = 18;
pub const LSP8_DECIMALS: u8 = 0;
pub const LSP8_TRANSFER_AMOUNT_TEXT: &str = "1";
pub const TOKEN_ID_SEPARATOR: char = '-';
pub const TOKEN_ID_SIZE: usize = 32;

// LSP7 / LSP8 transfer signatures
pub const LSP7_TRANSFER_SIGNATURE: &str = "transfer(address,address,uint256,bool,bytes)";
pub const LSP8_TRANSFER_SIGNATURE: &str = "transfer(address,address,bytes32,bool,bytes)";

// EIP-1193 methods
pub const METHOD_SWITCH_CHAIN: &str = "wallet_switchEthereumChain";
pub const METHOD_ADD_CHAIN: &str = "wallet_addEthereumChain";
pub const METHOD_REQUEST_ACCOUNTS: &str = "eth_requestAccounts";
pub const METHOD_SEND_TRANSACTION: &str = "eth_sendTransaction";
pub const METHOD_CHAIN_ID: &str = "eth_chainId";

// Universal Profile classification tokens, matched case-insensitively
pub const UP_PROVIDER_TOKENS: &[&str] = &[
    "universalprofile",
    "lukso",
    "universal profile",
    "universal-profile",
];

// Transfer status messages
pub const MSG_INVALID_AMOUNT: &str = "Invalid amount";
pub const MSG_AMOUNT_NOT_POSITIVE: &str = "Amount must be greater than 0";
pub const MSG_AMOUNT_EXCEEDS_BALANCE: &str = "Amount exceeds balance";
pub const MSG_TRANSACTION_FAILED: &str = "Transaction failed";
pub const MSG_REQUEST_TIMED_OUT: &str = "Request timed out";
pub const MSG_NO_WALLETS_FOUND: &str = "No wallets found";

// Validation constants
pub const ADDRESS_LENGTH: usize = 42; // 0x + 40 hex chars

// Configuration
pub const CONFIG_ENV_PREFIX: &str = "UP_MIGRATION";
pub const CONFIG_FILE_ENV: &str = "UP_MIGRATION_CONFIG";
pub const DEFAULT_CONFIG_FILE: &str = "up-migration.toml";

// Build information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
pub const NAME: &str = env!("CARGO_PKG_NAME");
pub const DESCRIPTION: &str = env!("CARGO_PKG_DESCRIPTION");
