//! Core migration functionality
//!
//! This module contains the components that drive a migration: provider
//! discovery, the step controller, the holdings indexer, the asset ledger
//! and the transfer engine.

pub mod registry;
pub mod session;
pub mod indexer;
pub mod ledger;
pub mod transfer;

pub use registry::{DiscoveryChannel, DiscoveryStatus, ProviderRegistry};
pub use session::{DestinationOrigin, SessionController, SourceConnection, Step, TransitionRefusal, WalletRole};
pub use indexer::IndexerClient;
pub use ledger::{AssetLedger, LedgerSummary};
pub use transfer::{
    validate_transfer_amount, ChannelObserver, FanoutObserver, TransferContext, TransferEngine, TransferObserver,
    TransferReport,
};
