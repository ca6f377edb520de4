//! UP Migration Core
//!
//! Moves LSP7 and LSP8 holdings from a legacy wallet to a LUKSO Universal
//! Profile in three steps: connect the source wallet, connect the destination
//! profile, then select and transfer assets.
//!
//! ## Architecture
//!
//! - **Core**: provider registry, step controller, indexer client, asset ledger, transfer engine
//! - **Domain**: assets, transfer statuses, provider descriptors, the holdings seam
//! - **Infrastructure**: EIP-1193 providers and the GraphQL transport
//! - **Shared**: configuration, errors, constants and helpers
//!
//! ## Usage
//!
//! ```rust,no_run
//! use up_migration_core::{init_logging, MigrationConfig, MigrationCore};
//!
//! # async fn run() -> Result<(), up_migration_core::MigrationError> {
//! init_logging();
//! let mut core = MigrationCore::new(MigrationConfig::load()?)?;
//!
//! // after the source wallet is connected and the destination is bound:
//! core.scan_assets().await?;
//! if let Some(report) = core.execute_transfers(None).await {
//!     println!("{} transferred, {} failed", report.succeeded, report.failed);
//! }
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;

pub mod core;
pub mod domain;
pub mod infrastructure;
pub mod shared;

use crate::core::{FanoutObserver, TransitionRefusal};
use crate::domain::repositories::HoldingsRepository;
use crate::shared::utils::addresses_equal;

// Re-export specific components
pub use crate::core::{
    AssetLedger, IndexerClient, ProviderRegistry, SessionController, Step, TransferEngine, TransferObserver,
    TransferReport,
};
pub use crate::domain::{AssetKind, TokenAsset, TransferState, TransferStatus};
pub use crate::infrastructure::{Eip1193Provider, HttpProvider, ProviderHandle};
pub use crate::shared::error::{MigrationError, MigrationResult, ProviderError};
pub use crate::shared::settings::MigrationConfig;
pub use crate::shared::constants::{DESCRIPTION, NAME, VERSION};

/// Initialize logging from `RUST_LOG`, defaulting to `info`. Later calls are no-ops.
pub fn init_logging() {
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).try_init();
}

/// Build a migration core from `.env`, the config file and the environment
pub fn init_migration_core() -> Result<MigrationCore, MigrationError> {
    let config = MigrationConfig::load()?;
    MigrationCore::new(config)
}

/// Owned state of one migration session
pub struct MigrationCore {
    pub config: MigrationConfig,
    pub registry: ProviderRegistry,
    pub session: SessionController,
    pub ledger: AssetLedger,
    pub engine: TransferEngine,
    holdings: Arc<dyn HoldingsRepository>,
}

impl MigrationCore {
    /// Core backed by the configured HTTP indexer
    pub fn new(config: MigrationConfig) -> Result<Self, MigrationError> {
        let indexer = IndexerClient::from_config(&config)?;
        Ok(Self::with_holdings(config, Arc::new(indexer)))
    }

    pub fn with_holdings(config: MigrationConfig, holdings: Arc<dyn HoldingsRepository>) -> Self {
        log::info!("{} {} starting, target chain {}", NAME, VERSION, config.target_network().chain_id);
        Self {
            registry: ProviderRegistry::new(&config.up_provider_tokens),
            session: SessionController::new(config.target_network()),
            ledger: AssetLedger::new(),
            engine: TransferEngine::from_config(&config),
            holdings,
            config,
        }
    }

    /// Replace the ledger with the current holdings of the source address.
    ///
    /// On any failure the ledger keeps its previous content.
    pub async fn scan_assets(&mut self) -> Result<usize, MigrationError> {
        let owner = self
            .session
            .source_address()
            .ok_or(TransitionRefusal::SourceNotConnected)?
            .to_string();
        self.session.ensure_distinct_roles()?;

        let assets = self.holdings.fetch_holdings(&owner).await?;
        let count = assets.len();
        self.ledger.replace_all(&owner, assets);
        Ok(count)
    }

    /// Transfer the selected assets. Statuses land in the ledger and, if given, in `forward`.
    pub async fn execute_transfers(&mut self, forward: Option<&mut dyn TransferObserver>) -> Option<TransferReport> {
        let context = self.session.transfer_context()?;
        match self.ledger.owner() {
            Some(owner) if addresses_equal(owner, &context.from) => {}
            owner => {
                log::warn!(
                    "Ledger was scanned for {:?} but the source is {}; scan again before transferring",
                    owner,
                    context.from
                );
                return None;
            }
        }
        let assets = self.ledger.selected_assets();

        match forward {
            Some(observer) => {
                let observers: Vec<&mut dyn TransferObserver> = vec![&mut self.ledger, observer];
                let mut fanout = FanoutObserver::new(observers);
                self.engine.run(&context, assets, &mut fanout).await
            }
            None => self.engine.run(&context, assets, &mut self.ledger).await,
        }
    }

    /// Drop the source binding and everything scanned for it
    pub fn disconnect_source(&mut self) {
        self.session.disconnect_source();
        self.ledger.clear();
    }

    /// Return to a fresh session; providers must be discovered again
    pub fn reset(&mut self) {
        self.registry.teardown();
        self.session = SessionController::new(self.config.target_network());
        self.ledger.clear();
    }
}
