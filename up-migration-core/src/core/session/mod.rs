//! Session and step controller
//!
//! Owns the active step of the three-step flow and the source/destination
//! bindings. The source provider handle is pinned when the flow leaves step 1
//! and every later signing call goes through that pin, whatever the active
//! connection does afterwards.

use std::fmt;
use std::sync::Arc;

use serde_json::{json, Value};
use thiserror::Error;

use crate::core::transfer::TransferContext;
use crate::domain::entities::InjectedProviderDescriptor;
use crate::infrastructure::provider::{Eip1193Provider, ProviderHandle};
use crate::shared::constants::*;
use crate::shared::error::MigrationError;
use crate::shared::types::{Address, ChainId, TargetNetwork};
use crate::shared::utils::{addresses_equal, parse_hex_quantity, validate_ethereum_address};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Step {
    ConnectSource = 1,
    ConnectDestination = 2,
    SelectAssets = 3,
}

impl Step {
    pub fn number(&self) -> u8 {
        *self as u8
    }

    fn previous(&self) -> Step {
        match self {
            Step::ConnectSource | Step::ConnectDestination => Step::ConnectSource,
            Step::SelectAssets => Step::ConnectDestination,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WalletRole {
    Source,
    Destination,
}

/// Why a step transition was refused
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransitionRefusal {
    #[error("Connect a source wallet first")]
    SourceNotConnected,

    #[error("A Universal Profile cannot be used as the source wallet")]
    WrongWalletType,

    #[error("Source wallet is on chain {actual}, switch to chain {expected}")]
    WrongNetwork { expected: ChainId, actual: ChainId },

    #[error("Connect or enter a destination Universal Profile")]
    DestinationMissing,

    #[error("Source and destination must be different addresses")]
    SameAddress,
}

impl TransitionRefusal {
    pub fn code(&self) -> &'static str {
        match self {
            TransitionRefusal::SourceNotConnected => "source-not-connected",
            TransitionRefusal::WrongWalletType => "wrong-wallet-type",
            TransitionRefusal::WrongNetwork { .. } => "wrong-network",
            TransitionRefusal::DestinationMissing => "destination-missing",
            TransitionRefusal::SameAddress => "same-address",
        }
    }
}

impl From<TransitionRefusal> for MigrationError {
    fn from(refusal: TransitionRefusal) -> Self {
        match refusal {
            TransitionRefusal::WrongWalletType | TransitionRefusal::SameAddress => {
                MigrationError::role_conflict(refusal.to_string())
            }
            TransitionRefusal::WrongNetwork { .. } => MigrationError::network(refusal.to_string()),
            _ => MigrationError::validation(refusal.to_string()),
        }
    }
}

/// The wallet connection currently reported by the source side
#[derive(Debug, Clone)]
pub struct SourceConnection {
    pub provider: InjectedProviderDescriptor,
    pub address: Address,
    pub chain_id: ChainId,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DestinationOrigin {
    Extension,
    Manual,
}

pub struct SessionController {
    step: Step,
    target: TargetNetwork,
    source: Option<SourceConnection>,
    pinned: Option<ProviderHandle>,
    source_snapshot: Option<Address>,
    destination: Option<Address>,
    destination_origin: Option<DestinationOrigin>,
}

impl fmt::Debug for SessionController {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("SessionController")
            .field("step", &self.step)
            .field("source", &self.source)
            .field("pinned", &self.pinned.is_some())
            .field("source_snapshot", &self.source_snapshot)
            .field("destination", &self.destination)
            .finish()
    }
}

impl SessionController {
    pub fn new(target: TargetNetwork) -> Self {
        Self {
            step: Step::ConnectSource,
            target,
            source: None,
            pinned: None,
            source_snapshot: None,
            destination: None,
            destination_origin: None,
        }
    }

    pub fn step(&self) -> Step {
        self.step
    }

    pub fn target(&self) -> &TargetNetwork {
        &self.target
    }

    pub fn source_connection(&self) -> Option<&SourceConnection> {
        self.source.as_ref()
    }

    /// Source address captured when the flow left step 1
    pub fn source_address(&self) -> Option<&str> {
        self.source_snapshot.as_deref()
    }

    pub fn pinned_provider(&self) -> Option<&ProviderHandle> {
        self.pinned.as_ref()
    }

    pub fn destination(&self) -> Option<&str> {
        self.destination.as_deref()
    }

    pub fn destination_origin(&self) -> Option<DestinationOrigin> {
        self.destination_origin
    }

    pub fn binding(&self, role: WalletRole) -> Option<&str> {
        match role {
            WalletRole::Source => self.source_address(),
            WalletRole::Destination => self.destination(),
        }
    }

    /// Record a newly connected source wallet. Any earlier pin belongs to the old wallet and is dropped.
    pub fn connect_source(&mut self, connection: SourceConnection) -> Result<(), MigrationError> {
        validate_ethereum_address(&connection.address)?;
        log::info!(
            "Source wallet {} connected as {} on chain {}",
            connection.provider.name,
            connection.address,
            connection.chain_id
        );
        self.pinned = None;
        self.source_snapshot = None;
        self.source = Some(connection);
        Ok(())
    }

    /// The wallet switched account or chain; the pin, if any, is kept
    pub fn update_active_connection(&mut self, connection: SourceConnection) -> Result<(), MigrationError> {
        validate_ethereum_address(&connection.address)?;
        log::debug!("Active source connection is now {} on chain {}", connection.address, connection.chain_id);
        self.source = Some(connection);
        Ok(())
    }

    pub fn update_chain_id(&mut self, chain_id: ChainId) {
        if let Some(source) = self.source.as_mut() {
            source.chain_id = chain_id;
        }
    }

    /// Ask the active source provider for its chain id and record it
    pub async fn sync_chain_id(&mut self) -> Result<ChainId, MigrationError> {
        let handle = match &self.source {
            Some(source) => source.provider.handle.clone(),
            None => return Err(TransitionRefusal::SourceNotConnected.into()),
        };
        let result = handle.request(METHOD_CHAIN_ID, json!([])).await?;
        let chain_id = match result {
            Value::String(hex) => parse_hex_quantity(&hex)?,
            Value::Number(n) => n
                .as_u64()
                .ok_or_else(|| MigrationError::network(format!("Invalid chain id {}", n)))?,
            other => return Err(MigrationError::network(format!("Invalid chain id {}", other))),
        };
        self.update_chain_id(chain_id);
        Ok(chain_id)
    }

    /// Step 1 to 2: pin the source provider and snapshot its address
    pub fn advance_to_destination(&mut self) -> Result<Step, TransitionRefusal> {
        let source = self.source.as_ref().ok_or(TransitionRefusal::SourceNotConnected)?;
        if source.provider.is_universal_profile() {
            return Err(TransitionRefusal::WrongWalletType);
        }
        if source.chain_id != self.target.chain_id {
            return Err(TransitionRefusal::WrongNetwork {
                expected: self.target.chain_id,
                actual: source.chain_id,
            });
        }

        let handle = source.provider.handle.clone();
        let address = source.address.clone();
        self.pinned.get_or_insert(handle);
        log::info!("Source {} pinned, moving to destination step", address);
        self.source_snapshot = Some(address);
        self.step = Step::ConnectDestination;
        Ok(self.step)
    }

    /// Forget the source entirely and restart at step 1
    pub fn disconnect_source(&mut self) {
        log::info!("Source wallet disconnected");
        self.source = None;
        self.pinned = None;
        self.source_snapshot = None;
        self.step = Step::ConnectSource;
    }

    /// Bind the first account of the Universal Profile extension as destination
    pub async fn connect_destination_extension(
        &mut self,
        up_provider: &dyn Eip1193Provider,
    ) -> Result<Address, MigrationError> {
        let accounts = up_provider.request(METHOD_REQUEST_ACCOUNTS, json!([])).await?;
        let first = accounts
            .as_array()
            .and_then(|list| list.first())
            .and_then(Value::as_str)
            .map(str::to_string)
            .ok_or_else(|| MigrationError::validation("The Universal Profile extension returned no accounts"))?;
        validate_ethereum_address(&first)?;

        log::info!("Destination profile {} connected through the extension", first);
        self.destination = Some(first.clone());
        self.destination_origin = Some(DestinationOrigin::Extension);
        Ok(first)
    }

    pub fn set_destination_manual(&mut self, text: &str) -> Result<Address, MigrationError> {
        let address = text.trim();
        validate_ethereum_address(address)?;
        log::info!("Destination profile {} entered manually", address);
        self.destination = Some(address.to_string());
        self.destination_origin = Some(DestinationOrigin::Manual);
        Ok(address.to_string())
    }

    pub fn clear_destination(&mut self) {
        self.destination = None;
        self.destination_origin = None;
        if self.step == Step::SelectAssets {
            self.step = Step::ConnectDestination;
        }
    }

    /// Step 2 to 3. From step 1 the source must be confirmed again first.
    pub fn advance_to_assets(&mut self) -> Result<Step, TransitionRefusal> {
        if self.step == Step::ConnectSource {
            return Err(TransitionRefusal::SourceNotConnected);
        }
        let source = self.source_snapshot.as_deref().ok_or(TransitionRefusal::SourceNotConnected)?;
        let destination = self.destination.as_deref().ok_or(TransitionRefusal::DestinationMissing)?;
        if addresses_equal(source, destination) {
            return Err(TransitionRefusal::SameAddress);
        }
        self.step = Step::SelectAssets;
        Ok(self.step)
    }

    /// Return one step without touching any binding
    pub fn go_back(&mut self) -> Step {
        self.step = self.step.previous();
        self.step
    }

    pub fn ensure_distinct_roles(&self) -> Result<(), MigrationError> {
        match (self.source_snapshot.as_deref(), self.destination.as_deref()) {
            (Some(source), Some(destination)) if addresses_equal(source, destination) => {
                Err(TransitionRefusal::SameAddress.into())
            }
            _ => Ok(()),
        }
    }

    /// Pinned provider plus both addresses, when all are present and distinct
    pub fn transfer_context(&mut self) -> Option<TransferContext> {
        let from = self.source_snapshot.clone()?;
        let to = self.destination.clone()?;
        if addresses_equal(&from, &to) {
            return None;
        }
        if self.pinned.is_none() {
            self.pinned = self.source.as_ref().map(|s| Arc::clone(&s.provider.handle));
        }
        let provider = self.pinned.clone()?;
        Some(TransferContext { provider, from, to })
    }

    /// Move `provider` to the target network, adding the chain once if the wallet does not know it
    pub async fn switch_network(&self, provider: &dyn Eip1193Provider) -> Result<(), MigrationError> {
        let chain_id = self.target.chain_id_hex();
        match provider
            .request(METHOD_SWITCH_CHAIN, json!([{ "chainId": chain_id }]))
            .await
        {
            Ok(_) => {
                log::info!("Switched wallet to chain {}", chain_id);
                Ok(())
            }
            Err(e) if e.is_unrecognized_chain() => {
                log::info!("Wallet does not know chain {}, adding {}", chain_id, self.target.name);
                let descriptor = serde_json::to_value(self.target.descriptor())?;
                provider.request(METHOD_ADD_CHAIN, json!([descriptor])).await?;
                Ok(())
            }
            Err(e) => {
                log::warn!("Chain switch failed: {}", e);
                Err(e.into())
            }
        }
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(TargetNetwork::lukso_mainnet())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::ProviderClass;
    use crate::infrastructure::provider::MockEip1193Provider;
    use crate::shared::error::{ProviderError, UNRECOGNIZED_CHAIN_CODE};

    const SOURCE: &str = "0xfeedfacefeedfacefeedfacefeedfacefeedface";
    const PROFILE: &str = "0xAbCdEf0123456789aBcDeF0123456789AbCdEf01";

    fn descriptor(id: &str, class: ProviderClass, handle: ProviderHandle) -> InjectedProviderDescriptor {
        InjectedProviderDescriptor {
            id: id.to_string(),
            name: format!("Wallet {}", id),
            icon_ref: String::new(),
            rdns: "com.example".to_string(),
            class,
            handle,
        }
    }

    fn connection(id: &str, class: ProviderClass, chain_id: ChainId) -> SourceConnection {
        SourceConnection {
            provider: descriptor(id, class, Arc::new(MockEip1193Provider::new())),
            address: SOURCE.to_string(),
            chain_id,
        }
    }

    fn at_destination_step() -> SessionController {
        let mut session = SessionController::default();
        session
            .connect_source(connection("legacy", ProviderClass::Legacy, TARGET_CHAIN_ID))
            .unwrap();
        session.advance_to_destination().unwrap();
        session
    }

    #[test]
    fn test_source_transition_refusals() {
        let mut session = SessionController::default();
        assert_eq!(session.advance_to_destination(), Err(TransitionRefusal::SourceNotConnected));

        session
            .connect_source(connection("up", ProviderClass::UniversalProfile, TARGET_CHAIN_ID))
            .unwrap();
        let refusal = session.advance_to_destination().unwrap_err();
        assert_eq!(refusal.code(), "wrong-wallet-type");

        session.connect_source(connection("legacy", ProviderClass::Legacy, 1)).unwrap();
        assert_eq!(
            session.advance_to_destination(),
            Err(TransitionRefusal::WrongNetwork { expected: 42, actual: 1 })
        );

        session.update_chain_id(TARGET_CHAIN_ID);
        assert_eq!(session.advance_to_destination(), Ok(Step::ConnectDestination));
        assert_eq!(session.source_address(), Some(SOURCE));
    }

    #[test]
    fn test_pin_survives_connection_change() {
        let mut session = at_destination_step();
        let pinned = session.pinned_provider().cloned().expect("provider pinned");

        let mut switched = connection("other", ProviderClass::Legacy, TARGET_CHAIN_ID);
        switched.address = "0x9999999999999999999999999999999999999999".to_string();
        session.update_active_connection(switched).unwrap();

        session.set_destination_manual(PROFILE).unwrap();
        let context = session.transfer_context().expect("context available");
        assert!(Arc::ptr_eq(&context.provider, &pinned));
        assert_eq!(context.from, SOURCE);
    }

    #[test]
    fn test_same_address_is_case_insensitive() {
        let mut session = at_destination_step();
        session.set_destination_manual(&format!("0x{}", SOURCE[2..].to_uppercase())).unwrap();

        assert_eq!(session.advance_to_assets(), Err(TransitionRefusal::SameAddress));
        assert!(session.ensure_distinct_roles().is_err());
        assert!(session.transfer_context().is_none());
    }

    #[test]
    fn test_destination_required() {
        let mut session = at_destination_step();
        assert_eq!(session.advance_to_assets(), Err(TransitionRefusal::DestinationMissing));

        assert!(session.set_destination_manual("0x1234").is_err());
        let bound = session.set_destination_manual(&format!("  {}  ", PROFILE)).unwrap();
        assert_eq!(bound, PROFILE);
        assert_eq!(session.destination_origin(), Some(DestinationOrigin::Manual));
        assert_eq!(session.advance_to_assets(), Ok(Step::SelectAssets));
    }

    #[test]
    fn test_clear_destination_and_disconnect() {
        let mut session = at_destination_step();
        session.set_destination_manual(PROFILE).unwrap();
        session.advance_to_assets().unwrap();

        session.clear_destination();
        assert_eq!(session.step(), Step::ConnectDestination);
        assert!(session.destination().is_none());

        session.disconnect_source();
        assert_eq!(session.step(), Step::ConnectSource);
        assert!(session.pinned_provider().is_none());
        assert!(session.source_address().is_none());
        assert!(session.source_connection().is_none());
    }

    #[test]
    fn test_go_back_keeps_bindings() {
        let mut session = at_destination_step();
        session.set_destination_manual(PROFILE).unwrap();
        session.advance_to_assets().unwrap();

        assert_eq!(session.go_back(), Step::ConnectDestination);
        assert_eq!(session.go_back(), Step::ConnectSource);
        assert_eq!(session.go_back(), Step::ConnectSource);
        assert_eq!(session.binding(WalletRole::Destination), Some(PROFILE));
        assert_eq!(session.binding(WalletRole::Source), Some(SOURCE));
    }

    #[test]
    fn test_assets_step_unreachable_from_source_step() {
        let mut session = at_destination_step();
        session.set_destination_manual(PROFILE).unwrap();
        session.go_back();

        assert_eq!(session.advance_to_assets(), Err(TransitionRefusal::SourceNotConnected));
        assert_eq!(session.step(), Step::ConnectSource);

        assert_eq!(session.advance_to_destination(), Ok(Step::ConnectDestination));
        assert_eq!(session.advance_to_assets(), Ok(Step::SelectAssets));
    }

    #[tokio::test]
    async fn test_destination_from_extension() {
        let mut up = MockEip1193Provider::new();
        up.expect_request()
            .withf(|method, _| method == METHOD_REQUEST_ACCOUNTS)
            .times(1)
            .returning(|_, _| Ok(json!([PROFILE, SOURCE])));

        let mut session = at_destination_step();
        let address = session.connect_destination_extension(&up).await.unwrap();
        assert_eq!(address, PROFILE);
        assert_eq!(session.destination_origin(), Some(DestinationOrigin::Extension));
    }

    #[tokio::test]
    async fn test_extension_without_accounts() {
        let mut up = MockEip1193Provider::new();
        up.expect_request().times(1).returning(|_, _| Ok(json!([])));

        let mut session = at_destination_step();
        assert!(session.connect_destination_extension(&up).await.is_err());
        assert!(session.destination().is_none());
    }

    #[tokio::test]
    async fn test_switch_falls_back_to_add_chain_once() {
        let mut wallet = MockEip1193Provider::new();
        wallet
            .expect_request()
            .withf(|method, params| method == METHOD_SWITCH_CHAIN && params[0]["chainId"] == "0x2a")
            .times(1)
            .returning(|_, _| Err(ProviderError::new(UNRECOGNIZED_CHAIN_CODE, "Unrecognized chain ID")));
        wallet
            .expect_request()
            .withf(|method, params| {
                method == METHOD_ADD_CHAIN
                    && params[0]["chainId"] == "0x2a"
                    && params[0]["chainName"] == TARGET_CHAIN_NAME
                    && params[0]["nativeCurrency"]["symbol"] == "LYX"
                    && params[0]["nativeCurrency"]["decimals"] == 18
                    && params[0]["rpcUrls"][0] == DEFAULT_RPC_URL
                    && params[0]["blockExplorerUrls"][0] == DEFAULT_EXPLORER_URL
            })
            .times(1)
            .returning(|_, _| Ok(Value::Null));

        SessionController::default().switch_network(&wallet).await.unwrap();
    }

    #[tokio::test]
    async fn test_switch_surfaces_other_errors() {
        let mut wallet = MockEip1193Provider::new();
        wallet
            .expect_request()
            .withf(|method, _| method == METHOD_SWITCH_CHAIN)
            .times(1)
            .returning(|_, _| Err(ProviderError::user_rejected()));
        wallet.expect_request().withf(|method, _| method == METHOD_ADD_CHAIN).never();

        let err = SessionController::default().switch_network(&wallet).await.unwrap_err();
        assert!(matches!(err, MigrationError::Provider { code: 4001, .. }));
    }

    #[tokio::test]
    async fn test_sync_chain_id() {
        let mut wallet = MockEip1193Provider::new();
        wallet
            .expect_request()
            .withf(|method, _| method == METHOD_CHAIN_ID)
            .times(1)
            .returning(|_, _| Ok(json!("0x2a")));

        let mut session = SessionController::default();
        session
            .connect_source(SourceConnection {
                provider: descriptor("legacy", ProviderClass::Legacy, Arc::new(wallet)),
                address: SOURCE.to_string(),
                chain_id: 1,
            })
            .unwrap();

        assert_eq!(session.sync_chain_id().await.unwrap(), TARGET_CHAIN_ID);
        assert_eq!(session.advance_to_destination(), Ok(Step::ConnectDestination));
    }
}
