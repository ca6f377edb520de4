//! Provider registry
//!
//! Tracks every wallet that answered the multi-provider discovery request and
//! classifies each one as a legacy wallet or a Universal Profile extension.

use std::collections::HashSet;

use tokio::sync::mpsc;

use crate::domain::entities::{InjectedProviderDescriptor, ProviderAnnouncement, ProviderClass, ProviderInfo};
use crate::shared::constants::{MSG_NO_WALLETS_FOUND, UP_PROVIDER_TOKENS};

/// Broadcast side of the discovery protocol
pub trait DiscoveryChannel {
    /// Ask every installed wallet to announce itself
    fn request_providers(&self);
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DiscoveryStatus {
    NoWalletsFound,
    Found(usize),
}

impl DiscoveryStatus {
    pub fn message(&self) -> Option<&'static str> {
        match self {
            DiscoveryStatus::NoWalletsFound => Some(MSG_NO_WALLETS_FOUND),
            DiscoveryStatus::Found(_) => None,
        }
    }
}

pub struct ProviderRegistry {
    providers: Vec<InjectedProviderDescriptor>,
    seen_ids: HashSet<String>,
    up_tokens: Vec<String>,
    active: bool,
}

impl ProviderRegistry {
    pub fn new(up_tokens: &[String]) -> Self {
        Self {
            providers: Vec::new(),
            seen_ids: HashSet::new(),
            up_tokens: up_tokens
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect(),
            active: false,
        }
    }

    /// Start listening and broadcast the discovery request.
    ///
    /// Returns `false` without broadcasting again if the registry is already active.
    pub fn activate(&mut self, discovery: &dyn DiscoveryChannel) -> bool {
        if self.active {
            log::debug!("Provider registry already active, not re-requesting");
            return false;
        }
        self.active = true;
        log::info!("Requesting wallet provider announcements");
        discovery.request_providers();
        true
    }

    pub fn is_active(&self) -> bool {
        self.active
    }

    /// Stop listening and forget every announced provider
    pub fn teardown(&mut self) {
        log::info!("Tearing down provider registry ({} providers)", self.providers.len());
        self.active = false;
        self.providers.clear();
        self.seen_ids.clear();
    }

    /// Record one announcement. Returns `true` if the provider was new.
    pub fn handle_announcement(&mut self, announcement: ProviderAnnouncement) -> bool {
        if !self.active {
            log::debug!("Ignoring announcement from {} while inactive", announcement.info.name);
            return false;
        }
        let ProviderAnnouncement { info, provider } = announcement;
        if !self.seen_ids.insert(info.uuid.clone()) {
            log::debug!("Duplicate announcement for provider {} ignored", info.uuid);
            return false;
        }

        let class = self.classify(&info);
        log::info!("Discovered wallet provider {} ({}) as {:?}", info.name, info.rdns, class);
        self.providers.push(InjectedProviderDescriptor {
            id: info.uuid,
            name: info.name,
            icon_ref: info.icon,
            rdns: info.rdns,
            class,
            handle: provider,
        });
        true
    }

    /// Drain announcements until every sender is dropped. Returns how many were new.
    pub async fn listen(&mut self, receiver: &mut mpsc::Receiver<ProviderAnnouncement>) -> usize {
        let mut added = 0;
        while let Some(announcement) = receiver.recv().await {
            if !self.active {
                break;
            }
            if self.handle_announcement(announcement) {
                added += 1;
            }
        }
        added
    }

    pub fn classify(&self, info: &ProviderInfo) -> ProviderClass {
        let rdns = info.rdns.to_lowercase();
        let name = info.name.to_lowercase();
        let is_up = self
            .up_tokens
            .iter()
            .any(|token| rdns.contains(token.as_str()) || name.contains(token.as_str()));
        if is_up {
            ProviderClass::UniversalProfile
        } else {
            ProviderClass::Legacy
        }
    }

    /// All providers in announcement order
    pub fn providers(&self) -> &[InjectedProviderDescriptor] {
        &self.providers
    }

    /// Providers eligible as migration source
    pub fn legacy_providers(&self) -> Vec<&InjectedProviderDescriptor> {
        self.providers.iter().filter(|p| !p.is_universal_profile()).collect()
    }

    pub fn universal_profile_providers(&self) -> Vec<&InjectedProviderDescriptor> {
        self.providers.iter().filter(|p| p.is_universal_profile()).collect()
    }

    pub fn find(&self, id: &str) -> Option<&InjectedProviderDescriptor> {
        self.providers.iter().find(|p| p.id == id)
    }

    pub fn len(&self) -> usize {
        self.providers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    pub fn discovery_status(&self) -> DiscoveryStatus {
        if self.providers.is_empty() {
            DiscoveryStatus::NoWalletsFound
        } else {
            DiscoveryStatus::Found(self.providers.len())
        }
    }
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        let tokens: Vec<String> = UP_PROVIDER_TOKENS.iter().map(|t| t.to_string()).collect();
        Self::new(&tokens)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::infrastructure::provider::MockEip1193Provider;
    use proptest::prelude::*;
    use std::cell::Cell;
    use std::sync::Arc;

    #[derive(Default)]
    struct CountingDiscovery {
        requests: Cell<u32>,
    }

    impl DiscoveryChannel for CountingDiscovery {
        fn request_providers(&self) {
            self.requests.set(self.requests.get() + 1);
        }
    }

    fn announcement(uuid: &str, name: &str, rdns: &str) -> ProviderAnnouncement {
        ProviderAnnouncement {
            info: ProviderInfo {
                uuid: uuid.to_string(),
                name: name.to_string(),
                icon: "data:image/svg+xml;base64,".to_string(),
                rdns: rdns.to_string(),
            },
            provider: Arc::new(MockEip1193Provider::new()),
        }
    }

    fn active_registry() -> ProviderRegistry {
        let mut registry = ProviderRegistry::default();
        registry.activate(&CountingDiscovery::default());
        registry
    }

    #[test]
    fn test_activate_requests_once() {
        let discovery = CountingDiscovery::default();
        let mut registry = ProviderRegistry::default();

        assert!(registry.activate(&discovery));
        assert!(!registry.activate(&discovery));
        assert_eq!(discovery.requests.get(), 1);

        registry.teardown();
        assert!(registry.activate(&discovery));
        assert_eq!(discovery.requests.get(), 2);
    }

    #[test]
    fn test_first_announcement_wins() {
        let mut registry = active_registry();
        assert!(registry.handle_announcement(announcement("a", "MetaMask", "io.metamask")));
        assert!(!registry.handle_announcement(announcement("a", "Impostor", "io.lukso.up")));

        assert_eq!(registry.len(), 1);
        assert_eq!(registry.providers()[0].name, "MetaMask");
        assert_eq!(registry.providers()[0].class, ProviderClass::Legacy);
    }

    #[test]
    fn test_classification() {
        let registry = ProviderRegistry::default();
        let classify = |name: &str, rdns: &str| {
            registry.classify(&ProviderInfo {
                uuid: "x".to_string(),
                name: name.to_string(),
                icon: String::new(),
                rdns: rdns.to_string(),
            })
        };

        assert_eq!(classify("Universal Profiles", "io.lukso.up"), ProviderClass::UniversalProfile);
        assert_eq!(classify("UP Browser Extension", "IO.LUKSO.UP"), ProviderClass::UniversalProfile);
        assert_eq!(classify("Universal-Profile Wallet", "com.example"), ProviderClass::UniversalProfile);
        assert_eq!(classify("MetaMask", "io.metamask"), ProviderClass::Legacy);
        assert_eq!(classify("Rabby Wallet", "io.rabby"), ProviderClass::Legacy);
    }

    #[test]
    fn test_role_filters() {
        let mut registry = active_registry();
        registry.handle_announcement(announcement("a", "MetaMask", "io.metamask"));
        registry.handle_announcement(announcement("b", "Universal Profiles", "io.lukso.up"));
        registry.handle_announcement(announcement("c", "Rabby Wallet", "io.rabby"));

        let legacy: Vec<&str> = registry.legacy_providers().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(legacy, vec!["a", "c"]);
        assert_eq!(registry.universal_profile_providers().len(), 1);
        assert!(registry.find("b").is_some());
        assert!(registry.find("z").is_none());
    }

    #[test]
    fn test_no_wallets_found() {
        let registry = active_registry();
        assert_eq!(registry.discovery_status(), DiscoveryStatus::NoWalletsFound);
        assert_eq!(registry.discovery_status().message(), Some(MSG_NO_WALLETS_FOUND));
    }

    #[test]
    fn test_inactive_registry_ignores_announcements() {
        let mut registry = ProviderRegistry::default();
        assert!(!registry.handle_announcement(announcement("a", "MetaMask", "io.metamask")));
        assert!(registry.is_empty());
    }

    #[tokio::test]
    async fn test_listen_until_senders_drop() {
        let mut registry = active_registry();
        let (tx, mut rx) = mpsc::channel(8);
        tx.send(announcement("a", "MetaMask", "io.metamask")).await.unwrap();
        tx.send(announcement("a", "MetaMask", "io.metamask")).await.unwrap();
        tx.send(announcement("b", "Universal Profiles", "io.lukso.up")).await.unwrap();
        drop(tx);

        let added = registry.listen(&mut rx).await;
        assert_eq!(added, 2);
        assert_eq!(registry.discovery_status(), DiscoveryStatus::Found(2));
    }

    proptest! {
        #[test]
        fn registry_size_equals_distinct_ids(ids in proptest::collection::vec(0u8..6, 0..40)) {
            let mut registry = active_registry();
            for id in &ids {
                registry.handle_announcement(announcement(&id.to_string(), "Wallet", "com.example"));
            }
            let distinct: HashSet<u8> = ids.iter().copied().collect();
            prop_assert_eq!(registry.len(), distinct.len());
        }
    }
}
