//! Injected wallet provider descriptors
//!
//! One descriptor per wallet that answered the multi-provider discovery request.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::infrastructure::provider::ProviderHandle;

/// Self-description a wallet broadcasts in reply to a discovery request
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderInfo {
    pub uuid: String,
    pub name: String,
    pub icon: String,
    pub rdns: String,
}

/// A discovery announcement: the descriptor plus the live provider handle
#[derive(Clone)]
pub struct ProviderAnnouncement {
    pub info: ProviderInfo,
    pub provider: ProviderHandle,
}

impl fmt::Debug for ProviderAnnouncement {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderAnnouncement")
            .field("info", &self.info)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProviderClass {
    /// Regular externally-owned-account wallet, eligible as a source
    Legacy,
    UniversalProfile,
}

#[derive(Clone)]
pub struct InjectedProviderDescriptor {
    pub id: String,
    pub name: String,
    pub icon_ref: String,
    pub rdns: String,
    pub class: ProviderClass,
    pub handle: ProviderHandle,
}

impl InjectedProviderDescriptor {
    pub fn is_universal_profile(&self) -> bool {
        self.class == ProviderClass::UniversalProfile
    }
}

impl fmt::Debug for InjectedProviderDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InjectedProviderDescriptor")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("rdns", &self.rdns)
            .field("class", &self.class)
            .finish_non_exhaustive()
    }
}
