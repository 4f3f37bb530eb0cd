//! Lazy, process-lifetime permission grants.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;

use crate::{Capability, DeviceError};

/// Outcome of a permission request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionStatus {
    /// Access allowed.
    Granted,
    /// Access refused.
    Denied,
}

/// Asks the user (or a policy) for a capability.
#[async_trait]
pub trait PermissionPrompt: Send + Sync {
    /// Requests `capability`, suspending until the user answers.
    async fn request(&self, capability: Capability) -> PermissionStatus;
}

/// A prompt that answers from a fixed set of allowed capabilities.
#[derive(Debug, Clone, Default)]
pub struct StaticPrompt {
    allowed: BTreeSet<Capability>,
}

impl StaticPrompt {
    /// Grants every capability.
    #[must_use]
    pub fn grant_all() -> Self {
        Self::granting(&[Capability::Location, Capability::Audio])
    }

    /// Denies every capability.
    #[must_use]
    pub fn deny_all() -> Self {
        Self::default()
    }

    /// Grants exactly the listed capabilities.
    #[must_use]
    pub fn granting(capabilities: &[Capability]) -> Self {
        Self {
            allowed: capabilities.iter().copied().collect(),
        }
    }
}

#[async_trait]
impl PermissionPrompt for StaticPrompt {
    async fn request(&self, capability: Capability) -> PermissionStatus {
        if self.allowed.contains(&capability) {
            PermissionStatus::Granted
        } else {
            PermissionStatus::Denied
        }
    }
}

/// Permission gate shared by all device providers.
///
/// A capability is requested the first time it is needed. Grants are
/// remembered until the process exits; denials are not, so the next use
/// asks again.
pub struct Permissions {
    prompt: Arc<dyn PermissionPrompt>,
    granted: Mutex<BTreeSet<Capability>>,
}

impl Permissions {
    /// Creates a gate that asks `prompt` on first use of each capability.
    #[must_use]
    pub fn new(prompt: Arc<dyn PermissionPrompt>) -> Self {
        Self {
            prompt,
            granted: Mutex::new(BTreeSet::new()),
        }
    }

    /// Whether `capability` has already been granted in this process.
    #[must_use]
    pub fn is_granted(&self, capability: Capability) -> bool {
        self.granted
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .contains(&capability)
    }

    /// Ensures `capability` is granted, prompting if needed.
    ///
    /// # Errors
    ///
    /// Returns [`DeviceError::PermissionDenied`] if the prompt refuses.
    pub async fn ensure(&self, capability: Capability) -> Result<(), DeviceError> {
        if self.is_granted(capability) {
            return Ok(());
        }

        match self.prompt.request(capability).await {
            PermissionStatus::Granted => {
                log::debug!("Permission granted: {capability}");
                self.granted
                    .lock()
                    .unwrap_or_else(PoisonError::into_inner)
                    .insert(capability);
                Ok(())
            }
            PermissionStatus::Denied => {
                log::warn!("Permission denied: {capability}");
                Err(DeviceError::PermissionDenied(capability))
            }
        }
    }
}
