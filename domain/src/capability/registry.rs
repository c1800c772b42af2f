//! Process-wide catalog of capabilities.

use super::entities::{Capability, CapabilityId};
use crate::core::error::DomainError;
use crate::util::now_millis;
use std::collections::HashMap;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

#[derive(Debug, Default)]
struct RegistryInner {
    entries: HashMap<CapabilityId, Capability>,
    next_seq: u64,
}

/// Catalog of capabilities that can be registered, enabled and disabled at runtime.
///
/// All mutation goes through one `RwLock`, so readers always observe a
/// consistent catalog. Reads hand out clones: a capability already handed to a
/// hypothesis is unaffected by later `disable` calls.
///
/// # Example
///
/// ```
/// use superposition_domain::capability::{
///     Capability, CapabilityId, CapabilityRegistry, CapabilityTemplate,
/// };
///
/// let registry = CapabilityRegistry::new();
/// registry.register(Capability::new("a", CapabilityTemplate::Analyst).with_priority(1)).unwrap();
/// registry.register(Capability::new("b", CapabilityTemplate::Skeptic).with_priority(5)).unwrap();
///
/// let active: Vec<_> = registry.list_active().into_iter().map(|c| c.id).collect();
/// assert_eq!(active, vec![CapabilityId::from("b"), CapabilityId::from("a")]);
/// ```
#[derive(Debug, Default)]
pub struct CapabilityRegistry {
    inner: RwLock<RegistryInner>,
}

impl CapabilityRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a registry pre-populated with `capabilities`.
    pub fn with_capabilities(
        capabilities: impl IntoIterator<Item = Capability>,
    ) -> Result<Self, DomainError> {
        let registry = Self::new();
        for capability in capabilities {
            registry.register(capability)?;
        }
        Ok(registry)
    }

    fn read(&self) -> RwLockReadGuard<'_, RegistryInner> {
        self.inner.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write(&self) -> RwLockWriteGuard<'_, RegistryInner> {
        self.inner.write().unwrap_or_else(PoisonError::into_inner)
    }

    /// Register a capability, failing with `DuplicateId` if the id is taken.
    pub fn register(&self, mut capability: Capability) -> Result<CapabilityId, DomainError> {
        let mut inner = self.write();
        if inner.entries.contains_key(&capability.id) {
            return Err(DomainError::DuplicateId(capability.id.to_string()));
        }
        capability.registration_seq = inner.next_seq;
        capability.created_at_ms = now_millis();
        inner.next_seq += 1;

        let id = capability.id.clone();
        inner.entries.insert(id.clone(), capability);
        Ok(id)
    }

    /// Enable a capability. Enabling an enabled capability is a no-op.
    pub fn enable(&self, id: &CapabilityId) -> Result<(), DomainError> {
        self.set_enabled(id, true)
    }

    /// Disable a capability. Disabling a disabled capability is a no-op.
    pub fn disable(&self, id: &CapabilityId) -> Result<(), DomainError> {
        self.set_enabled(id, false)
    }

    fn set_enabled(&self, id: &CapabilityId, enabled: bool) -> Result<(), DomainError> {
        let mut inner = self.write();
        let capability = inner
            .entries
            .get_mut(id)
            .ok_or_else(|| DomainError::NotFound(id.to_string()))?;
        capability.enabled = enabled;
        Ok(())
    }

    /// Enabled capabilities, highest priority first, then earliest registered.
    pub fn list_active(&self) -> Vec<Capability> {
        let inner = self.read();
        let mut active: Vec<Capability> = inner
            .entries
            .values()
            .filter(|c| c.enabled)
            .cloned()
            .collect();
        drop(inner);

        active.sort_by(|a, b| {
            b.priority
                .cmp(&a.priority)
                .then(a.registration_seq.cmp(&b.registration_seq))
        });
        active
    }

    /// Every capability regardless of state, in registration order.
    pub fn list_all(&self) -> Vec<Capability> {
        let mut all: Vec<Capability> = self.read().entries.values().cloned().collect();
        all.sort_by_key(|c| c.registration_seq);
        all
    }

    pub fn get(&self, id: &CapabilityId) -> Option<Capability> {
        self.read().entries.get(id).cloned()
    }

    pub fn len(&self) -> usize {
        self.read().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}
