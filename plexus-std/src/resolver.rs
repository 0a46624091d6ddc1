//! Capability resolution.
//!
//! [`CapabilityResolver::resolve`] maps a capability name to the single
//! provider that implements it with the highest priority. The answer is
//! memoized forever: capabilities are static once the registry is frozen.
//!
//! # Selection Rule
//!
//! Providers are scanned in registration order. Only the first entry a
//! provider advertises for the name counts. A candidate replaces the current
//! best only with a strictly greater priority, so on a tie the provider
//! registered first wins.
//!
//! # Concurrency
//!
//! The scan runs without locks and may be repeated by racing threads; the
//! memo is published first-writer-wins, and the winner's load hook is
//! guarded by a [`Once`] so it runs exactly once regardless of the race.

use crate::registry::Registry;
use parking_lot::RwLock;
use plexus_core::Provider;
use rustc_hash::FxHashMap;
use std::sync::{Arc, Once};

struct CapabilityBinding {
    provider: Option<Arc<dyn Provider>>,
    loaded: Once,
}

/// Resolves capability names against a frozen [`Registry`].
pub struct CapabilityResolver {
    registry: Registry,
    bindings: RwLock<FxHashMap<Arc<str>, Arc<CapabilityBinding>>>,
}

impl CapabilityResolver {
    /// Create a resolver over `registry`.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            bindings: RwLock::new(FxHashMap::default()),
        }
    }

    /// The registry this resolver scans.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Resolve `capability` to its provider, loading it on first use.
    ///
    /// Returns `None` when no registered provider advertises the capability.
    /// The winner's [`Provider::load`] must not resolve the same capability
    /// again, as it would wait on its own initialization.
    pub fn resolve(&self, capability: &str) -> Option<Arc<dyn Provider>> {
        let binding = self.binding(capability);
        if let Some(provider) = &binding.provider {
            binding.loaded.call_once(|| {
                #[cfg(feature = "tracing")]
                tracing::debug!(
                    capability,
                    provider = provider.name(),
                    "loading provider for capability"
                );
                provider.load(capability);
            });
        }
        binding.provider.clone()
    }

    /// Whether `capability` has been resolved before (successfully or not).
    pub fn is_resolved(&self, capability: &str) -> bool {
        self.bindings.read().contains_key(capability)
    }

    /// Memoized capability names with the name of their provider, if any.
    pub fn resolved(&self) -> Vec<(String, Option<String>)> {
        let mut out: Vec<_> = self
            .bindings
            .read()
            .iter()
            .map(|(name, binding)| {
                (
                    name.to_string(),
                    binding.provider.as_ref().map(|p| p.name().to_string()),
                )
            })
            .collect();
        out.sort();
        out
    }

    /// Every provider advertising `capability` with its priority, in
    /// registration order. Has no side effects.
    pub fn candidates(&self, capability: &str) -> Vec<(Arc<dyn Provider>, i32)> {
        self.registry
            .advertising(capability)
            .map(|(provider, priority)| (Arc::clone(provider), priority))
            .collect()
    }

    fn binding(&self, capability: &str) -> Arc<CapabilityBinding> {
        if let Some(binding) = self.bindings.read().get(capability) {
            return Arc::clone(binding);
        }

        let computed = Arc::new(CapabilityBinding {
            provider: self.select(capability),
            loaded: Once::new(),
        });
        #[cfg(feature = "tracing")]
        match &computed.provider {
            Some(provider) => {
                tracing::debug!(capability, provider = provider.name(), "capability resolved")
            }
            None => tracing::debug!(capability, "no provider for capability"),
        }

        let mut bindings = self.bindings.write();
        Arc::clone(bindings.entry(Arc::from(capability)).or_insert(computed))
    }

    fn select(&self, capability: &str) -> Option<Arc<dyn Provider>> {
        let mut best: Option<(&Arc<dyn Provider>, i32)> = None;
        for (provider, priority) in self.registry.advertising(capability) {
            #[cfg(feature = "tracing")]
            tracing::trace!(capability, provider = provider.name(), priority, "candidate");
            if best.is_none_or(|(_, current)| priority > current) {
                best = Some((provider, priority));
            }
        }
        best.map(|(provider, _)| Arc::clone(provider))
    }
}

impl std::fmt::Debug for CapabilityResolver {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CapabilityResolver")
            .field("registry", &self.registry)
            .field("resolved", &self.resolved())
            .finish()
    }
}
