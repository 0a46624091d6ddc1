//! Provider registry.
//!
//! Providers are collected with a [`RegistryBuilder`] while discovery runs,
//! then frozen into an immutable [`Registry`] that can be shared freely
//! across threads. There is no way to remove a provider.

use plexus_core::{Loader, Provider};
use std::sync::Arc;

/// Builder for constructing a [`Registry`].
///
/// # Example
/// ```ignore
/// let registry = RegistryBuilder::new()
///     .register(Arc::new(DiskStorage::new()))
///     .register(Arc::new(MemoryStorage::new()))
///     .build();
/// ```
#[derive(Default)]
pub struct RegistryBuilder {
    providers: Vec<Arc<dyn Provider>>,
}

impl RegistryBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a provider.
    pub fn register(mut self, provider: Arc<dyn Provider>) -> Self {
        self.register_mut(provider);
        self
    }

    /// Append a provider (mutable version).
    ///
    /// Never deduplicates: registering the same provider twice lists it twice.
    pub fn register_mut(&mut self, provider: Arc<dyn Provider>) {
        #[cfg(feature = "tracing")]
        tracing::trace!(provider = provider.name(), "registering provider");
        self.providers.push(provider);
    }

    /// Append many providers, keeping their order.
    pub fn extend(&mut self, providers: impl IntoIterator<Item = Arc<dyn Provider>>) {
        for provider in providers {
            self.register_mut(provider);
        }
    }

    /// Number of providers registered so far.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether nothing has been registered.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }

    /// Freeze into an immutable registry.
    pub fn build(self) -> Registry {
        Registry {
            providers: self.providers.into(),
        }
    }
}

/// An immutable, insertion-ordered collection of providers.
///
/// Cloning is O(1); clones share the same provider list.
#[derive(Clone, Default)]
pub struct Registry {
    providers: Arc<[Arc<dyn Provider>]>,
}

impl Registry {
    /// Start building a registry.
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::new()
    }

    /// All providers in registration order.
    ///
    /// The iterator is lazy and cloneable; call again to restart.
    pub fn iter(&self) -> std::slice::Iter<'_, Arc<dyn Provider>> {
        self.providers.iter()
    }

    /// Providers that are also loaders, in registration order.
    pub fn loaders(&self) -> impl Iterator<Item = (&Arc<dyn Provider>, &dyn Loader)> {
        self.providers
            .iter()
            .filter_map(|p| p.as_loader().map(|loader| (p, loader)))
    }

    /// Providers advertising `capability`, with the priority of their first
    /// matching entry, in registration order.
    pub fn advertising<'a>(
        &'a self,
        capability: &'a str,
    ) -> impl Iterator<Item = (&'a Arc<dyn Provider>, i32)> + 'a {
        self.providers
            .iter()
            .filter_map(move |p| p.priority_of(capability).map(|prio| (p, prio)))
    }

    /// Number of registered providers.
    pub fn len(&self) -> usize {
        self.providers.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.providers.is_empty()
    }
}

impl<'a> IntoIterator for &'a Registry {
    type Item = &'a Arc<dyn Provider>;
    type IntoIter = std::slice::Iter<'a, Arc<dyn Provider>>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl FromIterator<Arc<dyn Provider>> for Registry {
    fn from_iter<I: IntoIterator<Item = Arc<dyn Provider>>>(iter: I) -> Self {
        let mut builder = RegistryBuilder::new();
        builder.extend(iter);
        builder.build()
    }
}

impl std::fmt::Debug for Registry {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_list()
            .entries(self.providers.iter().map(|p| p.name()))
            .finish()
    }
}
