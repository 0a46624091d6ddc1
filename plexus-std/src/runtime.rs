//! Host runtime.
//!
//! [`Runtime::boot`] ties the pieces together: it runs discovery, freezes
//! the registry, runs both bootstrap phases and returns a runtime that
//! resolves capabilities for the rest of the program.

use crate::{
    bootstrap::{BootstrapOrchestrator, Phase},
    discovery::{Discovered, Discovery, StaticDiscovery},
    error::{DiscoveryError, PlexusError},
    registry::{Registry, RegistryBuilder},
    resolver::CapabilityResolver,
};
use plexus_core::{Loader, Provider};
use std::sync::Arc;

/// Builder for composing discovery strategies before [`boot`](Self::boot).
///
/// # Example
/// ```ignore
/// let runtime = Runtime::builder()
///     .discovery(StaticDiscovery::new().provider(DiskStorage::new()))
///     .unit(Arc::new(Metrics::new()))
///     .boot()?;
/// ```
#[derive(Default)]
pub struct RuntimeBuilder {
    discoveries: Vec<Box<dyn Discovery>>,
    fail_fast: bool,
}

impl RuntimeBuilder {
    /// Create a new empty builder.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a discovery strategy. Strategies run in the order they were added.
    pub fn discovery(mut self, discovery: impl Discovery + 'static) -> Self {
        self.discoveries.push(Box::new(discovery));
        self
    }

    /// Add a single provider at this point in the discovery order.
    pub fn provider(self, provider: Arc<dyn Provider>) -> Self {
        self.discovery(StaticDiscovery::new().shared_provider(provider))
    }

    /// Add a single general unit at this point in the discovery order.
    pub fn unit(self, unit: Arc<dyn Loader>) -> Self {
        self.discovery(StaticDiscovery::new().shared_unit(unit))
    }

    /// Abort on the first failed construction instead of logging and
    /// skipping it. Off by default.
    pub fn fail_fast(mut self, fail_fast: bool) -> Self {
        self.fail_fast = fail_fast;
        self
    }

    /// Discover, register and bootstrap.
    pub fn boot(self) -> Result<Runtime, PlexusError> {
        let mut registry = RegistryBuilder::new();
        let mut units: Vec<Arc<dyn Loader>> = Vec::new();
        let mut skipped: Vec<DiscoveryError> = Vec::new();

        for discovery in &self.discoveries {
            for found in discovery.discover() {
                match found {
                    Ok(Discovered::Provider(provider)) => registry.register_mut(provider),
                    Ok(Discovered::Unit(unit)) => {
                        #[cfg(feature = "tracing")]
                        tracing::trace!(unit = unit.unit_name(), "discovered unit");
                        units.push(unit);
                    }
                    Err(err) if self.fail_fast => return Err(err.into()),
                    Err(err) => {
                        #[cfg(feature = "tracing")]
                        tracing::warn!(error = %err, "skipping unit that failed to construct");
                        skipped.push(err);
                    }
                }
            }
        }

        let registry = registry.build();
        #[cfg(feature = "tracing")]
        tracing::debug!(
            providers = registry.len(),
            units = units.len(),
            skipped = skipped.len(),
            "discovery complete"
        );

        let mut orchestrator = BootstrapOrchestrator::new(registry.clone());
        orchestrator.run_loader_phase()?;
        orchestrator.run_general_phase(units.iter().cloned())?;

        Ok(Runtime {
            resolver: CapabilityResolver::new(registry),
            orchestrator,
            units,
            skipped,
        })
    }
}

impl std::fmt::Debug for RuntimeBuilder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RuntimeBuilder")
            .field("discoveries", &self.discoveries.len())
            .field("fail_fast", &self.fail_fast)
            .finish()
    }
}

/// A booted set of providers and units.
pub struct Runtime {
    resolver: CapabilityResolver,
    orchestrator: BootstrapOrchestrator,
    units: Vec<Arc<dyn Loader>>,
    skipped: Vec<DiscoveryError>,
}

impl Runtime {
    /// Start building a runtime.
    pub fn builder() -> RuntimeBuilder {
        RuntimeBuilder::new()
    }

    /// Boot from the given strategies with default options.
    pub fn boot<I, D>(discoveries: I) -> Result<Self, PlexusError>
    where
        I: IntoIterator<Item = D>,
        D: Discovery + 'static,
    {
        discoveries
            .into_iter()
            .fold(RuntimeBuilder::new(), |builder, d| builder.discovery(d))
            .boot()
    }

    /// Resolve a capability. See [`CapabilityResolver::resolve`].
    pub fn resolve(&self, capability: &str) -> Option<Arc<dyn Provider>> {
        self.resolver.resolve(capability)
    }

    /// The capability resolver.
    pub fn resolver(&self) -> &CapabilityResolver {
        &self.resolver
    }

    /// The frozen registry.
    pub fn registry(&self) -> &Registry {
        self.resolver.registry()
    }

    /// General units, in the order they ran (or were skipped).
    pub fn units(&self) -> &[Arc<dyn Loader>] {
        &self.units
    }

    /// Constructions that failed during discovery and were skipped.
    ///
    /// Always empty when booted with [`RuntimeBuilder::fail_fast`].
    pub fn skipped(&self) -> &[DiscoveryError] {
        &self.skipped
    }

    /// Bootstrap progress. Always [`Phase::GeneralDone`] for a booted runtime.
    pub fn phase(&self) -> Phase {
        self.orchestrator.phase()
    }
}

impl std::fmt::Debug for Runtime {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Runtime")
            .field("resolver", &self.resolver)
            .field("phase", &self.phase())
            .field(
                "units",
                &self.units.iter().map(|u| u.unit_name()).collect::<Vec<_>>(),
            )
            .field("skipped", &self.skipped.len())
            .finish()
    }
}
