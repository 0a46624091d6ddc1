//! Two-phase bootstrap.
//!
//! Startup runs in a fixed order:
//!
//! 1. **Loader phase**: every loader provider in the registry, in
//!    registration order. These run whether or not any capability ever
//!    resolves to them.
//! 2. **General phase**: the remaining units, in the order the caller
//!    supplies them. A unit already run in the loader phase is skipped.
//!
//! Every unit runs at most once; units are recognised by object address, so
//! the same provider reached through different handles still counts as one.
//! The first failing hook halts its phase and leaves the orchestrator in
//! [`Phase::Failed`].

use crate::{error::BootstrapError, registry::Registry};
use plexus_core::{Loader, loader_addr};
use rustc_hash::FxHashSet;
use std::{fmt, sync::Arc};

/// One of the two bootstrap phases.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Stage {
    /// Loader providers from the registry.
    Loader,
    /// Caller-supplied units.
    General,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Stage::Loader => f.write_str("loader"),
            Stage::General => f.write_str("general"),
        }
    }
}

/// Progress of a [`BootstrapOrchestrator`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum Phase {
    /// Nothing has run yet.
    #[default]
    Pending,
    /// The loader phase completed.
    LoaderDone,
    /// Both phases completed.
    GeneralDone,
    /// A hook failed during the given stage. No further phase can run.
    Failed(Stage),
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Pending => f.write_str("pending"),
            Phase::LoaderDone => f.write_str("loader phase done"),
            Phase::GeneralDone => f.write_str("general phase done"),
            Phase::Failed(stage) => write!(f, "{stage} phase failed"),
        }
    }
}

/// Runs bootstrap hooks in two ordered phases.
///
/// # Example
/// ```ignore
/// let mut boot = BootstrapOrchestrator::new(registry.clone());
/// boot.run_loader_phase()?;
/// boot.run_general_phase(units)?;
/// ```
#[derive(Debug)]
pub struct BootstrapOrchestrator {
    registry: Registry,
    phase: Phase,
    ran: FxHashSet<usize>,
}

impl BootstrapOrchestrator {
    /// An orchestrator for the loader providers of `registry`.
    pub fn new(registry: Registry) -> Self {
        Self {
            registry,
            phase: Phase::Pending,
            ran: FxHashSet::default(),
        }
    }

    /// Current progress.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The registry whose loader providers run in the loader phase.
    pub fn registry(&self) -> &Registry {
        &self.registry
    }

    /// Whether `loader` has already been run.
    pub fn has_run(&self, loader: &dyn Loader) -> bool {
        self.ran.contains(&(loader_addr(loader) as usize))
    }

    /// Run every loader provider once, in registration order.
    ///
    /// Returns how many hooks ran.
    pub fn run_loader_phase(&mut self) -> Result<usize, BootstrapError> {
        self.enter(Stage::Loader, Phase::Pending)?;

        let registry = self.registry.clone();
        #[cfg(feature = "tracing")]
        tracing::info!(providers = registry.len(), "starting loader phase");

        let mut count = 0;
        for (_, loader) in registry.loaders() {
            if self.run_hook(Stage::Loader, loader)? {
                count += 1;
            }
        }

        self.phase = Phase::LoaderDone;
        #[cfg(feature = "tracing")]
        tracing::info!(count, "loader phase complete");
        Ok(count)
    }

    /// Run each unit once, in the given order, skipping units that already
    /// ran.
    ///
    /// Returns how many hooks ran.
    pub fn run_general_phase<I>(&mut self, units: I) -> Result<usize, BootstrapError>
    where
        I: IntoIterator<Item = Arc<dyn Loader>>,
    {
        self.enter(Stage::General, Phase::LoaderDone)?;
        #[cfg(feature = "tracing")]
        tracing::info!("starting general phase");

        let mut count = 0;
        for unit in units {
            if self.run_hook(Stage::General, unit.as_ref())? {
                count += 1;
            }
        }

        self.phase = Phase::GeneralDone;
        #[cfg(feature = "tracing")]
        tracing::info!(count, "general phase complete");
        Ok(count)
    }

    fn enter(&self, stage: Stage, required: Phase) -> Result<(), BootstrapError> {
        if self.phase == required {
            return Ok(());
        }
        #[cfg(feature = "tracing")]
        tracing::error!(%stage, current = %self.phase, "bootstrap phase out of order");
        Err(BootstrapError::PhaseOrder {
            stage,
            current: self.phase,
        })
    }

    fn run_hook(&mut self, stage: Stage, loader: &dyn Loader) -> Result<bool, BootstrapError> {
        if !self.ran.insert(loader_addr(loader) as usize) {
            #[cfg(feature = "tracing")]
            tracing::trace!(%stage, unit = loader.unit_name(), "already ran, skipping");
            return Ok(false);
        }

        #[cfg(feature = "tracing")]
        tracing::debug!(%stage, unit = loader.unit_name(), "running bootstrap hook");
        match loader.bootstrap() {
            Ok(()) => Ok(true),
            Err(source) => {
                #[cfg(feature = "tracing")]
                tracing::error!(%stage, unit = loader.unit_name(), error = %source, "bootstrap hook failed");
                self.phase = Phase::Failed(stage);
                Err(BootstrapError::HookFailed {
                    stage,
                    unit: loader.unit_name().to_string(),
                    source,
                })
            }
        }
    }
}
