//! Error types for the Plexus runtime.
//!
//! - [`PlexusError`] - Top-level error type for runtime startup
//! - [`BootstrapError`] - Errors while running bootstrap phases
//! - [`DiscoveryError`] - Errors while constructing discovered units

use crate::bootstrap::{Phase, Stage};
use plexus_core::{BoxError, LoadError};
use thiserror::Error;

/// Top-level error type for all Plexus operations.
#[derive(Error, Debug)]
pub enum PlexusError {
    /// A bootstrap phase failed.
    #[error("bootstrap error: {0}")]
    Bootstrap(#[from] BootstrapError),

    /// A discovered unit could not be constructed.
    #[error("discovery error: {0}")]
    Discovery(#[from] DiscoveryError),
}

/// Errors that can occur while running bootstrap phases.
#[derive(Error, Debug)]
pub enum BootstrapError {
    /// A unit's bootstrap hook failed; the phase stopped at this unit.
    #[error("{stage} phase: `{unit}` failed")]
    HookFailed {
        /// The phase that was running.
        stage: Stage,
        /// Name of the failing unit.
        unit: String,
        /// The hook's error.
        #[source]
        source: LoadError,
    },

    /// A phase was requested out of order or a second time.
    #[error("cannot run {stage} phase while {current}")]
    PhaseOrder {
        /// The phase that was requested.
        stage: Stage,
        /// Where the orchestrator actually was.
        current: Phase,
    },
}

/// Errors that can occur during discovery.
#[derive(Error, Debug)]
pub enum DiscoveryError {
    /// A unit's constructor failed.
    #[error("failed to construct `{unit}`")]
    Construct {
        /// Name of the unit being constructed.
        unit: String,
        /// The constructor's error.
        #[source]
        source: BoxError,
    },
}
