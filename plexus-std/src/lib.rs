//! # plexus-std
//!
//! Standard machinery for the Plexus capability framework.
//!
//! This crate provides:
//! - **Registry**: [`Registry`], [`RegistryBuilder`]
//! - **Resolution**: [`CapabilityResolver`]
//! - **Bootstrap**: [`BootstrapOrchestrator`] with its two ordered phases
//! - **Discovery**: [`StaticDiscovery`], and `InventoryDiscovery` behind the
//!   `inventory` feature
//! - **Runtime**: [`Runtime`], which runs all of the above at startup
//! - **Testing**: recording fakes in [`testing`]

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

// Re-export core traits
pub use plexus_core;

// Modules
pub mod bootstrap;
pub mod discovery;
pub mod error;
pub mod registry;
pub mod resolver;
pub mod runtime;
pub mod testing;

pub use bootstrap::{BootstrapOrchestrator, Phase, Stage};
#[cfg(feature = "inventory")]
pub use discovery::{DiscoveryEntry, InventoryDiscovery};
pub use discovery::{Discovered, Discovery, DiscoveryIter, StaticDiscovery};
pub use error::{BootstrapError, DiscoveryError, PlexusError};
pub use registry::{Registry, RegistryBuilder};
pub use resolver::CapabilityResolver;
pub use runtime::{Runtime, RuntimeBuilder};

#[cfg(feature = "inventory")]
pub use inventory;
