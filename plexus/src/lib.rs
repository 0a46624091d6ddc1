//! # plexus - Capability Resolution and Dynamic Dispatch
//!
//! `plexus` finds the best implementation of a named capability among many
//! independently registered providers, and lets callers invoke operations on
//! objects by name and signature without static knowledge of their type.
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use plexus::prelude::*;
//! use std::sync::Arc;
//!
//! struct DiskStorage {
//!     capabilities: Vec<Capability>,
//!     object: ObjectCore,
//! }
//!
//! impl DiskStorage {
//!     fn new() -> Self {
//!         let table = OperationTable::builder()
//!             .function("free_space", || 4096_u64)
//!             .build();
//!         Self {
//!             capabilities: vec![Capability::new("storage").with_priority(5)],
//!             object: ObjectCore::new(table),
//!         }
//!     }
//! }
//!
//! impl DynamicObject for DiskStorage {
//!     fn object(&self) -> &ObjectCore {
//!         &self.object
//!     }
//! }
//!
//! impl Provider for DiskStorage {
//!     fn capabilities(&self) -> &[Capability] {
//!         &self.capabilities
//!     }
//! }
//!
//! let runtime = Runtime::builder()
//!     .provider(Arc::new(DiskStorage::new()))
//!     .boot()?;
//!
//! let storage = runtime.resolve("storage").unwrap();
//! let free: u64 = storage.invoke_function_or_default("free_space", &[]);
//! ```
//!
//! ## Distributed Registration
//!
//! With the `inventory` feature, providers and units can be submitted from
//! anywhere in the binary and picked up by [`InventoryDiscovery`]:
//!
//! ```rust,ignore
//! plexus::submit_provider!(DiskStorage::new());
//! plexus::submit_loader!(Metrics::new());
//!
//! let runtime = Runtime::boot([InventoryDiscovery])?;
//! ```

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

pub use plexus_core::{
    // Values
    ArgList,
    // Operations
    Binding,
    // Errors
    BoxError,
    Callable,
    // Providers
    Capability,
    // Objects
    DataSnapshot,
    DataStore,
    DynamicObject,
    // Events
    Event,
    EventHandler,
    IntoFunction,
    IntoProcedure,
    LoadError,
    Loader,
    ObjectCore,
    ObjectExt,
    Operation,
    OperationKey,
    OperationTable,
    OperationTableBuilder,
    Provider,
    Signature,
    TypeTag,
    Value,
    loader_addr,
};

pub use plexus_std::{
    BootstrapError,
    // Bootstrap
    BootstrapOrchestrator,
    // Resolution
    CapabilityResolver,
    // Discovery
    Discovered,
    Discovery,
    DiscoveryError,
    DiscoveryIter,
    Phase,
    PlexusError,
    // Registry
    Registry,
    RegistryBuilder,
    // Runtime
    Runtime,
    RuntimeBuilder,
    Stage,
    StaticDiscovery,
};

#[cfg(feature = "inventory")]
pub use plexus_std::{DiscoveryEntry, InventoryDiscovery};

/// Testing utilities.
pub mod testing {
    pub use plexus_std::testing::{CallLog, RecordingLoader, RecordingProvider};
}

/// Prelude module - common imports for Plexus.
///
/// # Usage
///
/// ```rust,ignore
/// use plexus::prelude::*;
/// ```
pub mod prelude {
    pub use crate::{
        // Providers
        Capability,
        CapabilityResolver,
        // Objects
        DynamicObject,
        EventHandler,
        // Errors
        LoadError,
        Loader,
        ObjectCore,
        ObjectExt,
        OperationTable,
        PlexusError,
        Provider,
        Registry,
        // Runtime
        Runtime,
        Signature,
        StaticDiscovery,
        Value,
    };
}

/// Submits a provider to the global inventory.
///
/// The expression is evaluated lazily, once per discovery run, and must
/// produce a type implementing `Provider`. An optional leading string names
/// the entry; entries are discovered in name order.
///
/// # Example
/// ```rust,ignore
/// plexus::submit_provider!(DiskStorage::new());
/// plexus::submit_provider!("storage.memory" => MemoryStorage::default());
/// ```
#[cfg(feature = "inventory")]
#[macro_export]
macro_rules! submit_provider {
    ($name:literal => $provider:expr) => {
        $crate::inventory::submit! {
            $crate::DiscoveryEntry::new($name, || {
                ::core::result::Result::Ok($crate::Discovered::Provider(
                    ::std::sync::Arc::new($provider),
                ))
            })
        }
    };
    ($provider:expr) => {
        $crate::inventory::submit! {
            $crate::DiscoveryEntry::new(::core::stringify!($provider), || {
                ::core::result::Result::Ok($crate::Discovered::Provider(
                    ::std::sync::Arc::new($provider),
                ))
            })
        }
    };
}

/// Submits a general bootstrap unit to the global inventory.
///
/// Works like [`submit_provider!`], but the expression must produce a type
/// implementing `Loader`; the unit runs in the general bootstrap phase.
///
/// # Example
/// ```rust,ignore
/// plexus::submit_loader!(Metrics::new());
/// ```
#[cfg(feature = "inventory")]
#[macro_export]
macro_rules! submit_loader {
    ($name:literal => $unit:expr) => {
        $crate::inventory::submit! {
            $crate::DiscoveryEntry::new($name, || {
                ::core::result::Result::Ok($crate::Discovered::Unit(
                    ::std::sync::Arc::new($unit),
                ))
            })
        }
    };
    ($unit:expr) => {
        $crate::inventory::submit! {
            $crate::DiscoveryEntry::new(::core::stringify!($unit), || {
                ::core::result::Result::Ok($crate::Discovered::Unit(
                    ::std::sync::Arc::new($unit),
                ))
            })
        }
    };
}

#[cfg(feature = "inventory")]
pub use inventory;
