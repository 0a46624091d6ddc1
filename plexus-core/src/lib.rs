//! # plexus-core
//!
//! Core traits for the Plexus capability and dynamic dispatch framework.
//!
//! This crate has minimal dependencies and is designed to be imported by
//! providers that don't need the registry, resolver or bootstrap machinery
//! in `plexus-std`.
//!
//! # Building Blocks
//!
//! ## Values ([`Value`], [`TypeTag`])
//!
//! Arguments, results and extension data travel as tagged boxes. Typed reads
//! compare tags first and yield `None` on a mismatch.
//!
//! ## Operations ([`OperationTable`], [`Signature`], [`Binding`])
//!
//! Each object describes its named procedures, functions and events once, at
//! construction. Callers bind by name and signature; bindings are cached per
//! object and stable for its lifetime.
//!
//! ## Objects ([`DynamicObject`], [`ObjectExt`], [`ObjectCore`])
//!
//! The uniform late-bound surface: resolve, invoke, subscribe, and typed
//! extension data.
//!
//! ## Providers ([`Provider`], [`Loader`], [`Capability`])
//!
//! Units advertising prioritized capabilities, and units with a bootstrap
//! hook.
//!
//! # Error Types
//!
//! - [`LoadError`] - Bootstrap hook failures
//! - [`BoxError`] - Boxed dynamic error

#![deny(clippy::wildcard_imports)]
#![warn(missing_docs)]

mod data;
mod error;
mod event;
mod object;
mod operation;
mod provider;
mod signature;
mod value;

// Re-exports
pub use data::{DataSnapshot, DataStore};
pub use error::{BoxError, LoadError};
pub use event::{Event, EventHandler};
pub use object::{DynamicObject, ObjectCore, ObjectExt};
pub use operation::{
    Binding, Callable, IntoFunction, IntoProcedure, Operation, OperationTable,
    OperationTableBuilder,
};
pub use provider::{Capability, Loader, Provider, loader_addr};
pub use signature::{ArgList, OperationKey, Signature};
pub use value::{TypeTag, Value};
