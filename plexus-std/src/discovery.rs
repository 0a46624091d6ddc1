//! Discovery strategies.
//!
//! A [`Discovery`] yields constructed providers and bootstrap units. The
//! runtime runs each strategy once at startup, registers every provider in
//! the order it was yielded, and hands the units to the general bootstrap
//! phase.
//!
//! - [`StaticDiscovery`]: an explicit, in-memory list of constructors.
//! - [`InventoryDiscovery`] (feature `inventory`): entries submitted anywhere
//!   in the binary.

use crate::error::DiscoveryError;
use plexus_core::{BoxError, Loader, Provider};
use std::{fmt, sync::Arc};

/// Something a discovery strategy found.
#[derive(Clone)]
pub enum Discovered {
    /// A provider, to be registered.
    Provider(Arc<dyn Provider>),
    /// A general unit, to be run in the general bootstrap phase.
    Unit(Arc<dyn Loader>),
}

impl Discovered {
    /// Name used in diagnostics.
    pub fn name(&self) -> &str {
        match self {
            Discovered::Provider(p) => p.name(),
            Discovered::Unit(u) => u.unit_name(),
        }
    }
}

impl fmt::Debug for Discovered {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Discovered::Provider(p) => f.debug_tuple("Provider").field(&p.name()).finish(),
            Discovered::Unit(u) => f.debug_tuple("Unit").field(&u.unit_name()).finish(),
        }
    }
}

/// Iterator returned by [`Discovery::discover`].
pub type DiscoveryIter<'a> = Box<dyn Iterator<Item = Result<Discovered, DiscoveryError>> + 'a>;

/// A pluggable way to find providers and units.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Discovery` strategy",
    label = "missing `Discovery` implementation"
)]
pub trait Discovery: Send + Sync {
    /// Construct everything this strategy knows about, in a stable order.
    ///
    /// A failed construction is yielded as an error; the rest continue.
    fn discover(&self) -> DiscoveryIter<'_>;
}

impl<D: Discovery + ?Sized> Discovery for Box<D> {
    fn discover(&self) -> DiscoveryIter<'_> {
        (**self).discover()
    }
}

impl<D: Discovery + ?Sized> Discovery for Arc<D> {
    fn discover(&self) -> DiscoveryIter<'_> {
        (**self).discover()
    }
}

// ============================================================================
// Static Discovery
// ============================================================================

type Constructor = Box<dyn Fn() -> Result<Discovered, BoxError> + Send + Sync>;

/// An explicit list of constructors, run in insertion order.
///
/// # Example
/// ```ignore
/// let discovery = StaticDiscovery::new()
///     .provider(DiskStorage::new())
///     .try_provider("remote", || RemoteStorage::connect("db:5432"))
///     .unit(Metrics::new());
/// ```
#[derive(Default)]
pub struct StaticDiscovery {
    entries: Vec<(String, Constructor)>,
}

impl StaticDiscovery {
    /// An empty list.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an already-built provider.
    pub fn provider<P: Provider>(self, provider: P) -> Self {
        self.shared_provider(Arc::new(provider))
    }

    /// Add a shared provider.
    pub fn shared_provider(mut self, provider: Arc<dyn Provider>) -> Self {
        let name = provider.name().to_string();
        self.entries.push((
            name,
            Box::new(move || Ok(Discovered::Provider(Arc::clone(&provider)))),
        ));
        self
    }

    /// Add a provider built by a fallible constructor.
    pub fn try_provider<P, E, F>(mut self, name: impl Into<String>, construct: F) -> Self
    where
        P: Provider,
        E: Into<BoxError>,
        F: Fn() -> Result<P, E> + Send + Sync + 'static,
    {
        self.entries.push((
            name.into(),
            Box::new(move || {
                construct()
                    .map(|p| Discovered::Provider(Arc::new(p)))
                    .map_err(Into::into)
            }),
        ));
        self
    }

    /// Add an already-built general unit.
    pub fn unit<L: Loader>(self, unit: L) -> Self {
        self.shared_unit(Arc::new(unit))
    }

    /// Add a shared general unit.
    pub fn shared_unit(mut self, unit: Arc<dyn Loader>) -> Self {
        let name = unit.unit_name().to_string();
        self.entries.push((
            name,
            Box::new(move || Ok(Discovered::Unit(Arc::clone(&unit)))),
        ));
        self
    }

    /// Add a general unit built by a fallible constructor.
    pub fn try_unit<L, E, F>(mut self, name: impl Into<String>, construct: F) -> Self
    where
        L: Loader,
        E: Into<BoxError>,
        F: Fn() -> Result<L, E> + Send + Sync + 'static,
    {
        self.entries.push((
            name.into(),
            Box::new(move || {
                construct()
                    .map(|u| Discovered::Unit(Arc::new(u)))
                    .map_err(Into::into)
            }),
        ));
        self
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether there are no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Discovery for StaticDiscovery {
    fn discover(&self) -> DiscoveryIter<'_> {
        Box::new(self.entries.iter().map(|(name, construct)| {
            construct().map_err(|source| DiscoveryError::Construct {
                unit: name.clone(),
                source,
            })
        }))
    }
}

impl fmt::Debug for StaticDiscovery {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_list()
            .entries(self.entries.iter().map(|(name, _)| name))
            .finish()
    }
}

// ============================================================================
// Inventory Discovery
// ============================================================================

/// A constructor submitted to the global inventory.
///
/// Usually created through `plexus::submit_provider!` or
/// `plexus::submit_loader!` rather than by hand.
#[cfg(feature = "inventory")]
pub struct DiscoveryEntry {
    name: &'static str,
    construct: fn() -> Result<Discovered, BoxError>,
}

#[cfg(feature = "inventory")]
impl DiscoveryEntry {
    /// An entry with a fallible constructor.
    pub const fn new(name: &'static str, construct: fn() -> Result<Discovered, BoxError>) -> Self {
        Self { name, construct }
    }

    /// Name used in diagnostics.
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Run the constructor.
    pub fn construct(&self) -> Result<Discovered, DiscoveryError> {
        (self.construct)().map_err(|source| DiscoveryError::Construct {
            unit: self.name.to_string(),
            source,
        })
    }
}

#[cfg(feature = "inventory")]
inventory::collect!(DiscoveryEntry);

/// Discovers every [`DiscoveryEntry`] submitted in the binary.
///
/// Entries are yielded sorted by name so that registration order, and with
/// it tie-breaking, does not depend on link order.
#[cfg(feature = "inventory")]
#[derive(Clone, Copy, Debug, Default)]
pub struct InventoryDiscovery;

#[cfg(feature = "inventory")]
impl InventoryDiscovery {
    /// All submitted entries, sorted by name.
    pub fn entries() -> Vec<&'static DiscoveryEntry> {
        let mut entries: Vec<_> = inventory::iter::<DiscoveryEntry>.into_iter().collect();
        entries.sort_by_key(|e| e.name);
        entries
    }
}

#[cfg(feature = "inventory")]
impl Discovery for InventoryDiscovery {
    fn discover(&self) -> DiscoveryIter<'_> {
        Box::new(Self::entries().into_iter().map(DiscoveryEntry::construct))
    }
}
