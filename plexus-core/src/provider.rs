//! # Providers and Loaders
//!
//! A [`Provider`] is a unit that implements one or more named capabilities,
//! each advertised with a priority. When a capability is resolved to a
//! provider, that provider's [`Provider::load`] hook runs once for the
//! capability.
//!
//! A [`Loader`] is anything with a no-argument [`Loader::bootstrap`] hook.
//! Providers that are also loaders ("loader providers") are initialized
//! before every other unit, whether or not any capability ever resolves to
//! them.

use crate::{error::LoadError, object::DynamicObject};
use std::{borrow::Cow, fmt};

/// A named capability advertised by a provider, with its priority.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub struct Capability {
    /// Capability name, e.g. `"storage"`.
    pub name: Cow<'static, str>,
    /// Higher wins. Defaults to 0.
    pub priority: i32,
}

impl Capability {
    /// A capability at the default priority.
    pub fn new(name: impl Into<Cow<'static, str>>) -> Self {
        Self {
            name: name.into(),
            priority: 0,
        }
    }

    /// Set the priority.
    pub fn with_priority(mut self, priority: i32) -> Self {
        self.priority = priority;
        self
    }

    /// Pair names with priorities positionally.
    ///
    /// Names without a matching priority get 0; surplus priorities are
    /// ignored.
    pub fn zip<N>(names: impl IntoIterator<Item = N>, priorities: &[i32]) -> Vec<Capability>
    where
        N: Into<Cow<'static, str>>,
    {
        names
            .into_iter()
            .enumerate()
            .map(|(i, name)| {
                Capability::new(name).with_priority(priorities.get(i).copied().unwrap_or(0))
            })
            .collect()
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}@{}", self.name, self.priority)
    }
}

/// An implementation unit that advertises capabilities.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Provider`",
    label = "missing `Provider` implementation",
    note = "Providers must list their capabilities and implement `DynamicObject`."
)]
pub trait Provider: DynamicObject {
    /// Advertised capabilities, in declaration order.
    fn capabilities(&self) -> &[Capability];

    /// Called once when `capability` resolves to this provider.
    fn load(&self, capability: &str) {
        let _ = capability;
    }

    /// Name used in diagnostics.
    fn name(&self) -> &str {
        std::any::type_name::<Self>()
    }

    /// This provider's bootstrap hook, if it is a loader provider.
    fn as_loader(&self) -> Option<&dyn Loader> {
        None
    }

    /// Priority of the first advertised entry for `capability`.
    fn priority_of(&self, capability: &str) -> Option<i32> {
        self.capabilities()
            .iter()
            .find(|c| c.name == capability)
            .map(|c| c.priority)
    }
}

/// A unit with a self-initialization hook run during bootstrap.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `Loader`",
    label = "missing `Loader` implementation",
    note = "Loaders must implement `bootstrap` and `DynamicObject`."
)]
pub trait Loader: DynamicObject {
    /// Initialize. A failure halts the bootstrap phase running this loader.
    fn bootstrap(&self) -> Result<(), LoadError>;

    /// Name used in diagnostics.
    fn unit_name(&self) -> &str {
        std::any::type_name::<Self>()
    }
}

/// Address of the object behind a loader, used to recognise the same unit
/// reached through different handles.
pub fn loader_addr(loader: &dyn Loader) -> *const () {
    std::ptr::from_ref(loader).cast::<()>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectCore;

    struct Multi {
        caps: Vec<Capability>,
        object: ObjectCore,
    }

    impl DynamicObject for Multi {
        fn object(&self) -> &ObjectCore {
            &self.object
        }
    }

    impl Provider for Multi {
        fn capabilities(&self) -> &[Capability] {
            &self.caps
        }
    }

    #[test]
    fn test_zip_pads_missing_priorities() {
        let caps = Capability::zip(["a", "b", "c"], &[5]);
        assert_eq!(
            caps,
            vec![
                Capability::new("a").with_priority(5),
                Capability::new("b"),
                Capability::new("c"),
            ]
        );
    }

    #[test]
    fn test_zip_ignores_extra_priorities() {
        let caps = Capability::zip(["a"], &[1, 2, 3]);
        assert_eq!(caps, vec![Capability::new("a").with_priority(1)]);
    }

    #[test]
    fn test_priority_of_uses_first_entry() {
        let provider = Multi {
            caps: vec![
                Capability::new("x").with_priority(1),
                Capability::new("x").with_priority(9),
            ],
            object: ObjectCore::empty(),
        };
        assert_eq!(provider.priority_of("x"), Some(1));
        assert_eq!(provider.priority_of("y"), None);
        assert!(provider.as_loader().is_none());
        assert!(provider.name().ends_with("Multi"));
    }

    #[test]
    fn test_display() {
        assert_eq!(Capability::new("storage").with_priority(3).to_string(), "storage@3");
    }
}
