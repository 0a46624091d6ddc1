//! # Dynamic Object Surface
//!
//! Every addressable entity exposes the same late-bound surface: named
//! operations resolved by name and [`Signature`], named events, and a keyed
//! store of typed extension data.
//!
//! # Caching
//!
//! Lookups are memoized per object. A lookup computes its answer from the
//! immutable [`OperationTable`] without holding any lock, then publishes it
//! with first-writer-wins semantics: if another thread published first, its
//! entry is returned instead. Misses are cached the same way, so repeated
//! failed lookups cost one hash probe.
//!
//! # Example
//!
//! ```rust,ignore
//! struct Greeter {
//!     object: ObjectCore,
//! }
//!
//! impl Greeter {
//!     fn new() -> Self {
//!         let table = OperationTable::builder()
//!             .function("greet", |name: &String| format!("hello {name}"))
//!             .build();
//!         Self { object: ObjectCore::new(table) }
//!     }
//! }
//!
//! impl DynamicObject for Greeter {
//!     fn object(&self) -> &ObjectCore {
//!         &self.object
//!     }
//! }
//!
//! let greeting: Option<String> =
//!     Greeter::new().invoke_function("greet", &[Value::new("Ada".to_string())]);
//! ```

use crate::{
    data::{DataSnapshot, DataStore},
    event::{Event, EventHandler},
    operation::{Binding, OperationTable},
    signature::{OperationKey, Signature},
    value::Value,
};
use parking_lot::RwLock;
use rustc_hash::FxHashMap;
use std::{any::Any, sync::Arc};

type BindingCache = FxHashMap<Arc<str>, FxHashMap<Signature, Option<Binding>>>;
type EventCache = FxHashMap<Arc<str>, Option<Arc<Event>>>;

/// Per-instance state behind the dynamic surface.
///
/// Owns the constructor-time [`OperationTable`], the binding cache, the
/// event table cache and the extension-data store.
pub struct ObjectCore {
    table: OperationTable,
    bindings: RwLock<BindingCache>,
    events: RwLock<EventCache>,
    data: DataStore,
}

impl ObjectCore {
    /// Wrap an object's self-description.
    pub fn new(table: OperationTable) -> Self {
        Self {
            table,
            bindings: RwLock::new(FxHashMap::default()),
            events: RwLock::new(FxHashMap::default()),
            data: DataStore::new(),
        }
    }

    /// An object with no operations or events; only extension data.
    pub fn empty() -> Self {
        Self::new(OperationTable::empty())
    }

    /// The operation table this object was built with.
    pub fn table(&self) -> &OperationTable {
        &self.table
    }

    /// The extension-data store.
    pub fn data(&self) -> &DataStore {
        &self.data
    }

    /// Bind `name` at `signature`.
    pub fn resolve(&self, name: &str, signature: &Signature) -> Option<Binding> {
        if let Some(cached) = self
            .bindings
            .read()
            .get(name)
            .and_then(|by_sig| by_sig.get(signature))
        {
            return cached.clone();
        }

        let key = OperationKey::new(name, signature.clone());
        let computed = self
            .table
            .find(name, signature)
            .map(|op| Binding::bind(op, key.clone()));
        #[cfg(feature = "tracing")]
        tracing::trace!(operation = %key, bound = computed.is_some(), "populating binding cache");

        let mut cache = self.bindings.write();
        cache
            .entry(Arc::clone(&key.name))
            .or_default()
            .entry(key.signature)
            .or_insert(computed)
            .clone()
    }

    /// Resolve and call a procedure. Absent bindings are a no-op.
    ///
    /// Returns whether an operation was found.
    pub fn invoke_procedure(&self, name: &str, args: &[Value]) -> bool {
        match self.resolve(name, &Signature::procedure_for(args)) {
            Some(binding) => {
                binding.call(args);
                true
            }
            None => false,
        }
    }

    /// Resolve and call a function returning `R`.
    pub fn invoke_function<R: Any + Clone>(&self, name: &str, args: &[Value]) -> Option<R> {
        self.invoke_function_value::<R>(name, args)?.get::<R>()
    }

    /// Resolve and call a function returning `R`, keeping the boxed result.
    pub fn invoke_function_value<R: Any>(&self, name: &str, args: &[Value]) -> Option<Value> {
        self.resolve(name, &Signature::function_for::<R>(args))?
            .call(args)
    }

    /// Look up the event named `name`.
    pub fn event(&self, name: &str) -> Option<Arc<Event>> {
        if let Some(cached) = self.events.read().get(name) {
            return cached.clone();
        }

        let computed = self.table.event(name).cloned();
        #[cfg(feature = "tracing")]
        tracing::trace!(event = name, found = computed.is_some(), "populating event table");

        self.events
            .write()
            .entry(Arc::from(name))
            .or_insert(computed)
            .clone()
    }

    /// Add `handler` to the event `name`. Returns `false` if there is no such event.
    pub fn subscribe(&self, name: &str, handler: EventHandler) -> bool {
        match self.event(name) {
            Some(event) => {
                event.subscribe(handler);
                true
            }
            None => false,
        }
    }

    /// Remove `handler` from the event `name`.
    ///
    /// Returns `false` if there is no such event or the handler was not
    /// subscribed.
    pub fn unsubscribe(&self, name: &str, handler: &EventHandler) -> bool {
        self.event(name)
            .is_some_and(|event| event.unsubscribe(handler))
    }

    /// Fire the event `name`, returning how many handlers ran.
    pub fn fire(&self, name: &str, args: &[Value]) -> usize {
        self.event(name).map_or(0, |event| event.fire(args))
    }
}

impl Default for ObjectCore {
    fn default() -> Self {
        Self::empty()
    }
}

impl std::fmt::Debug for ObjectCore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ObjectCore")
            .field("table", &self.table)
            .field("data", &self.data)
            .finish_non_exhaustive()
    }
}

/// An object addressable through the dynamic surface.
///
/// Implementors only hand out their [`ObjectCore`]; every operation of the
/// surface lives on [`ObjectExt`], which is implemented for all
/// `DynamicObject`s including trait objects.
#[diagnostic::on_unimplemented(
    message = "`{Self}` is not a `DynamicObject`",
    label = "missing `DynamicObject` implementation",
    note = "Store an `ObjectCore` in the type and return it from `object()`."
)]
pub trait DynamicObject: Send + Sync + 'static {
    /// The per-instance dispatch state.
    fn object(&self) -> &ObjectCore;
}

impl DynamicObject for ObjectCore {
    fn object(&self) -> &ObjectCore {
        self
    }
}

impl<T: DynamicObject + ?Sized> DynamicObject for Arc<T> {
    fn object(&self) -> &ObjectCore {
        (**self).object()
    }
}

/// The dynamic surface, available on every [`DynamicObject`].
pub trait ObjectExt: DynamicObject {
    /// Resolve the operation `name` with the given call shape.
    fn resolve(&self, name: &str, signature: &Signature) -> Option<Binding> {
        self.object().resolve(name, signature)
    }

    /// Invoke a procedure; a missing procedure is a no-op.
    fn invoke_procedure(&self, name: &str, args: &[Value]) -> bool {
        self.object().invoke_procedure(name, args)
    }

    /// Invoke a function; a missing function yields `None`.
    fn invoke_function<R: Any + Clone>(&self, name: &str, args: &[Value]) -> Option<R> {
        self.object().invoke_function(name, args)
    }

    /// Invoke a function; a missing function yields `R::default()`.
    fn invoke_function_or_default<R: Any + Clone + Default>(
        &self,
        name: &str,
        args: &[Value],
    ) -> R {
        self.object().invoke_function(name, args).unwrap_or_default()
    }

    /// Look up the event `name`.
    fn event(&self, name: &str) -> Option<Arc<Event>> {
        self.object().event(name)
    }

    /// Subscribe `handler` to the event `name`.
    fn subscribe(&self, name: &str, handler: EventHandler) -> bool {
        self.object().subscribe(name, handler)
    }

    /// Unsubscribe `handler` from the event `name`.
    fn unsubscribe(&self, name: &str, handler: &EventHandler) -> bool {
        self.object().unsubscribe(name, handler)
    }

    /// Read extension data `key` as `T`.
    fn get_data<T: Any + Send + Sync>(&self, key: &str) -> Option<Arc<T>> {
        self.object().data().get::<T>(key)
    }

    /// Write extension data, replacing any previous value.
    fn set_data<T: Any + Send + Sync>(&self, key: impl Into<Arc<str>>, value: T) {
        self.object().data().set(key, value);
    }

    /// Remove extension data `key`.
    fn remove_data(&self, key: &str) -> Option<Value> {
        self.object().data().remove(key)
    }

    /// All extension data, captured at first iteration.
    fn all_data(&self) -> DataSnapshot<'_> {
        self.object().data().snapshot()
    }
}

impl<T: DynamicObject + ?Sized> ObjectExt for T {}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct Counter {
        hits: Arc<AtomicUsize>,
        changed: Arc<Event>,
        object: ObjectCore,
    }

    impl Counter {
        fn new() -> Self {
            let hits = Arc::new(AtomicUsize::new(0));
            let changed = Event::shared();
            let (h, c) = (hits.clone(), changed.clone());
            let read = hits.clone();
            let table = OperationTable::builder()
                .procedure("bump", move || {
                    let now = h.fetch_add(1, Ordering::SeqCst) + 1;
                    c.fire(&[Value::new(now)]);
                })
                .function("get", move || read.load(Ordering::SeqCst))
                .event("changed", changed.clone())
                .build();
            Self {
                hits,
                changed,
                object: ObjectCore::new(table),
            }
        }
    }

    impl DynamicObject for Counter {
        fn object(&self) -> &ObjectCore {
            &self.object
        }
    }

    #[test]
    fn test_resolve_is_cached() {
        let counter = Counter::new();
        let sig = Signature::of_procedure::<()>();
        let first = counter.resolve("bump", &sig).unwrap();
        let second = counter.resolve("bump", &sig).unwrap();
        assert!(first.ptr_eq(&second));
        assert_eq!(first.key().name.as_ref(), "bump");
    }

    #[test]
    fn test_signature_mismatch_is_absent() {
        let counter = Counter::new();
        assert!(counter
            .resolve("bump", &Signature::of_procedure::<(u8,)>())
            .is_none());
        assert!(counter
            .resolve("get", &Signature::of_function::<(), String>())
            .is_none());
        assert!(counter.resolve("missing", &Signature::of_procedure::<()>()).is_none());
    }

    #[test]
    fn test_invoke() {
        let counter = Counter::new();
        assert!(counter.invoke_procedure("bump", &[]));
        assert!(counter.invoke_procedure("bump", &[]));
        assert!(!counter.invoke_procedure("bump", &[Value::new(1u8)]));
        assert_eq!(counter.invoke_function::<usize>("get", &[]), Some(2));
        assert_eq!(counter.hits.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_missing_function_yields_zero_value() {
        let counter = Counter::new();
        assert_eq!(counter.invoke_function::<String>("name", &[]), None);
        assert_eq!(counter.invoke_function_or_default::<u64>("get", &[]), 0);
    }

    #[test]
    fn test_events_through_surface() {
        let counter = Counter::new();
        let seen = Arc::new(AtomicUsize::new(0));
        let s = seen.clone();
        let handler = EventHandler::new(move |args| {
            if let Some(now) = args.first().and_then(|v| v.get::<usize>()) {
                s.store(now, Ordering::SeqCst);
            }
        });

        assert!(counter.subscribe("changed", handler.clone()));
        assert!(!counter.subscribe("unknown", handler.clone()));
        counter.invoke_procedure("bump", &[]);
        assert_eq!(seen.load(Ordering::SeqCst), 1);

        assert!(counter.unsubscribe("changed", &handler));
        counter.invoke_procedure("bump", &[]);
        assert_eq!(seen.load(Ordering::SeqCst), 1);
        assert!(counter.changed.is_empty());
    }

    #[test]
    fn test_event_lookup_is_cached() {
        let counter = Counter::new();
        let a = counter.event("changed").unwrap();
        let b = counter.event("changed").unwrap();
        assert!(Arc::ptr_eq(&a, &b));
        assert!(counter.event("nope").is_none());
        assert!(counter.event("nope").is_none());
    }

    #[test]
    fn test_extension_data() {
        let counter = Counter::new();
        counter.set_data("label", "main".to_string());
        assert_eq!(counter.get_data::<String>("label").as_deref().map(String::as_str), Some("main"));
        assert!(counter.get_data::<u32>("label").is_none());

        let all = counter.all_data();
        assert_eq!(all.iter().map(|(k, _)| k).collect::<Vec<_>>(), vec!["label"]);
    }

    #[test]
    fn test_trait_object_surface() {
        let object: Arc<dyn DynamicObject> = Arc::new(Counter::new());
        object.invoke_procedure("bump", &[]);
        assert_eq!(object.invoke_function::<usize>("get", &[]), Some(1));
    }

    #[test]
    fn test_concurrent_resolution_publishes_one_binding() {
        let counter = Counter::new();
        let sig = Signature::of_function::<(), usize>();
        let bindings: Vec<Binding> = std::thread::scope(|scope| {
            let handles: Vec<_> = (0..8)
                .map(|_| scope.spawn(|| counter.resolve("get", &sig).unwrap()))
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let first = &bindings[0];
        assert!(bindings.iter().all(|b| b.ptr_eq(first)));
    }
}
