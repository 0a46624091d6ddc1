//! Named operations and the constructor-time operation table.
//!
//! An object describes the operations it exposes once, when it is built, by
//! filling an [`OperationTable`]. Lookups by name and [`Signature`] then bind
//! against that table instead of scanning the type at runtime.
//!
//! ```rust,ignore
//! let counter = Arc::new(AtomicUsize::new(0));
//! let c = counter.clone();
//! let table = OperationTable::builder()
//!     .procedure("bump", move |by: &usize| {
//!         c.fetch_add(*by, Ordering::SeqCst);
//!     })
//!     .function("greet", |name: &String| format!("hello {name}"))
//!     .build();
//! ```

use crate::{
    event::Event,
    signature::{OperationKey, Signature},
    value::{TypeTag, Value},
};
use rustc_hash::FxHashMap;
use std::{any::Any, fmt, sync::Arc};

/// The single variadic call contract every operation is reduced to.
///
/// Procedures return `None`; functions return their result boxed in a
/// [`Value`], or `None` if the arguments could not be read.
pub type Callable = Arc<dyn Fn(&[Value]) -> Option<Value> + Send + Sync>;

/// A declared operation: a name, its call shape and the callable.
#[derive(Clone)]
pub struct Operation {
    name: Arc<str>,
    signature: Signature,
    callable: Callable,
}

impl Operation {
    /// Create an operation from a raw variadic callable.
    pub fn new(
        name: impl Into<Arc<str>>,
        signature: Signature,
        callable: impl Fn(&[Value]) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        Self {
            name: name.into(),
            signature,
            callable: Arc::new(callable),
        }
    }

    /// Operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Declared call shape.
    pub fn signature(&self) -> &Signature {
        &self.signature
    }

    /// Whether this operation can serve a request for `signature`.
    ///
    /// Shapes must agree exactly: same arity, same parameter tags in order,
    /// and the same return tag (or both procedures).
    pub fn is_compatible(&self, signature: &Signature) -> bool {
        self.signature == *signature
    }
}

impl fmt::Debug for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Operation")
            .field("name", &self.name)
            .field("signature", &self.signature)
            .finish_non_exhaustive()
    }
}

struct BoundOperation {
    key: OperationKey,
    callable: Callable,
}

/// A resolved, cached reference to an operation.
///
/// Cloning is O(1). Two bindings obtained from the same cache entry are
/// identical according to [`Binding::ptr_eq`].
#[derive(Clone)]
pub struct Binding(Arc<BoundOperation>);

impl Binding {
    pub(crate) fn bind(operation: &Operation, key: OperationKey) -> Self {
        Self(Arc::new(BoundOperation {
            key,
            callable: Arc::clone(&operation.callable),
        }))
    }

    /// The key this binding was resolved for.
    pub fn key(&self) -> &OperationKey {
        &self.0.key
    }

    /// Call the operation directly, skipping any cache lookup.
    pub fn call(&self, args: &[Value]) -> Option<Value> {
        (self.0.callable)(args)
    }

    /// Call as a function and read the result as `R`.
    pub fn call_as<R: Any + Clone>(&self, args: &[Value]) -> Option<R> {
        self.call(args)?.get::<R>()
    }

    /// Whether both bindings are the same cached entry.
    pub fn ptr_eq(&self, other: &Binding) -> bool {
        Arc::ptr_eq(&self.0, &other.0)
    }
}

impl fmt::Debug for Binding {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Binding").field(&self.0.key).finish()
    }
}

/// A closure usable as a procedure over the argument tuple `Args`.
pub trait IntoProcedure<Args>: Send + Sync + 'static {
    /// Reduce to the variadic contract.
    fn into_operation(self, name: Arc<str>) -> Operation;
}

/// A closure usable as a function over `Args` returning `R`.
pub trait IntoFunction<Args, R>: Send + Sync + 'static {
    /// Reduce to the variadic contract.
    fn into_operation(self, name: Arc<str>) -> Operation;
}

// Argument tags are checked again at call time so a direct `Binding::call`
// with the wrong arguments yields `None` instead of panicking.
macro_rules! impl_into_operation {
    ($($ty:ident => $idx:tt),*) => {
        impl<F, $($ty),*> IntoProcedure<($($ty,)*)> for F
        where
            F: Fn($(&$ty),*) + Send + Sync + 'static,
            $($ty: Any + Send + Sync,)*
        {
            fn into_operation(self, name: Arc<str>) -> Operation {
                let params: Vec<TypeTag> = vec![$(TypeTag::of::<$ty>()),*];
                let signature = Signature::procedure(params);
                let arity = signature.arity();
                Operation {
                    name,
                    signature,
                    callable: Arc::new(move |args: &[Value]| {
                        if args.len() != arity {
                            return None;
                        }
                        (self)($(args[$idx].downcast_ref::<$ty>()?),*);
                        None
                    }),
                }
            }
        }

        impl<F, R, $($ty),*> IntoFunction<($($ty,)*), R> for F
        where
            F: Fn($(&$ty),*) -> R + Send + Sync + 'static,
            R: Any + Send + Sync,
            $($ty: Any + Send + Sync,)*
        {
            fn into_operation(self, name: Arc<str>) -> Operation {
                let params: Vec<TypeTag> = vec![$(TypeTag::of::<$ty>()),*];
                let signature = Signature::function(params, TypeTag::of::<R>());
                let arity = signature.arity();
                Operation {
                    name,
                    signature,
                    callable: Arc::new(move |args: &[Value]| {
                        if args.len() != arity {
                            return None;
                        }
                        Some(Value::new((self)($(args[$idx].downcast_ref::<$ty>()?),*)))
                    }),
                }
            }
        }
    };
}

impl_into_operation!();
impl_into_operation!(A1 => 0);
impl_into_operation!(A1 => 0, A2 => 1);
impl_into_operation!(A1 => 0, A2 => 1, A3 => 2);
impl_into_operation!(A1 => 0, A2 => 1, A3 => 2, A4 => 3);

/// The self-description of an object: its operations and events.
///
/// Built once per object. Operations keep declaration order; several may
/// share a name as long as their signatures differ.
#[derive(Default)]
pub struct OperationTable {
    operations: Vec<Operation>,
    by_name: FxHashMap<Arc<str>, Vec<usize>>,
    events: FxHashMap<Arc<str>, Arc<Event>>,
}

impl OperationTable {
    /// Start describing an object.
    pub fn builder() -> OperationTableBuilder {
        OperationTableBuilder::default()
    }

    /// An object exposing nothing.
    pub fn empty() -> Self {
        Self::default()
    }

    /// First declared operation named `name` compatible with `signature`.
    pub fn find(&self, name: &str, signature: &Signature) -> Option<&Operation> {
        self.by_name
            .get(name)?
            .iter()
            .map(|&idx| &self.operations[idx])
            .find(|op| op.is_compatible(signature))
    }

    /// All operations declared under `name`, in declaration order.
    pub fn overloads<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a Operation> + 'a {
        self.by_name
            .get(name)
            .into_iter()
            .flatten()
            .map(|&idx| &self.operations[idx])
    }

    /// Declared event named `name`.
    pub fn event(&self, name: &str) -> Option<&Arc<Event>> {
        self.events.get(name)
    }

    /// All operations in declaration order.
    pub fn operations(&self) -> &[Operation] {
        &self.operations
    }

    /// Names of the declared events (unordered).
    pub fn event_names(&self) -> impl Iterator<Item = &str> {
        self.events.keys().map(|k| &**k)
    }

    /// Number of declared operations.
    pub fn len(&self) -> usize {
        self.operations.len()
    }

    /// Whether no operations are declared.
    pub fn is_empty(&self) -> bool {
        self.operations.is_empty()
    }
}

impl fmt::Debug for OperationTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationTable")
            .field("operations", &self.operations)
            .field("events", &self.event_names().collect::<Vec<_>>())
            .finish()
    }
}

/// Builder for [`OperationTable`].
#[derive(Default)]
pub struct OperationTableBuilder {
    table: OperationTable,
}

impl OperationTableBuilder {
    /// Declare a raw variadic operation.
    pub fn operation(mut self, operation: Operation) -> Self {
        self.push(operation);
        self
    }

    /// Declare a procedure from a typed closure.
    pub fn procedure<Args, F>(mut self, name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: IntoProcedure<Args>,
    {
        self.push(f.into_operation(name.into()));
        self
    }

    /// Declare a function from a typed closure.
    pub fn function<Args, R, F>(mut self, name: impl Into<Arc<str>>, f: F) -> Self
    where
        F: IntoFunction<Args, R>,
    {
        self.push(f.into_operation(name.into()));
        self
    }

    /// Declare an event. Redeclaring a name replaces the earlier handle.
    pub fn event(mut self, name: impl Into<Arc<str>>, event: Arc<Event>) -> Self {
        self.table.events.insert(name.into(), event);
        self
    }

    /// Finish the description.
    pub fn build(self) -> OperationTable {
        self.table
    }

    fn push(&mut self, operation: Operation) {
        let idx = self.table.operations.len();
        self.table
            .by_name
            .entry(Arc::clone(&operation.name))
            .or_default()
            .push(idx);
        self.table.operations.push(operation);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn test_typed_procedure() {
        let hits = Arc::new(AtomicUsize::new(0));
        let h = hits.clone();
        let table = OperationTable::builder()
            .procedure("add", move |n: &usize| {
                h.fetch_add(*n, Ordering::SeqCst);
            })
            .build();

        let op = table
            .find("add", &Signature::of_procedure::<(usize,)>())
            .unwrap();
        assert!((op.callable)(&[Value::new(3usize)]).is_none());
        assert_eq!(hits.load(Ordering::SeqCst), 3);
    }

    #[test]
    fn test_typed_function() {
        let table = OperationTable::builder()
            .function("concat", |a: &String, b: &String| format!("{a}{b}"))
            .build();

        let sig = Signature::of_function::<(String, String), String>();
        let op = table.find("concat", &sig).unwrap();
        let out = (op.callable)(&[Value::new("ab".to_string()), Value::new("cd".to_string())]);
        assert_eq!(out.and_then(|v| v.get::<String>()).as_deref(), Some("abcd"));
    }

    #[test]
    fn test_overloads_resolve_by_signature() {
        let table = OperationTable::builder()
            .function("size", |s: &String| s.len())
            .function("size", |v: &Vec<u8>| v.len())
            .function("size", || 0usize)
            .build();

        assert_eq!(table.overloads("size").count(), 3);
        let on_vec = table
            .find("size", &Signature::of_function::<(Vec<u8>,), usize>())
            .unwrap();
        assert_eq!(on_vec.signature().params(), &[TypeTag::of::<Vec<u8>>()]);
        assert!(table
            .find("size", &Signature::of_function::<(String,), u32>())
            .is_none());
    }

    #[test]
    fn test_first_declared_wins() {
        let table = OperationTable::builder()
            .function("pick", || 1u8)
            .function("pick", || 2u8)
            .build();

        let op = table
            .find("pick", &Signature::of_function::<(), u8>())
            .unwrap();
        assert_eq!((op.callable)(&[]).and_then(|v| v.get::<u8>()), Some(1));
    }

    #[test]
    fn test_wrong_arguments_yield_none() {
        let table = OperationTable::builder()
            .function("double", |n: &i32| n * 2)
            .build();

        let op = &table.operations()[0];
        assert!((op.callable)(&[Value::new(2u64)]).is_none());
        assert!((op.callable)(&[]).is_none());
    }

    #[test]
    fn test_raw_operation() {
        let sig = Signature::of_function::<(u8, u8), u8>();
        let op = Operation::new("sum", sig.clone(), |args| {
            let total: u8 = args.iter().filter_map(|a| a.get::<u8>()).sum();
            Some(Value::new(total))
        });
        let table = OperationTable::builder().operation(op).build();

        let found = table.find("sum", &sig).unwrap();
        let out = (found.callable)(&[Value::new(2u8), Value::new(5u8)]);
        assert_eq!(out.and_then(|v| v.get::<u8>()), Some(7));
    }

    #[test]
    fn test_event_names() {
        let table = OperationTable::builder()
            .event("saved", Event::shared())
            .event("closed", Event::shared())
            .procedure("save", || {})
            .build();

        let mut names: Vec<_> = table.event_names().collect();
        names.sort_unstable();
        assert_eq!(names, vec!["closed", "saved"]);
        assert!(table.event("saved").is_some());
        assert!(OperationTable::empty().event_names().next().is_none());
    }

    #[test]
    fn test_binding_call_as() {
        let table = OperationTable::builder()
            .function("answer", || 42u32)
            .build();
        let key = OperationKey::new("answer", Signature::of_function::<(), u32>());
        let op = table.find(&key.name, &key.signature).unwrap();
        let binding = Binding::bind(op, key);

        assert_eq!(binding.call_as::<u32>(&[]), Some(42));
        assert_eq!(binding.call_as::<u64>(&[]), None);
        assert_eq!(binding.call_as::<u32>(&[Value::new(1u8)]), None);
    }
}
