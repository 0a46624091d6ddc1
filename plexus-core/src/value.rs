//! Tagged values passed through the dynamic surface.
//!
//! Every argument, function result and extension-data entry travels as a
//! [`Value`]: a shared payload boxed together with the [`TypeTag`] of the type
//! it was created from. Typed access compares tags before touching the
//! payload, so a mismatch is an ordinary `None` rather than a failure.

use std::{
    any::{Any, TypeId},
    fmt,
    hash::{Hash, Hasher},
    sync::Arc,
};

/// Identity of a concrete Rust type as seen by the dynamic surface.
///
/// Equality and hashing only consider the underlying [`TypeId`]; the name is
/// kept for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeTag {
    id: TypeId,
    name: &'static str,
}

impl TypeTag {
    /// The tag of `T`.
    pub fn of<T: Any + ?Sized>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    /// The underlying type id.
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Human readable type name (not guaranteed stable across compilers).
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Whether this tag denotes `T`.
    pub fn is<T: Any + ?Sized>(&self) -> bool {
        self.id == TypeId::of::<T>()
    }
}

impl PartialEq for TypeTag {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeTag {}

impl Hash for TypeTag {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// A type-erased, reference-counted payload carrying its own [`TypeTag`].
///
/// Cloning a `Value` is O(1); clones share the payload.
#[derive(Clone)]
pub struct Value {
    tag: TypeTag,
    payload: Arc<dyn Any + Send + Sync>,
}

impl Value {
    /// Box `value`, tagging it with `T`.
    pub fn new<T: Any + Send + Sync>(value: T) -> Self {
        Self {
            tag: TypeTag::of::<T>(),
            payload: Arc::new(value),
        }
    }

    /// Wrap an already shared payload without copying it.
    pub fn from_arc<T: Any + Send + Sync>(value: Arc<T>) -> Self {
        Self {
            tag: TypeTag::of::<T>(),
            payload: value,
        }
    }

    /// The tag recorded when this value was created.
    pub fn tag(&self) -> TypeTag {
        self.tag
    }

    /// Whether the value was created from a `T`.
    pub fn is<T: Any>(&self) -> bool {
        self.tag.is::<T>()
    }

    /// Borrow the payload as `T`, or `None` if the tag does not match.
    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        if !self.is::<T>() {
            return None;
        }
        self.payload.downcast_ref::<T>()
    }

    /// Share the payload as `Arc<T>`, or `None` if the tag does not match.
    pub fn downcast_arc<T: Any + Send + Sync>(&self) -> Option<Arc<T>> {
        if !self.is::<T>() {
            return None;
        }
        Arc::clone(&self.payload).downcast::<T>().ok()
    }

    /// Clone the payload out as `T`.
    pub fn get<T: Any + Clone>(&self) -> Option<T> {
        self.downcast_ref::<T>().cloned()
    }

    /// Take the payload by value, cloning only if it is still shared.
    pub fn into_inner<T: Any + Send + Sync + Clone>(self) -> Option<T> {
        let shared = self.downcast_arc::<T>()?;
        drop(self);
        Some(Arc::try_unwrap(shared).unwrap_or_else(|shared| (*shared).clone()))
    }

    /// Whether two values share the same payload allocation.
    pub fn ptr_eq(&self, other: &Value) -> bool {
        std::ptr::addr_eq(Arc::as_ptr(&self.payload), Arc::as_ptr(&other.payload))
    }
}

impl fmt::Debug for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Value").field("tag", &self.tag).finish_non_exhaustive()
    }
}
