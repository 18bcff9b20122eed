//! Type-erased objects and the assignability rules used to match them

use crate::{inject::{Blueprint, Injectable}, key::TypeKey};
use std::{
    any::Any,
    fmt::{Debug, Formatter},
    sync::Arc,
};

/// A shared, type-erased instance held or produced by the container
pub type Object = Arc<
    dyn Any
    + Send
    + Sync
>;

/// An `Arc<K>` erased behind [`Any`], produced for a requested key `K`
pub type Resolved = Box<
    dyn Any
    + Send
>;

/// Turns an [`Object`] of a concrete type into a [`Resolved`] of one of its keys
pub(crate) type Caster = fn(&Object) -> Option<Resolved>;

/// Declares that a concrete type can be used wherever `K` is requested.
///
/// Every type is assignable to itself. For trait objects, use the
/// [`assignable!`](crate::assignable) macro or the `implements` option of the derive macro.
pub trait Assignable<K: ?Sized + 'static>: Any + Send + Sync {
    /// Converts a shared instance into a shared `K`
    fn upcast(self: Arc<Self>) -> Arc<K>;
}

impl<T: Send + Sync + 'static> Assignable<T> for T {
    #[inline]
    fn upcast(self: Arc<Self>) -> Arc<T> {
        self
    }
}

#[inline]
fn upcast<T, K>(object: &Object) -> Option<Resolved>
where
    T: Assignable<K>,
    K: ?Sized + Send + Sync + 'static
{
    let concrete = Arc::clone(object).downcast::<T>().ok()?;
    Some(Box::new(<T as Assignable<K>>::upcast(concrete)))
}

/// Upcasts known for one concrete type, always including the type itself
#[derive(Clone)]
pub(crate) struct Casts(Vec<(TypeKey, Caster)>);

impl Casts {
    #[inline]
    pub(crate) fn of<T: Send + Sync + 'static>() -> Self {
        let identity: Caster = upcast::<T, T>;
        Self(vec![(TypeKey::of::<T>(), identity)])
    }

    pub(crate) fn add<T, K>(&mut self)
    where
        T: Assignable<K>,
        K: ?Sized + Send + Sync + 'static
    {
        let key = TypeKey::of::<K>();
        if !self.supports(key) {
            let cast: Caster = upcast::<T, K>;
            self.0.push((key, cast));
        }
    }

    #[inline]
    pub(crate) fn supports(&self, key: TypeKey) -> bool {
        self.0.iter().any(|(k, _)| *k == key)
    }

    #[inline]
    pub(crate) fn cast(&self, object: &Object, key: TypeKey) -> Option<Resolved> {
        self.0
            .iter()
            .find(|(k, _)| *k == key)
            .and_then(|(_, cast)| cast(object))
    }
}

/// A pre-built instance, either registered with the container
/// or supplied ad-hoc to a single resolution call.
#[derive(Clone)]
pub struct Value {
    object: Object,
    ty: TypeKey,
    casts: Casts,
    blueprint: Option<Arc<Blueprint>>,
}

impl Debug for Value {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Value")
            .field("type", &self.ty)
            .finish_non_exhaustive()
    }
}

impl Value {
    /// Wraps a value that is only assignable to its own type
    #[inline]
    pub fn new<T: Send + Sync + 'static>(value: T) -> Self {
        Self::from_arc(Arc::new(value))
    }

    /// Wraps an already shared value that is only assignable to its own type
    #[inline]
    pub fn from_arc<T: Send + Sync + 'static>(value: Arc<T>) -> Self {
        Self {
            object: value,
            ty: TypeKey::of::<T>(),
            casts: Casts::of::<T>(),
            blueprint: None,
        }
    }

    /// Wraps a value that is assignable to its own type and to `K`
    ///
    /// # Example
    /// ```
    /// use tessera_di::{assignable, TypeKey, Value};
    ///
    /// trait Clock: Send + Sync {}
    /// struct Fixed;
    /// impl Clock for Fixed {}
    /// assignable!(dyn Clock => Fixed);
    ///
    /// let value = Value::with_interface::<dyn Clock, _>(Fixed);
    /// assert!(value.is_assignable_to(TypeKey::of::<dyn Clock>()));
    /// ```
    pub fn with_interface<K, T>(value: T) -> Self
    where
        T: Assignable<K>,
        K: ?Sized + Send + Sync + 'static
    {
        let mut wrapped = Self::new(value);
        wrapped.casts.add::<T, K>();
        wrapped
    }

    /// Wraps an [`Injectable`] value, taking its assignability from the descriptor.
    ///
    /// When registered as an instance, the container can rebuild it after
    /// the cached instance has been removed.
    pub fn injectable<T: Injectable>(value: T) -> Self {
        let blueprint = T::descriptor().into_blueprint();
        Self {
            object: Arc::new(value),
            ty: TypeKey::of::<T>(),
            casts: blueprint.casts().clone(),
            blueprint: Some(Arc::new(blueprint)),
        }
    }

    /// Concrete type of the wrapped value
    #[inline]
    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    /// The wrapped value
    #[inline]
    pub fn object(&self) -> &Object {
        &self.object
    }

    /// Returns `true` if the value can be supplied where `key` is requested
    #[inline]
    pub fn is_assignable_to(&self, key: TypeKey) -> bool {
        self.casts.supports(key)
    }

    #[inline]
    pub(crate) fn cast(&self, key: TypeKey) -> Option<Resolved> {
        self.casts.cast(&self.object, key)
    }

    #[inline]
    pub(crate) fn into_parts(self) -> (Object, TypeKey, Casts, Option<Arc<Blueprint>>) {
        (self.object, self.ty, self.casts, self.blueprint)
    }
}

/// Implements [`Assignable`] for one or more concrete types.
///
/// # Macro Syntax
/// ```ignore
/// assignable!(dyn Key => Type1, Type2, …, TypeN);
/// ```
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tessera_di::{assignable, Assignable};
///
/// trait Store: Send + Sync {}
///
/// struct Memory;
/// struct Disk;
///
/// impl Store for Memory {}
/// impl Store for Disk {}
///
/// assignable!(dyn Store => Memory, Disk);
///
/// let store: Arc<dyn Store> = Arc::new(Memory).upcast();
/// ```
#[macro_export]
macro_rules! assignable {
    ($key:ty => $($implementation:ty),+ $(,)?) => {
        $(impl $crate::Assignable<$key> for $implementation {
            #[inline]
            fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<$key> {
                self
            }
        })+
    };
}
