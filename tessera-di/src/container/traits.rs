//! Object-safe container surface and its typed extensions

use super::Lifetime;
use crate::{
    error::Error,
    inject::{Blueprint, Dependency, Injectable},
    key::TypeKey,
    value::{Assignable, Object, Resolved, Value},
};
use std::{any::{Any, type_name}, sync::Arc};

/// The resolution side of a container.
///
/// Obtained by the container itself, or by anything resolved from it
/// that requests `dyn Resolve` as a dependency.
pub trait Resolve: Send + Sync {
    /// Resolves `key` into an erased `Arc<K>`, using `values` for
    /// dependencies the registry cannot provide.
    fn resolve_key(&self, key: TypeKey, values: Vec<Value>) -> Result<Resolved, Error>;

    /// Builds a fresh instance from `blueprint` without registering or caching it
    fn create_from(&self, blueprint: &Blueprint, values: Vec<Value>) -> Result<Box<dyn Any + Send + Sync>, Error>;

    /// Returns `true` if `key` is registered
    fn contains_key(&self, key: TypeKey) -> bool;

    /// Returns `true` if an instance is held for the registered `key`
    fn contains_instance_key(&self, key: TypeKey) -> Result<bool, Error>;

    /// Every registered key, in registration order
    fn all(&self) -> Vec<TypeKey>;

    /// Every held instance, each distinct object listed once
    fn all_instances(&self) -> Vec<Object>;
}

/// The registration side of a container
pub trait Registry: Resolve {
    /// Registers an implementation blueprint under `key`
    fn register_blueprint(&self, key: TypeKey, blueprint: Blueprint, lifetime: Lifetime) -> Result<(), Error>;

    /// Registers a pre-built instance under `key`, held for the container's lifetime
    fn register_value(&self, key: TypeKey, value: Value) -> Result<(), Error>;

    /// Removes the registration of `key` together with its held instance
    fn remove_key(&self, key: TypeKey) -> Result<(), Error>;

    /// Drops the held instance of `key`, keeping the registration
    fn remove_instance_key(&self, key: TypeKey) -> Result<(), Error>;

    /// Removes everything except the container's own registrations.
    ///
    /// Does nothing when called through a handle whose container has been dropped,
    /// as do [`Registry::clear_all_instances`] and [`Registry::dispose`].
    fn clear_all(&self);

    /// Drops every held instance except the container's own
    fn clear_all_instances(&self);

    /// Drops every registration and instance
    fn dispose(&self);
}

/// Typed helpers over [`Resolve`]
pub trait ResolveExt: Resolve {
    /// Resolves a `K`
    ///
    /// # Example
    /// ```
    /// use tessera_di::{Container, RegistryExt, ResolveExt};
    ///
    /// let container = Container::new();
    /// container.register_instance::<u32, _>(42_u32).unwrap();
    ///
    /// assert_eq!(*container.get::<u32>().unwrap(), 42);
    /// ```
    #[inline]
    fn get<K: ?Sized + Send + Sync + 'static>(&self) -> Result<Arc<K>, Error> {
        self.get_with::<K>(Vec::<Value>::new())
    }

    /// Resolves a `K`, supplying `values` to dependencies the registry cannot provide.
    ///
    /// The values are only offered to the requested type itself,
    /// never to the registered dependencies it pulls in.
    fn get_with<K: ?Sized + Send + Sync + 'static>(
        &self,
        values: impl IntoIterator<Item = Value>
    ) -> Result<Arc<K>, Error> {
        let resolved = self.resolve_key(TypeKey::of::<K>(), values.into_iter().collect())?;
        <Arc<K> as Dependency>::from_resolved(resolved)
    }

    /// Builds a fresh `T` without registering or caching it
    fn create_instance<T: Injectable>(&self, values: impl IntoIterator<Item = Value>) -> Result<T, Error> {
        let blueprint = T::descriptor().into_blueprint();
        self.create_from(&blueprint, values.into_iter().collect())?
            .downcast::<T>()
            .map(|instance| *instance)
            .map_err(|_| Error::ResolveFailed(type_name::<T>()))
    }

    /// Returns `true` if `K` is registered
    #[inline]
    fn contains<K: ?Sized + 'static>(&self) -> bool {
        self.contains_key(TypeKey::of::<K>())
    }

    /// Returns `true` if an instance is held for the registered `K`
    #[inline]
    fn contains_instance<K: ?Sized + 'static>(&self) -> Result<bool, Error> {
        self.contains_instance_key(TypeKey::of::<K>())
    }
}

impl<R: Resolve + ?Sized> ResolveExt for R {}

/// Typed helpers over [`Registry`]
pub trait RegistryExt: Registry {
    /// Registers `I` as the implementation of `K`
    #[inline]
    fn register_implementation<K, I>(&self, lifetime: Lifetime) -> Result<(), Error>
    where
        K: ?Sized + Send + Sync + 'static,
        I: Injectable + Assignable<K>
    {
        let blueprint = I::descriptor()
            .implements::<K>()
            .into_blueprint();
        self.register_blueprint(TypeKey::of::<K>(), blueprint, lifetime)
    }

    /// Registers `instance` under `K`
    #[inline]
    fn register_instance<K, I>(&self, instance: I) -> Result<(), Error>
    where
        K: ?Sized + Send + Sync + 'static,
        I: Assignable<K>
    {
        self.register_value(TypeKey::of::<K>(), Value::with_interface::<K, I>(instance))
    }

    /// Removes the registration of `K`
    #[inline]
    fn remove<K: ?Sized + 'static>(&self) -> Result<(), Error> {
        self.remove_key(TypeKey::of::<K>())
    }

    /// Drops the held instance of `K`, keeping the registration
    #[inline]
    fn remove_instance<K: ?Sized + 'static>(&self) -> Result<(), Error> {
        self.remove_instance_key(TypeKey::of::<K>())
    }
}

impl<R: Registry + ?Sized> RegistryExt for R {}
