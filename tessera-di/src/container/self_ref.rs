//! The handle a container registers under its own keys

use super::{Container, Inner, Lifetime, Registration, Registry, Resolve};
use crate::{
    assignable,
    error::Error,
    inject::Blueprint,
    key::TypeKey,
    value::{Casts, Object, Resolved, Value},
};
use std::{any::Any, sync::{Arc, Weak}};
use tracing::debug;

/// Weak reference to a container, so that holding a resolved
/// `dyn Resolve` does not keep the container alive.
pub(super) struct ContainerRef(Weak<Inner>);

assignable!(dyn Resolve => ContainerRef);
assignable!(dyn Registry => ContainerRef);

impl ContainerRef {
    #[inline]
    pub(super) fn new(inner: Weak<Inner>) -> Self {
        Self(inner)
    }

    /// Registration entry shared by both self keys
    pub(super) fn registration() -> Registration {
        let mut casts = Casts::of::<Self>();
        casts.add::<Self, dyn Resolve>();
        casts.add::<Self, dyn Registry>();

        Registration {
            implementation: TypeKey::of::<Self>(),
            lifetime: Lifetime::PerContainer,
            blueprint: None,
            casts: Arc::new(casts),
        }
    }

    #[inline]
    fn container(&self) -> Result<Container, Error> {
        self.0
            .upgrade()
            .map(|inner| Container { inner })
            .ok_or(Error::ContainerMissing)
    }
}

impl Resolve for ContainerRef {
    #[inline]
    fn resolve_key(&self, key: TypeKey, values: Vec<Value>) -> Result<Resolved, Error> {
        self.container()?.resolve_key(key, values)
    }

    #[inline]
    fn create_from(&self, blueprint: &Blueprint, values: Vec<Value>) -> Result<Box<dyn Any + Send + Sync>, Error> {
        self.container()?.create_from(blueprint, values)
    }

    #[inline]
    fn contains_key(&self, key: TypeKey) -> bool {
        self.container().is_ok_and(|c| c.contains_key(key))
    }

    #[inline]
    fn contains_instance_key(&self, key: TypeKey) -> Result<bool, Error> {
        self.container()?.contains_instance_key(key)
    }

    #[inline]
    fn all(&self) -> Vec<TypeKey> {
        self.container()
            .map(|c| c.all())
            .unwrap_or_default()
    }

    #[inline]
    fn all_instances(&self) -> Vec<Object> {
        self.container()
            .map(|c| c.all_instances())
            .unwrap_or_default()
    }
}

impl Registry for ContainerRef {
    #[inline]
    fn register_blueprint(&self, key: TypeKey, blueprint: Blueprint, lifetime: Lifetime) -> Result<(), Error> {
        self.container()?.register_blueprint(key, blueprint, lifetime)
    }

    #[inline]
    fn register_value(&self, key: TypeKey, value: Value) -> Result<(), Error> {
        self.container()?.register_value(key, value)
    }

    #[inline]
    fn remove_key(&self, key: TypeKey) -> Result<(), Error> {
        self.container()?.remove_key(key)
    }

    #[inline]
    fn remove_instance_key(&self, key: TypeKey) -> Result<(), Error> {
        self.container()?.remove_instance_key(key)
    }

    #[inline]
    fn clear_all(&self) {
        match self.container() {
            Ok(container) => container.clear_all(),
            Err(_) => debug!("clear_all skipped, the container has been dropped"),
        }
    }

    #[inline]
    fn clear_all_instances(&self) {
        match self.container() {
            Ok(container) => container.clear_all_instances(),
            Err(_) => debug!("clear_all_instances skipped, the container has been dropped"),
        }
    }

    #[inline]
    fn dispose(&self) {
        match self.container() {
            Ok(container) => container.dispose(),
            Err(_) => debug!("dispose skipped, the container has been dropped"),
        }
    }
}
