//! Dependency Injection container and tools

use crate::{
    assembler,
    error::Error,
    inject::{Blueprint, Built},
    key::{KeyHasher, TypeKey},
    resolver::{AdHocPool, Lookup},
    value::{Casts, Object, Resolved, Value},
};
use indexmap::IndexMap;
use parking_lot::{ReentrantMutex, ReentrantMutexGuard};
use std::{
    any::Any,
    cell::RefCell,
    fmt::{Debug, Formatter},
    sync::Arc,
};
use tracing::{debug, trace};

pub use self::traits::{Registry, RegistryExt, Resolve, ResolveExt};
use self::self_ref::ContainerRef;

mod traits;
mod self_ref;

const DEFAULT_MAX_DEPTH: usize = 64;

/// Governs how long a resolved instance lives
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Lifetime {
    /// A new instance is built for every request
    #[default]
    PerCall,
    /// The instance is built once and held by the container
    PerContainer,
}

struct Registration {
    implementation: TypeKey,
    lifetime: Lifetime,
    blueprint: Option<Arc<Blueprint>>,
    casts: Arc<Casts>,
}

struct Instance {
    ty: TypeKey,
    object: Object,
}

type RegistrationMap = IndexMap<TypeKey, Registration, KeyHasher>;
type InstanceMap = IndexMap<TypeKey, Instance, KeyHasher>;

/// Registrations and held instances.
///
/// Objects taken out of it are dropped only after the borrow ends,
/// since their `Drop` may call back into the container.
#[derive(Default)]
struct State {
    registrations: RegistrationMap,
    instances: InstanceMap,
}

/// Everything guarded by the container lock
#[derive(Default)]
struct Shared {
    state: RefCell<State>,
    /// Implementation types currently under assembly, outermost first
    resolving: RefCell<Vec<TypeKey>>,
}

struct Inner {
    sync_root: ReentrantMutex<Shared>,
    /// The object registered under the container's own keys
    this: Object,
    max_depth: usize,
}

/// Pops the resolution stack when an assembly ends, even by panic
struct Frame<'a>(&'a RefCell<Vec<TypeKey>>);

impl Drop for Frame<'_> {
    #[inline]
    fn drop(&mut self) {
        self.0.borrow_mut().pop();
    }
}

/// Holds the container lock. While held, the owning thread may keep
/// calling the container and every other thread blocks on it.
pub struct SyncRoot<'a> {
    _guard: ReentrantMutexGuard<'a, Shared>,
}

impl Debug for SyncRoot<'_> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str("SyncRoot(..)")
    }
}

/// Represents a DI container builder,
/// that configures the container before it is created.
#[derive(Debug, Clone, Copy)]
pub struct ContainerBuilder {
    /// Maximum nesting of assemblies within one call
    max_depth: usize,
}

impl Default for ContainerBuilder {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl ContainerBuilder {
    /// Creates a new DI container builder
    ///
    /// Defaults:
    /// - max_depth: `64`
    #[inline]
    pub fn new() -> Self {
        Self { max_depth: DEFAULT_MAX_DEPTH }
    }

    /// Limits how deep dependencies may nest while resolving a single object
    ///
    /// Default: `64`
    #[inline]
    pub fn with_max_depth(mut self, max_depth: usize) -> Self {
        self.max_depth = max_depth;
        self
    }

    /// Build a DI container
    pub fn build(self) -> Container {
        let inner = Arc::new_cyclic(|weak| Inner {
            sync_root: ReentrantMutex::new(Shared::default()),
            this: Arc::new(ContainerRef::new(weak.clone())),
            max_depth: self.max_depth,
        });
        let container = Container { inner };
        {
            let shared = container.lock();
            container.seed(&mut shared.state.borrow_mut());
        }
        container
    }
}

/// Represents a DI container, that maps key types to implementations
/// or instances and resolves them with their dependencies injected.
///
/// Cloning is cheap, clones share the same registrations.
/// Every operation is serialized by one reentrant lock.
#[derive(Clone)]
pub struct Container {
    inner: Arc<Inner>,
}

impl Debug for Container {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Container")
            .field("keys", &self.all())
            .finish_non_exhaustive()
    }
}

impl Default for Container {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl Container {
    /// Creates a container with default settings,
    /// holding only its own two registrations
    #[inline]
    pub fn new() -> Self {
        ContainerBuilder::new().build()
    }

    /// Creates a [`ContainerBuilder`]
    #[inline]
    pub fn builder() -> ContainerBuilder {
        ContainerBuilder::new()
    }

    /// Acquires the container lock for coordinating external work
    /// with container mutation.
    ///
    /// # Example
    /// ```
    /// use tessera_di::{Container, Lifetime, RegistryExt, ResolveExt};
    ///
    /// let container = Container::new();
    /// {
    ///     let _root = container.sync_root();
    ///     if !container.contains::<String>() {
    ///         container.register_instance::<String, _>(String::from("config")).unwrap();
    ///     }
    /// }
    /// ```
    #[inline]
    pub fn sync_root(&self) -> SyncRoot<'_> {
        SyncRoot { _guard: self.lock() }
    }

    /// The two keys under which the container resolves itself.
    /// They cannot be removed.
    #[inline]
    pub fn self_keys() -> [TypeKey; 2] {
        [TypeKey::of::<dyn Resolve>(), TypeKey::of::<dyn Registry>()]
    }

    #[inline]
    fn is_protected(key: TypeKey) -> bool {
        Self::self_keys().contains(&key)
    }

    #[inline]
    fn lock(&self) -> ReentrantMutexGuard<'_, Shared> {
        self.inner.sync_root.lock()
    }

    /// Restores the self-registrations and their instance entries
    fn seed(&self, state: &mut State) {
        for key in Self::self_keys() {
            state.registrations
                .entry(key)
                .or_insert_with(ContainerRef::registration);
            state.instances.insert(key, Instance {
                ty: TypeKey::of::<ContainerRef>(),
                object: self.inner.this.clone(),
            });
        }
    }

    /// Returns the cached instance of `key`, or assembles a new one.
    /// Also returns the casts of the registration.
    fn get_object(&self, shared: &Shared, key: TypeKey, pool: &AdHocPool) -> Result<(Object, Arc<Casts>), Error> {
        let (implementation, lifetime, blueprint, casts) = {
            let state = shared.state.borrow();
            let registration = state.registrations
                .get(&key)
                .ok_or(Error::NotRegistered(key.name()))?;

            if let Some(instance) = state.instances.get(&key) {
                trace!(key = %key, instance = %instance.ty, "instance resolved from cache");
                return Ok((instance.object.clone(), registration.casts.clone()));
            }

            (
                registration.implementation,
                registration.lifetime,
                registration.blueprint.clone(),
                registration.casts.clone(),
            )
        };

        let blueprint = blueprint.ok_or(Error::NoInjectableConstructor(implementation.name()))?;
        let object: Object = Arc::from(self.build(shared, &blueprint, pool)?);

        if lifetime == Lifetime::PerContainer {
            let replaced = {
                let mut state = shared.state.borrow_mut();
                if state.registrations.contains_key(&key) {
                    state.instances.insert(key, Instance { ty: implementation, object: object.clone() })
                } else {
                    None
                }
            };
            drop(replaced);
        }

        debug!(key = %key, implementation = %implementation, lifetime = ?lifetime, "instance created");
        Ok((object, casts))
    }

    /// Assembles the described type, guarding against cycles and runaway nesting
    fn build(&self, shared: &Shared, blueprint: &Blueprint, pool: &AdHocPool) -> Result<Built, Error> {
        let ty = blueprint.type_key();
        {
            let mut resolving = shared.resolving.borrow_mut();
            if resolving.contains(&ty) {
                let mut chain: Vec<&'static str> = resolving
                    .iter()
                    .skip_while(|k| **k != ty)
                    .map(|k| k.name())
                    .collect();
                chain.push(ty.name());
                return Err(Error::CircularDependency(chain));
            }
            if resolving.len() >= self.inner.max_depth {
                return Err(Error::DepthExceeded { target: ty.name(), limit: self.inner.max_depth });
            }
            resolving.push(ty);
        }

        let _frame = Frame(&shared.resolving);
        assembler::assemble(blueprint, self, pool)
    }
}

impl Lookup for Container {
    fn provides(&self, key: TypeKey) -> bool {
        let shared = self.lock();
        let state = shared.state.borrow();
        state.registrations.contains_key(&key) || state.registrations
            .values()
            .any(|r| r.casts.supports(key))
    }

    fn fetch(&self, key: TypeKey) -> Result<Resolved, Error> {
        let shared = self.lock();
        let source = {
            let state = shared.state.borrow();
            if state.registrations.contains_key(&key) {
                key
            } else {
                state.registrations
                    .iter()
                    .find(|(_, r)| r.casts.supports(key))
                    .map(|(k, _)| *k)
                    .ok_or(Error::NotRegistered(key.name()))?
            }
        };

        let (object, casts) = self.get_object(&shared, source, &AdHocPool::default())?;
        casts
            .cast(&object, key)
            .ok_or(Error::ResolveFailed(key.name()))
    }
}

impl Resolve for Container {
    fn resolve_key(&self, key: TypeKey, values: Vec<Value>) -> Result<Resolved, Error> {
        let pool = AdHocPool::new(values)?;
        let shared = self.lock();
        let (object, casts) = self.get_object(&shared, key, &pool)?;
        casts
            .cast(&object, key)
            .ok_or(Error::ResolveFailed(key.name()))
    }

    fn create_from(&self, blueprint: &Blueprint, values: Vec<Value>) -> Result<Box<dyn Any + Send + Sync>, Error> {
        let pool = AdHocPool::new(values)?;
        let shared = self.lock();
        let built = self.build(&shared, blueprint, &pool)?;
        debug!(implementation = %blueprint.type_key(), "transient instance created");
        Ok(built)
    }

    fn contains_key(&self, key: TypeKey) -> bool {
        let shared = self.lock();
        let state = shared.state.borrow();
        state.registrations.contains_key(&key)
    }

    fn contains_instance_key(&self, key: TypeKey) -> Result<bool, Error> {
        let shared = self.lock();
        let state = shared.state.borrow();
        if !state.registrations.contains_key(&key) {
            return Err(Error::NotRegistered(key.name()));
        }
        Ok(state.instances.contains_key(&key))
    }

    fn all(&self) -> Vec<TypeKey> {
        let shared = self.lock();
        let state = shared.state.borrow();
        state.registrations.keys().copied().collect()
    }

    fn all_instances(&self) -> Vec<Object> {
        let shared = self.lock();
        let state = shared.state.borrow();
        let mut objects: Vec<Object> = Vec::with_capacity(state.instances.len());
        for instance in state.instances.values() {
            if !objects.iter().any(|o| Arc::ptr_eq(o, &instance.object)) {
                objects.push(instance.object.clone());
            }
        }
        objects
    }
}

impl Registry for Container {
    fn register_blueprint(&self, key: TypeKey, blueprint: Blueprint, lifetime: Lifetime) -> Result<(), Error> {
        let implementation = blueprint.type_key();
        if !blueprint.is_assignable_to(key) {
            return Err(Error::NotAssignable { implementation: implementation.name(), key: key.name() });
        }

        let shared = self.lock();
        let mut state = shared.state.borrow_mut();
        if state.registrations.contains_key(&key) {
            return Err(Error::AlreadyRegistered(key.name()));
        }

        state.registrations.insert(key, Registration {
            implementation,
            lifetime,
            casts: Arc::new(blueprint.casts().clone()),
            blueprint: Some(Arc::new(blueprint)),
        });

        debug!(key = %key, implementation = %implementation, lifetime = ?lifetime, "implementation registered");
        Ok(())
    }

    fn register_value(&self, key: TypeKey, value: Value) -> Result<(), Error> {
        if !value.is_assignable_to(key) {
            return Err(Error::NotAssignable { implementation: value.type_key().name(), key: key.name() });
        }

        let shared = self.lock();
        let mut state = shared.state.borrow_mut();
        if state.registrations.contains_key(&key) {
            return Err(Error::AlreadyRegistered(key.name()));
        }

        let (object, ty, casts, blueprint) = value.into_parts();
        state.registrations.insert(key, Registration {
            implementation: ty,
            lifetime: Lifetime::PerContainer,
            blueprint,
            casts: Arc::new(casts),
        });
        state.instances.insert(key, Instance { ty, object });

        debug!(key = %key, instance = %ty, "instance registered");
        Ok(())
    }

    fn remove_key(&self, key: TypeKey) -> Result<(), Error> {
        if Self::is_protected(key) {
            return Err(Error::ProtectedKey(key.name()));
        }

        let shared = self.lock();
        let removed = {
            let mut state = shared.state.borrow_mut();
            let registration = state.registrations
                .shift_remove(&key)
                .ok_or(Error::NotRegistered(key.name()))?;
            (registration, state.instances.shift_remove(&key))
        };

        debug!(key = %key, "registration removed");
        drop(removed);
        Ok(())
    }

    fn remove_instance_key(&self, key: TypeKey) -> Result<(), Error> {
        if Self::is_protected(key) {
            return Err(Error::ProtectedKey(key.name()));
        }

        let shared = self.lock();
        let removed = {
            let mut state = shared.state.borrow_mut();
            if !state.registrations.contains_key(&key) {
                return Err(Error::NotRegistered(key.name()));
            }
            state.instances
                .shift_remove(&key)
                .ok_or(Error::NoCachedInstance(key.name()))?
        };

        debug!(key = %key, "instance removed");
        drop(removed);
        Ok(())
    }

    fn clear_all(&self) {
        let shared = self.lock();
        let removed = {
            let mut state = shared.state.borrow_mut();
            let removed = std::mem::take(&mut *state);
            self.seed(&mut state);
            removed
        };

        debug!("registrations cleared");
        drop(removed);
    }

    fn clear_all_instances(&self) {
        let shared = self.lock();
        let removed = {
            let mut state = shared.state.borrow_mut();
            let removed = std::mem::take(&mut state.instances);
            self.seed(&mut state);
            removed
        };

        debug!("instances cleared");
        drop(removed);
    }

    fn dispose(&self) {
        let shared = self.lock();
        let removed = std::mem::take(&mut *shared.state.borrow_mut());

        debug!("container disposed");
        drop(removed);
    }
}

#[cfg(test)]
mod tests {
    use super::{Container, ContainerBuilder, Lifetime, Registry, RegistryExt, Resolve, ResolveExt};
    use crate::{
        assignable,
        error::{Error, ErrorKind},
        inject::{Descriptor, Injectable},
        key::TypeKey,
        value::Value,
    };
    use std::sync::{Arc, atomic::{AtomicUsize, Ordering}};

    trait Storage: Send + Sync {
        fn name(&self) -> &'static str;
    }

    trait Logger: Send + Sync {
        fn prefix(&self) -> String;
    }

    #[derive(Default)]
    struct MemoryStorage;

    #[derive(Default)]
    struct DiskStorage;

    struct ConsoleLogger {
        prefix: Arc<String>,
    }

    struct Service {
        storage: Arc<dyn Storage>,
        logger: Option<Arc<dyn Logger>>,
    }

    impl Storage for MemoryStorage {
        fn name(&self) -> &'static str {
            "memory"
        }
    }

    impl Storage for DiskStorage {
        fn name(&self) -> &'static str {
            "disk"
        }
    }

    impl Logger for ConsoleLogger {
        fn prefix(&self) -> String {
            self.prefix.to_string()
        }
    }

    assignable!(dyn Storage => MemoryStorage, DiskStorage);
    assignable!(dyn Logger => ConsoleLogger);

    impl Injectable for MemoryStorage {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::new()
                .constructor(MemoryStorage::default)
                .implements::<dyn Storage>()
        }
    }

    impl Injectable for DiskStorage {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::new()
                .constructor(DiskStorage::default)
                .implements::<dyn Storage>()
        }
    }

    impl Injectable for ConsoleLogger {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::new()
                .inject_constructor(|prefix: Arc<String>| ConsoleLogger { prefix })
        }
    }

    impl Injectable for Service {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::new()
                .inject_constructor(|storage: Arc<dyn Storage>| Service { storage, logger: None })
                .inject("logger", |service: &mut Service| &mut service.logger)
        }
    }

    struct Left(#[allow(dead_code)] Arc<Right>);
    struct Right(#[allow(dead_code)] Arc<Left>);

    impl Injectable for Left {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::new().inject_constructor(Left)
        }
    }

    impl Injectable for Right {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::new().inject_constructor(Right)
        }
    }

    struct Report {
        title: Arc<String>,
        pages: Arc<u32>,
    }

    impl Injectable for Report {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::new()
                .inject_constructor(|title: Arc<String>, pages: Arc<u32>| Report { title, pages })
        }
    }

    struct Archive(Arc<Report>);

    impl Injectable for Archive {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::new().inject_constructor(Archive)
        }
    }

    #[derive(Default)]
    struct Drops(AtomicUsize);

    /// Calls back into its container when dropped
    struct Watcher {
        resolver: Arc<dyn Resolve>,
        drops: Arc<Drops>,
    }

    impl Drop for Watcher {
        fn drop(&mut self) {
            let _ = self.resolver.contains::<Watcher>();
            let _ = self.resolver.all_instances();
            self.drops.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    impl Injectable for Watcher {
        fn descriptor() -> Descriptor<Self> {
            Descriptor::new()
                .inject_constructor(|resolver: Arc<dyn Resolve>, drops: Arc<Drops>| Watcher { resolver, drops })
        }
    }

    fn watched_container() -> (Container, Arc<Drops>) {
        let container = Container::new();
        container.register_instance::<Drops, _>(Drops::default()).unwrap();
        container.register_implementation::<Watcher, Watcher>(Lifetime::PerContainer).unwrap();
        drop(container.get::<Watcher>().unwrap());
        let drops = container.get::<Drops>().unwrap();
        (container, drops)
    }

    fn service_container() -> Container {
        let container = Container::new();
        container.register_implementation::<dyn Storage, MemoryStorage>(Lifetime::PerContainer).unwrap();
        container.register_implementation::<dyn Logger, ConsoleLogger>(Lifetime::PerCall).unwrap();
        container.register_instance::<String, _>(String::from("app")).unwrap();
        container.register_implementation::<Service, Service>(Lifetime::PerCall).unwrap();
        container
    }

    #[test]
    fn it_starts_with_own_registrations() {
        let container = Container::new();

        assert_eq!(container.all(), Container::self_keys().to_vec());
        assert_eq!(container.all_instances().len(), 1);
        assert!(container.contains::<dyn Resolve>());
        assert!(container.contains_instance::<dyn Registry>().unwrap());
    }

    #[test]
    fn it_resolves_itself() {
        let container = Container::new();

        let registry = container.get::<dyn Registry>().unwrap();
        registry.register_instance::<u8, _>(5_u8).unwrap();

        assert_eq!(*container.get::<u8>().unwrap(), 5);
        assert!(registry.contains::<u8>());
    }

    #[test]
    fn it_reports_missing_container() {
        let container = Container::new();
        let resolver = container.get::<dyn Resolve>().unwrap();

        drop(container);

        assert_eq!(resolver.get::<u8>().unwrap_err(), Error::ContainerMissing);
        assert!(!resolver.contains::<dyn Resolve>());
        assert!(resolver.all().is_empty());
    }

    #[test]
    fn it_skips_clears_without_container() {
        let container = Container::new();
        let registry = container.get::<dyn Registry>().unwrap();

        drop(container);
        registry.clear_all();
        registry.clear_all_instances();
        registry.dispose();

        assert!(registry.all_instances().is_empty());
        assert_eq!(registry.remove::<u8>(), Err(Error::ContainerMissing));
    }

    #[test]
    fn it_builds_per_call_instances() {
        let container = Container::new();
        container.register_implementation::<dyn Storage, MemoryStorage>(Lifetime::PerCall).unwrap();

        let first = container.get::<dyn Storage>().unwrap();
        let second = container.get::<dyn Storage>().unwrap();

        assert!(!Arc::ptr_eq(&first, &second));
        assert!(!container.contains_instance::<dyn Storage>().unwrap());
        assert_eq!(container.all_instances().len(), 1);
    }

    #[test]
    fn it_holds_per_container_instance() {
        let container = Container::new();
        container.register_implementation::<dyn Storage, MemoryStorage>(Lifetime::PerContainer).unwrap();

        assert!(!container.contains_instance::<dyn Storage>().unwrap());

        let first = container.get::<dyn Storage>().unwrap();
        let second = container.get::<dyn Storage>().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(first.name(), "memory");
        assert!(container.contains_instance::<dyn Storage>().unwrap());

        let instances = container.all_instances();
        assert_eq!(instances.len(), 2);
        let held = instances
            .iter()
            .find_map(|object| object.clone().downcast::<MemoryStorage>().ok())
            .unwrap();
        assert!(std::ptr::addr_eq(Arc::as_ptr(&held), Arc::as_ptr(&first)));
    }

    #[test]
    fn it_resolves_registered_instance() {
        let container = Container::new();

        container.register_instance::<dyn Storage, _>(DiskStorage).unwrap();

        assert_eq!(container.get::<dyn Storage>().unwrap().name(), "disk");
        assert!(container.contains_instance::<dyn Storage>().unwrap());
    }

    #[test]
    fn it_rejects_unassignable_value() {
        let container = Container::new();

        let err = container
            .register_value(TypeKey::of::<dyn Storage>(), Value::new(DiskStorage))
            .unwrap_err();

        assert!(matches!(err, Error::NotAssignable { .. }));
        assert!(!container.contains::<dyn Storage>());
    }

    #[test]
    fn it_rejects_double_registration() {
        let container = Container::new();
        container.register_implementation::<dyn Storage, MemoryStorage>(Lifetime::PerCall).unwrap();

        let err = container.register_instance::<dyn Storage, _>(DiskStorage).unwrap_err();
        assert!(matches!(err, Error::AlreadyRegistered(_)));

        let container = Container::new();
        container.register_instance::<dyn Storage, _>(DiskStorage).unwrap();

        let err = container
            .register_implementation::<dyn Storage, MemoryStorage>(Lifetime::PerContainer)
            .unwrap_err();
        assert!(matches!(err, Error::AlreadyRegistered(_)));
        assert_eq!(container.get::<dyn Storage>().unwrap().name(), "disk");
    }

    #[test]
    fn it_removes_registration() {
        let container = Container::new();
        container.register_implementation::<dyn Storage, MemoryStorage>(Lifetime::PerContainer).unwrap();
        container.get::<dyn Storage>().unwrap();

        container.remove::<dyn Storage>().unwrap();

        assert!(!container.contains::<dyn Storage>());
        assert_eq!(container.all_instances().len(), 1);
        assert!(matches!(container.get::<dyn Storage>(), Err(Error::NotRegistered(_))));
        assert!(matches!(container.remove::<dyn Storage>(), Err(Error::NotRegistered(_))));
    }

    #[test]
    fn it_protects_own_keys() {
        let container = Container::new();

        for key in Container::self_keys() {
            assert_eq!(container.remove_key(key), Err(Error::ProtectedKey(key.name())));
            assert_eq!(container.remove_instance_key(key), Err(Error::ProtectedKey(key.name())));
        }
        assert_eq!(container.all().len(), 2);
    }

    #[test]
    fn it_removes_held_instance() {
        let container = Container::new();
        container.register_implementation::<dyn Storage, MemoryStorage>(Lifetime::PerContainer).unwrap();

        assert!(matches!(container.remove_instance::<dyn Storage>(), Err(Error::NoCachedInstance(_))));

        let first = container.get::<dyn Storage>().unwrap();
        container.remove_instance::<dyn Storage>().unwrap();
        let second = container.get::<dyn Storage>().unwrap();

        assert!(container.contains::<dyn Storage>());
        assert!(!Arc::ptr_eq(&first, &second));
    }

    #[test]
    fn it_rebuilds_removed_injectable_instance() {
        let container = Container::new();
        let value = Value::injectable(MemoryStorage);
        container.register_value(TypeKey::of::<dyn Storage>(), value).unwrap();

        container.remove_instance::<dyn Storage>().unwrap();

        assert_eq!(container.get::<dyn Storage>().unwrap().name(), "memory");
        assert!(container.contains_instance::<dyn Storage>().unwrap());
    }

    #[test]
    fn it_cannot_rebuild_removed_plain_instance() {
        let container = Container::new();
        container.register_instance::<dyn Storage, _>(DiskStorage).unwrap();

        container.remove_instance::<dyn Storage>().unwrap();

        let err = container.get::<dyn Storage>().err().unwrap();
        assert!(matches!(err, Error::NoInjectableConstructor(name) if name.ends_with("DiskStorage")));
    }

    #[test]
    fn it_clears_all() {
        let container = service_container();
        container.get::<dyn Storage>().unwrap();

        container.clear_all();

        assert_eq!(container.all(), Container::self_keys().to_vec());
        let instances = container.all_instances();
        assert_eq!(instances.len(), 1);

        let resolver = container.get::<dyn Resolve>().unwrap();
        assert!(std::ptr::addr_eq(Arc::as_ptr(&instances[0]), Arc::as_ptr(&resolver)));
        assert!(resolver.contains::<dyn Registry>());
    }

    #[test]
    fn it_clears_all_instances() {
        let container = service_container();
        container.get::<dyn Storage>().unwrap();

        container.clear_all_instances();

        assert_eq!(container.all().len(), 6);
        assert_eq!(container.all_instances().len(), 1);
        assert!(!container.contains_instance::<String>().unwrap());
        assert!(container.contains_instance::<dyn Resolve>().unwrap());
    }

    #[test]
    fn it_disposes() {
        let container = service_container();

        container.dispose();

        assert!(container.all().is_empty());
        assert!(container.all_instances().is_empty());
    }

    #[test]
    fn it_lists_keys_in_registration_order() {
        let container = Container::new();
        container.register_instance::<u16, _>(1_u16).unwrap();
        container.register_instance::<u8, _>(2_u8).unwrap();
        container.register_instance::<u32, _>(3_u32).unwrap();

        container.remove::<u8>().unwrap();

        let keys = container.all();
        assert_eq!(&keys[2..], &[TypeKey::of::<u16>(), TypeKey::of::<u32>()]);
    }

    #[test]
    fn it_resolves_end_to_end() {
        let container = service_container();

        let service = container.get::<Service>().unwrap();

        assert_eq!(service.storage.name(), "memory");
        assert_eq!(service.logger.as_ref().unwrap().prefix(), "app");
        assert!(container.contains_instance::<dyn Storage>().unwrap());
        assert!(!container.contains_instance::<Service>().unwrap());
    }

    #[test]
    fn it_reports_missing_members() {
        let container = Container::new();
        container.register_implementation::<dyn Storage, MemoryStorage>(Lifetime::PerCall).unwrap();
        container.register_implementation::<Service, Service>(Lifetime::PerCall).unwrap();

        let err = container.get::<Service>().err().unwrap();

        assert!(matches!(err, Error::UnresolvedMembers { missing, .. } if missing.len() == 1));
    }

    #[test]
    fn it_matches_registered_supertype() {
        let container = Container::new();
        container.register_implementation::<MemoryStorage, MemoryStorage>(Lifetime::PerContainer).unwrap();
        container.register_implementation::<DiskStorage, DiskStorage>(Lifetime::PerContainer).unwrap();
        container.register_implementation::<dyn Logger, ConsoleLogger>(Lifetime::PerCall).unwrap();
        container.register_instance::<String, _>(String::from("app")).unwrap();
        container.register_implementation::<Service, Service>(Lifetime::PerCall).unwrap();

        let service = container.get::<Service>().unwrap();

        assert_eq!(service.storage.name(), "memory");
        assert!(container.contains_instance::<MemoryStorage>().unwrap());
        assert!(!container.contains_instance::<DiskStorage>().unwrap());
    }

    #[test]
    fn it_reports_every_missing_parameter() {
        let container = Container::new();
        container.register_implementation::<Report, Report>(Lifetime::PerCall).unwrap();

        let err = container.get::<Report>().err().unwrap();

        assert_eq!(err, Error::UnresolvedParameters {
            target: TypeKey::of::<Report>().name(),
            missing: vec![TypeKey::of::<String>().name(), TypeKey::of::<u32>().name()],
        });
    }

    #[test]
    fn it_uses_ad_hoc_values() {
        let container = Container::new();
        container.register_instance::<u32, _>(12_u32).unwrap();
        container.register_implementation::<Report, Report>(Lifetime::PerCall).unwrap();

        let report = container
            .get_with::<Report>([Value::new(String::from("Q3")), Value::new(99_u32)])
            .unwrap();

        assert_eq!(report.title.as_str(), "Q3");
        assert_eq!(*report.pages, 12);
    }

    #[test]
    fn it_does_not_pass_ad_hoc_values_to_nested_dependencies() {
        let container = Container::new();
        container.register_implementation::<Report, Report>(Lifetime::PerCall).unwrap();
        container.register_implementation::<Archive, Archive>(Lifetime::PerCall).unwrap();

        let err = container
            .get_with::<Archive>([Value::new(String::from("Q3")), Value::new(1_u32)])
            .err()
            .unwrap();

        assert!(matches!(err, Error::UnresolvedParameters { target, .. } if target.ends_with("Report")));
    }

    #[test]
    fn it_rejects_duplicate_ad_hoc_types() {
        let container = Container::new();
        container.register_implementation::<Report, Report>(Lifetime::PerCall).unwrap();

        let err = container
            .get_with::<Report>([Value::new(1_u32), Value::new(2_u32)])
            .err()
            .unwrap();

        assert_eq!(err, Error::DuplicateAdHocType("u32"));
        assert_eq!(err.kind(), ErrorKind::Misuse);
    }

    #[test]
    fn it_rejects_duplicate_ad_hoc_types_when_creating() {
        let container = Container::new();
        container.register_instance::<String, _>(String::from("draft")).unwrap();

        let err = container
            .create_instance::<Report>([Value::new(1_u32), Value::new(2_u32)])
            .err()
            .unwrap();

        assert_eq!(err, Error::DuplicateAdHocType("u32"));
        assert!(!container.contains::<Report>());
    }

    #[test]
    fn it_creates_unregistered_instance() {
        let container = Container::new();
        container.register_instance::<String, _>(String::from("draft")).unwrap();

        let report = container.create_instance::<Report>([Value::new(3_u32)]).unwrap();

        assert_eq!(report.title.as_str(), "draft");
        assert_eq!(*report.pages, 3);
        assert!(!container.contains::<Report>());
    }

    #[test]
    fn it_detects_circular_dependency() {
        let container = Container::new();
        container.register_implementation::<Left, Left>(Lifetime::PerCall).unwrap();
        container.register_implementation::<Right, Right>(Lifetime::PerCall).unwrap();

        let err = container.get::<Left>().err().unwrap();

        assert_eq!(err, Error::CircularDependency(vec![
            TypeKey::of::<Left>().name(),
            TypeKey::of::<Right>().name(),
            TypeKey::of::<Left>().name(),
        ]));

        // the resolution stack is unwound after a failure
        let err = container.get::<Right>().err().unwrap();
        assert!(matches!(err, Error::CircularDependency(chain) if chain[0].ends_with("Right")));
    }

    #[test]
    fn it_limits_depth() {
        let container = ContainerBuilder::new().with_max_depth(1).build();
        container.register_implementation::<dyn Storage, MemoryStorage>(Lifetime::PerCall).unwrap();
        container.register_implementation::<Service, Service>(Lifetime::PerCall).unwrap();

        assert!(container.get::<dyn Storage>().is_ok());

        let err = container.get::<Service>().err().unwrap();
        assert_eq!(err, Error::DepthExceeded {
            target: TypeKey::of::<MemoryStorage>().name(),
            limit: 1,
        });
    }

    #[test]
    fn it_reenters_sync_root() {
        let container = Container::new();

        let _root = container.sync_root();
        if !container.contains::<u8>() {
            container.register_instance::<u8, _>(1_u8).unwrap();
        }

        assert_eq!(*container.get::<u8>().unwrap(), 1);
    }

    #[test]
    fn it_shares_registrations_between_clones() {
        let container = Container::new();
        let clone = container.clone();

        clone.register_instance::<u8, _>(1_u8).unwrap();

        assert!(container.contains::<u8>());
    }

    #[test]
    fn it_drops_removed_instances_that_call_back() {
        let removals: [fn(&Container); 5] = [
            |container: &Container| container.remove_instance::<Watcher>().unwrap(),
            |container: &Container| container.remove::<Watcher>().unwrap(),
            |container: &Container| container.clear_all(),
            |container: &Container| container.clear_all_instances(),
            |container: &Container| container.dispose(),
        ];

        for remove in removals {
            let (container, drops) = watched_container();
            assert_eq!(drops.0.load(Ordering::SeqCst), 0);

            remove(&container);

            assert_eq!(drops.0.load(Ordering::SeqCst), 1);
        }
    }

    #[test]
    fn it_stays_usable_after_callback_from_drop() {
        let (container, drops) = watched_container();

        container.remove_instance::<Watcher>().unwrap();
        container.get::<Watcher>().unwrap();
        container.clear_all_instances();

        assert_eq!(drops.0.load(Ordering::SeqCst), 2);
        assert!(container.contains::<Watcher>());
        assert!(!container.contains_instance::<Watcher>().unwrap());
    }

    #[test]
    fn it_emits_events_with_subscriber() {
        let subscriber = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::new("trace"))
            .with_test_writer()
            .finish();

        tracing::subscriber::with_default(subscriber, || {
            let container = service_container();
            let service = container.get::<Service>().unwrap();
            assert_eq!(service.storage.name(), "memory");
        });
    }
}
