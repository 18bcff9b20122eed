//! Injection points: constructors and settable members of an injectable type

use crate::{
    error::Error,
    key::TypeKey,
    locator,
    value::{Assignable, Casts, Resolved},
};
use std::{
    any::{Any, type_name},
    fmt::{Debug, Formatter},
    marker::PhantomData,
    sync::Arc,
};

pub use self::{
    dependency::{Dependencies, Dependency},
    factory::GenericFactory,
};

pub mod dependency;
pub mod factory;

/// A freshly constructed instance, not yet shared
pub(crate) type Built = Box<
    dyn Any
    + Send
    + Sync
>;

type BuildFn = Arc<
    dyn Fn(Vec<Resolved>) -> Result<Built, Error>
    + Send
    + Sync
>;

type SetFn = Arc<
    dyn Fn(&mut (dyn Any + Send + Sync), Resolved) -> Result<(), Error>
    + Send
    + Sync
>;

/// A trait that describes how the container constructs and injects a type
///
/// # Example
/// ```
/// use std::sync::Arc;
/// use tessera_di::{Descriptor, Injectable};
///
/// struct Config;
///
/// struct Repository {
///     config: Arc<Config>,
///     audit: Option<Arc<String>>,
/// }
///
/// impl Repository {
///     fn new(config: Arc<Config>) -> Self {
///         Self { config, audit: None }
///     }
/// }
///
/// impl Injectable for Repository {
///     fn descriptor() -> Descriptor<Self> {
///         Descriptor::new()
///             .inject_constructor(Repository::new)
///             .inject("audit", |repo: &mut Repository| &mut repo.audit)
///     }
/// }
/// ```
pub trait Injectable: Sized + Send + Sync + 'static {
    /// Describes constructors, members and assignability of `Self`
    fn descriptor() -> Descriptor<Self>;
}

/// A member that can receive an injected value after construction
pub trait Slot: Send + Sync + 'static {
    /// Value type stored in the slot
    type Item: Dependency;

    /// Stores the injected value
    fn fill(&mut self, item: Self::Item);
}

impl<D: Dependency> Slot for Option<D> {
    type Item = D;

    #[inline]
    fn fill(&mut self, item: D) {
        *self = Some(item);
    }
}

/// A constructor of an injectable type
#[derive(Clone)]
pub struct Constructor {
    marked: bool,
    params: Vec<TypeKey>,
    build: BuildFn,
}

impl Debug for Constructor {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Constructor")
            .field("marked", &self.marked)
            .field("params", &self.params)
            .finish_non_exhaustive()
    }
}

impl Constructor {
    fn new<T, F, Args>(factory: F, marked: bool) -> Self
    where
        T: Send + Sync + 'static,
        F: GenericFactory<Args, Output = T>,
        Args: Dependencies
    {
        Self {
            marked,
            params: Args::keys(),
            build: Arc::new(move |values: Vec<Resolved>| -> Result<Built, Error> {
                let args = Args::from_resolved(values)?;
                Ok(Box::new(factory.call(args)))
            }),
        }
    }

    /// Returns `true` if the constructor is marked for injection
    #[inline]
    pub fn is_injection_point(&self) -> bool {
        self.marked
    }

    /// Parameter types in declaration order
    #[inline]
    pub fn params(&self) -> &[TypeKey] {
        &self.params
    }

    #[inline]
    pub(crate) fn build(&self, values: Vec<Resolved>) -> Result<Built, Error> {
        (self.build)(values)
    }
}

/// A member of an injectable type
#[derive(Clone)]
pub struct Member {
    name: &'static str,
    key: TypeKey,
    marked: bool,
    setter: Option<SetFn>,
}

impl Debug for Member {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Member")
            .field("name", &self.name)
            .field("key", &self.key)
            .field("marked", &self.marked)
            .field("settable", &self.is_settable())
            .finish()
    }
}

impl Member {
    fn settable<T, S>(name: &'static str, access: fn(&mut T) -> &mut S, marked: bool) -> Self
    where
        T: Send + Sync + 'static,
        S: Slot
    {
        Self {
            name,
            key: <S::Item as Dependency>::key(),
            marked,
            setter: Some(Arc::new(move |target: &mut (dyn Any + Send + Sync), value: Resolved| -> Result<(), Error> {
                let target = target
                    .downcast_mut::<T>()
                    .ok_or(Error::ResolveFailed(type_name::<T>()))?;
                let item = <S::Item as Dependency>::from_resolved(value)?;
                access(target).fill(item);
                Ok(())
            })),
        }
    }

    /// Member name
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }

    /// Declared type of the member
    #[inline]
    pub fn key(&self) -> TypeKey {
        self.key
    }

    /// Returns `true` if the member is marked for injection
    #[inline]
    pub fn is_injection_point(&self) -> bool {
        self.marked
    }

    /// Returns `true` if a value can be assigned to the member
    #[inline]
    pub fn is_settable(&self) -> bool {
        self.setter.is_some()
    }

    pub(crate) fn set(&self, target: &mut (dyn Any + Send + Sync), value: Resolved) -> Result<(), Error> {
        match &self.setter {
            Some(setter) => setter(target, value),
            None => Err(Error::ResolveFailed(self.name)),
        }
    }
}

/// Type-erased description of an injectable type
pub struct Blueprint {
    ty: TypeKey,
    constructors: Vec<Constructor>,
    members: Vec<Member>,
    casts: Casts,
}

impl Debug for Blueprint {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Blueprint")
            .field("type", &self.ty)
            .field("constructors", &self.constructors)
            .field("members", &self.members)
            .finish_non_exhaustive()
    }
}

impl Blueprint {
    /// The described type
    #[inline]
    pub fn type_key(&self) -> TypeKey {
        self.ty
    }

    /// All declared constructors in declaration order
    #[inline]
    pub fn constructors(&self) -> &[Constructor] {
        &self.constructors
    }

    /// All declared members in declaration order
    #[inline]
    pub fn members(&self) -> &[Member] {
        &self.members
    }

    /// Returns `true` if the described type can be used where `key` is requested
    #[inline]
    pub fn is_assignable_to(&self, key: TypeKey) -> bool {
        self.casts.supports(key)
    }

    #[inline]
    pub(crate) fn casts(&self) -> &Casts {
        &self.casts
    }
}

/// Builder of a [`Blueprint`] for `T`
pub struct Descriptor<T> {
    blueprint: Blueprint,
    _marker: PhantomData<fn() -> T>,
}

impl<T: Send + Sync + 'static> Default for Descriptor<T> {
    #[inline]
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Debug for Descriptor<T> {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        self.blueprint.fmt(f)
    }
}

impl<T: Send + Sync + 'static> Descriptor<T> {
    /// Creates an empty descriptor: no constructors, no members,
    /// assignable only to `T` itself
    #[inline]
    pub fn new() -> Self {
        Self {
            blueprint: Blueprint {
                ty: TypeKey::of::<T>(),
                constructors: Vec::new(),
                members: Vec::new(),
                casts: Casts::of::<T>(),
            },
            _marker: PhantomData,
        }
    }

    /// Declares a constructor that is not marked for injection.
    ///
    /// Only a parameterless one is ever used, and only when no constructor is marked.
    pub fn constructor<F, Args>(mut self, factory: F) -> Self
    where
        F: GenericFactory<Args, Output = T>,
        Args: Dependencies
    {
        self.blueprint.constructors.push(Constructor::new(factory, false));
        self
    }

    /// Declares a constructor marked for injection.
    ///
    /// Its parameters are resolved from the container or from ad-hoc values.
    /// Declaring more than one makes the type ambiguous to construct.
    pub fn inject_constructor<F, Args>(mut self, factory: F) -> Self
    where
        F: GenericFactory<Args, Output = T>,
        Args: Dependencies
    {
        self.blueprint.constructors.push(Constructor::new(factory, true));
        self
    }

    /// Declares a settable member that is not marked for injection
    pub fn member<S: Slot>(mut self, name: &'static str, access: fn(&mut T) -> &mut S) -> Self {
        self.blueprint.members.push(Member::settable(name, access, false));
        self
    }

    /// Declares a settable member marked for injection
    pub fn inject<S: Slot>(mut self, name: &'static str, access: fn(&mut T) -> &mut S) -> Self {
        self.blueprint.members.push(Member::settable(name, access, true));
        self
    }

    /// Declares a member marked for injection that cannot be assigned.
    ///
    /// Such members are never injected.
    pub fn inject_read_only<D: Dependency>(mut self, name: &'static str) -> Self {
        self.blueprint.members.push(Member {
            name,
            key: D::key(),
            marked: true,
            setter: None,
        });
        self
    }

    /// Declares that `T` can be used where `K` is requested
    pub fn implements<K>(mut self) -> Self
    where
        T: Assignable<K>,
        K: ?Sized + Send + Sync + 'static
    {
        self.blueprint.casts.add::<T, K>();
        self
    }

    /// Constructors marked for injection, in declaration order
    #[inline]
    pub fn injection_constructors(&self) -> Vec<&Constructor> {
        locator::locate_constructors(&self.blueprint)
    }

    /// Settable members marked for injection, in declaration order
    #[inline]
    pub fn injection_members(&self) -> Vec<&Member> {
        locator::locate_members(&self.blueprint)
    }

    /// Erases the type parameter
    #[inline]
    pub fn into_blueprint(self) -> Blueprint {
        self.blueprint
    }
}
