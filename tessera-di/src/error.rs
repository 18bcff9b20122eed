//! Describes dependency injection errors

use std::fmt::{Display, Formatter};

/// Errors produced by registration and resolution
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// The container behind a self-reference handle has been dropped
    ContainerMissing,
    /// Two ad-hoc values of the same concrete type were supplied to one call
    DuplicateAdHocType(&'static str),
    /// The key type is already registered
    AlreadyRegistered(&'static str),
    /// The key type is not registered
    NotRegistered(&'static str),
    /// The implementation (or instance) type cannot be used as the key type
    NotAssignable {
        /// Implementation or instance type
        implementation: &'static str,
        /// Registration key type
        key: &'static str,
    },
    /// More than one constructor is marked for injection
    AmbiguousConstructor(&'static str),
    /// No constructor is marked for injection and no parameterless one exists
    NoInjectableConstructor(&'static str),
    /// Constructor parameter types that are neither registered nor supplied ad-hoc
    UnresolvedParameters {
        /// Type under construction
        target: &'static str,
        /// Every parameter type that could not be resolved
        missing: Vec<&'static str>,
    },
    /// Member types that are neither registered nor supplied ad-hoc
    UnresolvedMembers {
        /// Type being injected
        target: &'static str,
        /// Every member type that could not be resolved
        missing: Vec<&'static str>,
    },
    /// One of the container's own keys cannot be removed
    ProtectedKey(&'static str),
    /// The key type is registered but no instance of it is held
    NoCachedInstance(&'static str),
    /// A type requires itself, directly or through other dependencies
    CircularDependency(Vec<&'static str>),
    /// Dependency nesting went deeper than the configured limit
    DepthExceeded {
        /// Type whose assembly crossed the limit
        target: &'static str,
        /// Configured maximum depth
        limit: usize,
    },
    /// A resolved object could not be converted into the requested type
    ResolveFailed(&'static str),
}

/// Broad classification of an [`Error`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// Invalid input, rejected before the container is touched
    Misuse,
    /// A registration or resolution rule of the container was violated
    Policy,
}

impl Error {
    /// Returns whether this is a caller-misuse or a container-policy error
    #[inline]
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::DuplicateAdHocType(_) => ErrorKind::Misuse,
            _ => ErrorKind::Policy,
        }
    }
}

impl Display for Error {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Error::ContainerMissing => write!(f, "Container Error: DI container is missing"),
            Error::DuplicateAdHocType(type_name) => write!(f, "Container Error: ad-hoc values contain more than one entry of type: {type_name}"),
            Error::AlreadyRegistered(type_name) => write!(f, "Container Error: key type already registered: {type_name}"),
            Error::NotRegistered(type_name) => write!(f, "Container Error: key type not registered: {type_name}"),
            Error::NotAssignable { implementation, key } => write!(f, "Container Error: type {implementation} cannot be used as {key}"),
            Error::AmbiguousConstructor(type_name) => write!(f, "Container Error: more than one injection constructor on type: {type_name}"),
            Error::NoInjectableConstructor(type_name) => write!(f, "Container Error: neither a parameterless nor an injection constructor on type: {type_name}"),
            Error::UnresolvedParameters { target, missing } => write!(
                f,
                "Container Error: constructor parameters ({}) of type {target} are neither registered nor supplied",
                missing.join(",")
            ),
            Error::UnresolvedMembers { target, missing } => write!(
                f,
                "Container Error: members ({}) of type {target} are neither registered nor supplied",
                missing.join(",")
            ),
            Error::ProtectedKey(type_name) => write!(f, "Container Error: key type cannot be removed: {type_name}"),
            Error::NoCachedInstance(type_name) => write!(f, "Container Error: no instance held for key type: {type_name}"),
            Error::CircularDependency(chain) => write!(f, "Container Error: circular dependency: {}", chain.join(" -> ")),
            Error::DepthExceeded { target, limit } => write!(f, "Container Error: resolving {target} exceeded the maximum depth of {limit}"),
            Error::ResolveFailed(type_name) => write!(f, "Container Error: unable to resolve the service: {type_name}"),
        }
    }
}

impl std::error::Error for Error {}
