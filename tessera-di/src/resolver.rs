//! Resolves the dependencies of one injection step

use crate::{
    error::Error,
    key::TypeKey,
    value::{Resolved, Value},
};
use tracing::trace;

/// Ad-hoc values supplied to a single resolution call,
/// at most one per concrete type.
#[derive(Debug, Default)]
pub(crate) struct AdHocPool {
    values: Vec<Value>,
}

impl AdHocPool {
    /// Builds the pool, rejecting two values of the same concrete type
    pub(crate) fn new(values: impl IntoIterator<Item = Value>) -> Result<Self, Error> {
        let mut pool: Vec<Value> = Vec::new();
        for value in values {
            let ty = value.type_key();
            if pool.iter().any(|v| v.type_key() == ty) {
                return Err(Error::DuplicateAdHocType(ty.name()));
            }
            pool.push(value);
        }
        Ok(Self { values: pool })
    }

    /// The value that can be supplied where `key` is requested
    #[inline]
    pub(crate) fn find(&self, key: TypeKey) -> Option<&Value> {
        self.values
            .iter()
            .find(|v| v.is_assignable_to(key))
    }
}

/// Registry side of dependency resolution
pub(crate) trait Lookup {
    /// Returns `true` if the registry can produce a value for `key`
    fn provides(&self, key: TypeKey) -> bool;

    /// Produces a value for `key`, recursing into its own injection points
    fn fetch(&self, key: TypeKey) -> Result<Resolved, Error>;
}

/// Why a list of dependencies could not be resolved
#[derive(Debug)]
pub(crate) enum Failure {
    /// Types found neither in the registry nor among the ad-hoc values
    Missing(Vec<&'static str>),
    /// A dependency was found but producing it failed
    Failed(Error),
}

impl Failure {
    #[inline]
    pub(crate) fn into_error(self, missing: impl FnOnce(Vec<&'static str>) -> Error) -> Error {
        match self {
            Failure::Missing(types) => missing(types),
            Failure::Failed(err) => err,
        }
    }
}

/// Resolves every type in `required`, registry first, then ad-hoc values.
///
/// All types are checked before anything is produced, so a failure
/// reports every missing type at once.
pub(crate) fn resolve<L: Lookup + ?Sized>(
    required: &[TypeKey],
    lookup: &L,
    pool: &AdHocPool
) -> Result<Vec<Resolved>, Failure> {
    let missing: Vec<&'static str> = required
        .iter()
        .filter(|key| !lookup.provides(**key) && pool.find(**key).is_none())
        .map(|key| key.name())
        .collect();

    if !missing.is_empty() {
        return Err(Failure::Missing(missing));
    }

    required
        .iter()
        .map(|key| resolve_one(*key, lookup, pool).map_err(Failure::Failed))
        .collect()
}

fn resolve_one<L: Lookup + ?Sized>(key: TypeKey, lookup: &L, pool: &AdHocPool) -> Result<Resolved, Error> {
    if lookup.provides(key) {
        return lookup.fetch(key);
    }

    let value = pool
        .find(key)
        .ok_or(Error::ResolveFailed(key.name()))?;

    trace!(key = %key, value = %value.type_key(), "dependency supplied ad-hoc");

    value
        .cast(key)
        .ok_or(Error::ResolveFailed(key.name()))
}
