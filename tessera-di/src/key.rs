//! Stable identifiers for key, implementation and dependency types

use std::{
    any::{TypeId, type_name},
    fmt::{Debug, Display, Formatter},
    hash::{BuildHasherDefault, Hash, Hasher},
};

/// Identifies a type registered in, or requested from, the container.
///
/// Equality and hashing only consider the [`TypeId`], the name is kept
/// for diagnostics.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    /// Creates a key for `T`, which may be unsized (e.g. `dyn Trait`)
    #[inline]
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: type_name::<T>(),
        }
    }

    /// Returns the [`TypeId`] of the keyed type
    #[inline]
    pub fn id(&self) -> TypeId {
        self.id
    }

    /// Returns the fully qualified name of the keyed type
    #[inline]
    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl Hash for TypeKey {
    #[inline]
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl Debug for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

impl Display for TypeKey {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name)
    }
}

/// Hasher state for maps keyed by [`TypeKey`]
pub(crate) type KeyHasher = BuildHasherDefault<TypeIdHasher>;

/// Keeps the hash a [`TypeId`] already carries instead of hashing it again
#[derive(Default)]
pub(crate) struct TypeIdHasher {
    hash: u64,
}

impl Hasher for TypeIdHasher {
    #[inline]
    fn write_u64(&mut self, hash: u64) {
        self.hash = hash;
    }

    /// Folds arbitrary bytes, used only if `TypeId` stops hashing through `write_u64`
    fn write(&mut self, bytes: &[u8]) {
        for byte in bytes {
            self.hash = self.hash.rotate_left(8) ^ u64::from(*byte);
        }
    }

    #[inline]
    fn finish(&self) -> u64 {
        self.hash
    }
}
