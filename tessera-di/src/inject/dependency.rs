//! Conversions from resolved objects into constructor arguments and member values

use crate::{error::Error, key::TypeKey, value::Resolved};
use std::{any::type_name, sync::Arc};

/// A single injectable value: the key type it is requested by,
/// and how to recover it from a [`Resolved`] object.
pub trait Dependency: Sized + Send + Sync + 'static {
    /// Key type requested from the container
    fn key() -> TypeKey;

    /// Recovers `Self` from an object resolved for [`Dependency::key`]
    fn from_resolved(value: Resolved) -> Result<Self, Error>;
}

impl<T: ?Sized + Send + Sync + 'static> Dependency for Arc<T> {
    #[inline]
    fn key() -> TypeKey {
        TypeKey::of::<T>()
    }

    #[inline]
    fn from_resolved(value: Resolved) -> Result<Self, Error> {
        value
            .downcast::<Arc<T>>()
            .map(|arc| *arc)
            .map_err(|_| Error::ResolveFailed(type_name::<T>()))
    }
}

/// An ordered list of dependencies, one per constructor parameter
pub trait Dependencies: Sized {
    /// Parameter key types in declaration order
    fn keys() -> Vec<TypeKey>;

    /// Recovers the arguments from objects resolved for [`Dependencies::keys`]
    fn from_resolved(values: Vec<Resolved>) -> Result<Self, Error>;
}

impl Dependencies for () {
    #[inline]
    fn keys() -> Vec<TypeKey> {
        Vec::new()
    }

    #[inline]
    fn from_resolved(_: Vec<Resolved>) -> Result<Self, Error> {
        Ok(())
    }
}

macro_rules! define_generic_dependencies {
    ($($T: ident),*) => {
        impl<$($T: Dependency),+> Dependencies for ($($T,)+) {
            #[inline]
            fn keys() -> Vec<TypeKey> {
                vec![$($T::key()),+]
            }

            #[inline]
            #[allow(non_snake_case)]
            fn from_resolved(values: Vec<Resolved>) -> Result<Self, Error> {
                let mut values = values.into_iter();
                let tuple = (
                    $(
                    $T::from_resolved(values
                        .next()
                        .ok_or(Error::ResolveFailed(type_name::<$T>()))?)?,
                    )*
                );
                Ok(tuple)
            }
        }
    }
}

define_generic_dependencies! { T1 }
define_generic_dependencies! { T1, T2 }
define_generic_dependencies! { T1, T2, T3 }
define_generic_dependencies! { T1, T2, T3, T4 }
define_generic_dependencies! { T1, T2, T3, T4, T5 }
define_generic_dependencies! { T1, T2, T3, T4, T5, T6 }
