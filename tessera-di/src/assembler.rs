//! Builds instances: constructor selection, then member injection

use crate::{
    error::Error,
    inject::{Blueprint, Built},
    key::TypeKey,
    locator,
    resolver::{self, AdHocPool, Lookup},
};
use std::any::Any;

/// Constructs an instance of the described type and injects its members
pub(crate) fn assemble<L: Lookup + ?Sized>(
    blueprint: &Blueprint,
    lookup: &L,
    pool: &AdHocPool
) -> Result<Built, Error> {
    let mut built = construct(blueprint, lookup, pool)?;
    inject_members(blueprint, &mut *built, lookup, pool)?;
    Ok(built)
}

fn construct<L: Lookup + ?Sized>(
    blueprint: &Blueprint,
    lookup: &L,
    pool: &AdHocPool
) -> Result<Built, Error> {
    let target = blueprint.type_key().name();
    match locator::locate_constructors(blueprint).as_slice() {
        [] => locator::parameterless(blueprint)
            .ok_or(Error::NoInjectableConstructor(target))?
            .build(Vec::new()),
        [constructor] => {
            let args = resolver::resolve(constructor.params(), lookup, pool)
                .map_err(|failure| failure.into_error(|missing| Error::UnresolvedParameters { target, missing }))?;
            constructor.build(args)
        },
        _ => Err(Error::AmbiguousConstructor(target)),
    }
}

fn inject_members<L: Lookup + ?Sized>(
    blueprint: &Blueprint,
    instance: &mut (dyn Any + Send + Sync),
    lookup: &L,
    pool: &AdHocPool
) -> Result<(), Error> {
    let members = locator::locate_members(blueprint);
    if members.is_empty() {
        return Ok(());
    }

    let target = blueprint.type_key().name();
    let keys: Vec<TypeKey> = members.iter().map(|m| m.key()).collect();
    let values = resolver::resolve(&keys, lookup, pool)
        .map_err(|failure| failure.into_error(|missing| Error::UnresolvedMembers { target, missing }))?;

    members
        .into_iter()
        .zip(values)
        .try_for_each(|(member, value)| member.set(instance, value))
}
