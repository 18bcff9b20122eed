//! Finds the injection points declared by a type

use crate::inject::{Blueprint, Constructor, Member};

/// Constructors marked for injection, in declaration order
#[inline]
pub(crate) fn locate_constructors(blueprint: &Blueprint) -> Vec<&Constructor> {
    blueprint.constructors()
        .iter()
        .filter(|c| c.is_injection_point())
        .collect()
}

/// Members marked for injection that can be assigned, in declaration order
#[inline]
pub(crate) fn locate_members(blueprint: &Blueprint) -> Vec<&Member> {
    blueprint.members()
        .iter()
        .filter(|m| m.is_injection_point() && m.is_settable())
        .collect()
}

/// The first declared constructor without parameters
#[inline]
pub(crate) fn parameterless(blueprint: &Blueprint) -> Option<&Constructor> {
    blueprint.constructors()
        .iter()
        .find(|c| c.params().is_empty())
}
