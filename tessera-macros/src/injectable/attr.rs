//! Parsing of the `#[injectable(...)]` attribute

use syn::{Attribute, Path, Result, Type};

/// Options collected from every `#[injectable(...)]` attribute of a type
#[derive(Default)]
pub(super) struct TypeOptions {
    /// `Default::default` is a parameterless constructor
    pub(super) default: bool,

    /// Injection constructors, in declaration order
    pub(super) constructors: Vec<Path>,

    /// Types the derived type is assignable to
    pub(super) implements: Vec<Type>,
}

impl TypeOptions {
    /// Parses the options, ignoring unrelated attributes.
    ///
    /// Accepts `default`, `constructor = path` and `implements = Type`,
    /// repeated or split across several attributes.
    pub(super) fn from_attrs(attrs: &[Attribute]) -> Result<Self> {
        let mut options = Self::default();
        for attr in attrs.iter().filter(|a| a.path().is_ident("injectable")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("default") {
                    options.default = true;
                    Ok(())
                } else if meta.path.is_ident("constructor") {
                    options.constructors.push(meta.value()?.parse()?);
                    Ok(())
                } else if meta.path.is_ident("implements") {
                    options.implements.push(meta.value()?.parse()?);
                    Ok(())
                } else {
                    Err(meta.error("expected `default`, `constructor` or `implements`"))
                }
            })?;
        }
        Ok(options)
    }
}
