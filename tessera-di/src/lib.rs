//! # Tessera DI
//!
//! An embeddable dependency-resolution registry. Key types (usually trait objects)
//! are mapped to implementation types or pre-built instances, and resolved into
//! fully constructed objects with constructor and member injection.
//!
//! ## Example
//! ```
//! use tessera_di::{assignable, Container, Descriptor, Injectable, Lifetime, RegistryExt, ResolveExt};
//!
//! trait Greeter: Send + Sync {
//!     fn greet(&self) -> String;
//! }
//!
//! #[derive(Default)]
//! struct English;
//!
//! impl Greeter for English {
//!     fn greet(&self) -> String { "Hello".into() }
//! }
//!
//! impl Injectable for English {
//!     fn descriptor() -> Descriptor<Self> {
//!         Descriptor::new().constructor(English::default)
//!     }
//! }
//!
//! assignable!(dyn Greeter => English);
//!
//! let container = Container::new();
//! container.register_implementation::<dyn Greeter, English>(Lifetime::PerContainer).unwrap();
//!
//! let greeter = container.get::<dyn Greeter>().unwrap();
//! assert_eq!(greeter.greet(), "Hello");
//! ```

pub use crate::{
    container::{
        Container,
        ContainerBuilder,
        Lifetime,
        Registry,
        RegistryExt,
        Resolve,
        ResolveExt,
        SyncRoot,
    },
    error::{Error, ErrorKind},
    inject::{Blueprint, Constructor, Descriptor, Injectable, Member, Slot},
    key::TypeKey,
    value::{Assignable, Object, Resolved, Value},
};

#[cfg(feature = "macros")]
pub use tessera_macros::Injectable;

pub mod error;
pub mod container;
pub mod inject;
pub mod key;
pub mod value;

mod assembler;
mod locator;
mod resolver;
