//! Proc-Macros for the Tessera DI container
//!

use proc_macro::TokenStream;
use syn::parse_macro_input;

mod injectable;

/// Derive macro for the `Injectable` trait
///
/// Type options, set with `#[injectable(...)]`:
/// - `default` declares `Default::default` as a parameterless constructor,
///   used when no constructor is marked for injection.
/// - `constructor = path` marks an associated or free function as an injection constructor.
///   Every parameter must be an `Arc<_>`.
/// - `implements = Type` makes the type assignable to `Type`, usually a trait object,
///   and implements `Assignable<Type>` for it.
///
/// Fields marked with `#[inject]` are injected after construction
/// and must be of type `Option<Arc<_>>`.
///
/// # Example
/// ```ignore
/// use std::sync::Arc;
/// use tessera_di::Injectable;
///
/// trait Cache: Send + Sync {}
///
/// #[derive(Injectable)]
/// #[injectable(constructor = Repository::new, implements = dyn Store)]
/// struct Repository {
///     cache: Arc<dyn Cache>,
///     #[inject]
///     audit: Option<Arc<AuditLog>>,
/// }
///
/// impl Repository {
///     fn new(cache: Arc<dyn Cache>) -> Self {
///         Self { cache, audit: None }
///     }
/// }
///
/// // This expands to:
/// // impl Injectable for Repository {
/// //     fn descriptor() -> Descriptor<Self> {
/// //         Descriptor::new()
/// //             .inject_constructor(Repository::new)
/// //             .inject::<Option<Arc<AuditLog>>>("audit", |target: &mut Self| &mut target.audit)
/// //             .implements::<dyn Store>()
/// //     }
/// // }
/// // impl Assignable<dyn Store> for Repository { ... }
/// ```
#[proc_macro_derive(Injectable, attributes(injectable, inject))]
pub fn derive_injectable(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as syn::DeriveInput);
    injectable::expand_injectable(&input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}
