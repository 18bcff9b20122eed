//! Macros for injectable types

use proc_macro2::TokenStream;
use quote::quote;
use self::attr::TypeOptions;

mod attr;

/// Expands a derive-macro for Injectable
pub(super) fn expand_injectable(input: &syn::DeriveInput) -> syn::Result<TokenStream> {
    let name = &input.ident;
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "`Injectable` cannot be derived for generic types"
        ));
    }

    let syn::Data::Struct(data) = &input.data else {
        return Err(syn::Error::new_spanned(
            name,
            "`Injectable` can only be derived for structs"
        ));
    };

    let options = TypeOptions::from_attrs(&input.attrs)?;

    let default = options.default.then(|| quote! {
        .constructor(<Self as ::core::default::Default>::default)
    });

    let constructors = options.constructors
        .iter()
        .map(|path| quote! { .inject_constructor(#path) });

    let members = data.fields
        .iter()
        .enumerate()
        .filter(|(_, field)| field.attrs.iter().any(|a| a.path().is_ident("inject")))
        .map(|(index, field)| {
            let ty = &field.ty;
            let (member, label) = match &field.ident {
                Some(ident) => (quote! { #ident }, ident.to_string()),
                None => {
                    let index = syn::Index::from(index);
                    (quote! { #index }, index.index.to_string())
                }
            };
            quote! {
                .inject::<#ty>(#label, |target: &mut Self| &mut target.#member)
            }
        });

    let implements = &options.implements;
    let upcasts = implements.iter().map(|ty| quote! {
        impl ::tessera_di::Assignable<#ty> for #name {
            #[inline]
            fn upcast(self: ::std::sync::Arc<Self>) -> ::std::sync::Arc<#ty> {
                self
            }
        }
    });

    Ok(quote! {
        impl ::tessera_di::Injectable for #name {
            fn descriptor() -> ::tessera_di::Descriptor<Self> {
                ::tessera_di::Descriptor::new()
                    #default
                    #(#constructors)*
                    #(#members)*
                    #(.implements::<#implements>())*
            }
        }

        #(#upcasts)*
    })
}
