//! Procedural macros for trellis.
//!
//! Provides `#[derive(PropsEq)]`, which compares hook props field by field so
//! the render hooks can tell whether derived values need recomputing.
//!
//! # Example
//!
//! ```ignore
//! use std::rc::Rc;
//! use trellis::prelude::*;
//!
//! #[derive(Clone, PropsEq)]
//! struct EventProps {
//!     title: String,
//!     is_selected: bool,
//!     // compared by pointer
//!     on_click: Rc<dyn Fn()>,
//!     #[props(skip)]
//!     render_count: u32,
//!     #[props(by_value)]
//!     tags: Rc<Vec<String>>,
//! }
//! ```

mod field_options;
mod suggestions;

use proc_macro::TokenStream;
use proc_macro2::TokenStream as TokenStream2;
use quote::quote;
use syn::{Data, DeriveInput, Field, Index, Member, Result};

use field_options::{find_option, option_names, FieldMode};
use suggestions::{format_conflicting_options_error, format_unknown_option_error};

/// Derive `trellis::core::PropsEq` for a struct.
///
/// Fields compare with `PropsEq` unless annotated:
///
/// - `#[props(skip)]` leaves the field out,
/// - `#[props(by_value)]` compares with `PartialEq`.
///
/// Type parameters get a `PropsEq` bound.
#[proc_macro_derive(PropsEq, attributes(props))]
pub fn derive_props_eq(input: TokenStream) -> TokenStream {
    let input = syn::parse_macro_input!(input as DeriveInput);
    expand_props_eq(input)
        .unwrap_or_else(syn::Error::into_compile_error)
        .into()
}

fn expand_props_eq(input: DeriveInput) -> Result<TokenStream2> {
    let name = &input.ident;
    let fields = match &input.data {
        Data::Struct(data) => &data.fields,
        Data::Enum(_) | Data::Union(_) => {
            return Err(syn::Error::new_spanned(
                name,
                "`PropsEq` can only be derived for structs",
            ));
        }
    };

    let mut comparisons = Vec::new();
    for (index, field) in fields.iter().enumerate() {
        let member = match &field.ident {
            Some(ident) => Member::Named(ident.clone()),
            None => Member::Unnamed(Index::from(index)),
        };
        match field_mode(field)? {
            FieldMode::Skip => {}
            FieldMode::ByValue => comparisons.push(quote! { self.#member == other.#member }),
            FieldMode::Props => comparisons.push(quote! {
                ::trellis::core::PropsEq::props_eq(&self.#member, &other.#member)
            }),
        }
    }

    let body = comparisons
        .into_iter()
        .reduce(|acc, next| quote! { #acc && #next })
        .unwrap_or_else(|| quote! { { let _ = other; true } });

    let mut generics = input.generics.clone();
    for param in generics.type_params_mut() {
        param
            .bounds
            .push(syn::parse_quote!(::trellis::core::PropsEq));
    }
    let (impl_generics, ty_generics, where_clause) = generics.split_for_impl();

    Ok(quote! {
        impl #impl_generics ::trellis::core::PropsEq for #name #ty_generics #where_clause {
            fn props_eq(&self, other: &Self) -> bool {
                #body
            }
        }
    })
}

/// Read the `#[props(...)]` options of a field.
fn field_mode(field: &Field) -> Result<FieldMode> {
    let mut chosen: Option<&'static str> = None;
    let mut mode = FieldMode::Props;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("props")) {
        attr.parse_nested_meta(|meta| {
            let name = meta
                .path
                .get_ident()
                .map(ToString::to_string)
                .unwrap_or_default();

            let Some(option) = find_option(&name) else {
                return Err(meta.error(format_unknown_option_error(&name, &option_names())));
            };
            if let Some(first) = chosen {
                return Err(meta.error(format_conflicting_options_error(first, option.name)));
            }

            chosen = Some(option.name);
            mode = option.mode;
            Ok(())
        })?;
    }

    Ok(mode)
}
