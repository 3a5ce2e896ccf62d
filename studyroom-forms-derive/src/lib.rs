//! Proc-macro implementation for `#[derive(FormKey)]`.
//!
//! The derive targets fieldless enums naming the fields (or verification
//! steps) of a form and generates an impl of `studyroom_forms::FormKey`:
//! 1. `ALL` lists the variants in declaration order.
//! 2. `index()` is the zero-based declaration position, used as the bit index
//!    inside `FieldSet`.
//! 3. `name()` is the wire name: the camelCase variant name unless the variant
//!    carries `#[form_key(rename = "...")]`.
extern crate proc_macro;

mod attr;
mod validate;

use proc_macro::TokenStream;
use quote::quote;
use syn::{parse_macro_input, DeriveInput};

#[proc_macro_derive(FormKey, attributes(form_key))]
pub fn derive_form_key(input: TokenStream) -> TokenStream {
    let input = parse_macro_input!(input as DeriveInput);
    match expand(&input) {
        Ok(tokens) => tokens.into(),
        Err(err) => err.to_compile_error().into(),
    }
}

fn expand(input: &DeriveInput) -> syn::Result<proc_macro2::TokenStream> {
    let variants = validate::unit_variants(input)?;

    let mut names = Vec::with_capacity(variants.len());
    for variant in &variants {
        names.push(attr::wire_name(variant)?);
    }
    validate::unique_names(&variants, &names)?;

    let ident = &input.ident;
    let variant_idents: Vec<&syn::Ident> = variants.iter().map(|v| &v.ident).collect();
    let indices = 0..variant_idents.len();

    Ok(quote! {
        impl ::studyroom_forms::FormKey for #ident {
            const ALL: &'static [Self] = &[ #( #ident::#variant_idents ),* ];

            #[inline]
            fn index(self) -> usize {
                match self {
                    #( #ident::#variant_idents => #indices, )*
                }
            }

            #[inline]
            fn name(self) -> &'static str {
                match self {
                    #( #ident::#variant_idents => #names, )*
                }
            }
        }
    })
}
