use std::collections::HashSet;

use syn::{spanned::Spanned, Data, DeriveInput, Fields, Variant};

/// `FieldSet` packs keys into a `u64`.
pub const MAX_VARIANTS: usize = 64;

/// Ensure the input is a non-generic enum whose variants carry no data, and
/// return those variants.
pub fn unit_variants(input: &DeriveInput) -> syn::Result<Vec<&Variant>> {
    if !input.generics.params.is_empty() {
        return Err(syn::Error::new_spanned(
            &input.generics,
            "FormKey cannot be derived for generic types",
        ));
    }

    let data = match &input.data {
        Data::Enum(data) => data,
        _ => {
            return Err(syn::Error::new_spanned(
                &input.ident,
                "FormKey can only be derived for enums",
            ))
        }
    };

    let mut variants = Vec::with_capacity(data.variants.len());
    for variant in &data.variants {
        if !matches!(variant.fields, Fields::Unit) {
            return Err(syn::Error::new(
                variant.fields.span(),
                "FormKey variants must not carry data",
            ));
        }
        variants.push(variant);
    }

    if variants.len() > MAX_VARIANTS {
        return Err(syn::Error::new_spanned(
            &input.ident,
            format!("FormKey supports at most {MAX_VARIANTS} variants"),
        ));
    }

    Ok(variants)
}

/// Two variants resolving to the same wire name would serialize into the same
/// request key.
pub fn unique_names(variants: &[&Variant], names: &[String]) -> syn::Result<()> {
    let mut seen = HashSet::new();
    for (variant, name) in variants.iter().zip(names) {
        if !seen.insert(name.as_str()) {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                format!("duplicate FormKey name `{name}`"),
            ));
        }
    }
    Ok(())
}
