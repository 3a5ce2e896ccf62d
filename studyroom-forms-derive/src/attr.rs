use convert_case::{Case, Casing};
use syn::{LitStr, Variant};

/// Resolves the wire name of a variant.
///
/// Accepts `#[form_key(rename = "roomId")]`; anything else inside
/// `form_key(...)` is rejected so typos do not silently fall back to the
/// default name.
pub fn wire_name(variant: &Variant) -> syn::Result<String> {
    let mut rename: Option<String> = None;

    for attr in variant.attrs.iter().filter(|a| a.path().is_ident("form_key")) {
        attr.parse_nested_meta(|meta| {
            if meta.path.is_ident("rename") {
                let lit: LitStr = meta.value()?.parse()?;
                if lit.value().is_empty() {
                    return Err(meta.error("`rename` must not be empty"));
                }
                rename = Some(lit.value());
                Ok(())
            } else {
                Err(meta.error("expected `rename = \"...\"`"))
            }
        })?;
    }

    Ok(rename.unwrap_or_else(|| variant.ident.to_string().to_case(Case::Camel)))
}
