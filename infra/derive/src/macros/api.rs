use super::derived_trait_names;
use fxhash::FxHashSet;
use proc_macro2::{Span, TokenStream};
use quote::quote;
use syn::meta::ParseNestedMeta;
use syn::parse::Parser;
use syn::{Attribute, Field, ItemFn, ItemStruct, Lit, LitStr, Meta, MetaNameValue, Type, parse_quote};

/// Expands the `#[api_model]` attribute macro.
pub fn expand_api_model(args: TokenStream, mut input: ItemStruct) -> TokenStream {
    let args = match ModelArgs::parse(args) {
        Ok(args) => args,
        Err(err) => return err.to_compile_error(),
    };
    let serde_meta = match SerdeMeta::collect(&input.attrs) {
        Ok(meta) => meta,
        Err(err) => return err.to_compile_error(),
    };

    let derives = derived_trait_names(&input.attrs);
    let mut missing = Vec::new();
    if !derives.contains("Debug") {
        missing.push(quote! { Debug });
    }
    if !derives.contains("Serialize") {
        missing.push(quote! { ::serde::Serialize });
    }
    if !derives.contains("Deserialize") {
        missing.push(quote! { ::serde::Deserialize });
    }
    if !derives.contains("ToSchema") {
        missing.push(quote! { ::utoipa::ToSchema });
    }
    if !missing.is_empty() {
        input.attrs.insert(0, parse_quote!(#[derive(#(#missing),*)]));
    }

    let rename_all = args.rename_all.unwrap_or_else(|| LitStr::new("camelCase", Span::call_site()));
    match &serde_meta.rename_all {
        Some(existing) if existing.value() != rename_all.value() => {
            return syn::Error::new_spanned(
                existing,
                "Conflicting serde rename_all; remove it or set api_model(rename_all = \"...\") to match",
            )
            .to_compile_error();
        },
        Some(_) => {},
        None => input.attrs.push(parse_quote!(#[serde(rename_all = #rename_all)])),
    }

    if args.deny_unknown_fields && !serde_meta.deny_unknown_fields {
        input.attrs.push(parse_quote!(#[serde(deny_unknown_fields)]));
    }

    if args.omit_null {
        for field in &mut input.fields {
            if is_option(&field.ty) && !field_opts_out(field) {
                field.attrs.push(parse_quote!(#[serde(skip_serializing_if = "Option::is_none")]));
            }
        }
    }

    quote! { #input }
}

/// Expands the `#[api_handler]` attribute macro.
pub fn expand_api_handler(args: TokenStream, input: ItemFn) -> TokenStream {
    let ItemFn { attrs, vis, sig, block } = input;

    quote! {
        #(#attrs)*
        #[allow(clippy::unused_async)]
        #[::utoipa::path(#args)]
        #vis #sig #block
    }
}

struct ModelArgs {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
    omit_null: bool,
}

impl ModelArgs {
    fn parse(args: TokenStream) -> syn::Result<Self> {
        let parser = syn::punctuated::Punctuated::<Meta, syn::Token![,]>::parse_terminated;
        let metas = parser.parse2(args)?;

        let mut seen = FxHashSet::default();
        let mut parsed = Self { rename_all: None, deny_unknown_fields: false, omit_null: true };

        for meta in metas {
            let Meta::NameValue(name_value) = meta else {
                return Err(syn::Error::new_spanned(
                    meta,
                    "Expected name-value arguments like `rename_all = \"...\"`",
                ));
            };

            let Some(key) = name_value.path.get_ident().map(ToString::to_string) else {
                return Err(syn::Error::new_spanned(name_value.path, "Expected an identifier"));
            };
            if !seen.insert(key.clone()) {
                return Err(syn::Error::new_spanned(name_value, "Duplicate argument"));
            }

            match key.as_str() {
                "rename_all" => parsed.rename_all = Some(string_literal(&name_value)?),
                "deny_unknown_fields" => parsed.deny_unknown_fields = bool_literal(&name_value)?,
                "omit_null" => parsed.omit_null = bool_literal(&name_value)?,
                _ => {
                    return Err(syn::Error::new_spanned(
                        name_value.path,
                        "Unsupported argument; expected rename_all, deny_unknown_fields or omit_null",
                    ));
                },
            }
        }

        Ok(parsed)
    }
}

fn string_literal(name_value: &MetaNameValue) -> syn::Result<LitStr> {
    if let syn::Expr::Lit(syn::ExprLit { lit: Lit::Str(lit), .. }) = &name_value.value {
        return Ok(lit.clone());
    }
    Err(syn::Error::new_spanned(&name_value.value, "Expected a string literal"))
}

fn bool_literal(name_value: &MetaNameValue) -> syn::Result<bool> {
    if let syn::Expr::Lit(syn::ExprLit { lit: Lit::Bool(lit), .. }) = &name_value.value {
        return Ok(lit.value);
    }
    Err(syn::Error::new_spanned(&name_value.value, "Expected a boolean literal"))
}

struct SerdeMeta {
    rename_all: Option<LitStr>,
    deny_unknown_fields: bool,
}

impl SerdeMeta {
    fn collect(attrs: &[Attribute]) -> syn::Result<Self> {
        let mut meta_info = Self { rename_all: None, deny_unknown_fields: false };

        for attr in attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
            attr.parse_nested_meta(|meta| {
                if meta.path.is_ident("rename_all") {
                    meta_info.rename_all = Some(meta.value()?.parse()?);
                } else if meta.path.is_ident("deny_unknown_fields") {
                    meta_info.deny_unknown_fields = true;
                } else {
                    skip_meta_value(&meta)?;
                }
                Ok(())
            })?;
        }

        Ok(meta_info)
    }
}

fn skip_meta_value(meta: &ParseNestedMeta<'_>) -> syn::Result<()> {
    if meta.input.peek(syn::Token![=]) {
        let _: syn::Expr = meta.value()?.parse()?;
    } else if meta.input.peek(syn::token::Paren) {
        let content;
        syn::parenthesized!(content in meta.input);
        let _: TokenStream = content.parse()?;
    }
    Ok(())
}

fn is_option(ty: &Type) -> bool {
    let Type::Path(path) = ty else {
        return false;
    };
    path.qself.is_none() && path.path.segments.last().is_some_and(|seg| seg.ident == "Option")
}

/// A field keeps its own serialization rule when it already skips or flattens.
fn field_opts_out(field: &Field) -> bool {
    let mut opted_out = false;

    for attr in field.attrs.iter().filter(|attr| attr.path().is_ident("serde")) {
        let _ = attr.parse_nested_meta(|meta| {
            if ["skip", "skip_serializing", "skip_serializing_if", "flatten"]
                .iter()
                .any(|name| meta.path.is_ident(name))
            {
                opted_out = true;
            }
            skip_meta_value(&meta)
        });
    }

    opted_out
}
