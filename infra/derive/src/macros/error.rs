use super::derived_trait_names;
use proc_macro2::TokenStream;
use quote::{format_ident, quote};
use syn::{Attribute, Data, DeriveInput, Field, Fields, FieldsNamed, Ident, Type, Variant};

struct ErrorVariant<'a> {
    ident: &'a Ident,
    source: Option<(&'a Ident, &'a Type)>,
    has_context: bool,
    cfg_attrs: Vec<Attribute>,
}

impl<'a> ErrorVariant<'a> {
    fn parse(variant: &'a Variant) -> syn::Result<Self> {
        let Fields::Named(fields) = &variant.fields else {
            return Err(syn::Error::new_spanned(
                variant,
                "sc_error requires named fields for source/context handling",
            ));
        };

        let has_context = context_field(fields)?.is_some();
        let source = source_field(fields).and_then(|f| f.ident.as_ref().map(|ident| (ident, &f.ty)));

        if source.is_some() && !has_context {
            return Err(syn::Error::new_spanned(
                &variant.ident,
                "sc_error requires `context: Option<Cow<'static, str>>` for variants with a source",
            ));
        }

        Ok(Self {
            ident: &variant.ident,
            source,
            has_context,
            cfg_attrs: variant.attrs.iter().filter(|a| a.path().is_ident("cfg")).cloned().collect(),
        })
    }

    fn is_internal(&self) -> bool {
        self.ident == "Internal"
    }
}

pub fn expand_derive(input: DeriveInput) -> TokenStream {
    let Data::Enum(data) = &input.data else {
        return syn::Error::new_spanned(&input.ident, "sc_error can only be applied to enums")
            .to_compile_error();
    };

    let variants = match data.variants.iter().map(ErrorVariant::parse).collect::<syn::Result<Vec<_>>>() {
        Ok(variants) => variants,
        Err(err) => return err.to_compile_error(),
    };

    let name = &input.ident;
    let ext = format_ident!("{name}Ext");

    let derives = derived_trait_names(&input.attrs);
    let mut missing = Vec::new();
    if !derives.contains("Debug") {
        missing.push(quote! { Debug });
    }
    if !derives.contains("Error") {
        missing.push(quote! { ::thiserror::Error });
    }
    let derive_attr = if missing.is_empty() { quote! {} } else { quote! { #[derive(#(#missing),*)] } };

    let context_arms = variants.iter().filter(|v| v.has_context).map(|v| {
        let ident = v.ident;
        let cfg_attrs = &v.cfg_attrs;
        quote! { #(#cfg_attrs)* #name::#ident { context: slot, .. } => *slot = Some(context.into()), }
    });

    let source_impls = variants.iter().filter(|v| !v.is_internal()).filter_map(|v| {
        let (field, ty) = v.source?;
        let ident = v.ident;
        let cfg_attrs = &v.cfg_attrs;
        Some(quote! {
            #(#cfg_attrs)*
            #[automatically_derived]
            impl From<#ty> for #name {
                #[inline]
                fn from(#field: #ty) -> Self {
                    Self::#ident { #field, context: None }
                }
            }

            #(#cfg_attrs)*
            #[automatically_derived]
            impl<T> #ext<T> for ::std::result::Result<T, #ty> {
                #[inline]
                fn context(
                    self,
                    context: impl Into<::std::borrow::Cow<'static, str>>,
                ) -> ::std::result::Result<T, #name> {
                    self.map_err(|#field| #name::#ident { #field, context: Some(context.into()) })
                }
            }
        })
    });

    let internal_impls = variants.iter().find(|v| v.is_internal()).map(|v| {
        let cfg_attrs = &v.cfg_attrs;
        quote! {
            #(#cfg_attrs)*
            impl From<&'static str> for #name {
                #[inline]
                fn from(message: &'static str) -> Self {
                    Self::Internal { message: ::std::borrow::Cow::Borrowed(message), context: None }
                }
            }

            #(#cfg_attrs)*
            impl From<String> for #name {
                #[inline]
                fn from(message: String) -> Self {
                    Self::Internal { message: ::std::borrow::Cow::Owned(message), context: None }
                }
            }
        }
    });

    quote! {
        #[allow(non_shorthand_field_patterns)]
        #derive_attr
        #input

        /// Attaches human-readable context to a failing result.
        pub trait #ext<T> {
            /// Wraps the error (if any) with the given context.
            ///
            /// # Errors
            /// Returns the original error, converted and annotated.
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> ::std::result::Result<T, #name>;
        }

        #[automatically_derived]
        impl<T> #ext<T> for ::std::result::Result<T, #name> {
            #[inline]
            fn context(self, context: impl Into<::std::borrow::Cow<'static, str>>) -> Self {
                self.map_err(|mut err| {
                    match &mut err {
                        #(#context_arms)*
                        _ => {},
                    }
                    err
                })
            }
        }

        #(#source_impls)*
        #internal_impls

        #[allow(dead_code)]
        fn format_context(
            context: &Option<::std::borrow::Cow<'static, str>>,
        ) -> ::std::borrow::Cow<'static, str> {
            context.as_ref().map_or(::std::borrow::Cow::Borrowed(""), |c| {
                ::std::borrow::Cow::Owned(format!(" ({c})"))
            })
        }
    }
}

fn context_field(fields: &FieldsNamed) -> syn::Result<Option<&Field>> {
    let Some(field) = fields.named.iter().find(|f| f.ident.as_ref().is_some_and(|i| i == "context"))
    else {
        return Ok(None);
    };

    if is_optional_static_cow(&field.ty) {
        Ok(Some(field))
    } else {
        Err(syn::Error::new_spanned(&field.ty, "context field must be Option<Cow<'static, str>>"))
    }
}

fn source_field(fields: &FieldsNamed) -> Option<&Field> {
    fields.named.iter().find(|field| {
        field.ident.as_ref().is_some_and(|ident| ident == "source")
            || field.attrs.iter().any(|a| a.path().is_ident("source") || a.path().is_ident("from"))
    })
}

/// Matches `Option<Cow<'static, str>>`, with or without leading paths.
fn is_optional_static_cow(ty: &Type) -> bool {
    let Some(inner) = single_generic(ty, "Option") else {
        return false;
    };
    let Type::Path(path) = inner else {
        return false;
    };
    let Some(segment) = path.path.segments.last().filter(|s| s.ident == "Cow") else {
        return false;
    };
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return false;
    };

    let mut args = args.args.iter();
    let lifetime_ok = matches!(args.next(), Some(syn::GenericArgument::Lifetime(lt)) if lt.ident == "static");
    let str_ok = matches!(
        args.next(),
        Some(syn::GenericArgument::Type(Type::Path(p))) if p.path.segments.last().is_some_and(|s| s.ident == "str")
    );

    lifetime_ok && str_ok && args.next().is_none()
}

fn single_generic<'t>(ty: &'t Type, wrapper: &str) -> Option<&'t Type> {
    let Type::Path(path) = ty else {
        return None;
    };
    let segment = path.path.segments.last().filter(|s| s.ident == wrapper)?;
    let syn::PathArguments::AngleBracketed(args) = &segment.arguments else {
        return None;
    };
    match args.args.first()? {
        syn::GenericArgument::Type(inner) => Some(inner),
        _ => None,
    }
}
