#![allow(unreachable_pub)]
#![allow(clippy::needless_pass_by_value)]

//! # Macros
//!
//! Attribute macros shared by every crate in the workspace:
//!
//! * [`sc_error`] turns an enum into a context-carrying error type.
//! * [`api_model`] applies the API's JSON conventions to a DTO.
//! * [`api_handler`] documents an Axum handler with `utoipa`.

mod macros;

use proc_macro::TokenStream;
use syn::{DeriveInput, ItemFn, ItemStruct, parse_macro_input};

/// Defines a request or response model that follows the API's wire conventions.
///
/// # Injected Behaviors
///
/// * **Derives**: `Debug`, `Serialize`, `Deserialize` and `utoipa::ToSchema` when missing.
/// * **Serde Policy**:
///     * `rename_all = "camelCase"` by default (can be overridden).
///     * every `Option<_>` field gets `skip_serializing_if = "Option::is_none"`, so nulls
///       never reach the wire (disable with `omit_null = false`).
///     * `deny_unknown_fields` is opt-in.
///
/// # Example
///
/// ```rust,ignore
/// use sc_derive::api_model;
///
/// #[api_model]
/// pub struct PointOfContact {
///     pub name: String,
///     pub email: Option<String>,
/// }
/// ```
#[proc_macro_attribute]
pub fn api_model(attr: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemStruct);
    macros::api::expand_api_model(attr.into(), input).into()
}

/// Bridges an Axum handler with `OpenAPI` documentation.
///
/// Accepts standard `utoipa::path` arguments such as `get`, `post`, `path = "..."`,
/// `responses(...)`, and `tag = "..."`.
///
/// # Example
///
/// ```rust,ignore
/// use sc_derive::api_handler;
///
/// #[api_handler(
///     get,
///     path = "/health",
///     responses((status = OK, body = HealthResponse)),
///     tag = "System"
/// )]
/// pub async fn health_handler() -> impl IntoResponse {
///     // ...
/// }
/// ```
#[proc_macro_attribute]
pub fn api_handler(args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as ItemFn);
    macros::api::expand_api_handler(args.into(), input).into()
}

/// Defines a crate error enum with optional context on every variant.
///
/// # Generated Items
///
/// * `#[derive(Debug, thiserror::Error)]` unless already present.
/// * `<ErrorName>Ext` trait with `.context(...)` for `Result<T, ErrorName>` and for
///   `Result<T, SourceError>` of every variant that wraps a source.
/// * `From<SourceError>` for variants with a `source` field (or `#[source]`/`#[from]`).
/// * `From<&'static str>` and `From<String>` when an `Internal` variant exists.
/// * A module-local `format_context` helper for the `#[error(...)]` strings.
///
/// # Requirements
///
/// 1. Only enums are accepted.
/// 2. Variants must use named fields.
/// 3. A `context` field must be `Option<Cow<'static, str>>`, and variants with a source must have one.
///
/// # Example
///
/// ```rust,ignore
/// use sc_derive::sc_error;
/// use std::borrow::Cow;
///
/// #[sc_error]
/// pub enum DatabaseError {
///     #[error("SurrealDB error{}: {source}", format_context(.context))]
///     Surreal { source: surrealdb::Error, context: Option<Cow<'static, str>> },
///
///     #[error("Internal database error{}: {message}", format_context(.context))]
///     Internal { message: Cow<'static, str>, context: Option<Cow<'static, str>> },
/// }
/// ```
#[proc_macro_attribute]
pub fn sc_error(_args: TokenStream, item: TokenStream) -> TokenStream {
    let input = parse_macro_input!(item as DeriveInput);
    macros::error::expand_derive(input).into()
}
