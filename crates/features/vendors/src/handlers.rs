use crate::Techs;
use crate::documents::VendorDocument;
use crate::error::{VendorsError, VendorsErrorExt};
use crate::models::{AddedBy, CommercialVendorCreateModel, CommercialVendorDetailsModel, TechInfo};
use axum::extract::Path;
use axum::http::{StatusCode, header};
use axum::response::IntoResponse;
use chrono::Utc;
use sc_database::DocumentSession;
use sc_derive::api_handler;
use sc_kernel::domain::constants::VENDORS_TAG;
use sc_kernel::safe_nanoid;
use sc_kernel::security::{JwtIdentity, ProvideIdentity};
use sc_kernel::server::{ApiJson, ProblemDetails, ValidJson};
use tracing::{info, warn};

pub(crate) const COLLECTION_PATH: &str = "/commercial-vendors";

#[api_handler(
    post,
    path = "/commercial-vendors",
    request_body = CommercialVendorCreateModel,
    responses(
        (status = CREATED, description = "Vendor added", body = CommercialVendorDetailsModel,
            headers(("Location" = String, description = "Address of the new vendor"))),
        (status = BAD_REQUEST, description = "Malformed or invalid body", body = ProblemDetails),
        (status = UNAUTHORIZED, description = "Missing or invalid bearer token", body = ProblemDetails),
        (status = FORBIDDEN, description = "Caller lacks the SoftwareCenter and Manager roles", body = ProblemDetails),
        (status = BAD_GATEWAY, description = "Tech lookup failed", body = ProblemDetails),
    ),
    security(("bearer" = [])),
    tag = VENDORS_TAG,
)]
pub(crate) async fn add_vendor(
    identity: JwtIdentity,
    Techs(techs): Techs,
    session: DocumentSession,
    ValidJson(model): ValidJson<CommercialVendorCreateModel>,
) -> Result<impl IntoResponse, VendorsError> {
    let tech = techs.find_tech(identity.subject()).await?;
    let added_by = added_by(&identity, tech);

    let id = safe_nanoid!();
    let document = VendorDocument::new(id.clone(), model, added_by, Utc::now());
    session.insert(document.clone()).await.context("Storing vendor")?;
    info!(vendor = %id, subject = identity.subject(), "Commercial vendor added");

    let location = format!("{COLLECTION_PATH}/{id}");
    Ok((StatusCode::CREATED, [(header::LOCATION, location)], ApiJson(document.into_details()?)))
}

#[api_handler(
    get,
    path = "/commercial-vendors",
    responses(
        (status = OK, description = "Every vendor, oldest first", body = [CommercialVendorDetailsModel]),
        (status = UNAUTHORIZED, description = "Missing or invalid bearer token", body = ProblemDetails),
    ),
    security(("bearer" = [])),
    tag = VENDORS_TAG,
)]
pub(crate) async fn list_vendors(
    session: DocumentSession,
) -> Result<ApiJson<Vec<CommercialVendorDetailsModel>>, VendorsError> {
    let vendors = session
        .list::<VendorDocument>()
        .await
        .context("Listing vendors")?
        .into_iter()
        .map(VendorDocument::into_details)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(ApiJson(vendors))
}

#[api_handler(
    get,
    path = "/commercial-vendors/{id}",
    params(("id" = String, Path, description = "Vendor id")),
    responses(
        (status = OK, description = "The vendor", body = CommercialVendorDetailsModel),
        (status = UNAUTHORIZED, description = "Missing or invalid bearer token", body = ProblemDetails),
        (status = NOT_FOUND, description = "No vendor with this id", body = ProblemDetails),
    ),
    security(("bearer" = [])),
    tag = VENDORS_TAG,
)]
pub(crate) async fn get_vendor(
    session: DocumentSession,
    Path(id): Path<String>,
) -> Result<ApiJson<CommercialVendorDetailsModel>, VendorsError> {
    let document = session.load::<VendorDocument>(&id).await.context("Loading vendor")?.ok_or_else(|| {
        VendorsError::NotFound { message: format!("No vendor with id '{id}'").into(), context: None }
    })?;
    Ok(ApiJson(document.into_details()?))
}

/// Prefers the tech API's record and falls back to the token's claims.
fn added_by(identity: &JwtIdentity, tech: Option<TechInfo>) -> AddedBy {
    match tech {
        Some(tech) => AddedBy {
            subject: tech.subject,
            name: Some(tech.name),
            email: tech.email.or_else(|| identity.email().map(ToOwned::to_owned)),
        },
        None => {
            warn!(subject = identity.subject(), "Tech API has no record of the caller; using token claims");
            AddedBy {
                subject: identity.subject().to_owned(),
                name: identity.name().map(ToOwned::to_owned),
                email: identity.email().map(ToOwned::to_owned),
            }
        },
    }
}
