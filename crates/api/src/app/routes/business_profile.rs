//! The caller's business profile and its image assets.

use std::sync::Arc;

use axum::{
    Router,
    body::Bytes,
    extract::{Extension, Multipart, Path, multipart::MultipartRejection},
    http::StatusCode,
    response::Response,
    routing::{get, post, put},
};
use chrono::Utc;

use invoiceai_core::{DomainError, ProfileId};
use invoiceai_invoicing::{AssetKind, ProfileInput};

use crate::app::dto;
use crate::app::errors::{ApiError, json_ok};
use crate::app::services::AppServices;
use crate::context::PrincipalContext;

const RESOURCE: &str = "Business profile";

pub fn router() -> Router {
    Router::new()
        .route("/", post(create_profile))
        .route("/me", get(my_profile))
        .route("/:id", put(update_profile))
        .route("/:id/assets/:kind", post(upload_asset))
}

fn parse_id(id: &str) -> Result<ProfileId, ApiError> {
    id.parse().map_err(ApiError::domain(RESOURCE))
}

pub async fn my_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
) -> Result<Response, ApiError> {
    let profile = services
        .profiles
        .for_owner(principal.owner_id())
        .ok_or(DomainError::NotFound)
        .map_err(ApiError::domain(RESOURCE))?;
    Ok(json_ok(StatusCode::OK, profile))
}

pub async fn create_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let input: ProfileInput = dto::parse_body(&body)?;
    let profile = services
        .profiles
        .create(principal.owner_id(), input, Utc::now())
        .map_err(ApiError::domain(RESOURCE))?;
    Ok(json_ok(StatusCode::CREATED, profile))
}

pub async fn update_profile(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path(id): Path<String>,
    body: Bytes,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let input: ProfileInput = dto::parse_body(&body)?;
    let profile = services
        .profiles
        .update(principal.owner_id(), &id, input, Utc::now())
        .map_err(ApiError::domain(RESOURCE))?;
    Ok(json_ok(StatusCode::OK, profile))
}

/// `POST /:id/assets/:kind`: multipart upload of a logo, stamp or signature.
///
/// The image is read from the `file` field (or the first field carrying a
/// file name). A replaced image is removed from disk.
pub async fn upload_asset(
    Extension(services): Extension<Arc<AppServices>>,
    Extension(principal): Extension<PrincipalContext>,
    Path((id, kind)): Path<(String, String)>,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Response, ApiError> {
    let id = parse_id(&id)?;
    let kind: AssetKind = kind.parse().map_err(ApiError::domain(RESOURCE))?;
    let owner = principal.owner_id();

    // Fail before touching the disk when the profile is not the caller's.
    services
        .profiles
        .get(owner, &id)
        .map_err(ApiError::domain(RESOURCE))?;

    let mut multipart = multipart.map_err(|e| ApiError::bad_request(e.body_text()))?;
    let (file_name, content_type, bytes) = read_file_field(&mut multipart)
        .await?
        .ok_or_else(|| ApiError::bad_request("No file provided"))?;

    let url = services
        .uploads
        .save(file_name.as_deref(), content_type.as_deref(), &bytes)
        .await?;

    let (profile, previous) = match services.profiles.set_asset(owner, &id, kind, url.clone(), Utc::now()) {
        Ok(v) => v,
        Err(e) => {
            // Profile vanished between the check and the write.
            if let Err(err) = services.uploads.remove(&url).await {
                tracing::warn!(error = %err, url = %url, "failed to discard orphaned upload");
            }
            return Err(ApiError::domain(RESOURCE)(e));
        }
    };

    if let Some(previous) = previous {
        if let Err(e) = services.uploads.remove(&previous).await {
            tracing::warn!(error = %e, url = %previous, "failed to remove replaced asset");
        }
    }

    tracing::info!(owner = %owner, profile_id = %id, kind = kind.as_str(), url = %url, "asset uploaded");
    Ok(json_ok(StatusCode::OK, profile))
}

type FileField = (Option<String>, Option<String>, Bytes);

async fn read_file_field(multipart: &mut Multipart) -> Result<Option<FileField>, ApiError> {
    loop {
        let field = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(e.body_text()))?;
        let Some(field) = field else {
            return Ok(None);
        };

        if field.name() == Some("file") || field.file_name().is_some() {
            let file_name = field.file_name().map(str::to_string);
            let content_type = field.content_type().map(str::to_string);
            let bytes = field
                .bytes()
                .await
                .map_err(|e| ApiError::bad_request(e.body_text()))?;
            return Ok(Some((file_name, content_type, bytes)));
        }
    }
}
