use axum::{
    body::Bytes,
    extract::{Query, State},
    http::StatusCode,
    Json,
};
use serde::Deserialize;
use utoipa::IntoParams;

use crate::api::docs::ErrorBody;
use crate::api::errors::ApiError;
use crate::api::middleware::AuthenticatedUser;
use crate::services::{MediaError, UploadedImage};
use crate::state::AppState;

#[derive(Debug, Deserialize, IntoParams)]
#[into_params(parameter_in = Query)]
pub struct UploadParams {
    /// Original file name, used as the storage hint
    pub file_name: String,
}

/// Upload an image to cloud storage
///
/// POST /api/media/images?file_name=cover.png
#[utoipa::path(
    post,
    path = "/api/media/images",
    tag = "media",
    params(UploadParams),
    request_body(content = String, description = "Raw image bytes", content_type = "application/octet-stream"),
    responses(
        (status = 201, description = "Image stored", body = UploadedImage),
        (status = 400, description = "Empty or invalid image", body = ErrorBody),
        (status = 401, description = "Missing or invalid bearer token", body = ErrorBody),
        (status = 503, description = "Cloud storage not configured", body = ErrorBody)
    )
)]
pub async fn upload_image(
    State(state): State<AppState>,
    user: AuthenticatedUser,
    Query(params): Query<UploadParams>,
    body: Bytes,
) -> Result<(StatusCode, Json<UploadedImage>), ApiError> {
    if body.is_empty() {
        return Err(MediaError::InvalidImage("empty body".to_string()).into());
    }

    let image = state
        .cloudinary
        .upload_image(&params.file_name, body.to_vec())
        .await?;
    tracing::info!(user_id = %user.id, public_id = %image.public_id, "image uploaded");

    Ok((StatusCode::CREATED, Json(image)))
}
