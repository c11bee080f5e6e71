//! Product image upload.

use axum::{
    Json,
    extract::{Multipart, State, multipart::MultipartError},
    http::StatusCode,
};
use serde::Serialize;

use crate::error::AppError;
use crate::middleware::RequireAdmin;
use crate::services::upload::{ImageUpload, UploadError, save_image};
use crate::state::AppState;

/// Multipart field carrying the image.
const IMAGE_FIELD: &str = "image";

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct UploadResponse {
    pub success: bool,
    pub image_url: String,
}

fn multipart_error(err: MultipartError) -> AppError {
    if err.status() == StatusCode::PAYLOAD_TOO_LARGE {
        UploadError::TooLarge.into()
    } else {
        AppError::BadRequest(err.body_text())
    }
}

/// POST /api/admin/upload - Store a PNG, JPEG or WebP image under
/// `/images/products/`.
pub async fn upload(
    State(state): State<AppState>,
    RequireAdmin(_): RequireAdmin,
    mut multipart: Multipart,
) -> Result<Json<UploadResponse>, AppError> {
    while let Some(field) = multipart.next_field().await.map_err(multipart_error)? {
        if field.name() != Some(IMAGE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_owned();
        let content_type = field.content_type().unwrap_or_default().to_owned();
        let bytes = field.bytes().await.map_err(multipart_error)?;

        let image_url = save_image(
            &state.config().upload_dir(),
            ImageUpload {
                file_name: &file_name,
                content_type: &content_type,
                bytes: &bytes,
            },
        )
        .await?;

        return Ok(Json(UploadResponse {
            success: true,
            image_url,
        }));
    }

    Err(UploadError::NoFile.into())
}
