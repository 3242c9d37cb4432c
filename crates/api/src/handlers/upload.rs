//! Handler for `/upload`: multipart media upload to Cloudinary.

use axum::extract::{Multipart, State};
use axum::Json;

use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::ApiResponse;
use crate::state::AppState;
use crate::upload::cloudinary::{UploadFile, UploadedAsset};
use crate::upload::{normalize_folder, validate_upload};

/// POST /api/upload
///
/// Expects a `file` part and an optional `folder` part. Responds 503 when
/// Cloudinary is not configured.
pub async fn upload_file(
    State(state): State<AppState>,
    auth: AuthUser,
    mut multipart: Multipart,
) -> AppResult<Json<ApiResponse<UploadedAsset>>> {
    let Some(uploader) = state.uploader.clone() else {
        return Err(AppError::Unavailable("File uploads are not configured".into()));
    };

    let mut file: Option<UploadFile> = None;
    let mut folder: Option<String> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::BadRequest(format!("Invalid multipart body: {e}")))?
    {
        match field.name() {
            Some("file") => {
                let file_name = field.file_name().unwrap_or("upload").to_string();
                let content_type = field.content_type().map(str::to_string);
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read file: {e}")))?;
                validate_upload(content_type.as_deref(), bytes.len())?;
                file = Some(UploadFile {
                    file_name,
                    content_type: content_type.unwrap_or_default(),
                    bytes: bytes.to_vec(),
                });
            }
            Some("folder") => {
                let text = field
                    .text()
                    .await
                    .map_err(|e| AppError::BadRequest(format!("Failed to read folder: {e}")))?;
                folder = Some(text);
            }
            _ => {}
        }
    }

    let file = file.ok_or_else(|| AppError::BadRequest("Missing 'file' field".into()))?;
    let folder = normalize_folder(folder.as_deref());
    let size = file.bytes.len();

    let asset = uploader.upload(file, &folder).await.map_err(|e| {
        tracing::error!(error = %e, user_id = auth.user_id, "Cloudinary upload failed");
        AppError::Unavailable("Upload failed, please try again later".into())
    })?;

    tracing::info!(
        user_id = auth.user_id,
        public_id = %asset.public_id,
        bytes = size,
        "File uploaded"
    );
    Ok(Json(ApiResponse::ok(asset).with_message("File uploaded")))
}
