//! Media uploads: request validation and the Cloudinary client.

pub mod cloudinary;

use collabbridge_core::error::CoreError;

/// Largest accepted upload.
pub const MAX_UPLOAD_BYTES: usize = 10 * 1024 * 1024;

/// Folder used when the client does not name one.
pub const DEFAULT_FOLDER: &str = "collabbridge";

/// Accept images, videos and PDFs up to [`MAX_UPLOAD_BYTES`].
pub fn validate_upload(content_type: Option<&str>, size: usize) -> Result<(), CoreError> {
    if size == 0 {
        return Err(CoreError::Validation("Uploaded file is empty".into()));
    }
    if size > MAX_UPLOAD_BYTES {
        return Err(CoreError::Validation(format!(
            "File exceeds the {} MB limit",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }
    let allowed = content_type.is_some_and(|ct| {
        ct.starts_with("image/") || ct.starts_with("video/") || ct == "application/pdf"
    });
    if !allowed {
        return Err(CoreError::Validation(
            "Only image, video and PDF files can be uploaded".into(),
        ));
    }
    Ok(())
}

/// Restrict a client-supplied folder to a safe path under the default.
pub fn normalize_folder(folder: Option<&str>) -> String {
    let cleaned: String = folder
        .unwrap_or_default()
        .split('/')
        .map(|seg| {
            seg.chars()
                .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-')
                .collect::<String>()
        })
        .filter(|seg| !seg.is_empty())
        .collect::<Vec<_>>()
        .join("/");
    if cleaned.is_empty() {
        DEFAULT_FOLDER.to_string()
    } else {
        format!("{DEFAULT_FOLDER}/{cleaned}")
    }
}
