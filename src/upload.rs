use crate::error::ApiError;
use crate::models::{ALLOWED_EXTENSIONS, ALLOWED_MIME_TYPES, MAX_UPLOAD_BYTES};

pub fn has_allowed_extension(filename: &str) -> bool {
    filename.rsplit_once('.').is_some_and(|(_, extension)| {
        ALLOWED_EXTENSIONS.contains(&extension.to_ascii_lowercase().as_str())
    })
}

/// Checks an uploaded image's name, declared MIME type and size.
///
/// An empty `content_type` is treated as absent.
pub fn validate_image_upload(
    filename: &str,
    content_type: &str,
    size: usize,
) -> Result<(), ApiError> {
    if filename.is_empty() {
        return Err(ApiError::BadRequest("No file selected".to_string()));
    }

    if !has_allowed_extension(filename) {
        return Err(ApiError::BadRequest(format!(
            "File type not allowed. Allowed: {}",
            ALLOWED_EXTENSIONS.join(", ")
        )));
    }

    if !content_type.is_empty() && !ALLOWED_MIME_TYPES.contains(&content_type) {
        return Err(ApiError::BadRequest(format!(
            "Invalid MIME type: {content_type}"
        )));
    }

    if size > MAX_UPLOAD_BYTES {
        return Err(ApiError::PayloadTooLarge(format!(
            "File too large. Maximum size is {} MB",
            MAX_UPLOAD_BYTES / (1024 * 1024)
        )));
    }

    if size == 0 {
        return Err(ApiError::BadRequest("Empty file uploaded".to_string()));
    }

    Ok(())
}
