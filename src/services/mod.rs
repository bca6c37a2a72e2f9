//! Domain operations. Each takes the calling [`Actor`](crate::auth::Actor)
//! explicitly, applies the access rules and returns response DTOs.

pub mod offers;
pub mod orders;
pub mod profiles;
pub mod reviews;

use crate::error::{AppError, AppResult};
use crate::storage::ImageFormat;

/// Non-blank text no longer than `max` characters.
pub(crate) fn require_text(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.trim().is_empty() {
        return Err(AppError::validation(field, "This field may not be blank."));
    }
    if value.chars().count() > max {
        return Err(AppError::validation(
            field,
            format!("Ensure this field has no more than {max} characters."),
        ));
    }
    Ok(())
}

/// Optional text: may be empty, but no longer than `max` characters.
pub(crate) fn limit_text(field: &str, value: &str, max: usize) -> AppResult<()> {
    if value.chars().count() > max {
        return Err(AppError::validation(
            field,
            format!("Ensure this field has no more than {max} characters."),
        ));
    }
    Ok(())
}

/// A non-empty PNG or JPEG upload. Anything above `max_bytes` is a 413.
pub(crate) fn check_image(
    field: &str,
    content_type: &str,
    bytes: &[u8],
    max_bytes: usize,
) -> AppResult<ImageFormat> {
    let format = ImageFormat::from_content_type(content_type)
        .ok_or_else(|| AppError::validation(field, "Only PNG and JPEG images are accepted."))?;
    if bytes.is_empty() {
        return Err(AppError::validation(field, "The submitted file is empty."));
    }
    if bytes.len() > max_bytes {
        return Err(AppError::PayloadTooLarge(format!(
            "The file may not be larger than {max_bytes} bytes."
        )));
    }
    Ok(format)
}
