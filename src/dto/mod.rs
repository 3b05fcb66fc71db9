use crate::error::{AppError, AppResult};

pub mod auth;
pub mod orders;
pub mod vendors;

pub(crate) fn required(field: &str, value: String) -> AppResult<String> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(missing(field));
    }
    Ok(trimmed.to_string())
}

pub(crate) fn missing(field: &str) -> AppError {
    AppError::Validation(format!("{field} is required"))
}

/// Trimmed and lowercased. An empty value passes through so callers decide
/// whether the field is optional.
pub(crate) fn normalize_email(field: &str, value: &str) -> AppResult<String> {
    let email = value.trim().to_lowercase();
    if !email.is_empty() && !email.contains('@') {
        return Err(AppError::Validation(format!(
            "{field} must be a valid email address"
        )));
    }
    Ok(email)
}
