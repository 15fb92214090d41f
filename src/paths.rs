//! Relative path normalization shared by configuration loading and generation.
use crate::error::{Result, SetupError};

/// Normalize a user-supplied relative path.
///
/// Trims whitespace, converts backslashes to forward slashes, and strips
/// leading/trailing slashes. Absolute paths, home-relative paths, and any
/// `..` segment are rejected so every rendered path stays inside the roots
/// the caller joins it against.
pub fn normalize_relative_path(raw: &str, label: &str) -> Result<String> {
    let value = raw.trim().replace('\\', "/");
    let value = value.trim_matches('/');
    if value.is_empty() {
        return Err(SetupError::InvalidPath {
            label: label.to_string(),
            raw: raw.to_string(),
        });
    }
    if value.starts_with('~') {
        return Err(SetupError::InvalidPath {
            label: label.to_string(),
            raw: raw.to_string(),
        });
    }
    if value.split('/').any(|segment| segment == "..") {
        return Err(SetupError::InvalidPath {
            label: label.to_string(),
            raw: raw.to_string(),
        });
    }
    Ok(value.to_string())
}
