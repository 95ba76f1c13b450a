//! Input validation rules shared by the service layer and the client.

use once_cell::sync::Lazy;
use regex::Regex;

use crate::defaults::{LABEL_NAME_MAX_LEN, NOTE_COLOR};
use crate::error::{Error, Result};

static HEX_COLOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#([A-Fa-f0-9]{6}|[A-Fa-f0-9]{3})$").expect("valid color regex"));

/// Reject non-positive identifiers.
///
/// `kind` is the human name used in the message ("note", "label", "user").
pub fn validate_id(id: i64, kind: &str) -> Result<()> {
    if id <= 0 {
        return Err(Error::Validation(format!("Invalid {} ID", kind)));
    }
    Ok(())
}

/// Reject a non-positive caller id.
pub fn validate_owner(owner_id: i64) -> Result<()> {
    validate_id(owner_id, "user")
}

/// True when `color` is `#RGB` or `#RRGGBB`.
pub fn is_valid_color(color: &str) -> bool {
    HEX_COLOR.is_match(color)
}

/// Validate an explicitly requested color, returning it trimmed.
pub fn validate_color(color: &str) -> Result<String> {
    let trimmed = color.trim();
    if trimmed.is_empty() {
        return Err(Error::Validation("Color is required".to_string()));
    }
    if !is_valid_color(trimmed) {
        return Err(Error::Validation(
            "Invalid color format. Use hex format (e.g., #ffffff)".to_string(),
        ));
    }
    Ok(trimmed.to_string())
}

/// Color for a newly created note: the requested one when valid, else the default.
pub fn color_or_default(color: Option<&str>) -> String {
    color
        .map(str::trim)
        .filter(|c| is_valid_color(c))
        .map(str::to_string)
        .unwrap_or_else(|| NOTE_COLOR.to_string())
}

/// Trim and validate a label name.
///
/// Rules:
/// - Required, and non-blank after trimming
/// - At most 50 characters
pub fn normalize_label_name(name: Option<&str>) -> Result<String> {
    let trimmed = name.map(str::trim).unwrap_or_default();
    if trimmed.is_empty() {
        return Err(Error::Validation("Label name is required".to_string()));
    }
    if trimmed.chars().count() > LABEL_NAME_MAX_LEN {
        return Err(Error::Validation(format!(
            "Label name must be {} characters or less",
            LABEL_NAME_MAX_LEN
        )));
    }
    Ok(trimmed.to_string())
}

/// Case-insensitive label name comparison.
pub fn label_names_equal(a: &str, b: &str) -> bool {
    a.to_lowercase() == b.to_lowercase()
}

/// Deduplicate ids keeping first-seen order.
pub fn dedup_ids(ids: &[i64]) -> Vec<i64> {
    let mut seen = std::collections::HashSet::with_capacity(ids.len());
    ids.iter().copied().filter(|id| seen.insert(*id)).collect()
}
