//! Title and emoji rules for saved lists

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_EMOJI: &str = "📋";

/// Longest title accepted from input, in characters
pub const MAX_TITLE_LEN: usize = 50;

/// Titles longer than this are shortened on list cards
pub const DISPLAY_TITLE_LEN: usize = 20;

/// Trimmed title, or a validation error when nothing is left
pub fn validate_title(raw: &str) -> ApiResult<String> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(ApiError::Validation("List name is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LEN {
        return Err(ApiError::Validation(format!(
            "List name must be at most {} characters",
            MAX_TITLE_LEN
        )));
    }
    Ok(title.to_string())
}

/// Whether a create/save action should be enabled for this input
pub fn is_submittable(raw: &str) -> bool {
    validate_title(raw).is_ok()
}

pub fn emoji_or_default(emoji: Option<&str>) -> String {
    match emoji.map(str::trim) {
        Some(e) if !e.is_empty() => e.to_string(),
        _ => DEFAULT_EMOJI.to_string(),
    }
}

/// Cut to `max` characters including a trailing `…`
pub fn truncate_title(title: &str, max: usize) -> String {
    if title.chars().count() <= max || max == 0 {
        return title.to_string();
    }
    let mut out: String = title.chars().take(max - 1).collect();
    out.push('…');
    out
}
