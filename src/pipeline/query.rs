//! Query normalization and filename sanitization.
//!
//! User input arrives from a terminal prompt or from a form-encoded request,
//! so spaces may show up as `+`, `%20` or runs of whitespace. Everything is
//! unified to single spaces before it reaches an external API.

use super::domain::PipelineError;

/// Normalize free-text input into a canonical search string.
///
/// Fails with [`PipelineError::InvalidInput`] when nothing is left. Applying
/// it to its own output returns the same string.
pub fn normalize_query(raw: &str) -> Result<String, PipelineError> {
    let unified = raw.replace("%20", " ").replace('+', " ");
    let normalized = unified.split_whitespace().collect::<Vec<_>>().join(" ");

    if normalized.is_empty() {
        return Err(PipelineError::InvalidInput("query is empty".to_string()));
    }

    Ok(normalized)
}

/// Sanitizes a filename by replacing characters that are invalid on common filesystems
pub fn sanitize_filename(name: &str) -> String {
    let replaced: String = name
        .chars()
        .map(|c| match c {
            '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|' => '_',
            c if c.is_control() => '_',
            _ => c,
        })
        .collect();

    // Windows refuses names ending in a dot or space
    let trimmed = replaced
        .trim_start()
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace());

    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}
