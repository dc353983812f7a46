//! Template file loading with compiled-in fallbacks.
//!
//! Templates live under the configured prompts directory so operators can
//! edit wording without a rebuild; each caller supplies an inline fallback
//! so a missing file never breaks a search. Variable substitution uses
//! `{{key}}` syntax.

use std::fs;
use std::path::Path;

/// Load `name` from `dir`, trimmed. Falls back to the compiled-in text when
/// the file is missing, unreadable, or blank.
pub(super) fn load_or(dir: &Path, name: &str, fallback: &str) -> String {
    let path = dir.join(name);
    match fs::read_to_string(&path) {
        Ok(text) => {
            let trimmed = text.trim().to_string();
            if !trimmed.is_empty() {
                return trimmed;
            }
            tracing::debug!("template '{}' is blank — using built-in text", path.display());
        }
        Err(_) => {
            tracing::debug!("template '{}' not found — using built-in text", path.display());
        }
    }
    fallback.trim().to_string()
}

/// Replace each `{{key}}` placeholder with its value.
pub(super) fn substitute(template: &str, vars: &[(&str, &str)]) -> String {
    let mut out = template.to_string();
    for (key, value) in vars {
        let placeholder = format!("{{{{{key}}}}}");
        out = out.replace(&placeholder, value);
    }
    out
}
