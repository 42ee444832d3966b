// Translation catalog check
use std::path::Path;
use tracing::info;

use crate::domain::{validate_translations, TranslationError, TranslationSummary};

/// Read, parse and validate a translations file
pub fn check_translations_file(path: &Path) -> Result<TranslationSummary, TranslationError> {
    let shown = path.display().to_string();

    let content = std::fs::read_to_string(path).map_err(|source| TranslationError::Io {
        path: shown.clone(),
        source,
    })?;
    let document: serde_json::Value =
        serde_json::from_str(&content).map_err(|source| TranslationError::Parse {
            path: shown.clone(),
            source,
        })?;

    let summary = validate_translations(&document)?;
    info!(path = %shown, keys = summary.keys, "Translations file valid");
    Ok(summary)
}
