//! JSON rendering of extraction bundles.

use std::fs;
use std::path::Path;

use crate::bundle::Bundle;
use crate::error::{Error, Result};

/// JSON output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum JsonFormat {
    /// Pretty-printed JSON with indentation
    #[default]
    Pretty,
    /// Compact JSON without extra whitespace
    Compact,
}

/// Convert a bundle to JSON.
pub fn to_json(bundle: &Bundle, format: JsonFormat) -> Result<String> {
    let result = match format {
        JsonFormat::Pretty => serde_json::to_string_pretty(bundle),
        JsonFormat::Compact => serde_json::to_string(bundle),
    };

    result.map_err(|e| Error::Render(format!("JSON serialization error: {}", e)))
}

/// Write a bundle as JSON to a file.
pub fn write_json(bundle: &Bundle, format: JsonFormat, path: &Path) -> Result<()> {
    fs::write(path, to_json(bundle, format)?)?;
    log::info!("Wrote bundle JSON to {}", path.display());
    Ok(())
}
