//! Structured error types for pagegrid.
//!
//! Only failures that callers must see end up here. Rejected placement
//! commands return `false`, malformed style values fall back to defaults,
//! and broken images are painted as placeholders; none of those are errors.

use thiserror::Error;

/// The unified error type returned by the public pagegrid API.
#[derive(Debug, Error)]
pub enum PageGridError {
    /// JSON input failed to parse as a layout.
    #[error("Failed to parse layout: {source}{}", hint_suffix(.hint))]
    Parse {
        #[source]
        source: serde_json::Error,
        hint: String,
    },

    /// The layout parsed but breaks a structural invariant (grid bounds,
    /// element spans, duplicate ids).
    #[error("Invalid layout: {0}")]
    InvalidLayout(String),

    /// An image source could not be decoded.
    #[error("Image error: {0}")]
    Image(String),

    /// The export pipeline aborted.
    #[error("Failed to generate PDF: {0}")]
    Export(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

fn hint_suffix(hint: &str) -> String {
    if hint.is_empty() {
        String::new()
    } else {
        format!("\n  Hint: {}", hint)
    }
}

impl From<serde_json::Error> for PageGridError {
    fn from(e: serde_json::Error) -> Self {
        let hint = match e.classify() {
            serde_json::error::Category::Syntax => {
                "Check for trailing commas, missing quotes, or unescaped characters.".to_string()
            }
            serde_json::error::Category::Data => {
                "The JSON is valid but doesn't match the layout schema. Check field names and types.".to_string()
            }
            serde_json::error::Category::Eof => {
                "Unexpected end of input; is the JSON truncated?".to_string()
            }
            serde_json::error::Category::Io => String::new(),
        };
        PageGridError::Parse { source: e, hint }
    }
}
