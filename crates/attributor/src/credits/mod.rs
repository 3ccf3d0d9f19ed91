//! Credits export
//!
//! Renders a resolved [`AttributionSet`] as a Markdown credits document or as
//! JSON for other tools.

pub mod markdown;

use std::fmt;
use std::str::FromStr;

use crate::error::{AttributorError, Result};
use crate::resolver::AttributionSet;

/// Output format of the credits document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CreditsFormat {
    #[default]
    Markdown,
    Json,
}

impl CreditsFormat {
    pub fn render(self, set: &AttributionSet) -> Result<String> {
        match self {
            CreditsFormat::Markdown => Ok(markdown::render(set)),
            CreditsFormat::Json => serde_json::to_string_pretty(set)
                .map(|mut json| {
                    json.push('\n');
                    json
                })
                .map_err(|source| AttributorError::Export {
                    format: self.to_string(),
                    source,
                }),
        }
    }

    pub fn file_extension(self) -> &'static str {
        match self {
            CreditsFormat::Markdown => "md",
            CreditsFormat::Json => "json",
        }
    }
}

impl fmt::Display for CreditsFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CreditsFormat::Markdown => write!(f, "markdown"),
            CreditsFormat::Json => write!(f, "json"),
        }
    }
}

impl FromStr for CreditsFormat {
    type Err = AttributorError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(CreditsFormat::Markdown),
            "json" => Ok(CreditsFormat::Json),
            other => Err(AttributorError::Configuration {
                message: format!("unknown credits format '{}'", other),
                field: Some("format".to_string()),
                suggestion: Some("Use 'markdown' or 'json'".to_string()),
            }),
        }
    }
}
