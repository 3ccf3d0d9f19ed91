//! Error types for the attributor with context and recovery information

use std::error::Error;
use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort a whole attribution run
///
/// Per-project catalog failures are not represented here; they are captured
/// as [`crate::catalog::CatalogError`] inside the resolved entries instead.
#[derive(Error, Debug)]
pub enum AttributorError {
    /// The manifest could not be decoded into mod references
    #[error("Malformed manifest: {reason}")]
    MalformedManifest {
        reason: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// File system I/O errors with file context
    #[error("File operation failed on '{path}'")]
    FileSystem {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The modpack archive could not be opened or read
    #[error("Failed to read modpack archive '{path}'")]
    Archive {
        path: PathBuf,
        #[source]
        source: zip::result::ZipError,
    },

    /// Configuration errors
    #[error("Invalid configuration: {message}")]
    Configuration {
        message: String,
        field: Option<String>,
        suggestion: Option<String>,
    },

    /// The HTTP client could not be constructed
    #[error("Failed to build HTTP client")]
    HttpClient {
        #[source]
        source: reqwest::Error,
    },

    /// The credits document could not be serialized
    #[error("Failed to export credits as {format}")]
    Export {
        format: String,
        #[source]
        source: serde_json::Error,
    },
}

pub type Result<T> = std::result::Result<T, AttributorError>;

impl AttributorError {
    /// Build a malformed-manifest error from a decode failure
    pub fn malformed<S, E>(reason: S, source: E) -> Self
    where
        S: Into<String>,
        E: std::error::Error + Send + Sync + 'static,
    {
        AttributorError::MalformedManifest {
            reason: reason.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Check if error is recoverable (worth retrying the whole run)
    pub fn is_recoverable(&self) -> bool {
        match self {
            AttributorError::FileSystem { source, .. } => matches!(
                source.kind(),
                std::io::ErrorKind::Interrupted
                    | std::io::ErrorKind::TimedOut
                    | std::io::ErrorKind::WouldBlock
            ),
            AttributorError::MalformedManifest { .. } => false, // Data issue
            AttributorError::Archive { .. } => false,           // Data issue
            AttributorError::Configuration { .. } => false,     // Configuration issue
            AttributorError::HttpClient { .. } => false,        // Configuration issue
            AttributorError::Export { .. } => false,
        }
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            AttributorError::MalformedManifest { .. } => "malformed_manifest",
            AttributorError::FileSystem { .. } => "file_system",
            AttributorError::Archive { .. } => "archive",
            AttributorError::Configuration { .. } => "configuration",
            AttributorError::HttpClient { .. } => "http_client",
            AttributorError::Export { .. } => "export",
        }
    }

    /// Get user-friendly suggestion for resolving the error
    pub fn suggestion(&self) -> Option<&str> {
        match self {
            AttributorError::MalformedManifest { .. } => {
                Some("Make sure the file is a CurseForge modpack or its manifest.json")
            }
            AttributorError::Archive { .. } => Some("The modpack archive may be corrupted, download it again"),
            AttributorError::Configuration { suggestion, .. } => suggestion.as_deref(),
            _ => None,
        }
    }

    /// Create a detailed error report for debugging
    pub fn detailed_report(&self) -> String {
        let mut report = format!("Error: {}\n", self);
        report.push_str(&format!("Category: {}\n", self.category()));
        report.push_str(&format!("Recoverable: {}\n", self.is_recoverable()));

        if let Some(suggestion) = self.suggestion() {
            report.push_str(&format!("Suggestion: {}\n", suggestion));
        }

        if let Some(source) = self.source() {
            report.push_str(&format!("Root cause: {}\n", source));
        }

        report
    }
}

impl From<url::ParseError> for AttributorError {
    fn from(error: url::ParseError) -> Self {
        let suggestion = match error {
            url::ParseError::EmptyHost => "URL must have a valid hostname",
            url::ParseError::RelativeUrlWithoutBase => "URL must be absolute (include http:// or https://)",
            _ => "Check URL format and try again",
        };

        AttributorError::Configuration {
            message: format!("invalid catalog API base URL: {}", error),
            field: Some("api_base".to_string()),
            suggestion: Some(suggestion.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_manifest_report() {
        let json_err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let error = AttributorError::malformed("not valid JSON", json_err);

        assert_eq!(error.category(), "malformed_manifest");
        assert!(!error.is_recoverable());

        let report = error.detailed_report();
        assert!(report.contains("Malformed manifest: not valid JSON"));
        assert!(report.contains("Root cause:"));
        assert!(report.contains("Suggestion:"));
    }

    #[test]
    fn test_url_error_becomes_configuration() {
        let error: AttributorError = url::Url::parse("not a url").unwrap_err().into();

        match &error {
            AttributorError::Configuration { field, .. } => {
                assert_eq!(field.as_deref(), Some("api_base"));
            }
            other => panic!("Expected configuration error, got {:?}", other),
        }
        assert!(error.suggestion().is_some());
    }

    #[test]
    fn test_interrupted_io_is_recoverable() {
        let error = AttributorError::FileSystem {
            path: PathBuf::from("manifest.json"),
            source: std::io::Error::from(std::io::ErrorKind::Interrupted),
        };
        assert!(error.is_recoverable());

        let error = AttributorError::FileSystem {
            path: PathBuf::from("manifest.json"),
            source: std::io::Error::from(std::io::ErrorKind::NotFound),
        };
        assert!(!error.is_recoverable());
    }
}
