//! Mod catalog lookups
//!
//! The resolver only depends on the [`CatalogClient`] trait; the CurseForge
//! HTTP adapter lives in [`curseforge`].

pub mod curseforge;

pub use curseforge::CurseForgeClient;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use thiserror::Error;

/// A project author as listed by the catalog
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Author {
    pub name: String,
    /// Profile page, when the catalog has one
    pub url: Option<String>,
}

impl Author {
    pub fn new<S: Into<String>>(name: S) -> Self {
        Self {
            name: name.into(),
            url: None,
        }
    }

    pub fn with_url<S: Into<String>, U: Into<String>>(name: S, url: U) -> Self {
        Self {
            name: name.into(),
            url: Some(url.into()),
        }
    }
}

/// Metadata of a single catalog project
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectMetadata {
    pub project_id: i64,
    pub name: String,
    /// Authors in catalog order
    pub authors: Vec<Author>,
    /// Project page on the hosting site, when the catalog has one
    pub website_url: Option<String>,
}

/// Why a single project could not be resolved
#[derive(Error, Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum CatalogError {
    #[error("project {project_id} does not exist in the catalog")]
    NotFound { project_id: i64 },

    #[error("catalog unavailable for project {project_id}: {reason}")]
    Unavailable { project_id: i64, reason: String },

    #[error("catalog reply for project {project_id} could not be decoded: {reason}")]
    Malformed { project_id: i64, reason: String },
}

impl CatalogError {
    pub fn project_id(&self) -> i64 {
        match self {
            CatalogError::NotFound { project_id }
            | CatalogError::Unavailable { project_id, .. }
            | CatalogError::Malformed { project_id, .. } => *project_id,
        }
    }

    /// Only transport-level failures are worth retrying
    pub fn is_recoverable(&self) -> bool {
        matches!(self, CatalogError::Unavailable { .. })
    }

    /// Get error category for metrics and logging
    pub fn category(&self) -> &'static str {
        match self {
            CatalogError::NotFound { .. } => "not_found",
            CatalogError::Unavailable { .. } => "unavailable",
            CatalogError::Malformed { .. } => "malformed",
        }
    }
}

/// Read-only lookup of project metadata by project id
#[async_trait]
pub trait CatalogClient: Send + Sync {
    /// Fetch one project's metadata
    ///
    /// Timeouts and rate limiting surface as [`CatalogError::Unavailable`].
    async fn fetch(&self, project_id: i64) -> Result<ProjectMetadata, CatalogError>;
}

#[async_trait]
impl<'a, T: CatalogClient + ?Sized> CatalogClient for &'a T {
    async fn fetch(&self, project_id: i64) -> Result<ProjectMetadata, CatalogError> {
        (**self).fetch(project_id).await
    }
}

#[async_trait]
impl<T: CatalogClient + ?Sized> CatalogClient for Arc<T> {
    async fn fetch(&self, project_id: i64) -> Result<ProjectMetadata, CatalogError> {
        (**self).fetch(project_id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_only_unavailable_is_recoverable() {
        assert!(CatalogError::Unavailable { project_id: 1, reason: "timeout".into() }.is_recoverable());
        assert!(!CatalogError::NotFound { project_id: 1 }.is_recoverable());
        assert!(!CatalogError::Malformed { project_id: 1, reason: "bad".into() }.is_recoverable());
    }

    #[test]
    fn test_project_id_and_category() {
        let error = CatalogError::Malformed { project_id: 42, reason: "missing name".into() };
        assert_eq!(error.project_id(), 42);
        assert_eq!(error.category(), "malformed");
        assert_eq!(
            error.to_string(),
            "catalog reply for project 42 could not be decoded: missing name"
        );
    }

    #[test]
    fn test_error_serializes_with_kind_tag() {
        let json = serde_json::to_value(CatalogError::NotFound { project_id: 7 }).unwrap();
        assert_eq!(json, serde_json::json!({ "kind": "not_found", "project_id": 7 }));
    }
}
