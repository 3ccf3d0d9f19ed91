//! CurseForge API client
//!
//! This module handles project lookups against the CurseForge REST API, including:
//! - API key management from configuration or environment variables
//! - Mapping HTTP statuses onto the catalog error taxonomy
//! - Retries with exponential backoff for transient failures
//! - A small in-memory cache of project replies

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use serde::Deserialize;
use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::{Duration, Instant};
use tokio_retry::RetryIf;
use tracing::{debug, warn};
use url::Url;

use crate::catalog::{Author, CatalogClient, CatalogError, ProjectMetadata};
use crate::config::AttributorConfig;
use crate::error::{AttributorError, Result};

/// `GET /v1/mods/{modId}` reply envelope
#[derive(Debug, Deserialize)]
struct ModResponse {
    data: ModData,
}

/// The subset of the CurseForge mod object needed for attribution
#[derive(Debug, Deserialize)]
struct ModData {
    id: i64,
    name: String,
    #[serde(default)]
    authors: Vec<ModAuthor>,
    #[serde(default)]
    links: Option<ModLinks>,
}

#[derive(Debug, Deserialize)]
struct ModAuthor {
    name: String,
    #[serde(default)]
    url: Option<String>,
}

impl ModAuthor {
    fn into_author(self) -> Author {
        Author {
            name: self.name,
            url: non_empty(self.url),
        }
    }
}

fn non_empty(url: Option<String>) -> Option<String> {
    url.filter(|url| !url.trim().is_empty())
}

#[derive(Debug, Deserialize)]
struct ModLinks {
    #[serde(rename = "websiteUrl", default)]
    website_url: Option<String>,
}

impl ModData {
    fn into_metadata(self) -> ProjectMetadata {
        ProjectMetadata {
            project_id: self.id,
            name: self.name,
            authors: self.authors.into_iter().map(ModAuthor::into_author).collect(),
            website_url: non_empty(self.links.and_then(|l| l.website_url)),
        }
    }
}

/// Cache entry for API responses
#[derive(Debug, Clone)]
struct CacheEntry<T> {
    data: T,
    expires_at: Instant,
}

impl<T> CacheEntry<T> {
    fn new(data: T, ttl: Duration) -> Self {
        Self {
            data,
            expires_at: Instant::now() + ttl,
        }
    }

    fn is_expired(&self) -> bool {
        Instant::now() > self.expires_at
    }
}

/// Outcome of one network attempt, split by whether another attempt could help
#[derive(Debug)]
enum AttemptError {
    Retryable(CatalogError),
    Final(CatalogError),
}

impl AttemptError {
    fn into_inner(self) -> CatalogError {
        match self {
            AttemptError::Retryable(e) | AttemptError::Final(e) => e,
        }
    }
}

/// CurseForge catalog client
pub struct CurseForgeClient {
    client: Client,
    api_key: String,
    api_base: Url,
    config: AttributorConfig,
    project_cache: Mutex<HashMap<i64, CacheEntry<ProjectMetadata>>>,
}

impl std::fmt::Debug for CurseForgeClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CurseForgeClient")
            .field("api_base", &self.api_base.as_str())
            .field("max_retries", &self.config.max_retries)
            .finish()
    }
}

impl CurseForgeClient {
    /// Create a client from the configuration, resolving the API key
    pub fn new(config: AttributorConfig) -> Result<Self> {
        let api_key = config.resolve_api_key()?;

        let mut api_base = Url::parse(&config.api_base)?;
        if !api_base.path().ends_with('/') {
            let path = format!("{}/", api_base.path());
            api_base.set_path(&path);
        }

        let client = Client::builder()
            .user_agent(config.user_agent.clone())
            .timeout(config.timeout)
            .build()
            .map_err(|source| AttributorError::HttpClient { source })?;

        Ok(Self {
            client,
            api_key,
            api_base,
            config,
            project_cache: Mutex::new(HashMap::new()),
        })
    }

    fn project_url(&self, project_id: i64) -> std::result::Result<Url, CatalogError> {
        self.api_base
            .join(&format!("v1/mods/{}", project_id))
            .map_err(|e| CatalogError::Unavailable {
                project_id,
                reason: format!("could not build request URL: {}", e),
            })
    }

    fn cached(&self, project_id: i64) -> Option<ProjectMetadata> {
        let mut cache = self.project_cache.lock().unwrap_or_else(PoisonError::into_inner);
        match cache.get(&project_id) {
            Some(entry) if !entry.is_expired() => Some(entry.data.clone()),
            Some(_) => {
                cache.remove(&project_id);
                None
            }
            None => None,
        }
    }

    fn store(&self, metadata: &ProjectMetadata) {
        let mut cache = self.project_cache.lock().unwrap_or_else(PoisonError::into_inner);
        cache.insert(
            metadata.project_id,
            CacheEntry::new(metadata.clone(), self.config.cache_ttl),
        );
    }

    /// Perform a single request without retries
    async fn fetch_once(&self, project_id: i64) -> std::result::Result<ProjectMetadata, AttemptError> {
        let url = self.project_url(project_id).map_err(AttemptError::Final)?;
        debug!("CurseForge request: GET {}", url);

        let response = self
            .client
            .get(url)
            .header("x-api-key", &self.api_key)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| AttemptError::Retryable(self.transport_error(project_id, &e)))?;

        let status = response.status();
        if !status.is_success() {
            return Err(classify_status(project_id, status));
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| AttemptError::Retryable(self.transport_error(project_id, &e)))?;

        let reply: ModResponse = serde_json::from_slice(&body).map_err(|e| {
            AttemptError::Final(CatalogError::Malformed {
                project_id,
                reason: e.to_string(),
            })
        })?;

        if reply.data.id != project_id {
            return Err(AttemptError::Final(CatalogError::Malformed {
                project_id,
                reason: format!("reply describes project {} instead", reply.data.id),
            }));
        }

        Ok(reply.data.into_metadata())
    }

    fn transport_error(&self, project_id: i64, error: &reqwest::Error) -> CatalogError {
        let reason = if error.is_timeout() {
            format!("request timed out after {}s", self.config.timeout.as_secs())
        } else if error.is_connect() {
            format!("could not connect to catalog: {}", error)
        } else {
            format!("transport error: {}", error)
        };
        CatalogError::Unavailable { project_id, reason }
    }
}

/// Map a non-success HTTP status onto the catalog taxonomy
fn classify_status(project_id: i64, status: StatusCode) -> AttemptError {
    match status {
        StatusCode::NOT_FOUND => AttemptError::Final(CatalogError::NotFound { project_id }),
        StatusCode::TOO_MANY_REQUESTS => AttemptError::Retryable(CatalogError::Unavailable {
            project_id,
            reason: "rate limited by catalog".to_string(),
        }),
        StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AttemptError::Final(CatalogError::Unavailable {
            project_id,
            reason: format!("catalog rejected the API key ({})", status),
        }),
        s if s.is_server_error() => AttemptError::Retryable(CatalogError::Unavailable {
            project_id,
            reason: format!("catalog server error ({})", s),
        }),
        s => AttemptError::Final(CatalogError::Unavailable {
            project_id,
            reason: format!("unexpected catalog status ({})", s),
        }),
    }
}

#[async_trait]
impl CatalogClient for CurseForgeClient {
    async fn fetch(&self, project_id: i64) -> std::result::Result<ProjectMetadata, CatalogError> {
        if let Some(metadata) = self.cached(project_id) {
            debug!("Returning cached project info for {}", project_id);
            return Ok(metadata);
        }

        let backoff = (0..self.config.max_retries).map(|attempt| self.config.get_retry_delay(attempt));
        let metadata = RetryIf::spawn(
            backoff,
            || self.fetch_once(project_id),
            |error: &AttemptError| match error {
                AttemptError::Retryable(e) => {
                    warn!("Retrying project {}: {}", project_id, e);
                    true
                }
                AttemptError::Final(_) => false,
            },
        )
        .await
        .map_err(AttemptError::into_inner)?;

        self.store(&metadata);
        Ok(metadata)
    }
}
