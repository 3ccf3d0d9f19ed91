//! Attribution resolution
//!
//! Turns an ordered list of manifest references into a deduplicated, sorted
//! attribution set. The call chain flows as follows:
//!
//! User Code
//! ↓
//! Resolver::resolve (this file)
//! ↓
//! tally_references: one slot per unique project, first-seen order
//! ↓
//! CatalogClient::fetch, bounded by `max_concurrent_fetches`
//! ↓
//! merge + sort into AttributionSet
//!
//! A failed lookup never aborts the run. It becomes an entry with
//! [`AttributionStatus::Failed`] so that no credited project silently drops
//! out of the list.

pub mod metrics;
pub mod progress;

pub use metrics::{ResolveMetrics, ResolveMetricsSnapshot};
pub use progress::{
    ConsoleProgressReporter, IntoProgressCallback, ProgressCallback, ProgressReporter, ResolveEvent,
};

use futures::stream::{self, StreamExt};
use serde::Serialize;
use std::cmp::Ordering;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering as AtomicOrdering};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::catalog::{Author, CatalogClient, CatalogError, ProjectMetadata};
use crate::config::AttributorConfig;
use crate::error::Result;
use crate::manifest::{read_manifest, ModReference};

/// Whether a project's metadata could be fetched
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "state", content = "error", rename_all = "snake_case")]
pub enum AttributionStatus {
    Resolved,
    Failed(CatalogError),
}

/// Credit line for one unique project of the modpack
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AttributionEntry {
    pub project_id: i64,
    /// `None` when the project could not be resolved
    pub name: Option<String>,
    pub authors: Vec<Author>,
    pub website_url: Option<String>,
    pub status: AttributionStatus,
    /// How many manifest references collapsed into this entry
    pub reference_count: usize,
}

impl AttributionEntry {
    fn resolved(metadata: ProjectMetadata, reference_count: usize) -> Self {
        Self {
            project_id: metadata.project_id,
            name: Some(metadata.name),
            authors: metadata.authors,
            website_url: metadata.website_url,
            status: AttributionStatus::Resolved,
            reference_count,
        }
    }

    fn failed(project_id: i64, error: CatalogError, reference_count: usize) -> Self {
        Self {
            project_id,
            name: None,
            authors: Vec::new(),
            website_url: None,
            status: AttributionStatus::Failed(error),
            reference_count,
        }
    }

    pub fn is_resolved(&self) -> bool {
        matches!(self.status, AttributionStatus::Resolved)
    }

    pub fn failure(&self) -> Option<&CatalogError> {
        match &self.status {
            AttributionStatus::Failed(error) => Some(error),
            AttributionStatus::Resolved => None,
        }
    }
}

/// Resolved entries by case-insensitive name, then id; failed entries last
///
/// Failed entries compare equal to each other so a stable sort keeps them in
/// first-seen order.
fn attribution_order(a: &AttributionEntry, b: &AttributionEntry) -> Ordering {
    match (a.is_resolved(), b.is_resolved()) {
        (true, true) => {
            let a_name = a.name.as_deref().unwrap_or_default().to_lowercase();
            let b_name = b.name.as_deref().unwrap_or_default().to_lowercase();
            a_name.cmp(&b_name).then(a.project_id.cmp(&b.project_id))
        }
        (true, false) => Ordering::Less,
        (false, true) => Ordering::Greater,
        (false, false) => Ordering::Equal,
    }
}

/// Sorted attribution entries, one per unique project id
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct AttributionSet {
    entries: Vec<AttributionEntry>,
}

impl AttributionSet {
    /// Sort entries into their final order
    ///
    /// `entries` must already be in first-seen manifest order.
    fn from_first_seen(mut entries: Vec<AttributionEntry>) -> Self {
        entries.sort_by(attribution_order);
        Self { entries }
    }

    pub fn entries(&self) -> &[AttributionEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, AttributionEntry> {
        self.entries.iter()
    }

    pub fn get(&self, project_id: i64) -> Option<&AttributionEntry> {
        self.entries.iter().find(|e| e.project_id == project_id)
    }

    pub fn resolved(&self) -> impl Iterator<Item = &AttributionEntry> {
        self.entries.iter().filter(|e| e.is_resolved())
    }

    pub fn failed(&self) -> impl Iterator<Item = &AttributionEntry> {
        self.entries.iter().filter(|e| !e.is_resolved())
    }

    /// Number of manifest references this set accounts for
    pub fn total_references(&self) -> usize {
        self.entries.iter().map(|e| e.reference_count).sum()
    }
}

impl IntoIterator for AttributionSet {
    type Item = AttributionEntry;
    type IntoIter = std::vec::IntoIter<AttributionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a> IntoIterator for &'a AttributionSet {
    type Item = &'a AttributionEntry;
    type IntoIter = std::slice::Iter<'a, AttributionEntry>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

/// Reference count for one unique project
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProjectTally {
    pub project_id: i64,
    pub reference_count: usize,
}

/// Collapse references by project id, keeping first-seen order
pub fn tally_references(references: &[ModReference]) -> Vec<ProjectTally> {
    let mut slots: HashMap<i64, usize> = HashMap::with_capacity(references.len());
    let mut tallies: Vec<ProjectTally> = Vec::new();

    for reference in references {
        match slots.get(&reference.project_id) {
            Some(&slot) => tallies[slot].reference_count += 1,
            None => {
                slots.insert(reference.project_id, tallies.len());
                tallies.push(ProjectTally {
                    project_id: reference.project_id,
                    reference_count: 1,
                });
            }
        }
    }

    tallies
}

/// Attribution resolver with bounded concurrent catalog lookups
///
/// This is the main entry point for users. It provides:
/// - Deduplication of manifest references by project
/// - Concurrent fetches limited by `max_concurrent_fetches`
/// - Partial-failure tolerance: failed lookups become failed entries
/// - Cancellation that abandons in-flight fetches
/// - Built-in metrics and progress events
pub struct Resolver<C> {
    client: C,
    config: AttributorConfig,
    progress_callback: Option<ProgressCallback>,
    metrics: Arc<ResolveMetrics>,
}

impl<C: CatalogClient> Resolver<C> {
    pub fn new(client: C, config: AttributorConfig) -> Self {
        Self {
            client,
            config,
            progress_callback: None,
            metrics: Arc::new(ResolveMetrics::default()),
        }
    }

    /// Set a progress callback for fetch updates
    pub fn with_progress_callback(mut self, callback: ProgressCallback) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Get access to built-in metrics
    pub fn metrics(&self) -> &ResolveMetrics {
        &self.metrics
    }

    pub fn config(&self) -> &AttributorConfig {
        &self.config
    }

    fn emit(&self, event: ResolveEvent) {
        if let Some(ref callback) = self.progress_callback {
            callback(event);
        }
    }

    /// Resolve references into a sorted attribution set
    ///
    /// Waits for every fetch to finish before returning; there is no partial
    /// output. An empty reference list yields an empty set.
    pub async fn resolve(&self, references: &[ModReference]) -> AttributionSet {
        let tallies = tally_references(references);
        let total = tallies.len();
        self.metrics.record_references(references.len(), total);

        info!(
            "Resolving {} manifest entries ({} unique projects, max_concurrent={})",
            references.len(),
            total,
            self.config.fetch_concurrency()
        );
        self.emit(ResolveEvent::Started {
            total_references: references.len(),
            unique_projects: total,
        });

        let completed = AtomicUsize::new(0);
        let completed = &completed;

        // Each id appears once in `tallies`, so each map slot is written once.
        let mut results: HashMap<i64, std::result::Result<ProjectMetadata, CatalogError>> =
            stream::iter(tallies.iter().map(|t| t.project_id))
                .map(|project_id| async move {
                    self.emit(ResolveEvent::FetchStarted { project_id });
                    let result = self.client.fetch(project_id).await;
                    let done = completed.fetch_add(1, AtomicOrdering::Relaxed) + 1;

                    match &result {
                        Ok(metadata) => {
                            debug!("Resolved project {} as '{}'", project_id, metadata.name);
                            self.metrics.record_resolved();
                            self.emit(ResolveEvent::FetchResolved {
                                project_id,
                                name: metadata.name.clone(),
                                completed: done,
                                total,
                            });
                        }
                        Err(error) => {
                            warn!("Unable to retrieve project information for {}: {}", project_id, error);
                            self.metrics.record_failed(error);
                            self.emit(ResolveEvent::FetchFailed {
                                project_id,
                                error: error.clone(),
                                completed: done,
                                total,
                            });
                        }
                    }

                    (project_id, result)
                })
                .buffer_unordered(self.config.fetch_concurrency())
                .collect()
                .await;

        let entries: Vec<AttributionEntry> = tallies
            .iter()
            .map(|tally| {
                let result = results.remove(&tally.project_id).unwrap_or_else(|| {
                    Err(CatalogError::Unavailable {
                        project_id: tally.project_id,
                        reason: "lookup produced no result".to_string(),
                    })
                });
                merge(tally, result)
            })
            .collect();

        let set = AttributionSet::from_first_seen(entries);
        let failed = set.failed().count();
        info!("Resolved {} / {} projects", total - failed, total);
        self.emit(ResolveEvent::Finished {
            resolved: total - failed,
            failed,
        });

        set
    }

    /// Resolve, giving up as soon as `token` is cancelled
    ///
    /// Returns `None` when cancelled; in-flight fetches are dropped and their
    /// outcomes discarded.
    pub async fn resolve_with_cancellation(
        &self,
        references: &[ModReference],
        token: &CancellationToken,
    ) -> Option<AttributionSet> {
        tokio::select! {
            biased;
            _ = token.cancelled() => {
                info!("Attribution cancelled, abandoning in-flight fetches");
                None
            }
            set = self.resolve(references) => Some(set),
        }
    }

    /// Parse a raw manifest and resolve its references
    pub async fn resolve_manifest(&self, manifest: &[u8]) -> Result<AttributionSet> {
        let references = read_manifest(manifest)?;
        Ok(self.resolve(&references).await)
    }
}

fn merge(
    tally: &ProjectTally,
    result: std::result::Result<ProjectMetadata, CatalogError>,
) -> AttributionEntry {
    match result {
        Ok(metadata) => {
            // Key the entry by the manifest id even if the catalog echoes another.
            let metadata = ProjectMetadata {
                project_id: tally.project_id,
                ..metadata
            };
            AttributionEntry::resolved(metadata, tally.reference_count)
        }
        Err(error) => AttributionEntry::failed(tally.project_id, error, tally.reference_count),
    }
}

/// Resolve references with a one-off resolver
pub async fn resolve<C: CatalogClient>(
    references: &[ModReference],
    client: &C,
    config: &AttributorConfig,
) -> AttributionSet {
    Resolver::new(client, config.clone()).resolve(references).await
}
