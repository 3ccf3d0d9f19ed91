//! Counters collected across attribution runs

use std::sync::atomic::{AtomicU64, Ordering};

use crate::catalog::CatalogError;

/// Performance metrics for attribution runs
#[derive(Debug, Default)]
pub struct ResolveMetrics {
    pub total_references: AtomicU64,
    pub unique_projects: AtomicU64,
    pub duplicate_references: AtomicU64,
    pub resolved_projects: AtomicU64,
    pub not_found: AtomicU64,
    pub unavailable: AtomicU64,
    pub malformed: AtomicU64,
}

impl ResolveMetrics {
    pub fn record_references(&self, total: usize, unique: usize) {
        self.total_references.fetch_add(total as u64, Ordering::Relaxed);
        self.unique_projects.fetch_add(unique as u64, Ordering::Relaxed);
        self.duplicate_references
            .fetch_add(total.saturating_sub(unique) as u64, Ordering::Relaxed);
    }

    pub fn record_resolved(&self) {
        self.resolved_projects.fetch_add(1, Ordering::Relaxed);
    }

    pub fn record_failed(&self, error: &CatalogError) {
        let counter = match error {
            CatalogError::NotFound { .. } => &self.not_found,
            CatalogError::Unavailable { .. } => &self.unavailable,
            CatalogError::Malformed { .. } => &self.malformed,
        };
        counter.fetch_add(1, Ordering::Relaxed);
    }

    /// Get metrics snapshot
    pub fn snapshot(&self) -> ResolveMetricsSnapshot {
        ResolveMetricsSnapshot {
            total_references: self.total_references.load(Ordering::Relaxed),
            unique_projects: self.unique_projects.load(Ordering::Relaxed),
            duplicate_references: self.duplicate_references.load(Ordering::Relaxed),
            resolved_projects: self.resolved_projects.load(Ordering::Relaxed),
            not_found: self.not_found.load(Ordering::Relaxed),
            unavailable: self.unavailable.load(Ordering::Relaxed),
            malformed: self.malformed.load(Ordering::Relaxed),
        }
    }
}

/// Immutable snapshot of metrics
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolveMetricsSnapshot {
    pub total_references: u64,
    pub unique_projects: u64,
    pub duplicate_references: u64,
    pub resolved_projects: u64,
    pub not_found: u64,
    pub unavailable: u64,
    pub malformed: u64,
}

impl ResolveMetricsSnapshot {
    pub fn failed_projects(&self) -> u64 {
        self.not_found + self.unavailable + self.malformed
    }

    pub fn success_rate(&self) -> f64 {
        let attempted = self.resolved_projects + self.failed_projects();
        if attempted == 0 {
            0.0
        } else {
            self.resolved_projects as f64 / attempted as f64
        }
    }
}
