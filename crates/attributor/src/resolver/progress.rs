//! Progress tracking and reporting for attribution runs

use std::sync::Arc;

use crate::catalog::CatalogError;

/// Progress callback for attribution runs
pub type ProgressCallback = Arc<dyn Fn(ResolveEvent) + Send + Sync>;

/// Events emitted while a manifest is being resolved
#[derive(Debug, Clone)]
pub enum ResolveEvent {
    /// References were deduplicated and fetching is about to begin
    Started {
        total_references: usize,
        unique_projects: usize,
    },
    FetchStarted {
        project_id: i64,
    },
    FetchResolved {
        project_id: i64,
        name: String,
        completed: usize,
        total: usize,
    },
    FetchFailed {
        project_id: i64,
        error: CatalogError,
        completed: usize,
        total: usize,
    },
    /// Every fetch has completed; the sorted set is being assembled
    Finished {
        resolved: usize,
        failed: usize,
    },
}

/// Trait for progress reporting with more granular control
pub trait ProgressReporter: Send + Sync {
    fn on_started(&self, _total_references: usize, _unique_projects: usize) {}
    fn on_fetch_started(&self, _project_id: i64) {}
    fn on_fetch_resolved(&self, _project_id: i64, _name: &str, _completed: usize, _total: usize) {}
    fn on_fetch_failed(&self, _project_id: i64, _error: &CatalogError, _completed: usize, _total: usize) {}
    fn on_finished(&self, _resolved: usize, _failed: usize) {}
}

/// Extension trait to convert ProgressReporter to ProgressCallback
pub trait IntoProgressCallback {
    fn into_callback(self) -> ProgressCallback;
}

impl<T: ProgressReporter + 'static> IntoProgressCallback for T {
    fn into_callback(self) -> ProgressCallback {
        Arc::new(move |event| match event {
            ResolveEvent::Started { total_references, unique_projects } => {
                self.on_started(total_references, unique_projects);
            }
            ResolveEvent::FetchStarted { project_id } => {
                self.on_fetch_started(project_id);
            }
            ResolveEvent::FetchResolved { project_id, name, completed, total } => {
                self.on_fetch_resolved(project_id, &name, completed, total);
            }
            ResolveEvent::FetchFailed { project_id, error, completed, total } => {
                self.on_fetch_failed(project_id, &error, completed, total);
            }
            ResolveEvent::Finished { resolved, failed } => {
                self.on_finished(resolved, failed);
            }
        })
    }
}

/// Simple console progress reporter, writes to stderr
#[derive(Debug, Default)]
pub struct ConsoleProgressReporter {
    pub verbose: bool,
}

impl ConsoleProgressReporter {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }
}

impl ProgressReporter for ConsoleProgressReporter {
    fn on_started(&self, total_references: usize, unique_projects: usize) {
        eprintln!(
            "Getting info... 0 / {} ({} manifest entries)",
            unique_projects, total_references
        );
    }

    fn on_fetch_started(&self, project_id: i64) {
        if self.verbose {
            eprintln!("Fetching project {}", project_id);
        }
    }

    fn on_fetch_resolved(&self, project_id: i64, name: &str, completed: usize, total: usize) {
        if self.verbose {
            eprintln!("Getting info... {} / {} ({} = {})", completed, total, project_id, name);
        } else {
            eprintln!("Getting info... {} / {}", completed, total);
        }
    }

    fn on_fetch_failed(&self, _project_id: i64, error: &CatalogError, completed: usize, total: usize) {
        eprintln!("Getting info... {} / {} (failed: {})", completed, total, error);
    }

    fn on_finished(&self, resolved: usize, failed: usize) {
        eprintln!("Complete. {} / {}", resolved, resolved + failed);
    }
}
