//! Attributor Library
//!
//! This library turns a CurseForge modpack into a credits list: it reads the
//! pack's manifest, looks every referenced project up in the catalog, and
//! produces a deduplicated, deterministically sorted attribution set.
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use attributor::{
//!     load_modpack, AttributorConfigBuilder, ConsoleProgressReporter,
//!     CreditsFormat, CurseForgeClient, IntoProgressCallback, Resolver,
//! };
//!
//! # async fn example() -> attributor::Result<()> {
//! // Create a configuration (the API key may also come from CURSEFORGE_API_KEY)
//! let config = AttributorConfigBuilder::new()
//!     .max_concurrent_fetches(6)
//!     .build();
//!
//! // Read the manifest out of the modpack archive
//! let manifest = load_modpack("/path/to/pack.zip").await?;
//!
//! // Resolve every referenced project
//! let client = CurseForgeClient::new(config.clone())?;
//! let resolver = Resolver::new(client, config)
//!     .with_progress_callback(ConsoleProgressReporter::new(false).into_callback());
//! let set = resolver.resolve(manifest.references()).await;
//!
//! // Export the credits
//! println!("{}", CreditsFormat::Markdown.render(&set)?);
//! # Ok(())
//! # }
//! ```
//!
//! # Features
//!
//! - **Manifest reading**: bare `manifest.json` or the modpack zip itself
//! - **Deduplication**: several files of one project collapse into one credit
//! - **Partial failure tolerance**: unreachable projects become failed entries instead of aborting
//! - **Bounded concurrency**: configurable number of in-flight catalog requests
//! - **Retry and caching**: transient catalog failures are retried with backoff
//! - **Cancellation**: abandon a run through a `CancellationToken`
//! - **Export**: Markdown credits document or JSON

pub mod catalog;
pub mod config;
pub mod credits;
pub mod error;
pub mod manifest;
pub mod resolver;

// Re-export commonly used types for convenience
pub use catalog::{Author, CatalogClient, CatalogError, CurseForgeClient, ProjectMetadata};
pub use config::{AttributorConfig, AttributorConfigBuilder};
pub use credits::CreditsFormat;
pub use error::{AttributorError, Result};
pub use manifest::{load_modpack, read_manifest, ModReference, ModpackManifest};
pub use resolver::{
    resolve, AttributionEntry, AttributionSet, AttributionStatus, ConsoleProgressReporter,
    IntoProgressCallback, ProgressCallback, ProgressReporter, ResolveEvent, ResolveMetrics,
    Resolver,
};
pub use tokio_util::sync::CancellationToken;
