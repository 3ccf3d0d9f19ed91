//! Modpack manifest reading
//!
//! Turns a CurseForge modpack (or its bare `manifest.json`) into the ordered
//! list of mod references the resolver consumes.

pub mod archive;
pub mod parser;

// Re-export main types
pub use archive::{load_modpack, MANIFEST_FILE_NAME};
pub use parser::{read_manifest, MinecraftInfo, ModLoader, ModReference, ModpackManifest};
