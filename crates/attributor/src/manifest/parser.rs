//! CurseForge modpack manifest parser
//!
//! Decodes `manifest.json` into typed structures. Only the `files` list is
//! required; everything else falls back to defaults so that hand-edited or
//! older manifests still yield their mod references.

use serde::{Deserialize, Serialize};

use crate::error::{AttributorError, Result};

/// UTF-8 byte order mark some exporters prepend to manifest.json
const UTF8_BOM: &[u8] = &[0xEF, 0xBB, 0xBF];

/// A single mod entry of a modpack: which project and which build of it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ModReference {
    #[serde(rename = "projectID")]
    pub project_id: i64,

    #[serde(rename = "fileID")]
    pub file_id: i64,

    #[serde(default = "default_required")]
    pub required: bool,
}

fn default_required() -> bool {
    true
}

impl ModReference {
    pub fn new(project_id: i64, file_id: i64) -> Self {
        Self {
            project_id,
            file_id,
            required: true,
        }
    }
}

/// Minecraft information for a modpack manifest
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct MinecraftInfo {
    #[serde(default)]
    pub version: String,

    #[serde(rename = "modLoaders", default)]
    pub mod_loaders: Vec<ModLoader>,
}

/// A mod loader declared by the manifest (e.g. `forge-36.2.39`)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModLoader {
    pub id: String,

    #[serde(default)]
    pub primary: bool,
}

/// Full CurseForge modpack manifest as it appears in the file
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModpackManifest {
    #[serde(default)]
    pub minecraft: MinecraftInfo,

    #[serde(rename = "manifestType", default)]
    pub manifest_type: String,

    #[serde(rename = "manifestVersion", default)]
    pub manifest_version: i64,

    #[serde(default)]
    pub name: String,

    #[serde(default)]
    pub version: String,

    #[serde(default)]
    pub author: String,

    #[serde(rename = "projectID", default)]
    pub project_id: Option<i64>,

    pub files: Vec<ModReference>,

    #[serde(default)]
    pub overrides: String,
}

impl ModpackManifest {
    /// Parse a complete manifest from raw bytes
    pub fn parse(bytes: &[u8]) -> Result<Self> {
        serde_json::from_slice(strip_bom(bytes))
            .map_err(|e| AttributorError::malformed(describe_json_error(&e), e))
    }

    /// Mod references in manifest order
    pub fn references(&self) -> &[ModReference] {
        &self.files
    }

    /// The loader flagged as primary, or the first one listed
    pub fn primary_mod_loader(&self) -> Option<&ModLoader> {
        self.minecraft
            .mod_loaders
            .iter()
            .find(|loader| loader.primary)
            .or_else(|| self.minecraft.mod_loaders.first())
    }
}

/// Only the part of the manifest the resolver needs
#[derive(Deserialize)]
struct FileList {
    files: Vec<ModReference>,
}

/// Read the ordered mod reference list out of a raw manifest
///
/// No deduplication or id validation happens here; zero or negative ids pass
/// through unchanged. Other manifest fields are not inspected, so a manifest
/// with an odd `minecraft` block still yields its references.
pub fn read_manifest(bytes: &[u8]) -> Result<Vec<ModReference>> {
    let list: FileList = serde_json::from_slice(strip_bom(bytes))
        .map_err(|e| AttributorError::malformed(describe_json_error(&e), e))?;
    Ok(list.files)
}

fn strip_bom(bytes: &[u8]) -> &[u8] {
    bytes.strip_prefix(UTF8_BOM).unwrap_or(bytes)
}

fn describe_json_error(error: &serde_json::Error) -> String {
    match error.classify() {
        serde_json::error::Category::Io => "could not read manifest".to_string(),
        serde_json::error::Category::Syntax | serde_json::error::Category::Eof => {
            format!("manifest is not valid JSON (line {}, column {})", error.line(), error.column())
        }
        serde_json::error::Category::Data => format!("unexpected manifest structure: {}", error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_MANIFEST: &str = r#"{
        "minecraft": {
            "version": "1.16.5",
            "modLoaders": [
                { "id": "forge-36.2.39", "primary": true }
            ]
        },
        "manifestType": "minecraftModpack",
        "manifestVersion": 1,
        "name": "Test Pack",
        "version": "1.0.0",
        "author": "Packmaker",
        "files": [
            { "projectID": 238222, "fileID": 3383214, "required": true },
            { "projectID": 32274, "fileID": 3366628, "required": false },
            { "projectID": 238222, "fileID": 3383215 }
        ],
        "overrides": "overrides"
    }"#;

    #[test]
    fn test_parse_full_manifest() {
        let manifest = ModpackManifest::parse(SAMPLE_MANIFEST.as_bytes()).expect("Failed to parse manifest");

        assert_eq!(manifest.name, "Test Pack");
        assert_eq!(manifest.manifest_type, "minecraftModpack");
        assert_eq!(manifest.minecraft.version, "1.16.5");
        assert_eq!(manifest.primary_mod_loader().map(|l| l.id.as_str()), Some("forge-36.2.39"));
        assert_eq!(manifest.project_id, None);
        assert_eq!(manifest.references().len(), 3);
    }

    #[test]
    fn test_read_manifest_preserves_order_and_duplicates() {
        let refs = read_manifest(SAMPLE_MANIFEST.as_bytes()).expect("Failed to read references");

        assert_eq!(
            refs,
            vec![
                ModReference { project_id: 238222, file_id: 3383214, required: true },
                ModReference { project_id: 32274, file_id: 3366628, required: false },
                ModReference { project_id: 238222, file_id: 3383215, required: true },
            ]
        );
    }

    #[test]
    fn test_read_manifest_passes_odd_ids_through() {
        let json = r#"{ "files": [ { "projectID": 0, "fileID": -5 }, { "projectID": -1, "fileID": 0 } ] }"#;
        let refs = read_manifest(json.as_bytes()).unwrap();

        assert_eq!(refs[0].project_id, 0);
        assert_eq!(refs[0].file_id, -5);
        assert_eq!(refs[1].project_id, -1);
    }

    #[test]
    fn test_read_manifest_empty_file_list() {
        let refs = read_manifest(br#"{ "files": [] }"#).unwrap();
        assert!(refs.is_empty());
    }

    #[test]
    fn test_read_manifest_with_bom() {
        let mut bytes = UTF8_BOM.to_vec();
        bytes.extend_from_slice(br#"{ "files": [ { "projectID": 1, "fileID": 2 } ] }"#);

        let refs = read_manifest(&bytes).unwrap();
        assert_eq!(refs, vec![ModReference::new(1, 2)]);
    }

    #[test]
    fn test_missing_files_field_is_malformed() {
        let err = read_manifest(br#"{ "name": "No files here" }"#).unwrap_err();
        assert!(matches!(err, AttributorError::MalformedManifest { .. }));
        assert!(err.to_string().contains("unexpected manifest structure"));
    }

    #[test]
    fn test_not_json_is_malformed() {
        let err = read_manifest(b"PK\x03\x04 definitely not json").unwrap_err();
        assert!(matches!(err, AttributorError::MalformedManifest { .. }));
        assert!(err.to_string().contains("not valid JSON"));
    }

    #[test]
    fn test_non_integer_ids_are_malformed() {
        let err = read_manifest(br#"{ "files": [ { "projectID": "abc", "fileID": 2 } ] }"#).unwrap_err();
        assert!(matches!(err, AttributorError::MalformedManifest { .. }));
    }
}
