//! Loading manifests from modpack archives
//!
//! CurseForge modpacks are zip files with `manifest.json` at the archive
//! root. A bare manifest file is accepted too.

use std::io::{Cursor, Read};
use std::path::Path;

use tokio::fs;
use tracing::debug;

use crate::error::{AttributorError, Result};
use crate::manifest::parser::ModpackManifest;

/// Name of the manifest entry inside a modpack archive
pub const MANIFEST_FILE_NAME: &str = "manifest.json";

const ZIP_MAGIC: &[u8] = b"PK\x03\x04";

/// Load and parse the manifest of a modpack file
///
/// The file may be either a modpack archive or the `manifest.json` itself;
/// the format is detected from the file contents, not the extension.
pub async fn load_modpack<P: AsRef<Path>>(path: P) -> Result<ModpackManifest> {
    let path = path.as_ref();
    let bytes = fs::read(path).await.map_err(|source| AttributorError::FileSystem {
        path: path.to_path_buf(),
        source,
    })?;

    let manifest_bytes = if is_zip(&bytes) {
        debug!("Reading {} from modpack archive {}", MANIFEST_FILE_NAME, path.display());
        extract_manifest(path, bytes)?
    } else {
        debug!("Treating {} as a bare manifest", path.display());
        bytes
    };

    ModpackManifest::parse(&manifest_bytes)
}

fn is_zip(bytes: &[u8]) -> bool {
    bytes.starts_with(ZIP_MAGIC)
}

fn extract_manifest(path: &Path, bytes: Vec<u8>) -> Result<Vec<u8>> {
    let mut archive = zip::ZipArchive::new(Cursor::new(bytes)).map_err(|source| AttributorError::Archive {
        path: path.to_path_buf(),
        source,
    })?;

    let mut entry = match archive.by_name(MANIFEST_FILE_NAME) {
        Ok(entry) => entry,
        Err(zip::result::ZipError::FileNotFound) => {
            return Err(AttributorError::MalformedManifest {
                reason: format!("{} has no {} at its root", path.display(), MANIFEST_FILE_NAME),
                source: None,
            });
        }
        Err(source) => {
            return Err(AttributorError::Archive {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    let mut manifest = Vec::new();
    entry.read_to_end(&mut manifest).map_err(|source| AttributorError::FileSystem {
        path: path.join(MANIFEST_FILE_NAME),
        source,
    })?;

    Ok(manifest)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::tempdir;
    use zip::write::SimpleFileOptions;

    const MANIFEST: &str = r#"{
        "manifestType": "minecraftModpack",
        "name": "Zipped Pack",
        "files": [ { "projectID": 10, "fileID": 100, "required": true } ],
        "overrides": "overrides"
    }"#;

    fn write_zip(path: &Path, entries: &[(&str, &str)]) {
        let file = std::fs::File::create(path).unwrap();
        let mut writer = zip::ZipWriter::new(file);
        for (name, contents) in entries {
            writer.start_file(*name, SimpleFileOptions::default()).unwrap();
            writer.write_all(contents.as_bytes()).unwrap();
        }
        writer.finish().unwrap();
    }

    #[tokio::test]
    async fn test_load_modpack_from_zip() {
        let temp_dir = tempdir().unwrap();
        let pack = temp_dir.path().join("pack.zip");
        write_zip(&pack, &[("overrides/config/a.cfg", "x=1"), (MANIFEST_FILE_NAME, MANIFEST)]);

        let manifest = load_modpack(&pack).await.expect("Failed to load zipped modpack");
        assert_eq!(manifest.name, "Zipped Pack");
        assert_eq!(manifest.references().len(), 1);
        assert_eq!(manifest.references()[0].project_id, 10);
    }

    #[tokio::test]
    async fn test_load_bare_manifest_with_any_extension() {
        let temp_dir = tempdir().unwrap();
        let path = temp_dir.path().join("manifest.bin");
        tokio::fs::write(&path, MANIFEST).await.unwrap();

        let manifest = load_modpack(&path).await.expect("Failed to load bare manifest");
        assert_eq!(manifest.references()[0].file_id, 100);
    }

    #[tokio::test]
    async fn test_zip_without_manifest_is_malformed() {
        let temp_dir = tempdir().unwrap();
        let pack = temp_dir.path().join("empty.zip");
        write_zip(&pack, &[("readme.txt", "hello")]);

        let err = load_modpack(&pack).await.unwrap_err();
        assert!(matches!(err, AttributorError::MalformedManifest { .. }));
    }

    #[tokio::test]
    async fn test_truncated_zip_is_archive_error() {
        let temp_dir = tempdir().unwrap();
        let pack = temp_dir.path().join("broken.zip");
        tokio::fs::write(&pack, b"PK\x03\x04garbage").await.unwrap();

        let err = load_modpack(&pack).await.unwrap_err();
        assert!(matches!(err, AttributorError::Archive { .. }));
    }

    #[tokio::test]
    async fn test_missing_file_is_file_system_error() {
        let temp_dir = tempdir().unwrap();
        let err = load_modpack(temp_dir.path().join("nope.zip")).await.unwrap_err();

        match err {
            AttributorError::FileSystem { path, .. } => assert!(path.ends_with("nope.zip")),
            other => panic!("Expected file system error, got {:?}", other),
        }
    }
}
