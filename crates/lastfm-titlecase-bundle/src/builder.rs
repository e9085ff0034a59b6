//! Archive creation utilities.
//!
//! The [`ArchiveBuilder`] provides a fluent API for creating per-platform
//! extension archives.

use crate::{BundleError, BundleResult, MANIFEST_FILE, Manifest};
use sha2::{Digest, Sha256};
use std::fs::{self, File};
use std::io::Write;
use std::path::{Component, Path};
use zip::write::SimpleFileOptions;
use zip::{DateTime, ZipWriter};

/// Builder for creating extension archives.
///
/// Every file is read when it is added, so a missing asset is reported
/// before the output archive is created.
///
/// # Example
///
/// ```no_run
/// use lastfm_titlecase_bundle::{ArchiveBuilder, Manifest, Platform};
///
/// let manifest = Manifest::from_file("manifest.json")?.for_platform(Platform::Chrome)?;
/// let builder = ArchiveBuilder::new(manifest)
///     .add_file(".", "img/icons/icon16.png")?
///     .add_file(".", "dist/content.js")?;
///
/// builder.write("lastfm-titlecase-chrome.zip")?;
/// # Ok::<(), lastfm_titlecase_bundle::BundleError>(())
/// ```
pub struct ArchiveBuilder {
    manifest: Manifest,
    files: Vec<ArchiveFile>,
}

/// A file to include in the archive.
struct ArchiveFile {
    /// Path within the archive, `/`-separated.
    archive_path: String,
    /// File contents.
    contents: Vec<u8>,
}

impl ArchiveBuilder {
    /// Create a new archive builder with the given manifest.
    #[must_use]
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            files: Vec::new(),
        }
    }

    /// Add a static asset, read from `root.join(relative_path)`.
    ///
    /// The archive entry is named after `relative_path` with its components
    /// joined by `/`, whatever the host separator is.
    pub fn add_file<R: AsRef<Path>, P: AsRef<Path>>(
        mut self,
        root: R,
        relative_path: P,
    ) -> BundleResult<Self> {
        let relative_path = relative_path.as_ref();

        // Entry name is independent of the host separator
        let archive_path = archive_path(relative_path)?;
        let source_path = root.as_ref().join(relative_path);

        // Read the asset now so a missing file fails before any write
        let contents = fs::read(&source_path).map_err(|e| BundleError::AssetNotFound {
            path: source_path.display().to_string(),
            source: e,
        })?;

        tracing::debug!(
            entry = %archive_path,
            bytes = contents.len(),
            sha256 = %compute_sha256(&contents),
            "staged asset"
        );

        self.files.push(ArchiveFile {
            archive_path,
            contents,
        });

        Ok(self)
    }

    /// Add raw bytes as a file in the archive.
    pub fn add_bytes(mut self, archive_path: &str, contents: Vec<u8>) -> Self {
        self.files.push(ArchiveFile {
            archive_path: archive_path.to_string(),
            contents,
        });
        self
    }

    /// Number of entries the archive will hold, manifest included.
    #[must_use]
    pub fn entry_count(&self) -> usize {
        self.files.len() + 1
    }

    /// Write the archive to a file, replacing any existing one.
    pub fn write<P: AsRef<Path>>(self, output_path: P) -> BundleResult<()> {
        let output_path = output_path.as_ref();

        // Serialize before creating the output file
        let manifest_json = self.manifest.to_json()?;

        // Create the ZIP file
        let file = File::create(output_path).map_err(|e| {
            BundleError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to create {}: {}", output_path.display(), e),
            ))
        })?;
        let mut zip = ZipWriter::new(file);
        // Fixed timestamps keep reruns byte-identical
        let options = SimpleFileOptions::default()
            .compression_method(zip::CompressionMethod::Deflated)
            .last_modified_time(DateTime::default());

        // Write manifest.json
        zip.start_file(MANIFEST_FILE, options)?;
        zip.write_all(manifest_json.as_bytes())?;

        // Write assets in the order they were added
        for archive_file in &self.files {
            zip.start_file(archive_file.archive_path.as_str(), options)?;
            zip.write_all(&archive_file.contents)?;
        }

        zip.finish()?;

        Ok(())
    }
}

/// Normalize a relative path into a `/`-separated archive entry name.
///
/// Absolute paths and `..` components are rejected; `.` components are
/// dropped.
pub fn archive_path(relative_path: &Path) -> BundleResult<String> {
    let mut parts = Vec::new();
    for component in relative_path.components() {
        match component {
            Component::Normal(part) => parts.push(part.to_string_lossy()),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => {
                return Err(BundleError::InvalidConfig(format!(
                    "asset path must stay inside the source directory: {}",
                    relative_path.display()
                )));
            }
        }
    }

    if parts.is_empty() {
        return Err(BundleError::InvalidConfig(format!(
            "asset path has no file name: {}",
            relative_path.display()
        )));
    }

    Ok(parts.join("/"))
}

/// Compute SHA256 hash of data and return as hex string.
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    let result = hasher.finalize();
    hex::encode(result)
}

/// Verify SHA256 checksum of data.
pub fn verify_sha256(data: &[u8], expected: &str) -> bool {
    let actual = compute_sha256(data);

    // Handle both "sha256:xxx" and raw "xxx" formats
    let expected_hex = expected.strip_prefix("sha256:").unwrap_or(expected);

    actual == expected_hex
}
