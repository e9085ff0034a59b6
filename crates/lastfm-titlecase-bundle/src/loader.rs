//! Archive loading utilities.
//!
//! The [`ArchiveLoader`] reads a packaged archive back, for verification
//! and inspection.

use crate::{BundleError, BundleResult, MANIFEST_FILE, Manifest};
use std::fs::File;
use std::io::Read;
use std::path::Path;
use zip::ZipArchive;

/// Loader for packaged extension archives.
///
/// # Example
///
/// ```no_run
/// use lastfm_titlecase_bundle::ArchiveLoader;
///
/// let mut loader = ArchiveLoader::open("lastfm-titlecase-firefox.zip")?;
/// println!("{:?}", loader.manifest().name());
/// let script = loader.read_file("dist/content.js")?;
/// # Ok::<(), lastfm_titlecase_bundle::BundleError>(())
/// ```
#[derive(Debug)]
pub struct ArchiveLoader {
    archive: ZipArchive<File>,
    manifest: Manifest,
}

impl ArchiveLoader {
    /// Open an archive file for reading.
    pub fn open<P: AsRef<Path>>(path: P) -> BundleResult<Self> {
        let path = path.as_ref();
        let file = File::open(path)?;
        let mut archive = ZipArchive::new(file)?;

        let manifest = {
            let mut manifest_file = archive.by_name(MANIFEST_FILE).map_err(|_| {
                BundleError::MissingFile(format!("{MANIFEST_FILE} not found in archive"))
            })?;

            let mut manifest_json = String::new();
            manifest_file.read_to_string(&mut manifest_json)?;
            Manifest::from_json(&manifest_json)?
        };

        Ok(Self { archive, manifest })
    }

    /// Get the archived manifest.
    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Read a file from the archive as bytes.
    pub fn read_file(&mut self, path: &str) -> BundleResult<Vec<u8>> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|_| BundleError::MissingFile(format!("File not found in archive: {path}")))?;

        let mut contents = Vec::new();
        file.read_to_end(&mut contents)?;
        Ok(contents)
    }

    /// Read a file from the archive as a string.
    pub fn read_file_string(&mut self, path: &str) -> BundleResult<String> {
        let mut file = self
            .archive
            .by_name(path)
            .map_err(|_| BundleError::MissingFile(format!("File not found in archive: {path}")))?;

        let mut contents = String::new();
        file.read_to_string(&mut contents)?;
        Ok(contents)
    }

    /// List all files in the archive, in stored order.
    #[must_use]
    pub fn list_files(&self) -> Vec<String> {
        (0..self.archive.len())
            .filter_map(|i| self.archive.name_for_index(i).map(String::from))
            .collect()
    }

    /// Check if a file exists in the archive.
    #[must_use]
    pub fn has_file(&self, path: &str) -> bool {
        self.archive.index_for_name(path).is_some()
    }

    /// Check that every entry uses DEFLATE compression.
    pub fn all_deflated(&mut self) -> BundleResult<bool> {
        for i in 0..self.archive.len() {
            let entry = self.archive.by_index(i)?;
            if entry.compression() != zip::CompressionMethod::Deflated {
                return Ok(false);
            }
        }
        Ok(true)
    }
}
