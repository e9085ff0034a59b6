//! Packaging run: one archive per configured platform.

use crate::builder::{compute_sha256, verify_sha256};
use crate::{
    ArchiveBuilder, ArchiveLoader, BundleError, BundleResult, MANIFEST_FILE, Manifest,
    PackagerConfig, Platform,
};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};

/// An archive written by [`Packager::run`].
#[derive(Debug, Clone, PartialEq)]
pub struct PackagedArchive {
    pub platform: Platform,
    pub path: PathBuf,
    /// Entries written, manifest included.
    pub entries: usize,
}

/// Packages the source manifest and assets for each configured platform.
///
/// # Example
///
/// ```no_run
/// use lastfm_titlecase_bundle::{Packager, PackagerConfig};
///
/// let packager = Packager::new(PackagerConfig::default())?;
/// for archive in packager.run()? {
///     println!("{}", archive.path.display());
/// }
/// # Ok::<(), lastfm_titlecase_bundle::BundleError>(())
/// ```
#[derive(Debug)]
pub struct Packager {
    config: PackagerConfig,
    manifest: Manifest,
}

impl Packager {
    /// Validate `config` and load the source manifest it points at.
    pub fn new(config: PackagerConfig) -> BundleResult<Self> {
        config.validate()?;

        let manifest = Manifest::from_file(config.manifest_file())?;
        manifest.validate()?;

        Ok(Self::with_manifest(config, manifest))
    }

    /// Use an already-loaded manifest instead of reading one from disk.
    #[must_use]
    pub fn with_manifest(config: PackagerConfig, manifest: Manifest) -> Self {
        Self { config, manifest }
    }

    #[must_use]
    pub fn config(&self) -> &PackagerConfig {
        &self.config
    }

    /// The source manifest, before any platform transform.
    #[must_use]
    pub fn manifest(&self) -> &Manifest {
        &self.manifest
    }

    /// Package every configured platform in order, stopping at the first error.
    ///
    /// On failure, archives for the failed platform and every platform after
    /// it are removed, so only archives written by this run remain.
    pub fn run(&self) -> BundleResult<Vec<PackagedArchive>> {
        let platforms = &self.config.platforms;
        let mut written = Vec::with_capacity(platforms.len());

        for (index, platform) in platforms.iter().enumerate() {
            match self.run_platform(*platform) {
                Ok(archive) => written.push(archive),
                Err(e) => {
                    for skipped in &platforms[index + 1..] {
                        self.discard_archive(*skipped);
                    }
                    return Err(e);
                }
            }
        }

        Ok(written)
    }

    /// Package a single platform.
    ///
    /// Any archive left from an earlier run is removed if packaging fails.
    pub fn run_platform(&self, platform: Platform) -> BundleResult<PackagedArchive> {
        let path = self.config.archive_file(platform);

        self.write_archive(platform, path).inspect_err(|e| {
            warn!(%platform, error = %e, "packaging failed");
            self.discard_archive(platform);
        })
    }

    fn write_archive(&self, platform: Platform, path: PathBuf) -> BundleResult<PackagedArchive> {
        let manifest = self.manifest.for_platform(platform)?;

        // Stage every asset before touching the output file
        let mut builder = ArchiveBuilder::new(manifest);
        for file in &self.config.files {
            builder = builder.add_file(&self.config.source_dir, file)?;
        }

        let entries = builder.entry_count();
        builder.write(&path)?;

        info!(%platform, path = %path.display(), entries, "archive written");

        Ok(PackagedArchive {
            platform,
            path,
            entries,
        })
    }

    /// Remove the archive for `platform` if one exists.
    fn discard_archive(&self, platform: Platform) {
        let path = self.config.archive_file(platform);
        match fs::remove_file(&path) {
            Ok(()) => debug!(%platform, path = %path.display(), "removed stale archive"),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => warn!(path = %path.display(), error = %e, "could not remove stale archive"),
        }
    }

    /// Re-open a written archive and check it against its sources.
    ///
    /// The archived manifest must equal the platform transform of the source
    /// manifest, and every asset must match its source file byte for byte.
    pub fn verify(&self, archive: &PackagedArchive) -> BundleResult<()> {
        let expected = self.manifest.for_platform(archive.platform)?;
        let mut loader = ArchiveLoader::open(&archive.path)?;

        // Compare parsed documents so formatting differences don't matter
        if loader.manifest() != &expected {
            return Err(BundleError::ChecksumMismatch {
                path: format!("{}:{MANIFEST_FILE}", archive.path.display()),
                expected: format!("sha256:{}", compute_sha256(expected.to_json()?.as_bytes())),
                actual: format!(
                    "sha256:{}",
                    compute_sha256(loader.manifest().to_json()?.as_bytes())
                ),
            });
        }

        for file in &self.config.files {
            let entry = crate::builder::archive_path(Path::new(file))?;
            let source = fs::read(self.config.source_dir.join(file))?;
            let expected = compute_sha256(&source);

            // Missing entries surface as MissingFile from the loader
            let archived = loader.read_file(&entry)?;
            if !verify_sha256(&archived, &expected) {
                return Err(BundleError::ChecksumMismatch {
                    path: entry,
                    expected: format!("sha256:{expected}"),
                    actual: format!("sha256:{}", compute_sha256(&archived)),
                });
            }
            debug!(%entry, "verified");
        }

        let listed = loader.list_files().len();
        if listed != archive.entries {
            return Err(BundleError::EntryCountMismatch {
                path: archive.path.display().to_string(),
                expected: archive.entries,
                actual: listed,
            });
        }

        Ok(())
    }
}
