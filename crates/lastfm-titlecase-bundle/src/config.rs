//! Packaging configuration.
//!
//! [`PackagerConfig::default`] describes the extension as it ships: the
//! source manifest, the fixed asset list, and all three target stores.
//! A TOML file can narrow the platform set or move the output directory;
//! the manifest and asset list are fixed.

use crate::{BundleError, BundleResult, MANIFEST_FILE, Platform};
use serde::Deserialize;
use std::collections::HashSet;
use std::path::{Path, PathBuf};

/// Archive file name prefix; archives are `<prefix>-<platform>.zip`.
pub const DEFAULT_ARCHIVE_PREFIX: &str = "lastfm-titlecase";

/// Assets copied verbatim into every archive, in write order.
pub const STATIC_FILES: &[&str] = &[
    "img/icons/icon16.png",
    "img/icons/icon48.png",
    "img/icons/icon128.png",
    "dist/config.js",
    "dist/content.js",
    "src/background.js",
    "src/config.html",
    "src/config.css",
];

/// Everything the packager needs for one run.
#[derive(Debug, Clone, PartialEq)]
pub struct PackagerConfig {
    /// Directory the manifest and assets are read from.
    pub source_dir: PathBuf,
    /// Directory archives are written to.
    pub output_dir: PathBuf,
    /// Manifest location, relative to `source_dir`.
    pub manifest_path: PathBuf,
    pub archive_prefix: String,
    /// Asset paths relative to `source_dir`.
    pub files: Vec<String>,
    /// Platforms to package, in order.
    pub platforms: Vec<Platform>,
}

/// On-disk overrides, e.g. `package.toml`.
///
/// ```toml
/// out_dir = "target/store"
/// platforms = ["firefox"]
/// ```
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ConfigOverrides {
    out_dir: Option<PathBuf>,
    platforms: Option<Vec<Platform>>,
}

impl Default for PackagerConfig {
    fn default() -> Self {
        Self {
            source_dir: PathBuf::from("."),
            output_dir: PathBuf::from("."),
            manifest_path: PathBuf::from(MANIFEST_FILE),
            archive_prefix: DEFAULT_ARCHIVE_PREFIX.to_string(),
            files: STATIC_FILES.iter().map(|f| (*f).to_string()).collect(),
            platforms: Platform::all().to_vec(),
        }
    }
}

impl PackagerConfig {
    #[must_use]
    pub fn with_source_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.source_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_output_dir<P: Into<PathBuf>>(mut self, dir: P) -> Self {
        self.output_dir = dir.into();
        self
    }

    #[must_use]
    pub fn with_platforms(mut self, platforms: Vec<Platform>) -> Self {
        self.platforms = platforms;
        self
    }

    /// Apply overrides from a TOML document.
    pub fn apply_toml(mut self, content: &str) -> BundleResult<Self> {
        let overrides: ConfigOverrides = toml::from_str(content)?;

        if let Some(out_dir) = overrides.out_dir {
            self.output_dir = out_dir;
        }
        if let Some(platforms) = overrides.platforms {
            self.platforms = platforms;
        }

        Ok(self)
    }

    /// Apply overrides from a TOML file.
    pub fn apply_toml_file<P: AsRef<Path>>(self, path: P) -> BundleResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            BundleError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config {}: {}", path.display(), e),
            ))
        })?;
        self.apply_toml(&content)
    }

    /// Validate the configuration.
    pub fn validate(&self) -> BundleResult<()> {
        if self.archive_prefix.is_empty() {
            return Err(BundleError::InvalidConfig(
                "archive prefix cannot be empty".to_string(),
            ));
        }

        if self.archive_prefix.contains(['/', '\\']) {
            return Err(BundleError::InvalidConfig(format!(
                "archive prefix cannot contain path separators: {}",
                self.archive_prefix
            )));
        }

        if self.files.is_empty() {
            return Err(BundleError::InvalidConfig(
                "at least one asset file must be listed".to_string(),
            ));
        }

        if self.platforms.is_empty() {
            return Err(BundleError::InvalidConfig(
                "at least one platform must be selected".to_string(),
            ));
        }

        let mut seen = HashSet::new();
        for platform in &self.platforms {
            if !seen.insert(platform) {
                return Err(BundleError::InvalidConfig(format!(
                    "platform listed twice: {platform}"
                )));
            }
        }

        let mut seen = HashSet::new();
        for file in &self.files {
            let entry = crate::builder::archive_path(Path::new(file))?;
            if entry == MANIFEST_FILE {
                return Err(BundleError::InvalidConfig(format!(
                    "asset would overwrite the generated {MANIFEST_FILE}"
                )));
            }
            if !seen.insert(entry) {
                return Err(BundleError::InvalidConfig(format!(
                    "asset listed twice: {file}"
                )));
            }
        }

        Ok(())
    }

    /// Full path of the source manifest.
    #[must_use]
    pub fn manifest_file(&self) -> PathBuf {
        self.source_dir.join(&self.manifest_path)
    }

    /// Output path of the archive for `platform`.
    #[must_use]
    pub fn archive_file(&self, platform: Platform) -> PathBuf {
        self.output_dir
            .join(platform.archive_name(&self.archive_prefix))
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;

    #[test]
    fn PackagerConfig___default___matches_shipped_layout() {
        let config = PackagerConfig::default();

        assert_eq!(config.files.len(), 8);
        assert_eq!(config.files[0], "img/icons/icon16.png");
        assert_eq!(config.files[7], "src/config.css");
        assert_eq!(
            config.platforms,
            vec![Platform::Chrome, Platform::Edge, Platform::Firefox]
        );
        assert_eq!(config.manifest_file(), Path::new("./manifest.json"));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn PackagerConfig___archive_file___joins_output_dir() {
        let config = PackagerConfig::default().with_output_dir("/tmp/out");

        assert_eq!(
            config.archive_file(Platform::Firefox),
            Path::new("/tmp/out/lastfm-titlecase-firefox.zip")
        );
    }

    #[test]
    fn PackagerConfig___apply_toml___overrides_given_fields_only() {
        let config = PackagerConfig::default()
            .apply_toml(
                r#"
                out_dir = "target/store"
                platforms = ["firefox", "chrome"]
                "#,
            )
            .unwrap();

        assert_eq!(config.output_dir, Path::new("target/store"));
        assert_eq!(config.platforms, vec![Platform::Firefox, Platform::Chrome]);
        assert_eq!(config.source_dir, Path::new("."));
        assert_eq!(config.archive_prefix, DEFAULT_ARCHIVE_PREFIX);
        assert_eq!(config.files.len(), STATIC_FILES.len());
    }

    #[test]
    fn PackagerConfig___apply_toml___rejects_unknown_platform() {
        let result = PackagerConfig::default().apply_toml(r#"platforms = ["safari"]"#);

        assert!(matches!(result, Err(BundleError::Toml(_))));
    }

    #[test]
    fn PackagerConfig___apply_toml___rejects_asset_list_override() {
        let result = PackagerConfig::default()
            .apply_toml(r#"files = ["dist/content.js"]"#);

        assert!(matches!(result, Err(BundleError::Toml(_))));
    }

    #[test]
    fn PackagerConfig___apply_toml___rejects_unknown_field() {
        let result = PackagerConfig::default().apply_toml(r#"compression = "store""#);

        assert!(matches!(result, Err(BundleError::Toml(_))));
    }

    #[test]
    fn PackagerConfig___apply_toml_file___missing_file_returns_io_error() {
        let result = PackagerConfig::default().apply_toml_file("/nonexistent/package.toml");

        assert!(matches!(result, Err(BundleError::Io(_))));
    }

    #[test]
    fn PackagerConfig___validate___rejects_empty_file_list() {
        let mut config = PackagerConfig::default();
        config.files.clear();

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("at least one asset"));
    }

    #[test]
    fn PackagerConfig___validate___rejects_duplicate_platform() {
        let config =
            PackagerConfig::default().with_platforms(vec![Platform::Edge, Platform::Edge]);

        let err = config.validate().unwrap_err();

        assert!(err.to_string().contains("platform listed twice: edge"));
    }

    #[test]
    fn PackagerConfig___validate___rejects_manifest_shadowing_asset() {
        let mut config = PackagerConfig::default();
        config.files.push("./manifest.json".to_string());

        assert!(config.validate().is_err());
    }

    #[test]
    fn PackagerConfig___validate___rejects_escaping_asset() {
        let mut config = PackagerConfig::default();
        config.files.push("../outside.js".to_string());

        assert!(config.validate().is_err());
    }

    #[test]
    fn PackagerConfig___validate___rejects_prefix_with_separator() {
        let mut config = PackagerConfig::default();
        config.archive_prefix = "dist/lastfm".to_string();

        assert!(config.validate().is_err());
    }
}
