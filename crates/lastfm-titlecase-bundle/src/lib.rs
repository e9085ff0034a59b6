//! Browser extension packaging for Last.fm Titlecase
//!
//! This crate turns the extension source tree into one `.zip` archive per
//! browser store. Each archive carries a copy of `manifest.json` reshaped for
//! its target, plus the same fixed set of static assets.
//!
//! # Archive Structure
//!
//! ```text
//! lastfm-titlecase-chrome.zip
//! ├── manifest.json              # background.scripts and
//! │                              # browser_specific_settings removed
//! ├── img/icons/
//! │   ├── icon16.png
//! │   ├── icon48.png
//! │   └── icon128.png
//! ├── dist/
//! │   ├── config.js
//! │   └── content.js
//! └── src/
//!     ├── background.js
//!     ├── config.html
//!     └── config.css
//! ```
//!
//! The Firefox archive keeps `background.scripts` and
//! `browser_specific_settings` and drops `background.service_worker`.
//!
//! # Example
//!
//! ```no_run
//! use lastfm_titlecase_bundle::{Packager, PackagerConfig};
//!
//! let packager = Packager::new(PackagerConfig::default())?;
//! packager.run()?;
//! # Ok::<(), lastfm_titlecase_bundle::BundleError>(())
//! ```

mod config;
mod error;
mod manifest;
mod packager;
mod platform;

pub mod builder;
pub mod loader;

pub use builder::ArchiveBuilder;
pub use config::{DEFAULT_ARCHIVE_PREFIX, PackagerConfig, STATIC_FILES};
pub use error::BundleError;
pub use loader::ArchiveLoader;
pub use manifest::{
    BACKGROUND, BACKGROUND_SCRIPTS, BACKGROUND_SERVICE_WORKER, BROWSER_SPECIFIC_SETTINGS, KeyPath,
    Manifest, REQUIRED_KEYS, dotted,
};
pub use packager::{PackagedArchive, Packager};
pub use platform::{Family, Platform};

/// Result type for packaging operations.
pub type BundleResult<T> = Result<T, BundleError>;

/// Archive file extension.
pub const ARCHIVE_EXTENSION: &str = "zip";

/// Manifest file name, both in the source tree and within each archive.
pub const MANIFEST_FILE: &str = "manifest.json";
