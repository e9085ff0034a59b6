//! Target browser identification.

use crate::manifest::{
    BACKGROUND_SCRIPTS, BACKGROUND_SERVICE_WORKER, BROWSER_SPECIFIC_SETTINGS, KeyPath,
};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Browser stores an archive is produced for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Google Chrome Web Store.
    Chrome,
    /// Microsoft Edge Add-ons.
    Edge,
    /// Mozilla Add-ons.
    Firefox,
}

/// Browser engine family, which decides the manifest shape.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Family {
    /// Service-worker background, no Gecko settings.
    Chromium,
    /// Script-list background with `browser_specific_settings`.
    Gecko,
}

impl Platform {
    /// Get the platform key string (e.g., "chrome").
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Chrome => "chrome",
            Self::Edge => "edge",
            Self::Firefox => "firefox",
        }
    }

    /// Parse a platform from its string representation.
    #[must_use]
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "chrome" => Some(Self::Chrome),
            "edge" => Some(Self::Edge),
            "firefox" => Some(Self::Firefox),
            _ => None,
        }
    }

    #[must_use]
    pub fn family(&self) -> Family {
        match self {
            Self::Chrome | Self::Edge => Family::Chromium,
            Self::Firefox => Family::Gecko,
        }
    }

    /// Manifest keys that do not apply to this platform, in removal order.
    #[must_use]
    pub fn stripped_keys(&self) -> &'static [KeyPath] {
        match self.family() {
            Family::Chromium => &[BROWSER_SPECIFIC_SETTINGS, BACKGROUND_SCRIPTS],
            Family::Gecko => &[BACKGROUND_SERVICE_WORKER],
        }
    }

    /// Format the archive file name for this platform.
    ///
    /// # Example
    ///
    /// ```
    /// use lastfm_titlecase_bundle::Platform;
    ///
    /// assert_eq!(
    ///     Platform::Firefox.archive_name("lastfm-titlecase"),
    ///     "lastfm-titlecase-firefox.zip"
    /// );
    /// ```
    #[must_use]
    pub fn archive_name(&self, prefix: &str) -> String {
        format!("{prefix}-{}.{}", self.as_str(), crate::ARCHIVE_EXTENSION)
    }

    /// Get all supported platforms.
    #[must_use]
    pub fn all() -> &'static [Platform] {
        &[Self::Chrome, Self::Edge, Self::Firefox]
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}
