//! Extension manifest document and per-platform transforms.
//!
//! The manifest is kept as a generic JSON tree rather than a typed struct:
//! only a handful of keys are ever touched, and every other key must pass
//! through byte-for-byte in its original position.

use crate::{BundleError, BundleResult, Platform};
use serde::{Deserialize, Serialize};
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Value};
use std::path::Path;

/// A nested manifest key, outermost segment first.
pub type KeyPath = &'static [&'static str];

/// Top-level `background` section.
pub const BACKGROUND: KeyPath = &["background"];

/// Firefox-only metadata (`gecko` id and version bounds).
pub const BROWSER_SPECIFIC_SETTINGS: KeyPath = &["browser_specific_settings"];

/// Event-page script list used by Firefox.
pub const BACKGROUND_SCRIPTS: KeyPath = &["background", "scripts"];

/// Service worker entry point used by Chromium browsers.
pub const BACKGROUND_SERVICE_WORKER: KeyPath = &["background", "service_worker"];

/// Keys every source manifest must carry before any transform runs.
pub const REQUIRED_KEYS: &[KeyPath] = &[
    BACKGROUND_SCRIPTS,
    BACKGROUND_SERVICE_WORKER,
    BROWSER_SPECIFIC_SETTINGS,
];

/// Extension manifest - the `manifest.json` document shipped in every archive.
///
/// Key order is preserved from the source document.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Manifest {
    root: Map<String, Value>,
}

impl Manifest {
    /// Wrap an already-parsed JSON value. The value must be an object.
    pub fn from_value(value: Value) -> BundleResult<Self> {
        match value {
            Value::Object(root) => Ok(Self { root }),
            other => Err(BundleError::InvalidManifest(format!(
                "top-level value must be an object, found {}",
                value_kind(&other)
            ))),
        }
    }

    /// Deserialize from JSON.
    pub fn from_json(json: &str) -> BundleResult<Self> {
        Self::from_value(serde_json::from_str(json)?)
    }

    /// Load a manifest from disk.
    pub fn from_file<P: AsRef<Path>>(path: P) -> BundleResult<Self> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path).map_err(|e| {
            BundleError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read manifest {}: {}", path.display(), e),
            ))
        })?;
        Self::from_json(&json)
    }

    /// Serialize to tab-indented JSON. Non-ASCII text is written literally.
    pub fn to_json(&self) -> BundleResult<String> {
        let mut buf = Vec::new();
        let mut serializer =
            serde_json::Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
        self.root.serialize(&mut serializer)?;

        String::from_utf8(buf)
            .map_err(|e| BundleError::InvalidManifest(format!("serialized to invalid UTF-8: {e}")))
    }

    /// Top-level entries in document order.
    #[must_use]
    pub fn as_map(&self) -> &Map<String, Value> {
        &self.root
    }

    /// Convert back into a plain JSON value.
    #[must_use]
    pub fn into_value(self) -> Value {
        Value::Object(self.root)
    }

    /// Extension name, if present.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.root.get("name").and_then(Value::as_str)
    }

    /// Extension version, if present.
    #[must_use]
    pub fn version(&self) -> Option<&str> {
        self.root.get("version").and_then(Value::as_str)
    }

    /// Look up a nested key.
    #[must_use]
    pub fn get(&self, path: KeyPath) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        rest.iter()
            .try_fold(self.root.get(*first)?, |value, segment| value.get(*segment))
    }

    #[must_use]
    pub fn contains(&self, path: KeyPath) -> bool {
        self.get(path).is_some()
    }

    /// Remove a nested key, returning its value.
    ///
    /// Sibling keys keep their relative order. Fails with
    /// [`BundleError::MissingKey`] if any segment of the path is absent.
    pub fn remove_key(&mut self, path: KeyPath) -> BundleResult<Value> {
        let (last, parents) = path
            .split_last()
            .ok_or_else(|| BundleError::InvalidManifest("empty key path".to_string()))?;

        let mut map = &mut self.root;
        for (depth, segment) in parents.iter().enumerate() {
            let value = map
                .get_mut(*segment)
                .ok_or_else(|| missing_key(&path[..=depth]))?;
            map = value.as_object_mut().ok_or_else(|| {
                BundleError::InvalidManifest(format!(
                    "{} must be an object",
                    dotted(&path[..=depth])
                ))
            })?;
        }

        map.shift_remove(*last).ok_or_else(|| missing_key(path))
    }

    /// Derive the manifest shipped to `platform`.
    ///
    /// Works on a copy; `self` is never modified, so platforms can be
    /// derived in any order from the same source.
    pub fn for_platform(&self, platform: Platform) -> BundleResult<Self> {
        let mut derived = self.clone();
        for &path in platform.stripped_keys() {
            derived.remove_key(path)?;
            tracing::debug!(%platform, key = %dotted(path), "removed manifest key");
        }
        Ok(derived)
    }

    /// Check that every key a platform transform removes is present.
    pub fn validate(&self) -> BundleResult<()> {
        match self.root.get(BACKGROUND[0]) {
            Some(Value::Object(_)) => {}
            Some(_) => {
                return Err(BundleError::InvalidManifest(
                    "background must be an object".to_string(),
                ));
            }
            None => return Err(missing_key(BACKGROUND)),
        }

        for &path in REQUIRED_KEYS {
            if !self.contains(path) {
                return Err(missing_key(path));
            }
        }

        Ok(())
    }
}

/// Render a key path as `a.b.c`.
#[must_use]
pub fn dotted(path: &[&str]) -> String {
    path.join(".")
}

fn missing_key(path: &[&str]) -> BundleError {
    BundleError::MissingKey { key: dotted(path) }
}

fn value_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    #![allow(non_snake_case)]

    use super::*;
    use serde_json::json;

    fn source_manifest() -> Manifest {
        Manifest::from_value(json!({
            "manifest_version": 3,
            "name": "Last.fm Titlecase",
            "version": "1.4.0",
            "background": {
                "scripts": ["src/background.js"],
                "service_worker": "src/background.js",
                "type": "module"
            },
            "browser_specific_settings": {
                "gecko": { "id": "titlecase@example.org" }
            },
            "permissions": ["storage"]
        }))
        .unwrap()
    }

    fn top_level_keys(manifest: &Manifest) -> Vec<&str> {
        manifest.as_map().keys().map(String::as_str).collect()
    }

    #[test]
    fn Manifest___from_json___rejects_non_object() {
        let result = Manifest::from_json("[1, 2, 3]");

        assert!(matches!(result, Err(BundleError::InvalidManifest(_))));
        assert!(result.unwrap_err().to_string().contains("array"));
    }

    #[test]
    fn Manifest___from_json___rejects_malformed_document() {
        let result = Manifest::from_json("{\"name\": ");

        assert!(matches!(result, Err(BundleError::Json(_))));
    }

    #[test]
    fn Manifest___from_file___missing_file_returns_io_error() {
        let result = Manifest::from_file("/nonexistent/manifest.json");

        assert!(matches!(result, Err(BundleError::Io(_))));
    }

    #[test]
    fn Manifest___from_json___preserves_key_order() {
        let manifest = Manifest::from_json(r#"{"zeta": 1, "alpha": 2, "mid": 3}"#).unwrap();

        assert_eq!(top_level_keys(&manifest), vec!["zeta", "alpha", "mid"]);
    }

    #[test]
    fn Manifest___to_json___uses_tab_indentation() {
        let manifest = Manifest::from_json(r#"{"name": "x", "background": {"a": [1]}}"#).unwrap();

        let json = manifest.to_json().unwrap();

        assert_eq!(
            json,
            "{\n\t\"name\": \"x\",\n\t\"background\": {\n\t\t\"a\": [\n\t\t\t1\n\t\t]\n\t}\n}"
        );
    }

    #[test]
    fn Manifest___to_json___keeps_non_ascii_literal() {
        let manifest = Manifest::from_json(r#"{"description": "Titelschreibung für Künstler ✓"}"#)
            .unwrap();

        let json = manifest.to_json().unwrap();

        assert!(json.contains("Titelschreibung für Künstler ✓"));
        assert!(!json.contains("\\u"));
    }

    #[test]
    fn Manifest___get___follows_nested_path() {
        let manifest = source_manifest();

        assert_eq!(
            manifest.get(BACKGROUND_SERVICE_WORKER),
            Some(&json!("src/background.js"))
        );
        assert_eq!(manifest.get(&["background", "nope"]), None);
        assert_eq!(manifest.get(&[]), None);
    }

    #[test]
    fn Manifest___remove_key___keeps_sibling_order() {
        let mut manifest = source_manifest();

        manifest.remove_key(BACKGROUND_SCRIPTS).unwrap();

        let background = manifest.get(BACKGROUND).unwrap().as_object().unwrap();
        let keys: Vec<&str> = background.keys().map(String::as_str).collect();
        assert_eq!(keys, vec!["service_worker", "type"]);
    }

    #[test]
    fn Manifest___remove_key___missing_parent_reports_parent() {
        let mut manifest = Manifest::from_json(r#"{"name": "x"}"#).unwrap();

        let err = manifest.remove_key(BACKGROUND_SCRIPTS).unwrap_err();

        assert!(matches!(err, BundleError::MissingKey { ref key } if key == "background"));
    }

    #[test]
    fn Manifest___remove_key___non_object_parent_is_invalid() {
        let mut manifest = Manifest::from_json(r#"{"background": "bg.js"}"#).unwrap();

        let err = manifest.remove_key(BACKGROUND_SCRIPTS).unwrap_err();

        assert!(matches!(err, BundleError::InvalidManifest(_)));
    }

    #[test]
    fn Manifest___for_platform___chromium_strips_gecko_keys() {
        let manifest = source_manifest();

        for platform in [Platform::Chrome, Platform::Edge] {
            let derived = manifest.for_platform(platform).unwrap();

            assert!(!derived.contains(BROWSER_SPECIFIC_SETTINGS));
            assert!(!derived.contains(BACKGROUND_SCRIPTS));
            assert!(derived.contains(BACKGROUND_SERVICE_WORKER));
            assert_eq!(
                top_level_keys(&derived),
                vec![
                    "manifest_version",
                    "name",
                    "version",
                    "background",
                    "permissions"
                ]
            );
        }
    }

    #[test]
    fn Manifest___for_platform___firefox_strips_service_worker_only() {
        let manifest = source_manifest();

        let derived = manifest.for_platform(Platform::Firefox).unwrap();

        let mut expected = source_manifest();
        expected.remove_key(BACKGROUND_SERVICE_WORKER).unwrap();
        assert_eq!(derived, expected);
        assert_eq!(
            derived.get(BROWSER_SPECIFIC_SETTINGS),
            manifest.get(BROWSER_SPECIFIC_SETTINGS)
        );
    }

    #[test]
    fn Manifest___for_platform___leaves_source_untouched() {
        let manifest = source_manifest();
        let before = manifest.clone();

        for platform in Platform::all() {
            manifest.for_platform(*platform).unwrap();
        }

        assert_eq!(manifest, before);
    }

    #[test]
    fn Manifest___for_platform___second_pass_fails_on_missing_key() {
        let manifest = source_manifest();

        for platform in Platform::all() {
            let once = manifest.for_platform(*platform).unwrap();
            let twice = once.for_platform(*platform);

            assert!(matches!(twice, Err(BundleError::MissingKey { .. })));
        }
    }

    #[test]
    fn Manifest___validate___accepts_complete_manifest() {
        assert!(source_manifest().validate().is_ok());
    }

    #[test]
    fn Manifest___validate___rejects_missing_background() {
        let manifest = Manifest::from_json(r#"{"name": "x"}"#).unwrap();

        let err = manifest.validate().unwrap_err();

        assert_eq!(err.to_string(), "Manifest key not found: background");
    }

    #[test]
    fn Manifest___validate___rejects_missing_gecko_settings() {
        let mut manifest = source_manifest();
        manifest.remove_key(BROWSER_SPECIFIC_SETTINGS).unwrap();

        let err = manifest.validate().unwrap_err();

        assert!(
            matches!(err, BundleError::MissingKey { ref key } if key == "browser_specific_settings")
        );
    }

    #[test]
    fn Manifest___json_roundtrip___preserves_data() {
        let manifest = source_manifest();

        let parsed = Manifest::from_json(&manifest.to_json().unwrap()).unwrap();

        assert_eq!(parsed, manifest);
        assert_eq!(parsed.name(), Some("Last.fm Titlecase"));
        assert_eq!(parsed.version(), Some("1.4.0"));
    }
}
