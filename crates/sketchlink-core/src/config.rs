//! Bridge configuration model.
//!
//! Loaded from `config.toml` by the infrastructure layer. Every field has a
//! default so a missing or partial file still yields a usable configuration.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use std::time::Duration;

use crate::record::DEFAULT_DOCUMENT_NAME;

/// Embed URL of the hosted diagram editor, JSON protocol enabled.
pub const DEFAULT_EMBED_URL: &str =
    "https://embed.diagrams.net/?embed=1&proto=json&spin=1&ui=min&libraries=1#";

/// Title shown on notifications raised by the bridge.
pub const DEFAULT_NOTIFICATION_TITLE: &str = "Draw.io";

/// Upper bound on how long a `load` waits for the editor's `init` event.
pub const DEFAULT_LOAD_FALLBACK_DELAY_MS: u64 = 500;

/// Root of `config.toml`.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct RootConfig {
    #[serde(default)]
    pub editor: EditorConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Settings for the embedded editor and the session protocol.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct EditorConfig {
    /// URL loaded into the editor frame
    pub embed_url: String,
    /// Title used for notify/warn calls
    pub notification_title: String,
    /// Document name used when the record has none
    pub default_document_name: String,
    /// Fallback delay before `load` is sent without an `init` event
    pub load_fallback_delay_ms: u64,
    /// Give up on an export request after this long (disabled when unset)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub export_timeout_ms: Option<u64>,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            embed_url: DEFAULT_EMBED_URL.to_string(),
            notification_title: DEFAULT_NOTIFICATION_TITLE.to_string(),
            default_document_name: DEFAULT_DOCUMENT_NAME.to_string(),
            load_fallback_delay_ms: DEFAULT_LOAD_FALLBACK_DELAY_MS,
            export_timeout_ms: None,
        }
    }
}

impl EditorConfig {
    /// Fallback delay as a `Duration`.
    pub fn load_fallback_delay(&self) -> Duration {
        Duration::from_millis(self.load_fallback_delay_ms)
    }

    /// Export timeout as a `Duration`, if enabled.
    pub fn export_timeout(&self) -> Option<Duration> {
        self.export_timeout_ms.map(Duration::from_millis)
    }

    /// Origin (`scheme://host[:port]`) of the embed URL.
    ///
    /// Userinfo, path and default ports are dropped. Returns `None` when the
    /// URL does not parse or has an opaque origin.
    pub fn editor_origin(&self) -> Option<String> {
        let url = url::Url::parse(&self.embed_url).ok()?;
        let origin = url.origin();
        origin
            .is_tuple()
            .then(|| origin.ascii_serialization())
    }
}

/// Where record files live.
#[derive(Deserialize, Serialize, Debug, Clone, Default, PartialEq, Eq)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory of record files; platform data dir when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub records_dir: Option<PathBuf>,
}

/// Logging output settings.
#[derive(Deserialize, Serialize, Debug, Clone, PartialEq, Eq)]
#[serde(default)]
pub struct LoggingConfig {
    /// Default filter directive; `RUST_LOG` takes precedence
    pub level: String,
    /// Emit JSON lines instead of human-readable output
    pub json: bool,
    /// Directory for daily rolling log files; stderr only when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            json: false,
            directory: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = RootConfig::default();
        assert_eq!(config.editor.embed_url, DEFAULT_EMBED_URL);
        assert_eq!(config.editor.default_document_name, "diagram.drawio");
        assert_eq!(config.editor.load_fallback_delay(), Duration::from_millis(500));
        assert_eq!(config.editor.export_timeout(), None);
        assert_eq!(config.logging.level, "info");
        assert!(config.storage.records_dir.is_none());
    }

    #[test]
    fn test_partial_toml_keeps_defaults() {
        let config: RootConfig = toml::from_str(
            r#"
            [editor]
            export_timeout_ms = 30000

            [logging]
            json = true
            "#,
        )
        .unwrap();

        assert_eq!(config.editor.export_timeout(), Some(Duration::from_secs(30)));
        assert_eq!(config.editor.notification_title, DEFAULT_NOTIFICATION_TITLE);
        assert!(config.logging.json);
        assert_eq!(config.logging.level, "info");
    }

    #[test]
    fn test_editor_origin() {
        let config = EditorConfig::default();
        assert_eq!(config.editor_origin().as_deref(), Some("https://embed.diagrams.net"));

        let local = EditorConfig {
            embed_url: "http://localhost:8080?embed=1".to_string(),
            ..EditorConfig::default()
        };
        assert_eq!(local.editor_origin().as_deref(), Some("http://localhost:8080"));

        let broken = EditorConfig {
            embed_url: "embed.diagrams.net".to_string(),
            ..EditorConfig::default()
        };
        assert_eq!(broken.editor_origin(), None);

        let opaque = EditorConfig {
            embed_url: "data:text/html,<p>".to_string(),
            ..EditorConfig::default()
        };
        assert_eq!(opaque.editor_origin(), None);
    }

    #[test]
    fn test_editor_origin_drops_userinfo_and_default_port() {
        let config = EditorConfig {
            embed_url: "https://user:pw@embed.example.net:443/?embed=1".to_string(),
            ..EditorConfig::default()
        };
        assert_eq!(config.editor_origin().as_deref(), Some("https://embed.example.net"));

        let custom_port = EditorConfig {
            embed_url: "https://embed.example.net:8443/app#x".to_string(),
            ..EditorConfig::default()
        };
        assert_eq!(
            custom_port.editor_origin().as_deref(),
            Some("https://embed.example.net:8443")
        );
    }
}
