//! Content Security Policy adjustments for pages that host the editor.
//!
//! A host page that frames the editor needs the editor origin in `frame-src`,
//! and shows PNG previews as `data:` URLs, so `img-src` needs `data:`.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use crate::config::EditorConfig;

const FRAME_SRC: &str = "frame-src";
const IMG_SRC: &str = "img-src";
const DATA_SCHEME_SOURCE: &str = "data:";

/// A parsed `Content-Security-Policy` header.
///
/// Directives and their sources are kept sorted so rendering is deterministic.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CspPolicy {
    directives: BTreeMap<String, BTreeSet<String>>,
}

impl CspPolicy {
    /// Creates an empty policy.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a header value such as `default-src 'self'; img-src *`.
    ///
    /// Empty segments are skipped; directive names are lowercased.
    pub fn parse(header: &str) -> Self {
        let mut policy = Self::new();
        for segment in header.split(';') {
            let mut parts = segment.split_whitespace();
            let Some(name) = parts.next() else {
                continue;
            };
            let sources = policy.directives.entry(name.to_ascii_lowercase()).or_default();
            sources.extend(parts.map(str::to_string));
        }
        policy
    }

    /// Adds a source to a directive, creating the directive if needed.
    pub fn allow(&mut self, directive: &str, source: impl Into<String>) -> &mut Self {
        self.directives
            .entry(directive.to_ascii_lowercase())
            .or_default()
            .insert(source.into());
        self
    }

    /// Returns the sources of a directive.
    pub fn sources(&self, directive: &str) -> Option<&BTreeSet<String>> {
        self.directives.get(&directive.to_ascii_lowercase())
    }

    /// Opens the policy to the editor frame and its data-URL previews.
    ///
    /// Idempotent: applying it twice yields the same policy.
    pub fn allow_editor(&mut self, config: &EditorConfig) -> &mut Self {
        if let Some(origin) = config.editor_origin() {
            self.allow(FRAME_SRC, origin);
        } else {
            tracing::warn!(embed_url = %config.embed_url, "embed URL has no origin, frame-src left unchanged");
        }
        self.allow(IMG_SRC, DATA_SCHEME_SOURCE)
    }

    /// Renders the policy back into header form.
    pub fn to_header(&self) -> String {
        self.directives
            .iter()
            .map(|(name, sources)| {
                if sources.is_empty() {
                    name.clone()
                } else {
                    let joined: Vec<&str> = sources.iter().map(String::as_str).collect();
                    format!("{} {}", name, joined.join(" "))
                }
            })
            .collect::<Vec<_>>()
            .join("; ")
    }
}

impl fmt::Display for CspPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_header())
    }
}
