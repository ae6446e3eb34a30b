//! Editor-to-host events.

use serde::{Deserialize, Serialize};

use crate::error::{BridgeError, Result};

/// Body of an `export` event.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportPayload {
    /// Exported document text
    #[serde(default, rename = "xml")]
    pub document: Option<String>,
    /// Preview image, usually a `data:image/png;base64,` URI
    #[serde(default, rename = "data")]
    pub image: Option<String>,
}

/// An event received from the editor frame.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundEvent {
    /// The editor finished booting and accepts commands
    Init,
    /// The user pressed the editor's own save button
    Save,
    /// Reply to an export request
    Export(ExportPayload),
    /// Periodic autosave notification
    Autosave,
    /// The user left the editor
    Exit,
    /// Anything else seen on the channel
    Unknown,
}

#[derive(Deserialize)]
#[serde(tag = "event", rename_all = "lowercase")]
enum WireEvent {
    Init,
    Save,
    Export(ExportPayload),
    Autosave,
    Exit,
    #[serde(other)]
    Other,
}

impl InboundEvent {
    /// Parses a raw channel payload, reporting why it was rejected.
    ///
    /// # Errors
    ///
    /// Returns `MalformedMessage` for text that is not a JSON object with a
    /// known `event` tag, or whose known tag carries fields of the wrong type.
    pub fn try_parse(raw: &str) -> Result<Self> {
        match serde_json::from_str::<WireEvent>(raw) {
            Ok(WireEvent::Init) => Ok(Self::Init),
            Ok(WireEvent::Save) => Ok(Self::Save),
            Ok(WireEvent::Export(payload)) => Ok(Self::Export(payload)),
            Ok(WireEvent::Autosave) => Ok(Self::Autosave),
            Ok(WireEvent::Exit) => Ok(Self::Exit),
            Ok(WireEvent::Other) => Err(BridgeError::malformed_message("unrecognized event")),
            Err(e) => Err(BridgeError::malformed_message(e.to_string())),
        }
    }

    /// Parses a raw channel payload.
    ///
    /// Never fails: anything [`try_parse`](Self::try_parse) rejects is `Unknown`.
    pub fn parse(raw: &str) -> Self {
        Self::try_parse(raw).unwrap_or(Self::Unknown)
    }

    /// Short name used in logs.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Init => "init",
            Self::Save => "save",
            Self::Export(_) => "export",
            Self::Autosave => "autosave",
            Self::Exit => "exit",
            Self::Unknown => "unknown",
        }
    }

    /// Returns true for `Unknown`.
    pub fn is_unknown(&self) -> bool {
        matches!(self, Self::Unknown)
    }
}
