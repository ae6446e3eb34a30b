//! Host-to-editor commands.

use serde::{Serialize, Serializer};

use crate::error::Result;

/// Export formats understood by the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ExportFormat {
    /// Document only
    Xml,
    /// Preview image only
    Png,
    /// Document plus a PNG preview with the document embedded
    XmlPng,
}

/// Rendering options sent alongside an export request.
///
/// The editor expects string flags for most of these; the values mirror what
/// it accepts from its own embed protocol.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ExportOptions {
    /// Show the editor's spinner while exporting
    pub spin: String,
    /// Include the document in the export event
    pub xml: String,
    /// Embed the document inside the PNG preview
    pub embed_xml: String,
    /// Preview scale factor
    pub scale: u32,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            spin: "1".to_string(),
            xml: "1".to_string(),
            embed_xml: "1".to_string(),
            scale: 1,
        }
    }
}

/// A command posted from the host into the editor frame.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "action")]
pub enum OutboundCommand {
    /// Open a document in the editor.
    #[serde(rename = "load")]
    Load {
        #[serde(serialize_with = "flag_as_int")]
        autosave: bool,
        /// `None` opens a blank diagram
        #[serde(rename = "xml")]
        document: Option<String>,
        title: String,
    },
    /// Ask the editor to export the current diagram.
    #[serde(rename = "export")]
    RequestExport {
        format: ExportFormat,
        #[serde(flatten)]
        options: ExportOptions,
    },
}

impl OutboundCommand {
    /// Builds the `load` command for a stored document.
    ///
    /// An empty document is sent as `null` so the editor starts a new diagram.
    pub fn load(document: Option<&str>, title: impl Into<String>) -> Self {
        Self::Load {
            autosave: true,
            document: document.filter(|doc| !doc.is_empty()).map(str::to_string),
            title: title.into(),
        }
    }

    /// Builds an `export` command with the default options.
    pub fn request_export(format: ExportFormat) -> Self {
        Self::RequestExport {
            format,
            options: ExportOptions::default(),
        }
    }

    /// Returns the wire `action` of this command.
    pub fn action(&self) -> &'static str {
        match self {
            Self::Load { .. } => "load",
            Self::RequestExport { .. } => "export",
        }
    }

    /// Returns true for `Load`.
    pub fn is_load(&self) -> bool {
        matches!(self, Self::Load { .. })
    }

    /// Serializes the command into the JSON text the editor expects.
    pub fn to_wire(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

fn flag_as_int<S: Serializer>(flag: &bool, serializer: S) -> std::result::Result<S::Ok, S::Error> {
    serializer.serialize_u8(u8::from(*flag))
}
