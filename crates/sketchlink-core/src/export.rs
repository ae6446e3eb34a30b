//! Export translation.
//!
//! Turns the editor's `export` event into the document/preview pair a record
//! accessor stores. The editor sends its PNG preview as a data URI; records
//! keep plain base64, so the URI header is removed here.

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::protocol::ExportPayload;

/// Data-URI header the editor puts in front of PNG previews.
pub const PNG_DATA_URI_PREFIX: &str = "data:image/png;base64,";

const DATA_URI_SCHEME: &str = "data:image/";
const BASE64_MARKER: &str = ";base64,";

/// Normalized outcome of an export, handed to the record accessor.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExportResult {
    /// Serialized diagram document; empty when the editor sent none
    pub document: String,
    /// Base64-encoded preview image, if the editor produced one
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
}

impl ExportResult {
    /// Decodes the base64 preview into raw image bytes.
    ///
    /// Returns `Ok(None)` when the export carried no image.
    pub fn decode_image(&self) -> Result<Option<Vec<u8>>> {
        self.image
            .as_deref()
            .map(|encoded| STANDARD.decode(encoded.trim()))
            .transpose()
            .map_err(Into::into)
    }
}

/// Normalizes an export payload.
///
/// Total over the payload shape: a missing document becomes `""`, and an
/// image without a recognized data-URI header is passed through as already
/// being base64. An image that is empty, or empty once its header is
/// removed, counts as missing.
pub fn normalize(payload: &ExportPayload) -> ExportResult {
    ExportResult {
        document: payload.document.clone().unwrap_or_default(),
        image: payload
            .image
            .as_deref()
            .map(strip_data_uri)
            .filter(|image| !image.trim().is_empty())
            .map(str::to_string),
    }
}

/// Removes a `data:image/<subtype>;base64,` header, if present.
fn strip_data_uri(image: &str) -> &str {
    if let Some(rest) = image.strip_prefix(PNG_DATA_URI_PREFIX) {
        return rest;
    }

    if image.starts_with(DATA_URI_SCHEME) {
        if let Some(index) = image.find(BASE64_MARKER) {
            return &image[index + BASE64_MARKER.len()..];
        }
    }

    image
}
