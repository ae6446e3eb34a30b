use anyhow::{Context, Result};
use sketchlink_core::config::RootConfig;
use sketchlink_core::export::{self, ExportResult};
use sketchlink_core::protocol::{ChannelAdapter, InboundEvent, OutboundCommand};
use sketchlink_core::record::{DiagramRecord, RecordAccessor, RecordId};
use std::io::Read;
use std::path::Path;

use super::record_accessor;

/// Builds the `load` command sent to the editor once it is ready.
pub fn load_command_for(record: &DiagramRecord, default_name: &str) -> OutboundCommand {
    OutboundCommand::load(record.document(), record.name_or(default_name))
}

pub async fn load_command(config: &RootConfig, id: &str) -> Result<()> {
    let accessor = record_accessor(config)?;
    let record_id = RecordId::new(id);
    let record = accessor
        .read(&record_id)
        .await
        .with_context(|| format!("Failed to read record '{}'", record_id))?;

    let command = load_command_for(&record, &config.editor.default_document_name);
    println!("{}", command.to_wire()?);
    Ok(())
}

/// What a raw editor message amounts to outside of a live session.
#[derive(Debug, PartialEq, Eq)]
pub enum Applied {
    /// The message carried an export to store
    Export(ExportResult),
    /// Any other message, named by its event
    Ignored(&'static str),
}

pub fn interpret(raw: &str) -> Applied {
    match ChannelAdapter::new().receive(raw) {
        InboundEvent::Export(payload) => Applied::Export(export::normalize(&payload)),
        other => Applied::Ignored(other.name()),
    }
}

pub async fn apply_export(config: &RootConfig, id: &str, input: Option<&Path>) -> Result<()> {
    let raw = match input {
        Some(path) => std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read {}", path.display()))?,
        None => {
            let mut buffer = String::new();
            std::io::stdin()
                .read_to_string(&mut buffer)
                .context("Failed to read stdin")?;
            buffer
        }
    };

    match interpret(&raw) {
        Applied::Export(result) => {
            let accessor = record_accessor(config)?;
            let record_id = RecordId::new(id);
            accessor
                .write(&record_id, &result)
                .await
                .with_context(|| format!("Failed to store export in record '{}'", record_id))?;
            println!(
                "✅ Saved record {} ({} bytes, preview: {})",
                record_id,
                result.document.len(),
                if result.image.is_some() { "yes" } else { "no" }
            );
        }
        Applied::Ignored(event) => println!("ignored ({})", event),
    }
    Ok(())
}
