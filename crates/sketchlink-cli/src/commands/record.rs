use anyhow::{Context, Result};
use sketchlink_core::config::RootConfig;
use sketchlink_core::record::{RecordAccessor, RecordId};

use super::record_accessor;

pub async fn show(config: &RootConfig, id: &str) -> Result<()> {
    let accessor = record_accessor(config)?;
    let record_id = RecordId::new(id);
    let record = accessor
        .read(&record_id)
        .await
        .with_context(|| format!("Failed to read record '{}'", record_id))?;

    println!("record:   {}", record_id);
    println!("file:     {}", accessor.record_path(&record_id)?.display());
    println!(
        "name:     {}",
        record.name_or(&config.editor.default_document_name)
    );
    match record.document() {
        Some(document) => println!("document: {} bytes", document.len()),
        None => println!("document: (empty, editor starts blank)"),
    }

    let preview = accessor.preview_path(&record_id)?;
    if preview.exists() {
        println!("preview:  {}", preview.display());
    }
    Ok(())
}

pub async fn create(config: &RootConfig, id: &str, name: Option<String>) -> Result<()> {
    let accessor = record_accessor(config)?;
    let record_id = RecordId::new(id);
    accessor
        .create(&record_id, name)
        .await
        .with_context(|| format!("Failed to create record '{}'", record_id))?;

    println!("✅ Created {}", accessor.record_path(&record_id)?.display());
    Ok(())
}
