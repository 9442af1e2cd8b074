//! JSON export writer.

use std::fs::File;
use std::io::{BufReader, BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::export::ChannelExport;

/// Write an export as pretty-printed JSON (two-space indentation).
pub fn write_json(export: &ChannelExport, path: &Path) -> Result<()> {
    let file = File::create(path)?;
    let mut writer = BufWriter::new(file);

    serde_json::to_writer_pretty(&mut writer, export)?;
    writer.write_all(b"\n")?;
    writer.flush()?;

    tracing::debug!(
        "Wrote {} messages to {}",
        export.total_messages(),
        path.display()
    );
    Ok(())
}

/// Reload a previously written export.
pub fn load_json(path: &Path) -> Result<ChannelExport> {
    let file = File::open(path)?;
    let export = serde_json::from_reader(BufReader::new(file))?;
    Ok(export)
}
