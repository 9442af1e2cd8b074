//! Output renderers.
//!
//! Provides:
//! - JSON export writer and loader
//! - Document layout (avatar, header, text and image rows)
//! - PDF writer for the document layout

pub mod json;
pub mod layout;
pub mod pdf;

use std::path::Path;

use crate::config::OutputFormat;
use crate::error::Result;
use crate::export::ChannelExport;

pub use json::{load_json, write_json};
pub use layout::{build_layout, DocumentLayout, MessageBlock, MessageRow};
pub use pdf::{render_pdf, write_pdf};

/// Write an export to `path` in the given format.
pub fn render(format: OutputFormat, export: &ChannelExport, path: &Path) -> Result<()> {
    match format {
        OutputFormat::Json => write_json(export, path),
        OutputFormat::Pdf => write_pdf(&build_layout(export), path),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_render_each_format() {
        let dir = TempDir::new().unwrap();
        let export = ChannelExport::new("empty", Vec::new());

        for format in [OutputFormat::Json, OutputFormat::Pdf] {
            let path = dir.path().join(format.file_name());
            render(format, &export, &path).unwrap();
            assert!(path.exists());
        }

        let loaded = load_json(&dir.path().join("slack_export.json")).unwrap();
        assert_eq!(loaded.channel, "empty");
        assert!(loaded.messages.is_empty());
    }
}
