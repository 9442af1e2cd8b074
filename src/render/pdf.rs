//! PDF writer for the document layout.
//!
//! US Letter pages with 72pt margins. Rows are laid out top to bottom as a
//! two-column table (0.4in avatar column, 6in text column) with page breaks
//! between row elements.

use std::fs;
use std::path::Path;
use std::sync::Arc;

use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Dictionary, Document, Object, ObjectId, Stream};

use crate::error::{Error, Result};
use crate::render::layout::{DocumentLayout, MessageRow, RasterImage, AVATAR_SIZE};

const PAGE_WIDTH: f32 = 612.0;
const PAGE_HEIGHT: f32 = 792.0;
const MARGIN: f32 = 72.0;

const AVATAR_COLUMN: f32 = 29.0;
const TEXT_COLUMN: f32 = 432.0;
const CELL_PADDING: f32 = 2.0;
const BLOCK_SPACING: f32 = 12.0;

const TITLE_SIZE: f32 = 18.0;
const BODY_SIZE: f32 = 10.0;
const REPLY_SIZE: f32 = 9.0;

/// Average Helvetica glyph width as a fraction of the font size.
const GLYPH_WIDTH: f32 = 0.5;
const BOLD_GLYPH_WIDTH: f32 = 0.56;

const FONT_REGULAR: &str = "F1";
const FONT_BOLD: &str = "F2";

/// Render a layout and write it to `path`.
pub fn write_pdf(layout: &DocumentLayout, path: &Path) -> Result<()> {
    let bytes = render_pdf(layout)?;
    fs::write(path, bytes)?;
    tracing::debug!("Wrote {} rows to {}", layout.row_count(), path.display());
    Ok(())
}

/// Render a layout to PDF bytes.
pub fn render_pdf(layout: &DocumentLayout) -> Result<Vec<u8>> {
    let mut writer = PdfWriter::new();

    writer.title(&layout.title);
    for block in &layout.blocks {
        for row in &block.rows {
            writer.row(row)?;
        }
        writer.space(BLOCK_SPACING);
    }

    writer.finish()
}

/// Lays out content onto pages and builds the document.
struct PdfWriter {
    doc: Document,
    pages_id: ObjectId,
    page_ids: Vec<ObjectId>,
    ops: Vec<Operation>,
    /// Distance of the layout cursor from the page bottom.
    y: f32,
    xobjects: Dictionary,
    /// Embedded images and their resource names.
    images: Vec<(Arc<RasterImage>, String)>,
}

impl PdfWriter {
    fn new() -> Self {
        let mut doc = Document::with_version("1.5");
        let pages_id = doc.new_object_id();

        Self {
            doc,
            pages_id,
            page_ids: Vec::new(),
            ops: Vec::new(),
            y: PAGE_HEIGHT - MARGIN,
            xobjects: Dictionary::new(),
            images: Vec::new(),
        }
    }

    fn flush_page(&mut self) -> Result<()> {
        let content = Content {
            operations: std::mem::take(&mut self.ops),
        };
        let encoded = content
            .encode()
            .map_err(|e| Error::Render(format!("Failed to encode page content: {}", e)))?;

        let content_id = self.doc.add_object(Stream::new(dictionary! {}, encoded));
        let page_id = self.doc.add_object(dictionary! {
            "Type" => "Page",
            "Parent" => self.pages_id,
            "Contents" => content_id,
        });
        self.page_ids.push(page_id);
        self.y = PAGE_HEIGHT - MARGIN;
        Ok(())
    }

    /// Start a new page if `height` does not fit below the cursor.
    fn ensure_space(&mut self, height: f32) -> Result<()> {
        if self.y - height < MARGIN && self.y < PAGE_HEIGHT - MARGIN {
            self.flush_page()?;
        }
        Ok(())
    }

    fn space(&mut self, height: f32) {
        self.y -= height;
    }

    fn text(&mut self, font: &str, size: f32, x: f32, baseline: f32, text: &str) {
        self.ops.push(Operation::new("BT", vec![]));
        self.ops
            .push(Operation::new("Tf", vec![font.into(), pt(size)]));
        self.ops
            .push(Operation::new("Td", vec![pt(x), pt(baseline)]));
        self.ops.push(Operation::new(
            "Tj",
            vec![Object::string_literal(win_ansi(text))],
        ));
        self.ops.push(Operation::new("ET", vec![]));
    }

    fn image(&mut self, image: &Arc<RasterImage>, x: f32, bottom: f32, width: f32, height: f32) {
        let embedded = self
            .images
            .iter()
            .find(|(known, _)| Arc::ptr_eq(known, image))
            .map(|(_, name)| name.clone());

        let name = match embedded {
            Some(name) => name,
            None => {
                let name = format!("Im{}", self.images.len() + 1);
                let id = self.doc.add_object(Stream::new(
                    dictionary! {
                        "Type" => "XObject",
                        "Subtype" => "Image",
                        "Width" => image.width as i64,
                        "Height" => image.height as i64,
                        "ColorSpace" => "DeviceRGB",
                        "BitsPerComponent" => 8,
                    },
                    image.rgb.clone(),
                ));
                self.xobjects.set(name.clone(), id);
                self.images.push((Arc::clone(image), name.clone()));
                name
            }
        };

        self.ops.push(Operation::new("q", vec![]));
        self.ops.push(Operation::new(
            "cm",
            vec![pt(width), pt(0.0), pt(0.0), pt(height), pt(x), pt(bottom)],
        ));
        self.ops.push(Operation::new(
            "Do",
            vec![Object::Name(name.into_bytes())],
        ));
        self.ops.push(Operation::new("Q", vec![]));
    }

    fn title(&mut self, title: &str) {
        self.text(FONT_BOLD, TITLE_SIZE, MARGIN, self.y - TITLE_SIZE, title);
        self.space(TITLE_SIZE + BLOCK_SPACING);
    }

    fn row(&mut self, row: &MessageRow) -> Result<()> {
        let size = if row.is_reply { REPLY_SIZE } else { BODY_SIZE };
        let leading = size * 1.2;
        let avatar_x = MARGIN + row.indent;
        let text_x = avatar_x + AVATAR_COLUMN;
        let text_width = TEXT_COLUMN - row.indent;

        // Header cell: avatar beside bold author and time.
        let header_height = if row.avatar.is_some() {
            (AVATAR_SIZE as f32).max(leading)
        } else {
            leading
        };
        self.ensure_space(header_height + 2.0 * CELL_PADDING)?;
        let top = self.y - CELL_PADDING;

        if let Some(avatar) = &row.avatar {
            let side = AVATAR_SIZE as f32;
            self.image(avatar, avatar_x, top - side, side, side);
        }

        let baseline = top - size;
        self.text(FONT_BOLD, size, text_x, baseline, &row.author);
        let time_x = text_x + text_width_estimate(&row.author, size, BOLD_GLYPH_WIDTH) + size * 0.5;
        self.text(FONT_REGULAR, size, time_x, baseline, &row.time);
        self.space(header_height + 2.0 * CELL_PADDING);

        // Text cell.
        let max_chars = (text_width / (size * GLYPH_WIDTH)).floor().max(1.0) as usize;
        for line in wrap_text(&row.text, max_chars) {
            self.ensure_space(leading)?;
            self.text(FONT_REGULAR, size, text_x, self.y - size, &line);
            self.space(leading);
        }
        self.space(2.0 * CELL_PADDING);

        // Image cells.
        let max_height = PAGE_HEIGHT - 2.0 * MARGIN - 2.0 * CELL_PADDING;
        for placed in &row.images {
            let (mut width, mut height) = (placed.display_width, placed.display_height);
            if width > text_width {
                height *= text_width / width;
                width = text_width;
            }
            if height > max_height {
                width *= max_height / height;
                height = max_height;
            }

            self.ensure_space(height + 2.0 * CELL_PADDING)?;
            let bottom = self.y - CELL_PADDING - height;
            self.image(&placed.image, text_x, bottom, width, height);
            self.space(height + 2.0 * CELL_PADDING);
        }

        Ok(())
    }

    fn finish(mut self) -> Result<Vec<u8>> {
        self.flush_page()?;

        let regular_id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica",
            "Encoding" => "WinAnsiEncoding",
        });
        let bold_id = self.doc.add_object(dictionary! {
            "Type" => "Font",
            "Subtype" => "Type1",
            "BaseFont" => "Helvetica-Bold",
            "Encoding" => "WinAnsiEncoding",
        });

        let xobjects = std::mem::take(&mut self.xobjects);
        let resources_id = self.doc.add_object(dictionary! {
            "Font" => dictionary! {
                FONT_REGULAR => regular_id,
                FONT_BOLD => bold_id,
            },
            "XObject" => xobjects,
        });

        let kids: Vec<Object> = self.page_ids.iter().map(|id| Object::from(*id)).collect();
        let pages = dictionary! {
            "Type" => "Pages",
            "Kids" => kids,
            "Count" => self.page_ids.len() as i64,
            "Resources" => resources_id,
            "MediaBox" => vec![pt(0.0), pt(0.0), pt(PAGE_WIDTH), pt(PAGE_HEIGHT)],
        };
        self.doc.objects.insert(self.pages_id, Object::Dictionary(pages));

        let catalog_id = self.doc.add_object(dictionary! {
            "Type" => "Catalog",
            "Pages" => self.pages_id,
        });
        self.doc.trailer.set("Root", catalog_id);
        self.doc.compress();

        let mut bytes = Vec::new();
        self.doc
            .save_to(&mut bytes)
            .map_err(|e| Error::Render(format!("Failed to write PDF: {}", e)))?;
        Ok(bytes)
    }
}

/// Coordinates are emitted in whole points.
fn pt(value: f32) -> Object {
    Object::Integer(value.round() as i64)
}

fn text_width_estimate(text: &str, size: f32, glyph_width: f32) -> f32 {
    text.chars().count() as f32 * size * glyph_width
}

/// Encode text for the standard fonts' WinAnsi encoding.
fn win_ansi(text: &str) -> Vec<u8> {
    text.chars()
        .filter(|c| *c != '\r' && *c != '\n')
        .map(|c| match c {
            '\t' => b' ',
            c if (c as u32) < 0x20 => b' ',
            // C1 controls occupy glyph slots in WinAnsi.
            c if (0x80..=0x9F).contains(&(c as u32)) => b'?',
            c if (c as u32) <= 0xFF => c as u32 as u8,
            _ => b'?',
        })
        .collect()
}

/// Greedy word wrap. Words longer than a line are split.
fn wrap_text(text: &str, max_chars: usize) -> Vec<String> {
    let mut lines = Vec::new();

    for paragraph in text.lines() {
        let mut line = String::new();
        let mut line_len = 0;

        for word in paragraph.split_whitespace() {
            let mut chars: Vec<char> = word.chars().collect();

            while chars.len() > max_chars {
                if line_len > 0 {
                    lines.push(std::mem::take(&mut line));
                    line_len = 0;
                }
                lines.push(chars.drain(..max_chars).collect());
            }

            let word_len = chars.len();
            if word_len == 0 {
                continue;
            }
            let needed = if line_len == 0 { word_len } else { line_len + 1 + word_len };
            if needed > max_chars {
                lines.push(std::mem::take(&mut line));
                line_len = 0;
            }
            if line_len > 0 {
                line.push(' ');
                line_len += 1;
            }
            line.extend(chars);
            line_len += word_len;
        }

        lines.push(line);
    }

    lines
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::render::layout::{MessageBlock, PlacedImage};

    fn row(text: &str, is_reply: bool, images: Vec<PlacedImage>) -> MessageRow {
        MessageRow {
            is_reply,
            indent: if is_reply { 50.0 } else { 0.0 },
            avatar: Some(Arc::new(RasterImage {
                width: 24,
                height: 24,
                rgb: vec![128; 24 * 24 * 3],
            })),
            author: "Test User".into(),
            time: "2024-01-01 12:00:00".into(),
            text: text.into(),
            images,
        }
    }

    #[test]
    fn test_wrap_text() {
        assert_eq!(wrap_text("one two three", 7), vec!["one two", "three"]);
        assert_eq!(wrap_text("abcdefghij", 4), vec!["abcd", "efgh", "ij"]);
        assert_eq!(wrap_text("a\n\nb", 10), vec!["a", "", "b"]);
        assert!(wrap_text("", 10).is_empty());
    }

    #[test]
    fn test_win_ansi() {
        assert_eq!(win_ansi("café"), vec![b'c', b'a', b'f', 0xE9]);
        assert_eq!(win_ansi("日本"), b"??".to_vec());
        assert_eq!(win_ansi("a\u{80}b\u{9F}"), b"a?b?".to_vec());
    }

    #[test]
    fn test_render_single_page() {
        let layout = DocumentLayout {
            title: "Slack Export - #test-channel".into(),
            blocks: vec![MessageBlock {
                rows: vec![
                    row("Hello (world)", false, Vec::new()),
                    row("A reply", true, Vec::new()),
                ],
            }],
        };

        let bytes = render_pdf(&layout).unwrap();
        assert!(bytes.starts_with(b"%PDF-1.5"));

        let doc = Document::load_mem(&bytes).unwrap();
        assert_eq!(doc.get_pages().len(), 1);
    }

    #[test]
    fn test_render_breaks_pages() {
        let tall = PlacedImage {
            image: Arc::new(RasterImage {
                width: 2,
                height: 2,
                rgb: vec![0; 12],
            }),
            display_width: 400.0,
            display_height: 300.0,
        };
        let blocks = (0..6)
            .map(|i| MessageBlock {
                rows: vec![row(&format!("message {}", i), false, vec![tall.clone()])],
            })
            .collect();
        let layout = DocumentLayout {
            title: "Slack Export - #c".into(),
            blocks,
        };

        let bytes = render_pdf(&layout).unwrap();
        let doc = Document::load_mem(&bytes).unwrap();
        assert!(doc.get_pages().len() >= 3);
    }

    #[test]
    fn test_write_pdf_file() {
        let dir = tempfile::TempDir::new().unwrap();
        let path = dir.path().join("slack_export.pdf");
        let layout = DocumentLayout {
            title: "Slack Export - #empty".into(),
            blocks: Vec::new(),
        };

        write_pdf(&layout, &path).unwrap();
        let bytes = std::fs::read(&path).unwrap();
        assert!(bytes.starts_with(b"%PDF"));
    }
}
