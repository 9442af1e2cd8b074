//! Row/column content of the document renderer.
//!
//! Each message becomes a two-column row: the author's avatar on the left,
//! and a header line, the message text and any images on the right. Replies
//! follow their parent, indented. Building this model is independent of the
//! PDF backend so the content contract can be checked directly.

use std::collections::HashMap;
use std::sync::Arc;

use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::Result;
use crate::export::{ChannelExport, Message};

/// Avatar edge length, in pixels and points.
pub const AVATAR_SIZE: u32 = 24;

/// Maximum display width of an attached image, in points.
pub const MAX_IMAGE_WIDTH: f32 = 400.0;

/// Left indent applied to thread replies, in points.
pub const REPLY_INDENT: f32 = 50.0;

/// Attached images wider than this are downsampled before embedding.
const MAX_EMBED_PIXELS: u32 = 1200;

/// Decoded 8-bit RGB pixels.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterImage {
    pub width: u32,
    pub height: u32,
    pub rgb: Vec<u8>,
}

impl RasterImage {
    fn from_dynamic(image: DynamicImage) -> Self {
        let rgb = image.to_rgb8();
        Self {
            width: rgb.width(),
            height: rgb.height(),
            rgb: rgb.into_raw(),
        }
    }
}

/// An image with its size on the page.
#[derive(Debug, Clone)]
pub struct PlacedImage {
    pub image: Arc<RasterImage>,
    pub display_width: f32,
    pub display_height: f32,
}

/// One message rendered as a table row.
#[derive(Debug, Clone)]
pub struct MessageRow {
    pub is_reply: bool,
    pub indent: f32,
    pub avatar: Option<Arc<RasterImage>>,
    pub author: String,
    pub time: String,
    pub text: String,
    pub images: Vec<PlacedImage>,
}

/// A top-level message followed by its replies.
#[derive(Debug, Clone)]
pub struct MessageBlock {
    pub rows: Vec<MessageRow>,
}

/// Everything the PDF writer draws.
#[derive(Debug, Clone)]
pub struct DocumentLayout {
    pub title: String,
    pub blocks: Vec<MessageBlock>,
}

impl DocumentLayout {
    pub fn row_count(&self) -> usize {
        self.blocks.iter().map(|b| b.rows.len()).sum()
    }
}

/// Build the document content for an export, in chronological order.
pub fn build_layout(export: &ChannelExport) -> DocumentLayout {
    let mut avatars: HashMap<String, Arc<RasterImage>> = HashMap::new();

    let blocks = export
        .messages
        .iter()
        .map(|message| {
            let mut rows = vec![build_row(message, false, &mut avatars)];
            rows.extend(
                message
                    .replies
                    .iter()
                    .map(|reply| build_row(reply, true, &mut avatars)),
            );
            MessageBlock { rows }
        })
        .collect();

    DocumentLayout {
        title: format!("Slack Export - #{}", export.channel),
        blocks,
    }
}

fn build_row(
    message: &Message,
    is_reply: bool,
    avatars: &mut HashMap<String, Arc<RasterImage>>,
) -> MessageRow {
    let author = &message.author;

    let avatar = match (avatars.get(&author.id), author.avatar.as_deref()) {
        (Some(cached), _) => Some(Arc::clone(cached)),
        (None, Some(bytes)) => match avatar_image(bytes) {
            Ok(image) => {
                let image = Arc::new(image);
                avatars.insert(author.id.clone(), Arc::clone(&image));
                Some(image)
            }
            Err(e) => {
                tracing::warn!("Skipping avatar of {}: {}", author.display_name, e);
                None
            }
        },
        // Unresolved authors carry no avatar; a later resolved one may.
        (None, None) => None,
    };

    let images = message
        .attachments
        .iter()
        .filter_map(|attachment| match attachment_image(&attachment.data) {
            Ok(placed) => Some(placed),
            Err(e) => {
                tracing::warn!("Skipping image {}: {}", attachment.filename, e);
                None
            }
        })
        .collect();

    MessageRow {
        is_reply,
        indent: if is_reply { REPLY_INDENT } else { 0.0 },
        avatar,
        author: author.display_name.clone(),
        time: format_timestamp(message),
        text: unescape_text(&message.text),
        images,
    }
}

/// Decode an avatar and resize it to the fixed square.
pub fn avatar_image(bytes: &[u8]) -> Result<RasterImage> {
    let image = image::load_from_memory(bytes)?;
    let resized = image.resize_exact(AVATAR_SIZE, AVATAR_SIZE, FilterType::Triangle);
    Ok(RasterImage::from_dynamic(resized))
}

/// Decode an attached image and size it to fit the text column.
pub fn attachment_image(bytes: &[u8]) -> Result<PlacedImage> {
    let image = image::load_from_memory(bytes)?;
    let (display_width, display_height) = fit_width(image.width(), image.height(), MAX_IMAGE_WIDTH);

    let image = if image.width() > MAX_EMBED_PIXELS {
        let height = (u64::from(image.height()) * u64::from(MAX_EMBED_PIXELS)
            / u64::from(image.width()))
        .max(1) as u32;
        image.resize_exact(MAX_EMBED_PIXELS, height, FilterType::Triangle)
    } else {
        image
    };

    Ok(PlacedImage {
        image: Arc::new(RasterImage::from_dynamic(image)),
        display_width,
        display_height,
    })
}

/// Scale `width`×`height` down to at most `max_width`, keeping the aspect ratio.
pub fn fit_width(width: u32, height: u32, max_width: f32) -> (f32, f32) {
    if width == 0 || height == 0 {
        return (0.0, 0.0);
    }
    let aspect = width as f32 / height as f32;
    let display_width = (width as f32).min(max_width);
    (display_width, display_width / aspect)
}

/// Local time of a message as `YYYY-MM-DD HH:MM:SS`.
pub fn format_timestamp(message: &Message) -> String {
    message
        .datetime()
        .map(|dt| dt.format("%Y-%m-%d %H:%M:%S").to_string())
        .unwrap_or_else(|| message.timestamp.clone())
}

/// Undo the HTML entity escaping Slack applies to message text.
fn unescape_text(text: &str) -> String {
    text.replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&amp;", "&")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::export::{Attachment, User};
    use image::{ImageBuffer, ImageFormat, Rgb};
    use std::io::Cursor;

    fn png(width: u32, height: u32) -> Vec<u8> {
        let buffer = ImageBuffer::from_pixel(width, height, Rgb([200u8, 30, 30]));
        let mut bytes = Vec::new();
        DynamicImage::ImageRgb8(buffer)
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .unwrap();
        bytes
    }

    fn message(ts: &str, avatar: Option<Vec<u8>>) -> Message {
        Message {
            author: Arc::new(User {
                id: "U1".into(),
                display_name: "Test User".into(),
                real_name: String::new(),
                avatar,
            }),
            text: "a &lt;b&gt; &amp; c".into(),
            timestamp: ts.into(),
            thread_timestamp: None,
            attachments: Vec::new(),
            replies: Vec::new(),
        }
    }

    #[test]
    fn test_fit_width() {
        assert_eq!(fit_width(800, 400, 400.0), (400.0, 200.0));
        assert_eq!(fit_width(100, 50, 400.0), (100.0, 50.0));
        assert_eq!(fit_width(0, 50, 400.0), (0.0, 0.0));
    }

    #[test]
    fn test_avatar_resized_to_square() {
        let avatar = avatar_image(&png(48, 48)).unwrap();
        assert_eq!((avatar.width, avatar.height), (24, 24));
        assert_eq!(avatar.rgb.len(), 24 * 24 * 3);
    }

    #[test]
    fn test_invalid_image_is_error() {
        assert!(avatar_image(b"fake-image-data").is_err());
    }

    #[test]
    fn test_layout_order_and_indent() {
        let mut parent = message("200.0", Some(png(48, 48)));
        parent.attachments.push(Attachment {
            filename: "wide.png".into(),
            mime_type: "image/png".into(),
            data: png(800, 200),
        });
        parent.replies = vec![message("201.0", None), message("202.0", None)];

        let export = ChannelExport::new(
            "test-channel",
            vec![message("100.0", None), parent, message("300.0", None)],
        );
        let layout = build_layout(&export);

        assert_eq!(layout.title, "Slack Export - #test-channel");
        assert_eq!(layout.blocks.len(), 3);
        assert_eq!(layout.row_count(), 5);

        let thread = &layout.blocks[1];
        assert_eq!(thread.rows.len(), 3);
        assert!(!thread.rows[0].is_reply);
        assert_eq!(thread.rows[0].indent, 0.0);
        assert!(thread.rows.iter().skip(1).all(|r| r.is_reply && r.indent == REPLY_INDENT));

        let image = &thread.rows[0].images[0];
        assert_eq!((image.display_width, image.display_height), (400.0, 100.0));
        assert_eq!(thread.rows[0].text, "a <b> & c");
        assert_eq!(thread.rows[0].author, "Test User");
    }

    #[test]
    fn test_avatar_decoded_once_per_user() {
        let export = ChannelExport::new(
            "c",
            vec![
                message("1.0", Some(png(48, 48))),
                message("2.0", Some(png(48, 48))),
            ],
        );
        let layout = build_layout(&export);
        let first = layout.blocks[0].rows[0].avatar.as_ref().unwrap();
        let second = layout.blocks[1].rows[0].avatar.as_ref().unwrap();
        assert!(Arc::ptr_eq(first, second));
    }

    #[test]
    fn test_avatar_found_after_unresolved_row() {
        let mut unresolved = message("1.0", None);
        unresolved.author = Arc::new(User::degraded("U1"));
        let export = ChannelExport::new(
            "c",
            vec![unresolved, message("2.0", Some(png(48, 48)))],
        );

        let layout = build_layout(&export);
        assert!(layout.blocks[0].rows[0].avatar.is_none());
        let avatar = layout.blocks[1].rows[0].avatar.as_ref().unwrap();
        assert_eq!((avatar.width, avatar.height), (24, 24));
    }

    #[test]
    fn test_undecodable_attachment_skipped() {
        let mut msg = message("1.0", Some(b"not an image".to_vec()));
        msg.attachments.push(Attachment {
            filename: "broken.png".into(),
            mime_type: "image/png".into(),
            data: b"garbage".to_vec(),
        });
        let layout = build_layout(&ChannelExport::new("c", vec![msg]));
        let row = &layout.blocks[0].rows[0];
        assert!(row.avatar.is_none());
        assert!(row.images.is_empty());
    }
}
