//! Page encoding: `DynamicImage` → single-page PDF bytes.
//!
//! The page is exactly as large as the image: one pixel becomes one PDF
//! point, so an 800×600 px photo yields an 800×600 pt MediaBox. The pixels
//! are stored as a zlib-compressed (`FlateDecode`) RGB Image XObject; an
//! alpha channel, when present, becomes a grey-scale soft mask.
//!
//! Every step that can fail returns [`SyncError`] instead of panicking: an
//! image the loader cannot read is [`SyncError::ImageDecode`], and a page
//! that cannot be built (zero-sized image, serialisation failure) is
//! [`SyncError::PageEncode`].

use crate::error::SyncError;
use flate2::{write::ZlibEncoder, Compression};
use image::{DynamicImage, ImageReader};
use lopdf::content::{Content, Operation};
use lopdf::{dictionary, Document, Object, Stream};
use std::io::Write;
use std::path::Path;
use tracing::debug;

/// Resource name of the page image inside the content stream.
const IMAGE_NAME: &str = "Im0";

/// A serialised one-page PDF and its page size in points.
#[derive(Debug, Clone)]
pub struct EncodedPage {
    pub bytes: Vec<u8>,
    pub width: u32,
    pub height: u32,
}

/// Decode an image file and encode it as a one-page PDF.
///
/// The format is sniffed from the file contents, falling back to the
/// extension.
pub fn encode_image_file(path: &Path) -> Result<EncodedPage, SyncError> {
    let reader = ImageReader::open(path)
        .and_then(|r| r.with_guessed_format())
        .map_err(|e| SyncError::InputReadFailed {
            path: path.to_path_buf(),
            source: e,
        })?;

    let img = reader.decode().map_err(|e| SyncError::ImageDecode {
        path: path.to_path_buf(),
        detail: e.to_string(),
    })?;

    encode_image(&img)
}

/// Encode a decoded image as a one-page PDF sized to its pixel dimensions.
pub fn encode_image(img: &DynamicImage) -> Result<EncodedPage, SyncError> {
    let (width, height) = (img.width(), img.height());
    if width == 0 || height == 0 {
        return Err(SyncError::PageEncode {
            detail: format!("image has no pixels ({width}×{height})"),
        });
    }

    let mut doc = Document::with_version("1.5");
    let pages_id = doc.new_object_id();

    // ── Image XObject (+ optional soft mask) ────────────────────────────
    let has_alpha = img.color().has_alpha();
    let (rgb, alpha) = split_channels(img, has_alpha);

    let mut image_dict = dictionary! {
        "Type" => "XObject",
        "Subtype" => "Image",
        "Width" => width as i64,
        "Height" => height as i64,
        "ColorSpace" => "DeviceRGB",
        "BitsPerComponent" => 8,
        "Filter" => "FlateDecode",
    };

    if let Some(alpha) = alpha {
        let smask = dictionary! {
            "Type" => "XObject",
            "Subtype" => "Image",
            "Width" => width as i64,
            "Height" => height as i64,
            "ColorSpace" => "DeviceGray",
            "BitsPerComponent" => 8,
            "Filter" => "FlateDecode",
        };
        let smask_id = doc.add_object(Stream::new(smask, deflate(&alpha)?));
        image_dict.set("SMask", smask_id);
    }

    let image_id = doc.add_object(Stream::new(image_dict, deflate(&rgb)?));

    // ── Content stream: scale the unit square to the full page ──────────
    let w = Object::Integer(width as i64);
    let h = Object::Integer(height as i64);
    let content = Content {
        operations: vec![
            Operation::new("q", vec![]),
            Operation::new(
                "cm",
                vec![w.clone(), 0.into(), 0.into(), h.clone(), 0.into(), 0.into()],
            ),
            Operation::new("Do", vec![Object::Name(IMAGE_NAME.as_bytes().to_vec())]),
            Operation::new("Q", vec![]),
        ],
    };
    let content_bytes = content.encode().map_err(|e| SyncError::PageEncode {
        detail: format!("content stream: {e}"),
    })?;
    let content_id = doc.add_object(Stream::new(dictionary! {}, content_bytes));

    // ── Page tree ───────────────────────────────────────────────────────
    let page_id = doc.add_object(dictionary! {
        "Type" => "Page",
        "Parent" => pages_id,
        "MediaBox" => vec![0.into(), 0.into(), w, h],
        "Contents" => content_id,
        "Resources" => dictionary! {
            "XObject" => dictionary! { IMAGE_NAME => image_id },
        },
    });

    doc.objects.insert(
        pages_id,
        Object::Dictionary(dictionary! {
            "Type" => "Pages",
            "Kids" => vec![page_id.into()],
            "Count" => 1,
        }),
    );

    let catalog_id = doc.add_object(dictionary! {
        "Type" => "Catalog",
        "Pages" => pages_id,
    });
    doc.trailer.set("Root", catalog_id);

    let mut bytes = Vec::new();
    doc.save_to(&mut bytes).map_err(|e| SyncError::PageEncode {
        detail: format!("serialise: {e}"),
    })?;

    debug!("Encoded {}×{} page → {} bytes PDF", width, height, bytes.len());

    Ok(EncodedPage {
        bytes,
        width,
        height,
    })
}

/// Split the image into packed RGB samples and, if requested, an alpha plane.
fn split_channels(img: &DynamicImage, with_alpha: bool) -> (Vec<u8>, Option<Vec<u8>>) {
    if !with_alpha {
        return (img.to_rgb8().into_raw(), None);
    }

    let rgba = img.to_rgba8();
    let pixels = (rgba.width() as usize) * (rgba.height() as usize);
    let mut rgb = Vec::with_capacity(pixels * 3);
    let mut alpha = Vec::with_capacity(pixels);
    for px in rgba.pixels() {
        rgb.extend_from_slice(&px.0[..3]);
        alpha.push(px.0[3]);
    }
    (rgb, Some(alpha))
}

/// zlib-compress a sample buffer for a `FlateDecode` stream.
fn deflate(data: &[u8]) -> Result<Vec<u8>, SyncError> {
    let mut encoder = ZlibEncoder::new(Vec::new(), Compression::default());
    encoder
        .write_all(data)
        .and_then(|_| encoder.finish())
        .map_err(|e| SyncError::PageEncode {
            detail: format!("compress image samples: {e}"),
        })
}
