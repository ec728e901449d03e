//! Conversion entry points: validate → encode → persist.
//!
//! [`convert_image`] is what the application layer calls. It moves the
//! CPU-bound decode/encode work onto tokio's blocking pool so the owner task
//! keeps servicing network completions while a large photo is encoded.
//! [`convert_image_blocking`] is the same pipeline for callers without a
//! runtime.

use crate::config::SyncConfig;
use crate::error::SyncError;
use crate::model::{ConvertedDocument, SelectedInput};
use crate::pipeline::{encode, input, persist};
use std::time::Instant;
use tracing::info;

/// Convert the selected image into `<basename>.pdf` in `config.output_dir`.
///
/// # Errors
/// - [`SyncError::UnsupportedExtension`] / [`SyncError::InputNotFound`] before
///   anything is read
/// - [`SyncError::ImageDecode`] / [`SyncError::PageEncode`] when the page
///   cannot be produced
/// - [`SyncError::OutputWriteFailed`] when the output directory is missing
///   or not writable
pub async fn convert_image(
    selected: &SelectedInput,
    config: &SyncConfig,
) -> Result<ConvertedDocument, SyncError> {
    // Reject unsupported input without touching the blocking pool.
    input::validate(selected)?;

    let selected = selected.clone();
    let config = config.clone();
    tokio::task::spawn_blocking(move || convert_image_blocking(&selected, &config))
        .await
        .map_err(|e| SyncError::Internal(format!("Conversion task panicked: {}", e)))?
}

/// Blocking implementation of [`convert_image`].
pub fn convert_image_blocking(
    selected: &SelectedInput,
    config: &SyncConfig,
) -> Result<ConvertedDocument, SyncError> {
    let start = Instant::now();
    input::validate(selected)?;

    let page = encode::encode_image_file(selected.path())?;
    let file_name = input::output_file_name(selected.path());
    let path = persist::write_document(
        &config.output_dir,
        &file_name,
        &page.bytes,
        config.conflict_policy,
    )?;

    info!(
        "Converted {} → {} ({}×{} pt, {} bytes) in {}ms",
        selected.label(),
        path.display(),
        page.width,
        page.height,
        page.bytes.len(),
        start.elapsed().as_millis()
    );

    Ok(ConvertedDocument {
        path,
        width: page.width,
        height: page.height,
        bytes: page.bytes.len(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{Rgb, RgbImage};

    fn config_for(dir: &std::path::Path) -> SyncConfig {
        SyncConfig::builder().output_dir(dir).build().unwrap()
    }

    #[test]
    fn photo_jpg_becomes_photo_pdf() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let image_path = src.path().join("photo.jpg");
        RgbImage::from_pixel(80, 60, Rgb([200, 100, 50]))
            .save(&image_path)
            .unwrap();

        let doc = tokio_test::block_on(convert_image(
            &SelectedInput::new(&image_path),
            &config_for(out.path()),
        ))
        .expect("conversion should succeed");

        assert_eq!(doc.path, out.path().join("photo.pdf"));
        assert_eq!((doc.width, doc.height), (80, 60));
        let written = std::fs::read(&doc.path).unwrap();
        assert_eq!(written.len(), doc.bytes);
        assert!(written.starts_with(b"%PDF"));
    }

    #[test]
    fn unsupported_extension_writes_nothing() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let image_path = src.path().join("anim.gif");
        std::fs::write(&image_path, b"GIF89a").unwrap();

        let err = convert_image_blocking(&SelectedInput::new(&image_path), &config_for(out.path()))
            .unwrap_err();
        assert!(matches!(err, SyncError::UnsupportedExtension { .. }));
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }

    #[test]
    fn undecodable_image_writes_nothing() {
        let src = tempfile::tempdir().unwrap();
        let out = tempfile::tempdir().unwrap();
        let image_path = src.path().join("broken.png");
        std::fs::write(&image_path, b"\x89PNG but truncated").unwrap();

        let err = convert_image_blocking(&SelectedInput::new(&image_path), &config_for(out.path()))
            .unwrap_err();
        assert!(matches!(err, SyncError::ImageDecode { .. }));
        assert_eq!(std::fs::read_dir(out.path()).unwrap().count(), 0);
    }
}
