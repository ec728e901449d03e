//! Input validation: decide whether a user-selected file can be converted.
//!
//! Only two raster formats are accepted, matched on the file extension
//! without regard to case. The check happens before anything is decoded or
//! written so an unsupported file never reaches the encoder, the disk or the
//! network.

use crate::error::SyncError;
use crate::model::SelectedInput;
use std::path::Path;
use tracing::debug;

/// Extensions the page encoder accepts (compared lowercase).
pub const SUPPORTED_EXTENSIONS: [&str; 2] = ["jpg", "png"];

/// Extension given to converted documents.
pub const DOCUMENT_EXTENSION: &str = "pdf";

/// True if `path` ends in one of [`SUPPORTED_EXTENSIONS`], ignoring case.
pub fn is_supported(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| {
            let e = e.to_ascii_lowercase();
            SUPPORTED_EXTENSIONS.contains(&e.as_str())
        })
        .unwrap_or(false)
}

/// Validate a selection before conversion.
///
/// Checks the extension first: an unsupported file is rejected even if it
/// does not exist.
pub fn validate(input: &SelectedInput) -> Result<(), SyncError> {
    let path = input.path();
    if !is_supported(path) {
        let extension = path
            .extension()
            .map(|e| e.to_string_lossy().into_owned())
            .unwrap_or_default();
        return Err(SyncError::UnsupportedExtension {
            path: path.to_path_buf(),
            extension,
        });
    }
    if !path.is_file() {
        return Err(SyncError::InputNotFound {
            path: path.to_path_buf(),
        });
    }
    debug!("Accepted input: {}", path.display());
    Ok(())
}

/// Input file name with its extension stripped, e.g. `photo` for `photo.jpg`.
pub fn base_name(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "document".to_string())
}

/// Name of the converted document: `<basename>.pdf`.
pub fn output_file_name(path: &Path) -> String {
    format!("{}.{}", base_name(path), DOCUMENT_EXTENSION)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn extension_match_ignores_case() {
        assert!(is_supported(Path::new("photo.jpg")));
        assert!(is_supported(Path::new("photo.JPG")));
        assert!(is_supported(Path::new("shot.Png")));
        assert!(!is_supported(Path::new("photo.jpeg")));
        assert!(!is_supported(Path::new("anim.gif")));
        assert!(!is_supported(Path::new("README")));
        assert!(!is_supported(Path::new("")));
    }

    #[test]
    fn unsupported_rejected_before_existence_check() {
        let input = SelectedInput::new("/definitely/missing/file.tiff");
        match validate(&input) {
            Err(SyncError::UnsupportedExtension { extension, .. }) => {
                assert_eq!(extension, "tiff")
            }
            other => panic!("expected UnsupportedExtension, got {other:?}"),
        }
    }

    #[test]
    fn missing_supported_file_is_not_found() {
        let input = SelectedInput::new("/definitely/missing/file.png");
        assert!(matches!(
            validate(&input),
            Err(SyncError::InputNotFound { .. })
        ));
    }

    #[test]
    fn existing_supported_file_is_accepted() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("photo.jpg");
        std::fs::write(&path, b"not really a jpeg").unwrap();
        assert!(validate(&SelectedInput::new(&path)).is_ok());
    }

    #[test]
    fn output_name_strips_extension() {
        assert_eq!(output_file_name(&PathBuf::from("/a/b/photo.jpg")), "photo.pdf");
        assert_eq!(output_file_name(&PathBuf::from("holiday.2024.PNG")), "holiday.2024.pdf");
    }
}
