//! Error types for the pagesync library.
//!
//! A single error type, [`SyncError`], covers every failure of the
//! convert-and-synchronise workflow. Each variant belongs to exactly one
//! [`ErrorKind`]:
//!
//! * [`ErrorKind::UnsupportedInput`]: nothing was selected, the file is
//!   missing, or its extension is outside the JPG/PNG allow-list.
//! * [`ErrorKind::Decode`]: the image could not be decoded, the page could
//!   not be built, or the server answered with a body we cannot parse.
//! * [`ErrorKind::Transport`]: the server was unreachable, too slow, or
//!   answered with a non-2xx status.
//! * [`ErrorKind::Filesystem`]: reading the input or writing the output
//!   failed.
//!
//! The application layer turns every error into a status line
//! ([`crate::model::StatusMessage::from_error`]); none of them abort the
//! process.

use std::path::PathBuf;
use thiserror::Error;

/// All errors returned by the pagesync library.
#[derive(Debug, Error)]
pub enum SyncError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// Convert was requested before any file was selected.
    #[error("No input file selected")]
    NoInputSelected,

    /// Selected file does not exist.
    #[error("Input file not found: '{path}'")]
    InputNotFound { path: PathBuf },

    /// Input extension is not one of the supported raster formats.
    #[error("Unsupported extension '{extension}' for '{path}' (expected jpg or png)")]
    UnsupportedExtension { path: PathBuf, extension: String },

    // ── Decode errors ─────────────────────────────────────────────────────
    /// The image loader rejected the input file.
    #[error("Could not decode image '{path}': {detail}")]
    ImageDecode { path: PathBuf, detail: String },

    /// The PDF page could not be constructed or serialised.
    #[error("Could not build PDF page: {detail}")]
    PageEncode { detail: String },

    /// The server answered, but the body did not have the expected shape.
    #[error("Unexpected response from '{url}': {detail}")]
    ResponseDecode { url: String, detail: String },

    // ── Transport errors ──────────────────────────────────────────────────
    /// Connection refused, DNS failure, reset, …
    #[error("Request to '{url}' failed: {reason}")]
    Transport { url: String, reason: String },

    /// The server answered with a non-2xx status.
    #[error("Server returned HTTP {status} for '{url}'")]
    HttpStatus { url: String, status: u16 },

    /// The request did not complete within the configured timeout.
    #[error("Request to '{url}' timed out after {secs}s")]
    Timeout { url: String, secs: u64 },

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Could not read the input file.
    #[error("Failed to read '{path}': {source}")]
    InputReadFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Could not create or write an output file.
    #[error("Failed to write '{path}': {source}")]
    OutputWriteFailed {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error (a worker task panicked, …).
    #[error("Internal error: {0}")]
    Internal(String),
}

/// Coarse failure category used for user-facing status lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub enum ErrorKind {
    UnsupportedInput,
    Decode,
    Transport,
    Filesystem,
    Internal,
}

impl ErrorKind {
    /// Short label prefixed to status lines.
    pub fn label(self) -> &'static str {
        match self {
            ErrorKind::UnsupportedInput => "unsupported input",
            ErrorKind::Decode => "decode error",
            ErrorKind::Transport => "network error",
            ErrorKind::Filesystem => "file error",
            ErrorKind::Internal => "internal error",
        }
    }
}

impl SyncError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            SyncError::NoInputSelected
            | SyncError::InputNotFound { .. }
            | SyncError::UnsupportedExtension { .. } => ErrorKind::UnsupportedInput,
            SyncError::ImageDecode { .. }
            | SyncError::PageEncode { .. }
            | SyncError::ResponseDecode { .. } => ErrorKind::Decode,
            SyncError::Transport { .. }
            | SyncError::HttpStatus { .. }
            | SyncError::Timeout { .. } => ErrorKind::Transport,
            SyncError::InputReadFailed { .. } | SyncError::OutputWriteFailed { .. } => {
                ErrorKind::Filesystem
            }
            SyncError::InvalidConfig(_) | SyncError::Internal(_) => ErrorKind::Internal,
        }
    }

    /// Map a reqwest failure for `url` onto the transport/decode variants.
    pub(crate) fn from_reqwest(url: &str, timeout_secs: u64, e: reqwest::Error) -> Self {
        if e.is_timeout() {
            SyncError::Timeout {
                url: url.to_string(),
                secs: timeout_secs,
            }
        } else if e.is_decode() {
            SyncError::ResponseDecode {
                url: url.to_string(),
                detail: e.to_string(),
            }
        } else if let Some(status) = e.status() {
            SyncError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            }
        } else {
            SyncError::Transport {
                url: url.to_string(),
                reason: e.to_string(),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_extension_display() {
        let e = SyncError::UnsupportedExtension {
            path: PathBuf::from("/tmp/scan.gif"),
            extension: "gif".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("gif"), "got: {msg}");
        assert!(msg.contains("jpg or png"), "got: {msg}");
        assert_eq!(e.kind(), ErrorKind::UnsupportedInput);
    }

    #[test]
    fn http_status_is_transport() {
        let e = SyncError::HttpStatus {
            url: "http://localhost:8080/pdf".into(),
            status: 500,
        };
        assert!(e.to_string().contains("HTTP 500"));
        assert_eq!(e.kind(), ErrorKind::Transport);
    }

    #[test]
    fn timeout_display() {
        let e = SyncError::Timeout {
            url: "http://localhost:8080/pdf".into(),
            secs: 30,
        };
        assert!(e.to_string().contains("30s"));
        assert_eq!(e.kind(), ErrorKind::Transport);
    }

    #[test]
    fn write_failure_is_filesystem() {
        let e = SyncError::OutputWriteFailed {
            path: PathBuf::from("/nope/photo.pdf"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "missing"),
        };
        assert_eq!(e.kind(), ErrorKind::Filesystem);
        assert!(e.to_string().contains("/nope/photo.pdf"));
    }

    #[test]
    fn every_kind_has_a_distinct_label() {
        let labels = [
            ErrorKind::UnsupportedInput.label(),
            ErrorKind::Decode.label(),
            ErrorKind::Transport.label(),
            ErrorKind::Filesystem.label(),
            ErrorKind::Internal.label(),
        ];
        let unique: std::collections::HashSet<_> = labels.iter().collect();
        assert_eq!(unique.len(), labels.len());
    }
}
