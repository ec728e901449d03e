//! Data types shared by the pipeline, the sync client and the view.

use crate::error::{ErrorKind, SyncError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Server-known metadata for one stored document.
///
/// Decoded from `GET /pdf`, which must return exactly
/// `[{"id": <int>, "filename": <string>}, …]`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocumentRecord {
    pub id: i64,
    pub filename: String,
}

/// The single local file the user picked.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedInput {
    path: PathBuf,
    label: String,
}

impl SelectedInput {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        let path = path.into();
        let label = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "<none>".to_string());
        Self { path, label }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Last path component, shown in the view.
    pub fn label(&self) -> &str {
        &self.label
    }
}

/// Whether a status line reports progress or a failure.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Severity {
    #[default]
    Info,
    Error,
}

/// Outcome of the most recent operation, overwritten on every update.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StatusMessage {
    pub text: String,
    pub severity: Severity,
    pub kind: Option<ErrorKind>,
}

impl StatusMessage {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            severity: Severity::Info,
            kind: None,
        }
    }

    /// Status line for a failed operation, e.g. `Upload failed (network error): …`.
    pub fn from_error(action: &str, err: &SyncError) -> Self {
        let kind = err.kind();
        Self {
            text: format!("{} failed ({}): {}", action, kind.label(), err),
            severity: Severity::Error,
            kind: Some(kind),
        }
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// A PDF that was encoded and written to disk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConvertedDocument {
    pub path: PathBuf,
    /// Page width in points (= image width in pixels).
    pub width: u32,
    /// Page height in points (= image height in pixels).
    pub height: u32,
    pub bytes: usize,
}

/// What the server said about an accepted upload.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadReceipt {
    pub status: u16,
    pub body: String,
}

/// A document fetched from the server but not yet written anywhere.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedDocument {
    pub id: i64,
    /// Name from `Content-Disposition`, if the server sent one.
    pub suggested_name: Option<String>,
    pub bytes: Vec<u8>,
}
