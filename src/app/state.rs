//! Application state and its transition function.
//!
//! [`update`] is pure: it mutates an [`AppState`] in response to a
//! [`Message`] and returns the [`Command`]s the caller should run. Nothing in
//! here touches the network or the disk, which keeps every transition
//! testable without a server.

use crate::error::SyncError;
use crate::model::{ConvertedDocument, DocumentRecord, SelectedInput, StatusMessage, UploadReceipt};
use crate::pipeline::input;
use std::path::PathBuf;
use tracing::{debug, warn};

/// Everything the single screen shows.
#[derive(Debug, Clone, Default)]
pub struct AppState {
    selected: Option<SelectedInput>,
    documents: Vec<DocumentRecord>,
    status: StatusMessage,
    converting: bool,
    last_saved: Option<PathBuf>,
    last_uploaded: Option<PathBuf>,
}

impl AppState {
    pub fn selected(&self) -> Option<&SelectedInput> {
        self.selected.as_ref()
    }

    pub fn documents(&self) -> &[DocumentRecord] {
        &self.documents
    }

    pub fn status(&self) -> &StatusMessage {
        &self.status
    }

    /// True between a convert request and the end of its upload.
    pub fn is_converting(&self) -> bool {
        self.converting
    }

    /// Path of the most recently saved PDF, if any.
    pub fn last_saved(&self) -> Option<&PathBuf> {
        self.last_saved.as_ref()
    }

    /// Path uploaded by the current conversion, once the server accepted it.
    pub fn last_uploaded(&self) -> Option<&PathBuf> {
        self.last_uploaded.as_ref()
    }
}

/// User actions and task completions.
#[derive(Debug)]
pub enum Message {
    /// The view was shown for the first time.
    Appeared,
    Select(PathBuf),
    ConvertRequested,
    Converted(Result<ConvertedDocument, SyncError>),
    Uploaded {
        path: PathBuf,
        result: Result<UploadReceipt, SyncError>,
    },
    RefreshRequested,
    ListLoaded(Result<Vec<DocumentRecord>, SyncError>),
    DownloadRequested(i64),
    Downloaded {
        id: i64,
        result: Result<PathBuf, SyncError>,
    },
    /// In-flight tasks were aborted.
    Cancelled,
}

/// Side effects requested by [`update`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Encode the selection and save it to the output directory.
    Convert(SelectedInput),
    Upload(PathBuf),
    List,
    Download(i64),
}

/// Apply `msg` to `state` and return the commands to run next.
pub fn update(state: &mut AppState, msg: Message) -> Vec<Command> {
    match msg {
        Message::Appeared => vec![Command::List],

        Message::Select(path) => {
            let input = SelectedInput::new(path);
            debug!("Selected {}", input.path().display());
            state.selected = Some(input);
            state.status = StatusMessage::default();
            vec![]
        }

        Message::ConvertRequested => {
            let Some(selected) = state.selected.clone() else {
                state.status = StatusMessage::from_error("Convert", &SyncError::NoInputSelected);
                return vec![];
            };
            if !input::is_supported(selected.path()) {
                let err = SyncError::UnsupportedExtension {
                    path: selected.path().to_path_buf(),
                    extension: selected
                        .path()
                        .extension()
                        .map(|e| e.to_string_lossy().into_owned())
                        .unwrap_or_default(),
                };
                state.status = StatusMessage::from_error("Convert", &err);
                return vec![];
            }
            if state.converting {
                state.status = StatusMessage::info("A conversion is already in progress");
                return vec![];
            }
            state.converting = true;
            state.last_uploaded = None;
            state.status = StatusMessage::info(format!("Converting {}…", selected.label()));
            vec![Command::Convert(selected)]
        }

        Message::Converted(Ok(doc)) => {
            state.status = StatusMessage::info(format!(
                "PDF saved to: {} ({}×{} pt), uploading…",
                doc.path.display(),
                doc.width,
                doc.height
            ));
            state.last_saved = Some(doc.path.clone());
            vec![Command::Upload(doc.path)]
        }

        Message::Converted(Err(e)) => {
            warn!("Conversion failed: {}", e);
            state.converting = false;
            state.status = StatusMessage::from_error("Convert", &e);
            vec![]
        }

        Message::Uploaded { path, result } => {
            state.converting = false;
            match result {
                Ok(receipt) => {
                    let name = path
                        .file_name()
                        .map(|n| n.to_string_lossy().into_owned())
                        .unwrap_or_default();
                    state.status =
                        StatusMessage::info(format!("Uploaded {} (HTTP {})", name, receipt.status));
                    state.last_uploaded = Some(path);
                    vec![Command::List]
                }
                Err(e) => {
                    warn!("Upload of {} failed: {}", path.display(), e);
                    state.status = StatusMessage::from_error("Upload", &e);
                    vec![]
                }
            }
        }

        Message::RefreshRequested => vec![Command::List],

        Message::ListLoaded(Ok(records)) => {
            // Wholesale replacement: the last applied response wins.
            state.documents = records;
            vec![]
        }

        Message::ListLoaded(Err(e)) => {
            warn!("Listing documents failed: {}", e);
            state.status = StatusMessage::from_error("Fetching document list", &e);
            vec![]
        }

        Message::DownloadRequested(id) => {
            state.status = StatusMessage::info(format!("Downloading document {id}…"));
            vec![Command::Download(id)]
        }

        Message::Downloaded { id, result } => {
            state.status = match result {
                Ok(path) => StatusMessage::info(format!("PDF downloaded to: {}", path.display())),
                Err(e) => {
                    warn!("Download of document {} failed: {}", id, e);
                    StatusMessage::from_error("Download", &e)
                }
            };
            vec![]
        }

        Message::Cancelled => {
            state.converting = false;
            state.status = StatusMessage::info("Cancelled");
            vec![]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn record(id: i64, name: &str) -> DocumentRecord {
        DocumentRecord {
            id,
            filename: name.to_string(),
        }
    }

    fn converted(path: &str) -> ConvertedDocument {
        ConvertedDocument {
            path: PathBuf::from(path),
            width: 800,
            height: 600,
            bytes: 1234,
        }
    }

    #[test]
    fn first_display_lists_once() {
        let mut state = AppState::default();
        assert_eq!(update(&mut state, Message::Appeared), vec![Command::List]);
    }

    #[test]
    fn convert_without_selection_sets_status() {
        let mut state = AppState::default();
        let cmds = update(&mut state, Message::ConvertRequested);
        assert!(cmds.is_empty());
        assert_eq!(state.status().kind, Some(ErrorKind::UnsupportedInput));
    }

    #[test]
    fn unsupported_extension_produces_no_commands() {
        let mut state = AppState::default();
        update(&mut state, Message::Select("/tmp/anim.gif".into()));
        let cmds = update(&mut state, Message::ConvertRequested);
        assert!(cmds.is_empty());
        assert!(state.status().is_error());
        assert!(state.status().text.to_lowercase().contains("unsupported"));
        assert!(!state.is_converting());
    }

    #[test]
    fn convert_chain_uploads_then_refreshes() {
        let mut state = AppState::default();
        update(&mut state, Message::Select("/tmp/photo.JPG".into()));

        let cmds = update(&mut state, Message::ConvertRequested);
        assert!(matches!(cmds.as_slice(), [Command::Convert(i)] if i.label() == "photo.JPG"));
        assert!(state.is_converting());

        let cmds = update(&mut state, Message::Converted(Ok(converted("/desk/photo.pdf"))));
        assert_eq!(cmds, vec![Command::Upload(PathBuf::from("/desk/photo.pdf"))]);
        assert!(state.is_converting());

        let cmds = update(
            &mut state,
            Message::Uploaded {
                path: "/desk/photo.pdf".into(),
                result: Ok(UploadReceipt {
                    status: 201,
                    body: "{}".into(),
                }),
            },
        );
        assert_eq!(cmds, vec![Command::List]);
        assert!(!state.is_converting());
        assert!(state.status().text.contains("photo.pdf"));
    }

    #[test]
    fn upload_is_remembered_until_next_convert() {
        let mut state = AppState::default();
        update(&mut state, Message::Select("/tmp/photo.png".into()));
        update(&mut state, Message::ConvertRequested);
        update(
            &mut state,
            Message::Uploaded {
                path: "/desk/photo.pdf".into(),
                result: Ok(UploadReceipt {
                    status: 200,
                    body: String::new(),
                }),
            },
        );
        update(
            &mut state,
            Message::ListLoaded(Err(SyncError::Transport {
                url: "http://localhost:8080/pdf".into(),
                reason: "connection reset".into(),
            })),
        );
        assert!(state.status().is_error());
        assert_eq!(state.last_uploaded(), Some(&PathBuf::from("/desk/photo.pdf")));

        update(&mut state, Message::ConvertRequested);
        assert_eq!(state.last_uploaded(), None);
    }

    #[test]
    fn second_convert_while_busy_is_ignored() {
        let mut state = AppState::default();
        update(&mut state, Message::Select("/tmp/photo.png".into()));
        assert_eq!(update(&mut state, Message::ConvertRequested).len(), 1);
        assert!(update(&mut state, Message::ConvertRequested).is_empty());
    }

    #[test]
    fn failed_upload_does_not_refresh() {
        let mut state = AppState::default();
        let cmds = update(
            &mut state,
            Message::Uploaded {
                path: "/desk/photo.pdf".into(),
                result: Err(SyncError::HttpStatus {
                    url: "http://localhost:8080/pdf".into(),
                    status: 500,
                }),
            },
        );
        assert!(cmds.is_empty());
        assert_eq!(state.status().kind, Some(ErrorKind::Transport));
    }

    #[test]
    fn failed_conversion_clears_busy_flag() {
        let mut state = AppState::default();
        update(&mut state, Message::Select("/tmp/photo.png".into()));
        update(&mut state, Message::ConvertRequested);
        update(
            &mut state,
            Message::Converted(Err(SyncError::PageEncode {
                detail: "boom".into(),
            })),
        );
        assert!(!state.is_converting());
        assert_eq!(state.status().kind, Some(ErrorKind::Decode));
    }

    #[test]
    fn list_is_replaced_wholesale() {
        let mut state = AppState::default();
        update(
            &mut state,
            Message::ListLoaded(Ok(vec![record(1, "a.pdf"), record(2, "b.pdf")])),
        );
        update(&mut state, Message::ListLoaded(Ok(vec![record(7, "z.pdf")])));
        assert_eq!(state.documents(), &[record(7, "z.pdf")]);
    }

    #[test]
    fn failed_list_keeps_previous_records() {
        let mut state = AppState::default();
        update(&mut state, Message::ListLoaded(Ok(vec![record(1, "a.pdf")])));
        update(
            &mut state,
            Message::ListLoaded(Err(SyncError::ResponseDecode {
                url: "http://localhost:8080/pdf".into(),
                detail: "expected array".into(),
            })),
        );
        assert_eq!(state.documents().len(), 1);
        assert_eq!(state.status().kind, Some(ErrorKind::Decode));
    }

    #[test]
    fn download_reports_path() {
        let mut state = AppState::default();
        assert_eq!(
            update(&mut state, Message::DownloadRequested(4)),
            vec![Command::Download(4)]
        );
        update(
            &mut state,
            Message::Downloaded {
                id: 4,
                result: Ok("/dl/photo.pdf".into()),
            },
        );
        assert_eq!(state.status().text, "PDF downloaded to: /dl/photo.pdf");
    }

    #[test]
    fn selecting_replaces_previous_selection() {
        let mut state = AppState::default();
        update(&mut state, Message::Select("/a/one.png".into()));
        update(&mut state, Message::Select("/a/two.jpg".into()));
        assert_eq!(state.selected().map(|s| s.label()), Some("two.jpg"));
    }
}
