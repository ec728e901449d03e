//! Text rendering of the single screen.

use super::state::AppState;
use std::fmt;

/// Render the screen: title, selection, actions, document list, status.
pub fn render(state: &AppState) -> String {
    Screen(state).to_string()
}

/// [`AppState`] formatted as the single screen.
pub struct Screen<'a>(pub &'a AppState);

impl fmt::Display for Screen<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0;
        writeln!(f, "PDF Converter")?;
        writeln!(
            f,
            "  File: {}",
            state.selected().map(|s| s.label()).unwrap_or("<none>")
        )?;
        writeln!(f, "  [select <path>]  [convert]  [refresh]")?;
        writeln!(f)?;

        if state.documents().is_empty() {
            writeln!(f, "  (no documents on server)")?;
        } else {
            writeln!(f, "  Documents:")?;
            for doc in state.documents() {
                writeln!(f, "    {:>5}  {:<40}  [download {}]", doc.id, doc.filename, doc.id)?;
            }
        }

        let status = state.status();
        if !status.is_empty() {
            let marker = if status.is_error() { "!" } else { "›" };
            writeln!(f)?;
            writeln!(f, "  {} {}", marker, status.text)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::state::{update, Message};
    use crate::error::SyncError;
    use crate::model::DocumentRecord;

    #[test]
    fn empty_screen() {
        let screen = render(&AppState::default());
        assert!(screen.starts_with("PDF Converter\n"));
        assert!(screen.contains("File: <none>"));
        assert!(screen.contains("no documents"));
    }

    #[test]
    fn lists_documents_with_download_affordance() {
        let mut state = AppState::default();
        update(
            &mut state,
            Message::ListLoaded(Ok(vec![DocumentRecord {
                id: 12,
                filename: "photo.pdf".into(),
            }])),
        );
        let screen = render(&state);
        assert!(screen.contains("photo.pdf"));
        assert!(screen.contains("[download 12]"));
    }

    #[test]
    fn screen_display_matches_render() {
        let mut state = AppState::default();
        update(&mut state, Message::Select("/tmp/photo.png".into()));
        assert_eq!(format!("{}", Screen(&state)), render(&state));
    }

    #[test]
    fn error_status_is_marked() {
        let mut state = AppState::default();
        update(&mut state, Message::Select("/tmp/photo.jpg".into()));
        update(
            &mut state,
            Message::Downloaded {
                id: 1,
                result: Err(SyncError::Transport {
                    url: "http://localhost:8080/pdf/1".into(),
                    reason: "connection refused".into(),
                }),
            },
        );
        let screen = render(&state);
        assert!(screen.contains("File: photo.jpg"));
        assert!(screen.contains("! Download failed (network error)"));
    }
}
