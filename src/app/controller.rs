//! Runs [`Command`]s as tasks and feeds their results back into the state.
//!
//! The controller is the only owner of [`AppState`]. Each command becomes a
//! task in a [`JoinSet`] that resolves to a [`Message`]; the controller
//! applies that message itself when it awaits [`Controller::next`]. Network
//! and encoding tasks therefore never touch the state, and two list
//! responses arriving back to back are applied one after the other, each
//! replacing the list as a whole.

use super::state::{update, AppState, Command, Message};
use crate::client::SyncClient;
use crate::config::SyncConfig;
use crate::convert::convert_image;
use crate::error::SyncError;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::task::JoinSet;
use tracing::{debug, error};

/// Owner of the application state and its in-flight tasks.
pub struct Controller {
    state: AppState,
    client: SyncClient,
    config: Arc<SyncConfig>,
    tasks: JoinSet<Message>,
}

impl Controller {
    pub fn new(config: SyncConfig) -> Result<Self, SyncError> {
        let client = SyncClient::new(&config)?;
        Ok(Self {
            state: AppState::default(),
            client,
            config: Arc::new(config),
            tasks: JoinSet::new(),
        })
    }

    pub fn state(&self) -> &AppState {
        &self.state
    }

    pub fn config(&self) -> &SyncConfig {
        &self.config
    }

    /// Number of tasks that have not been applied yet.
    pub fn in_flight(&self) -> usize {
        self.tasks.len()
    }

    /// Apply `msg` and spawn whatever it asks for. Must run inside a tokio runtime.
    pub fn dispatch(&mut self, msg: Message) {
        for cmd in update(&mut self.state, msg) {
            debug!("Spawning {:?}", cmd);
            let client = self.client.clone();
            let config = Arc::clone(&self.config);
            self.tasks.spawn(run_guarded(cmd, client, config));
        }
    }

    /// Wait for the next task to finish and apply its result.
    ///
    /// Returns `false` when nothing is in flight.
    pub async fn next(&mut self) -> bool {
        match self.tasks.join_next().await {
            None => false,
            Some(Ok(msg)) => {
                self.dispatch(msg);
                true
            }
            Some(Err(e)) if e.is_cancelled() => true,
            Some(Err(e)) => {
                // Panics are caught inside the task, so this is unreachable in practice.
                error!("Task failed: {}", e);
                true
            }
        }
    }

    /// Drive tasks, including the ones they trigger, until none are left.
    pub async fn settle(&mut self) {
        while self.next().await {}
    }

    /// Abort every in-flight task and wait for them to stop.
    pub async fn cancel_all(&mut self) {
        if self.tasks.is_empty() {
            return;
        }
        let n = self.tasks.len();
        self.tasks.shutdown().await;
        debug!("Cancelled {} tasks", n);
        self.dispatch(Message::Cancelled);
    }
}

/// Run `cmd`, turning a panic into the failure message for that command.
async fn run_guarded(cmd: Command, client: SyncClient, config: Arc<SyncConfig>) -> Message {
    let fallback = cmd.clone();
    match AssertUnwindSafe(execute(cmd, client, config))
        .catch_unwind()
        .await
    {
        Ok(msg) => msg,
        Err(_) => failure(fallback, SyncError::Internal("task panicked".into())),
    }
}

async fn execute(cmd: Command, client: SyncClient, config: Arc<SyncConfig>) -> Message {
    match cmd {
        Command::Convert(selected) => Message::Converted(convert_image(&selected, &config).await),
        Command::Upload(path) => {
            let result = client.upload(&path).await;
            Message::Uploaded { path, result }
        }
        Command::List => Message::ListLoaded(client.list().await),
        Command::Download(id) => Message::Downloaded {
            id,
            result: client
                .download(id, &config.download_dir, config.conflict_policy)
                .await,
        },
    }
}

/// The message a command would have produced had it failed with `err`.
fn failure(cmd: Command, err: SyncError) -> Message {
    match cmd {
        Command::Convert(_) => Message::Converted(Err(err)),
        Command::Upload(path) => Message::Uploaded {
            path,
            result: Err(err),
        },
        Command::List => Message::ListLoaded(Err(err)),
        Command::Download(id) => Message::Downloaded {
            id,
            result: Err(err),
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ErrorKind;

    fn unreachable_config(dir: &std::path::Path) -> SyncConfig {
        // Port 9 (discard) is closed on test machines: connects fail fast.
        SyncConfig::builder()
            .base_url("http://127.0.0.1:9")
            .output_dir(dir)
            .download_dir(dir)
            .connect_timeout_secs(1)
            .request_timeout_secs(2)
            .build()
            .unwrap()
    }

    #[tokio::test]
    async fn unsupported_selection_spawns_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = Controller::new(unreachable_config(dir.path())).unwrap();
        c.dispatch(Message::Select(dir.path().join("clip.gif")));
        c.dispatch(Message::ConvertRequested);
        assert_eq!(c.in_flight(), 0);
        assert_eq!(c.state().status().kind, Some(ErrorKind::UnsupportedInput));
    }

    #[tokio::test]
    async fn unreachable_server_surfaces_transport_status() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = Controller::new(unreachable_config(dir.path())).unwrap();
        c.dispatch(Message::Appeared);
        assert_eq!(c.in_flight(), 1);
        c.settle().await;
        assert_eq!(c.state().status().kind, Some(ErrorKind::Transport));
        assert!(c.state().documents().is_empty());
    }

    #[tokio::test]
    async fn cancel_clears_tasks() {
        let dir = tempfile::tempdir().unwrap();
        let mut c = Controller::new(unreachable_config(dir.path())).unwrap();
        c.dispatch(Message::RefreshRequested);
        c.dispatch(Message::DownloadRequested(3));
        c.cancel_all().await;
        assert_eq!(c.in_flight(), 0);
        assert_eq!(c.state().status().text, "Cancelled");
        assert!(!c.next().await);
    }

    #[test]
    fn failure_keeps_command_identity() {
        match failure(Command::Download(8), SyncError::Internal("x".into())) {
            Message::Downloaded { id, result } => {
                assert_eq!(id, 8);
                assert!(result.is_err());
            }
            other => panic!("unexpected {other:?}"),
        }
    }
}
