//! # pagesync
//!
//! Turn a JPG or PNG into a single-page PDF, keep a copy on the desktop, and
//! synchronise it with a document server on the local network.
//!
//! ## Workflow
//!
//! ```text
//! image
//!  │
//!  ├─ 1. Input    accept only .jpg / .png (any case)
//!  ├─ 2. Encode   one page, 1 px = 1 pt, Flate-compressed image XObject
//!  ├─ 3. Persist  atomic write of <basename>.pdf to the desktop
//!  ├─ 4. Upload   POST /pdf, multipart part "file", application/pdf
//!  └─ 5. Refresh  GET /pdf on success → document list
//! ```
//!
//! Any listed document can be fetched back with `GET /pdf/{id}` into the
//! downloads folder.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use pagesync::{convert_image, SelectedInput, SyncClient, SyncConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = SyncConfig::default();
//!     let doc = convert_image(&SelectedInput::new("photo.jpg"), &config).await?;
//!     println!("saved {} ({}×{} pt)", doc.path.display(), doc.width, doc.height);
//!
//!     let client = SyncClient::new(&config)?;
//!     client.upload(&doc.path).await?;
//!     for record in client.list().await? {
//!         println!("{:>4}  {}", record.id, record.filename);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `pagesync` binary (clap + anyhow + tracing-subscriber + indicatif) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod app;
pub mod client;
pub mod config;
pub mod convert;
pub mod error;
pub mod model;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use app::{render, update, AppState, Command, Controller, Message};
pub use client::SyncClient;
pub use config::{ConflictPolicy, SyncConfig, SyncConfigBuilder};
pub use convert::{convert_image, convert_image_blocking};
pub use error::{ErrorKind, SyncError};
pub use model::{
    ConvertedDocument, DocumentRecord, FetchedDocument, SelectedInput, Severity, StatusMessage,
    UploadReceipt,
};
