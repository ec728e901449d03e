//! Pipeline stages for image-to-PDF conversion.
//!
//! Each submodule implements exactly one step, so each can be tested on its
//! own without a server or a real desktop directory.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ encode ──▶ persist ──▶ (client::upload)
//! (jpg/png)  (lopdf)    (atomic write)
//! ```
//!
//! 1. [`input`]: reject anything outside the JPG/PNG allow-list and
//!    derive the output name
//! 2. [`encode`]: decode the image and draw it onto one page of the same
//!    size; CPU-bound, so async callers run it in `spawn_blocking`
//! 3. [`persist`]: temp-file + rename into the output directory

pub mod encode;
pub mod input;
pub mod persist;
