//! Local persistence: write a document into a directory atomically.
//!
//! Bytes are written to a temp file created next to the destination and
//! then renamed over it, so a reader never observes a half-written PDF and
//! a failed write leaves any previous file untouched. The target directory
//! must already exist; it is not created on the caller's behalf.

use crate::config::ConflictPolicy;
use crate::error::SyncError;
use std::io::Write;
use std::path::{Path, PathBuf};
use tracing::{debug, info};

/// Upper bound on `name (n).ext` candidates tried under [`ConflictPolicy::Rename`].
const MAX_RENAME_ATTEMPTS: u32 = 10_000;

/// Write `bytes` to `dir/file_name` and return the final path.
///
/// With [`ConflictPolicy::Rename`] an existing file is kept and the new
/// document lands at the first free `name (n).ext`. Each candidate is
/// claimed with a no-clobber rename, so concurrent writers of the same name
/// always end up at distinct paths.
pub fn write_document(
    dir: &Path,
    file_name: &str,
    bytes: &[u8],
    policy: ConflictPolicy,
) -> Result<PathBuf, SyncError> {
    let first = dir.join(file_name);
    let fail = |path: &Path, source: std::io::Error| SyncError::OutputWriteFailed {
        path: path.to_path_buf(),
        source,
    };

    let mut tmp = tempfile::Builder::new()
        .prefix(".pagesync-")
        .suffix(".tmp")
        .tempfile_in(dir)
        .map_err(|e| fail(&first, e))?;
    tmp.write_all(bytes).map_err(|e| fail(&first, e))?;
    tmp.as_file().sync_all().map_err(|e| fail(&first, e))?;

    if policy == ConflictPolicy::Overwrite {
        tmp.persist(&first).map_err(|e| fail(&first, e.error))?;
        info!("Wrote {} bytes to {}", bytes.len(), first.display());
        return Ok(first);
    }

    let mut target = first.clone();
    for n in 0..=MAX_RENAME_ATTEMPTS {
        if n > 0 {
            target = dir.join(numbered_name(file_name, n));
        }
        match tmp.persist_noclobber(&target) {
            Ok(_) => {
                if n > 0 {
                    debug!("{} exists, used {}", first.display(), target.display());
                }
                info!("Wrote {} bytes to {}", bytes.len(), target.display());
                return Ok(target);
            }
            Err(e) if e.error.kind() == std::io::ErrorKind::AlreadyExists => tmp = e.file,
            Err(e) => return Err(fail(&target, e.error)),
        }
    }

    Err(fail(
        &first,
        std::io::Error::new(std::io::ErrorKind::AlreadyExists, "no free file name left"),
    ))
}

/// `photo.pdf` → `photo (n).pdf`.
fn numbered_name(file_name: &str, n: u32) -> String {
    let name = Path::new(file_name);
    let stem = name
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    match name.extension() {
        Some(ext) => format!("{stem} ({n}).{}", ext.to_string_lossy()),
        None => format!("{stem} ({n})"),
    }
}
