//! Configuration for the convert-and-synchronise workflow.
//!
//! Everything the workflow needs to know about its surroundings lives in
//! [`SyncConfig`]: where the document server is, where converted and
//! downloaded files go, how long a request may take, and what to do when a
//! file name is already taken. The defaults are the fixed endpoint and the
//! desktop/downloads directories; the library never reads the environment,
//! callers (the CLI) decide what to override.

use crate::error::SyncError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default document server.
pub const DEFAULT_BASE_URL: &str = "http://localhost:8080";

/// Multipart field name the server expects the document under.
pub const DEFAULT_UPLOAD_FIELD: &str = "file";

/// Configuration for [`crate::client::SyncClient`] and the conversion stages.
///
/// Built via [`SyncConfig::builder()`] or using [`SyncConfig::default()`].
///
/// # Example
/// ```rust
/// use pagesync::{ConflictPolicy, SyncConfig};
///
/// let config = SyncConfig::builder()
///     .base_url("http://192.168.1.20:8080")
///     .request_timeout_secs(10)
///     .conflict_policy(ConflictPolicy::Rename)
///     .build()
///     .unwrap();
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Base URL of the document server. Default: `http://localhost:8080`.
    pub base_url: String,

    /// Where converted PDFs are written. Default: the user's desktop.
    pub output_dir: PathBuf,

    /// Where downloaded PDFs are written. Default: the user's downloads folder.
    pub download_dir: PathBuf,

    /// Whole-request timeout in seconds. Default: 30.
    pub request_timeout_secs: u64,

    /// TCP connect timeout in seconds. Default: 5.
    ///
    /// The server is expected on the local network, so a connect that takes
    /// longer than a few seconds means it is down.
    pub connect_timeout_secs: u64,

    /// What to do when the output file already exists. Default: overwrite.
    pub conflict_policy: ConflictPolicy,

    /// Multipart field name for uploads. Default: `file`.
    pub upload_field: String,
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: default_output_dir(),
            download_dir: default_download_dir(),
            request_timeout_secs: 30,
            connect_timeout_secs: 5,
            conflict_policy: ConflictPolicy::default(),
            upload_field: DEFAULT_UPLOAD_FIELD.to_string(),
        }
    }
}

impl SyncConfig {
    /// Create a new builder for `SyncConfig`.
    pub fn builder() -> SyncConfigBuilder {
        SyncConfigBuilder {
            config: Self::default(),
        }
    }
}

/// Builder for [`SyncConfig`].
#[derive(Debug)]
pub struct SyncConfigBuilder {
    config: SyncConfig,
}

impl SyncConfigBuilder {
    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.base_url = url.into();
        self
    }

    pub fn output_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.output_dir = dir.into();
        self
    }

    pub fn download_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.config.download_dir = dir.into();
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.request_timeout_secs = secs;
        self
    }

    pub fn connect_timeout_secs(mut self, secs: u64) -> Self {
        self.config.connect_timeout_secs = secs;
        self
    }

    pub fn conflict_policy(mut self, policy: ConflictPolicy) -> Self {
        self.config.conflict_policy = policy;
        self
    }

    pub fn upload_field(mut self, name: impl Into<String>) -> Self {
        self.config.upload_field = name.into();
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<SyncConfig, SyncError> {
        let c = &self.config;
        let url = reqwest::Url::parse(&c.base_url).map_err(|e| {
            SyncError::InvalidConfig(format!("base URL '{}' is invalid: {}", c.base_url, e))
        })?;
        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(SyncError::InvalidConfig(format!(
                "base URL must be http or https, got '{}'",
                url.scheme()
            )));
        }
        if c.request_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "Request timeout must be ≥ 1s".into(),
            ));
        }
        if c.connect_timeout_secs == 0 {
            return Err(SyncError::InvalidConfig(
                "Connect timeout must be ≥ 1s".into(),
            ));
        }
        if c.upload_field.trim().is_empty() {
            return Err(SyncError::InvalidConfig(
                "Upload field name must not be empty".into(),
            ));
        }
        Ok(self.config)
    }
}

// ── Enums ────────────────────────────────────────────────────────────────

/// What to do when the destination file already exists.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum ConflictPolicy {
    /// Replace the existing file. (default)
    #[default]
    Overwrite,
    /// Keep the existing file and write `name (1).pdf`, `name (2).pdf`, …
    Rename,
}

// ── Directory defaults ───────────────────────────────────────────────────

fn home_dir() -> PathBuf {
    dirs::home_dir().unwrap_or_else(|| PathBuf::from("."))
}

/// The desktop-equivalent directory for converted output.
pub fn default_output_dir() -> PathBuf {
    dirs::desktop_dir().unwrap_or_else(|| home_dir().join("Desktop"))
}

/// The downloads-equivalent directory for fetched documents.
pub fn default_download_dir() -> PathBuf {
    dirs::download_dir().unwrap_or_else(|| home_dir().join("Downloads"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_point_at_local_server() {
        let c = SyncConfig::default();
        assert_eq!(c.base_url, "http://localhost:8080");
        assert_eq!(c.upload_field, "file");
        assert_eq!(c.conflict_policy, ConflictPolicy::Overwrite);
        assert_eq!(c.request_timeout_secs, 30);
    }

    #[test]
    fn rejects_unparseable_url() {
        let err = SyncConfig::builder().base_url("not a url").build().unwrap_err();
        assert!(matches!(err, SyncError::InvalidConfig(_)));
    }

    #[test]
    fn rejects_non_http_scheme() {
        let err = SyncConfig::builder()
            .base_url("ftp://localhost/")
            .build()
            .unwrap_err();
        assert!(err.to_string().contains("ftp"));
    }

    #[test]
    fn rejects_zero_timeouts() {
        assert!(SyncConfig::builder().request_timeout_secs(0).build().is_err());
        assert!(SyncConfig::builder().connect_timeout_secs(0).build().is_err());
    }

    #[test]
    fn rejects_blank_upload_field() {
        assert!(SyncConfig::builder().upload_field("  ").build().is_err());
    }
}
