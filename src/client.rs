//! HTTP client for the companion document server.
//!
//! Three independent exchanges, all relative to [`SyncConfig::base_url`]:
//!
//! | Operation | Request | Success |
//! |-----------|---------|---------|
//! | [`SyncClient::list`] | `GET /pdf` | JSON `[{id, filename}]` |
//! | [`SyncClient::upload`] | `POST /pdf`, multipart part `file` | any 2xx |
//! | [`SyncClient::fetch`] / [`SyncClient::download`] | `GET /pdf/{id}` | raw bytes |
//!
//! Every request runs under the configured timeout and every non-2xx status
//! is an error. There are no retries: the caller sees the first failure.

use crate::config::{ConflictPolicy, SyncConfig};
use crate::error::SyncError;
use crate::model::{DocumentRecord, FetchedDocument, UploadReceipt};
use crate::pipeline::persist;
use reqwest::header::CONTENT_DISPOSITION;
use reqwest::multipart::{Form, Part};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};

/// Content type sent for the uploaded part, whatever the file holds.
pub const UPLOAD_CONTENT_TYPE: &str = "application/pdf";

/// Name used when the server does not suggest one.
pub const FALLBACK_DOWNLOAD_NAME: &str = "downloaded.pdf";

/// Part file name used when the uploaded path has no final component.
pub const FALLBACK_UPLOAD_NAME: &str = "document.pdf";

/// Client for the document server. Cheap to clone.
#[derive(Debug, Clone)]
pub struct SyncClient {
    http: reqwest::Client,
    base_url: String,
    upload_field: String,
    timeout_secs: u64,
}

impl SyncClient {
    /// Build a client from a validated configuration.
    pub fn new(config: &SyncConfig) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.request_timeout_secs))
            .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
            .build()
            .map_err(|e| SyncError::InvalidConfig(format!("HTTP client: {e}")))?;

        Ok(Self {
            http,
            base_url: config.base_url.trim_end_matches('/').to_string(),
            upload_field: config.upload_field.clone(),
            timeout_secs: config.request_timeout_secs,
        })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    /// `GET /pdf`: the server's document list, in server order.
    pub async fn list(&self) -> Result<Vec<DocumentRecord>, SyncError> {
        let url = self.url("pdf");
        debug!("GET {}", url);

        let response = self.send(self.http.get(&url), &url).await?;
        let body = response
            .bytes()
            .await
            .map_err(|e| SyncError::from_reqwest(&url, self.timeout_secs, e))?;

        let records: Vec<DocumentRecord> =
            serde_json::from_slice(&body).map_err(|e| SyncError::ResponseDecode {
                url: url.clone(),
                detail: e.to_string(),
            })?;

        debug!("Listed {} documents", records.len());
        Ok(records)
    }

    /// `POST /pdf`: upload the document at `path` as a one-part multipart form.
    ///
    /// The part is named after [`SyncConfig::upload_field`], carries the
    /// file's own name and is always typed `application/pdf`. The boundary
    /// is random per request.
    pub async fn upload(&self, path: &Path) -> Result<UploadReceipt, SyncError> {
        let url = self.url("pdf");
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|e| SyncError::InputReadFailed {
                path: path.to_path_buf(),
                source: e,
            })?;
        let file_name = upload_file_name(path);

        info!("Uploading {} ({} bytes) to {}", file_name, bytes.len(), url);

        let part = Part::bytes(bytes)
            .file_name(file_name)
            .mime_str(UPLOAD_CONTENT_TYPE)
            .map_err(|e| SyncError::Internal(format!("multipart content type: {e}")))?;
        let form = Form::new().part(self.upload_field.clone(), part);

        let response = self.send(self.http.post(&url).multipart(form), &url).await?;
        let status = response.status().as_u16();
        let body = response
            .text()
            .await
            .map_err(|e| SyncError::from_reqwest(&url, self.timeout_secs, e))?;

        debug!("Upload response {}: {}", status, body);
        Ok(UploadReceipt { status, body })
    }

    /// `GET /pdf/{id}`: the raw document bytes and the server's suggested name.
    pub async fn fetch(&self, id: i64) -> Result<FetchedDocument, SyncError> {
        let url = self.url(&format!("pdf/{id}"));
        debug!("GET {}", url);

        let response = self.send(self.http.get(&url), &url).await?;
        let suggested_name = response
            .headers()
            .get(CONTENT_DISPOSITION)
            .and_then(|v| v.to_str().ok())
            .and_then(disposition_filename);
        let bytes = response
            .bytes()
            .await
            .map_err(|e| SyncError::from_reqwest(&url, self.timeout_secs, e))?;

        Ok(FetchedDocument {
            id,
            suggested_name,
            bytes: bytes.to_vec(),
        })
    }

    /// Fetch document `id` and write it into `dir`; returns the written path.
    pub async fn download(
        &self,
        id: i64,
        dir: &Path,
        policy: ConflictPolicy,
    ) -> Result<PathBuf, SyncError> {
        let doc = self.fetch(id).await?;
        let name = doc
            .suggested_name
            .as_deref()
            .unwrap_or(FALLBACK_DOWNLOAD_NAME)
            .to_string();

        let dir = dir.to_path_buf();
        let path = tokio::task::spawn_blocking(move || {
            persist::write_document(&dir, &name, &doc.bytes, policy)
        })
        .await
        .map_err(|e| SyncError::Internal(format!("Write task panicked: {}", e)))??;

        info!("Downloaded document {} to {}", id, path.display());
        Ok(path)
    }

    /// Send a request and require a 2xx answer.
    async fn send(
        &self,
        request: reqwest::RequestBuilder,
        url: &str,
    ) -> Result<reqwest::Response, SyncError> {
        let response = request
            .send()
            .await
            .map_err(|e| SyncError::from_reqwest(url, self.timeout_secs, e))?;

        if !response.status().is_success() {
            return Err(SyncError::HttpStatus {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }
        Ok(response)
    }
}

/// File name sent with the upload part for `path`.
fn upload_file_name(path: &Path) -> String {
    path.file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| FALLBACK_UPLOAD_NAME.to_string())
}

/// Extract a safe file name from a `Content-Disposition` header value.
///
/// Only the `filename=` parameter is honoured, as a bare token or a quoted
/// string (which may contain `;` and `\"` escapes). Directory components
/// are stripped; empty, `.` and `..` names are rejected.
pub fn disposition_filename(header: &str) -> Option<String> {
    let raw = disposition_params(header)
        .into_iter()
        .find(|(key, _)| key.eq_ignore_ascii_case("filename"))
        .map(|(_, value)| value)?;

    let name = raw.rsplit(['/', '\\']).next().unwrap_or("").trim();
    if name.is_empty() || name == "." || name == ".." {
        return None;
    }
    Some(name.to_string())
}

/// Split the `key=value` parameters after the disposition type.
///
/// Separators inside a quoted value are part of the value.
fn disposition_params(header: &str) -> Vec<(String, String)> {
    let mut params = Vec::new();
    let mut chars = header.chars().peekable();

    // Disposition type.
    for c in chars.by_ref() {
        if c == ';' {
            break;
        }
    }

    loop {
        let mut key = String::new();
        let mut has_value = false;
        for c in chars.by_ref() {
            if c == '=' {
                has_value = true;
                break;
            }
            if c == ';' {
                break;
            }
            key.push(c);
        }
        if !has_value {
            if chars.peek().is_none() {
                break;
            }
            continue;
        }

        while chars.next_if(|c| c.is_whitespace()).is_some() {}
        let mut value = String::new();
        if chars.next_if_eq(&'"').is_some() {
            while let Some(c) = chars.next() {
                match c {
                    // Only `\"` and `\\` are escapes; Windows paths keep their separators.
                    '\\' => match chars.next_if(|n| *n == '"' || *n == '\\') {
                        Some(escaped) => value.push(escaped),
                        None => value.push('\\'),
                    },
                    '"' => break,
                    c => value.push(c),
                }
            }
            // Anything between the closing quote and the next separator.
            for c in chars.by_ref() {
                if c == ';' {
                    break;
                }
            }
        } else {
            for c in chars.by_ref() {
                if c == ';' {
                    break;
                }
                value.push(c);
            }
            value = value.trim().to_string();
        }

        params.push((key.trim().to_string(), value));
        if chars.peek().is_none() {
            break;
        }
    }
    params
}
