//! Error types for the task list.
//!
//! Failures fall into three families: the remote store could not be reached or
//! answered badly, the local cache could not be read or written, or the user
//! input did not pass validation. Controller operations return these instead of
//! swallowing them so the presentation layer can decide how to surface them.

use std::{error::Error as StdError, fmt, path::PathBuf};

use thiserror::Error;

use crate::task::TaskId;

const BODY_PREVIEW_LIMIT: usize = 512;

/// Top-level error for controller operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),
    #[error("task {0} not found")]
    NotFound(TaskId),
    #[error("no task is being renamed")]
    NotEditing,
    #[error(transparent)]
    Remote(#[from] RemoteError),
    #[error("cache error: {0}")]
    Cache(#[from] CacheError),
}

impl Error {
    /// Short classification used in status lines and logs.
    pub fn kind(&self) -> &'static str {
        match self {
            Error::Validation(_) => "validation",
            Error::NotFound(_) => "not-found",
            Error::NotEditing => "not-editing",
            Error::Remote(_) => "network",
            Error::Cache(_) => "cache",
        }
    }
}

/// Input rejected before any network call.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationError {
    #[error("task name must not be empty")]
    EmptyName,
}

/// Local cache failures.
#[derive(Error, Debug)]
pub enum CacheError {
    #[error("cache io error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("cache snapshot is not a valid task list: {0}")]
    Snapshot(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RemoteErrorKind {
    Timeout,
    Connect,
    Request,
    Body,
    Decode,
    Status,
    Unknown,
}

impl RemoteErrorKind {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Timeout => "timeout",
            Self::Connect => "connect",
            Self::Request => "request",
            Self::Body => "body",
            Self::Decode => "decode",
            Self::Status => "status",
            Self::Unknown => "unknown",
        }
    }
}

impl fmt::Display for RemoteErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call against the remote store.
#[derive(Debug)]
pub struct RemoteError {
    kind: RemoteErrorKind,
    status: Option<u16>,
    url: Option<String>,
    message: String,
    source: Option<Box<dyn StdError + Send + Sync>>,
}

impl RemoteError {
    pub fn new(kind: RemoteErrorKind, message: impl Into<String>) -> Self {
        RemoteError {
            kind,
            status: None,
            url: None,
            message: message.into(),
            source: None,
        }
    }

    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn with_status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    pub fn kind(&self) -> RemoteErrorKind {
        self.kind
    }

    pub fn status(&self) -> Option<u16> {
        self.status
    }

    pub fn url(&self) -> Option<&str> {
        self.url.as_deref()
    }

    pub(crate) fn from_reqwest(err: reqwest::Error, url: &str) -> Self {
        let kind = if err.is_timeout() {
            RemoteErrorKind::Timeout
        } else if err.is_connect() {
            RemoteErrorKind::Connect
        } else if err.is_request() {
            RemoteErrorKind::Request
        } else if err.is_body() {
            RemoteErrorKind::Body
        } else if err.is_decode() {
            RemoteErrorKind::Decode
        } else {
            RemoteErrorKind::Unknown
        };
        RemoteError {
            kind,
            status: err.status().map(|s| s.as_u16()),
            url: Some(url.to_string()),
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub(crate) fn status_error(status: u16, url: &str, body: &str) -> Self {
        RemoteError::new(RemoteErrorKind::Status, preview_body(body))
            .with_status(status)
            .with_url(url)
    }

    pub(crate) fn decode_error(status: u16, url: &str, err: serde_json::Error, body: &str) -> Self {
        RemoteError {
            kind: RemoteErrorKind::Decode,
            status: Some(status),
            url: Some(url.to_string()),
            message: format!("failed to decode response body: {} | body={}", err, preview_body(body)),
            source: Some(Box::new(err)),
        }
    }
}

impl fmt::Display for RemoteError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "remote store error kind={}", self.kind)?;
        if let Some(status) = self.status {
            write!(f, " status={}", status)?;
        }
        if let Some(url) = &self.url {
            write!(f, " url={}", url)?;
        }
        write!(f, ": {}", self.message)
    }
}

impl StdError for RemoteError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|err| &**err as &(dyn StdError + 'static))
    }
}

/// Trimmed body text capped at `BODY_PREVIEW_LIMIT` characters.
pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }

    let mut out: String = trimmed.chars().take(BODY_PREVIEW_LIMIT).collect();
    if trimmed.chars().count() > BODY_PREVIEW_LIMIT {
        out.push_str("...");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn preview_truncates_long_bodies() {
        let body = "x".repeat(BODY_PREVIEW_LIMIT + 10);
        let preview = preview_body(&body);
        assert!(preview.ends_with("..."));
        assert_eq!(preview.chars().count(), BODY_PREVIEW_LIMIT + 3);
    }

    #[test]
    fn preview_marks_empty_bodies() {
        assert_eq!(preview_body("   \n"), "<empty body>");
    }

    #[test]
    fn remote_error_display_includes_context() {
        let err = RemoteError::status_error(404, "http://h/api/tasks/7", "{\"error\":\"Task not found\"}");
        let text = err.to_string();
        assert!(text.contains("kind=status"));
        assert!(text.contains("status=404"));
        assert!(text.contains("url=http://h/api/tasks/7"));
        assert_eq!(err.kind(), RemoteErrorKind::Status);
    }

    #[test]
    fn controller_error_kinds() {
        assert_eq!(Error::from(ValidationError::EmptyName).kind(), "validation");
        let remote = RemoteError::new(RemoteErrorKind::Connect, "refused");
        assert_eq!(Error::from(remote).kind(), "network");
    }
}
