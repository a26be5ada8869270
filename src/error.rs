use std::path::PathBuf;

use thiserror::Error;

const BODY_PREVIEW_LIMIT: usize = 200;

#[derive(Error, Debug)]
pub enum ApiError {
    #[error("request to {url} failed: {source}")]
    Transport {
        url: String,
        #[source]
        source: reqwest::Error,
    },
    #[error("{method} {url} returned {status}: {body}")]
    Status {
        method: &'static str,
        url: String,
        status: u16,
        body: String,
    },
    #[error("failed to decode response from {url}: {source} (body: {body})")]
    Decode {
        url: String,
        #[source]
        source: serde_json::Error,
        body: String,
    },
    #[error("task has no id, it was never saved")]
    MissingId,
}

impl ApiError {
    pub fn status_error(method: &'static str, url: String, status: u16, body: &str) -> Self {
        Self::Status {
            method,
            url,
            status,
            body: preview_body(body),
        }
    }

    pub fn decode_error(url: String, source: serde_json::Error, body: &str) -> Self {
        Self::Decode {
            url,
            source,
            body: preview_body(body),
        }
    }
}

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

pub(crate) fn preview_body(body: &str) -> String {
    let trimmed = body.trim();
    if trimmed.is_empty() {
        return "<empty body>".to_string();
    }
    if trimmed.len() <= BODY_PREVIEW_LIMIT {
        return trimmed.to_string();
    }
    let mut end = BODY_PREVIEW_LIMIT;
    while !trimmed.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}...", &trimmed[..end])
}
