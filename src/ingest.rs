use std::fs;

use log::{debug, info};
use thiserror::Error;

/// A run that fails here produces no partial output; once the blob is in
/// hand the aggregation pass cannot fail.
#[derive(Debug, Error)]
pub enum IngestError {
    #[error("failed to read {path}: {source}")]
    File {
        path: String,
        source: std::io::Error,
    },

    #[error("request failed for {url}: {source}")]
    Request {
        url: String,
        source: reqwest::Error,
    },

    #[error("HTTP {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Obtain the full source text. `input` is either a local file path or an
/// http(s) URL; either way the blob is complete before aggregation starts.
pub fn read_source(input: &str) -> Result<String, IngestError> {
    if input.starts_with("http://") || input.starts_with("https://") {
        fetch_url(input)
    } else {
        debug!("Reading local file - path={input}");
        fs::read_to_string(input).map_err(|source| IngestError::File {
            path: input.to_string(),
            source,
        })
    }
}

/// Fetch a remote table. Non-success statuses are a distinct failure so the
/// caller can tell "server said no" from "could not reach the server".
pub fn fetch_url(url: &str) -> Result<String, IngestError> {
    let start = std::time::Instant::now();
    debug!("Fetching source - url={url}");

    let response = reqwest::blocking::get(url).map_err(|source| IngestError::Request {
        url: url.to_string(),
        source,
    })?;

    let status = response.status();
    if !status.is_success() {
        return Err(IngestError::Status {
            url: url.to_string(),
            status: status.as_u16(),
        });
    }

    let body = response.text().map_err(|source| IngestError::Request {
        url: url.to_string(),
        source,
    })?;

    info!(
        "Source fetch completed - url={}, duration={:.2}s, bytes={}",
        url,
        start.elapsed().as_secs_f32(),
        body.len()
    );
    Ok(body)
}
