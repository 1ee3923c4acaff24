use hyper::Uri;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("target url must not be empty")]
    EmptyUrl,
    #[error("invalid target url {url:?}: {reason}")]
    InvalidUrl { url: String, reason: String },
    #[error("unsupported scheme {0:?}, only http and https targets can be tested")]
    UnsupportedScheme(String),
    #[error("concurrency must be at least 1")]
    ZeroConcurrency,
}

/// Validated parameters of one load test run.
#[derive(Debug, Clone)]
pub struct RunConfig {
    uri: Uri,
    total_requests: usize,
    concurrency: usize,
}

impl RunConfig {
    /// A `total_requests` of zero is allowed and yields an empty run.
    pub fn new(url: &str, total_requests: usize, concurrency: usize) -> Result<Self, ConfigError> {
        let url = url.trim();
        if url.is_empty() {
            return Err(ConfigError::EmptyUrl);
        }
        let invalid = |reason: String| ConfigError::InvalidUrl {
            url: url.to_owned(),
            reason,
        };
        let uri: Uri = url.parse().map_err(|e| invalid(format!("{e}")))?;
        match uri.scheme_str() {
            Some("http" | "https") => {}
            Some(other) => return Err(ConfigError::UnsupportedScheme(other.to_owned())),
            None => return Err(invalid("missing scheme".to_owned())),
        }
        if uri.authority().is_none() {
            return Err(invalid("missing host".to_owned()));
        }
        if concurrency == 0 {
            return Err(ConfigError::ZeroConcurrency);
        }
        Ok(Self {
            uri,
            total_requests,
            concurrency,
        })
    }

    #[inline]
    #[must_use]
    pub fn uri(&self) -> &Uri {
        &self.uri
    }

    #[inline]
    #[must_use]
    pub fn total_requests(&self) -> usize {
        self.total_requests
    }

    #[inline]
    #[must_use]
    pub fn concurrency(&self) -> usize {
        self.concurrency
    }
}
