//! Extraction request domain type

use thiserror::Error;
use url::Url;

/// Reasons an extraction request is rejected before any remote call
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RequestError {
    #[error("url must not be empty")]
    EmptyUrl,

    #[error("invalid url '{url}': {reason}")]
    InvalidUrl { url: String, reason: String },

    #[error("prompt must not be empty")]
    EmptyPrompt,
}

/// A single extraction request: which page to read and what to pull out of it
///
/// Built through [`ExtractionRequest::new`], which guarantees a well-formed
/// absolute URL and a non-empty prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExtractionRequest {
    url: String,
    prompt: String,
}

impl ExtractionRequest {
    /// Validates and builds a request
    ///
    /// The URL is kept exactly as supplied so that it can be echoed back to
    /// the caller unchanged.
    pub fn new(url: impl Into<String>, prompt: impl Into<String>) -> Result<Self, RequestError> {
        let url = url.into();
        let prompt = prompt.into();

        if url.trim().is_empty() {
            return Err(RequestError::EmptyUrl);
        }

        Url::parse(url.trim()).map_err(|e| RequestError::InvalidUrl {
            url: url.clone(),
            reason: e.to_string(),
        })?;

        if prompt.trim().is_empty() {
            return Err(RequestError::EmptyPrompt);
        }

        Ok(Self { url, prompt })
    }

    pub fn url(&self) -> &str {
        &self.url
    }

    pub fn prompt(&self) -> &str {
        &self.prompt
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_valid_request() {
        let req = ExtractionRequest::new("https://example.com/products", "List all prices").unwrap();
        assert_eq!(req.url(), "https://example.com/products");
        assert_eq!(req.prompt(), "List all prices");
    }

    #[test]
    fn test_empty_url_rejected() {
        assert_eq!(
            ExtractionRequest::new("  ", "prompt").unwrap_err(),
            RequestError::EmptyUrl
        );
    }

    #[test]
    fn test_relative_url_rejected() {
        let err = ExtractionRequest::new("/products", "prompt").unwrap_err();
        assert!(matches!(err, RequestError::InvalidUrl { .. }));
    }

    #[test]
    fn test_empty_prompt_rejected() {
        assert_eq!(
            ExtractionRequest::new("https://example.com", "\n\t").unwrap_err(),
            RequestError::EmptyPrompt
        );
    }
}
