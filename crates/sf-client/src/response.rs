//! HTTP response handling.

use serde::de::DeserializeOwned;

use crate::error::{Error, ErrorKind, Result};
use crate::security::sanitize_error_message;

/// Wrapper around HTTP response with additional functionality.
#[derive(Debug)]
pub struct Response {
    inner: reqwest::Response,
}

impl Response {
    pub(crate) fn new(inner: reqwest::Response) -> Self {
        Self { inner }
    }

    /// Get the HTTP status code.
    pub fn status(&self) -> u16 {
        self.inner.status().as_u16()
    }

    /// Returns true if the response status is successful (2xx).
    pub fn is_success(&self) -> bool {
        let status = self.status();
        (200..300).contains(&status)
    }

    /// Get the response body as text.
    pub async fn text(self) -> Result<String> {
        self.inner.text().await.map_err(Into::into)
    }

    /// Deserialize the response body as JSON.
    ///
    /// The body is read as text first so a malformed payload surfaces as a
    /// JSON error rather than a transport error.
    pub async fn json<T: DeserializeOwned>(self) -> Result<T> {
        let body = self.text().await?;
        serde_json::from_str(&body).map_err(Into::into)
    }

    /// Turn a non-2xx response into an [`ErrorKind::Http`] error.
    ///
    /// The body is sanitized and truncated before it lands in the message.
    pub async fn error_for_status(self) -> Result<Response> {
        if self.is_success() {
            return Ok(self);
        }

        let status = self.status();
        let body = self.text().await.unwrap_or_default();
        let message = if body.trim().is_empty() {
            "empty response body".to_string()
        } else {
            sanitize_error_message(&body)
        };
        Err(Error::new(ErrorKind::Http { status, message }))
    }
}
