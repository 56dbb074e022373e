//! Error types for sf-buildpack-auth.
//!
//! Error messages are designed to avoid exposing sensitive credential data.

/// Result type alias for sf-buildpack-auth operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for sf-buildpack-auth operations.
///
/// Error messages are sanitized to prevent accidental credential exposure.
#[derive(Debug, thiserror::Error)]
#[error("{kind}")]
pub struct Error {
    /// The kind of error that occurred.
    pub kind: ErrorKind,
    /// Optional source error.
    #[source]
    pub source: Option<Box<dyn std::error::Error + Send + Sync>>,
}

impl Error {
    /// Create a new error with the given kind.
    pub fn new(kind: ErrorKind) -> Self {
        Self { kind, source: None }
    }

    /// Create a new error with the given kind and source.
    pub fn with_source(
        kind: ErrorKind,
        source: impl std::error::Error + Send + Sync + 'static,
    ) -> Self {
        Self {
            kind,
            source: Some(Box::new(source)),
        }
    }

    /// The HTTP status involved in the failure, if a server answered.
    pub fn status(&self) -> Option<u16> {
        match &self.kind {
            ErrorKind::AuthRefreshFailed { status, .. }
            | ErrorKind::IdentityLookupFailed { status, .. } => *status,
            _ => None,
        }
    }

    /// Short name of the handshake step that failed.
    pub fn step(&self) -> &'static str {
        match &self.kind {
            ErrorKind::InvalidCredentialFormat(_) => "parse",
            ErrorKind::ConfigurationMissing(_) | ErrorKind::Config(_) => "configure",
            ErrorKind::AuthRefreshFailed { .. } => "refresh",
            ErrorKind::IdentityLookupFailed { .. } => "identity",
        }
    }

    pub(crate) fn invalid_format(reason: impl Into<String>) -> Self {
        Self::new(ErrorKind::InvalidCredentialFormat(reason.into()))
    }

    pub(crate) fn refresh_failed(
        host: impl Into<String>,
        status: Option<u16>,
        message: impl Into<String>,
    ) -> Self {
        Self::new(ErrorKind::AuthRefreshFailed {
            host: host.into(),
            status,
            message: message.into(),
        })
    }
}

/// The kind of error that occurred.
///
/// Error messages avoid including credential values.
#[derive(Debug, thiserror::Error)]
pub enum ErrorKind {
    /// The connection string does not have the expected shape.
    #[error("Invalid credential format: {0}")]
    InvalidCredentialFormat(String),

    /// The refresh-token exchange failed.
    #[error("Auth refresh failed for {host}{}: {message}", fmt_status(.status))]
    AuthRefreshFailed {
        host: String,
        status: Option<u16>,
        message: String,
    },

    /// The identity lookup failed.
    #[error("Identity lookup failed for {url}{}: {message}", fmt_status(.status))]
    IdentityLookupFailed {
        url: String,
        status: Option<u16>,
        message: String,
    },

    /// A required input is absent, e.g. an unset environment variable.
    #[error("Configuration missing: {0}")]
    ConfigurationMissing(String),

    /// The HTTP client could not be configured.
    #[error("Configuration error: {0}")]
    Config(String),
}

fn fmt_status(status: &Option<u16>) -> String {
    status
        .map(|s| format!(" (HTTP {s})"))
        .unwrap_or_default()
}
