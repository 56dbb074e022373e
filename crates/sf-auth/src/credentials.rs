//! Credentials trait and the connection handle handed to deploy tooling.
//!
//! All credential types implement custom Debug to redact sensitive data.

use crate::connection_url::ConnectionUrl;
use crate::oauth::AuthSession;

/// What external deploy, push and retrieve collaborators need to reach an org.
///
/// This is the whole hand-off surface: an instance URL, a bearer token and an
/// API version. Collaborators re-authenticate on their own if the token expires.
pub trait Credentials: Send + Sync {
    /// Get the Salesforce instance URL.
    fn instance_url(&self) -> &str;

    /// Get the access token.
    fn access_token(&self) -> &str;

    /// Get the API version (e.g., "37.0").
    fn api_version(&self) -> &str;

    /// Returns true if the credentials appear to be valid (non-empty).
    fn is_valid(&self) -> bool {
        !self.instance_url().is_empty()
            && !self.access_token().is_empty()
            && !self.api_version().is_empty()
    }
}

/// Authenticated connection to one org, valid for one command invocation.
///
/// The access token is redacted in Debug output.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionHandle {
    instance_url: String,
    access_token: String,
    api_version: String,
}

impl std::fmt::Debug for ConnectionHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionHandle")
            .field("instance_url", &self.instance_url)
            .field("access_token", &"[REDACTED]")
            .field("api_version", &self.api_version)
            .finish()
    }
}

impl ConnectionHandle {
    /// Create a handle with the given values.
    pub fn new(
        instance_url: impl Into<String>,
        access_token: impl Into<String>,
        api_version: impl Into<String>,
    ) -> Self {
        Self {
            instance_url: instance_url.into(),
            access_token: access_token.into(),
            api_version: api_version.into(),
        }
    }

    /// Assemble the handle from a parsed connection string and a refreshed session.
    ///
    /// The instance URL always comes from the connection string's host.
    pub fn from_session(
        connection: &ConnectionUrl,
        session: &AuthSession,
        api_version: impl Into<String>,
    ) -> Self {
        Self::new(
            connection.instance_url(),
            session.access_token(),
            api_version,
        )
    }

    /// Change the API version.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Get the SOAP partner endpoint used as the server URL by deploy tooling.
    pub fn soap_server_url(&self) -> String {
        format!(
            "{}/services/Soap/u/{}",
            self.instance_url.trim_end_matches('/'),
            self.api_version
        )
    }

    /// Get the Metadata API URL for this org.
    pub fn metadata_api_url(&self) -> String {
        format!(
            "{}/services/Soap/m/{}",
            self.instance_url.trim_end_matches('/'),
            self.api_version
        )
    }

    /// Get the base REST API URL for this org.
    pub fn rest_api_url(&self) -> String {
        format!(
            "{}/services/data/v{}",
            self.instance_url.trim_end_matches('/'),
            self.api_version
        )
    }
}

impl Credentials for ConnectionHandle {
    fn instance_url(&self) -> &str {
        &self.instance_url
    }

    fn access_token(&self) -> &str {
        &self.access_token
    }

    fn api_version(&self) -> &str {
        &self.api_version
    }
}
