//! OAuth 2.0 refresh-token exchange.
//!
//! The token endpoint lives on the instance named by the connection string,
//! so sandboxes and custom domains are reached directly rather than through
//! a generic login host.

use serde::Deserialize;
use sf_buildpack_client::security::sanitize_error_message;
use sf_buildpack_client::SfHttpClient;
use tracing::{debug, info, instrument};
use url::Url;

use crate::connection_url::ConnectionUrl;
use crate::error::{Error, ErrorKind, Result};

/// Result of a successful refresh: a short-lived access token plus the
/// identity URL, already pointed at the instance host.
///
/// Never persisted. The access token is redacted in Debug output.
#[derive(Clone)]
pub struct AuthSession {
    access_token: String,
    identity_url: String,
    instance_url: Option<String>,
    token_type: Option<String>,
    issued_at: Option<String>,
}

impl std::fmt::Debug for AuthSession {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuthSession")
            .field("access_token", &"[REDACTED]")
            .field("identity_url", &self.identity_url)
            .field("instance_url", &self.instance_url)
            .field("token_type", &self.token_type)
            .field("issued_at", &self.issued_at)
            .finish()
    }
}

impl AuthSession {
    /// Create a session from an access token and identity URL.
    pub fn new(access_token: impl Into<String>, identity_url: impl Into<String>) -> Self {
        Self {
            access_token: access_token.into(),
            identity_url: identity_url.into(),
            instance_url: None,
            token_type: None,
            issued_at: None,
        }
    }

    /// Get the access token.
    pub fn access_token(&self) -> &str {
        &self.access_token
    }

    /// Get the identity URL.
    pub fn identity_url(&self) -> &str {
        &self.identity_url
    }

    /// Instance URL as reported by the token endpoint, if any.
    ///
    /// Informational only: connections target the host from the connection string.
    pub fn reported_instance_url(&self) -> Option<&str> {
        self.instance_url.as_deref()
    }

    /// Token type, usually `Bearer`.
    pub fn token_type(&self) -> Option<&str> {
        self.token_type.as_deref()
    }

    /// Issue timestamp (milliseconds since the epoch, as a string).
    pub fn issued_at(&self) -> Option<&str> {
        self.issued_at.as_deref()
    }
}

/// OAuth client that exchanges refresh tokens on the instance's token endpoint.
#[derive(Debug, Clone)]
pub struct OAuthClient {
    http: SfHttpClient,
}

impl OAuthClient {
    /// Create a new OAuth client over the given HTTP client.
    pub fn new(http: SfHttpClient) -> Self {
        Self { http }
    }

    /// Refresh an access token using the connection's refresh token.
    ///
    /// Single attempt. Credentials go in the form body, never in the URL,
    /// and are not logged.
    #[instrument(skip(self, connection), fields(host = %connection.instance_host()))]
    pub async fn refresh(&self, connection: &ConnectionUrl) -> Result<AuthSession> {
        let host = connection.instance_host();
        info!(host, "Refreshing Salesforce auth");

        let request = self.http.post(connection.token_url()).accept_json().form([
            ("grant_type", "refresh_token"),
            ("client_id", connection.client_id()),
            ("client_secret", connection.client_secret()),
            ("refresh_token", connection.refresh_token()),
        ]);

        let response = self.http.execute(request).await.map_err(|e| {
            let status = e.status();
            let message = e.to_string();
            Error::with_source(
                ErrorKind::AuthRefreshFailed {
                    host: host.to_string(),
                    status,
                    message,
                },
                e,
            )
        })?;

        let status = response.status();
        let body = response.text().await.map_err(|e| {
            let message = format!("failed to read response body: {e}");
            Error::with_source(
                ErrorKind::AuthRefreshFailed {
                    host: host.to_string(),
                    status: Some(status),
                    message,
                },
                e,
            )
        })?;

        if !(200..300).contains(&status) {
            return Err(Error::refresh_failed(
                host,
                Some(status),
                describe_error_body(&body),
            ));
        }

        let token: TokenResponse = serde_json::from_str(&body).map_err(|e| {
            let message = format!(
                "response is not valid JSON ({e}): {}",
                sanitize_error_message(&body)
            );
            Error::with_source(
                ErrorKind::AuthRefreshFailed {
                    host: host.to_string(),
                    status: Some(status),
                    message,
                },
                e,
            )
        })?;

        let access_token = token
            .access_token
            .filter(|t| !t.is_empty())
            .ok_or_else(|| {
                Error::refresh_failed(host, Some(status), "response is missing \"access_token\"")
            })?;
        let id = token
            .id
            .filter(|id| !id.is_empty())
            .ok_or_else(|| Error::refresh_failed(host, Some(status), "response is missing \"id\""))?;

        let identity_url = rewrite_identity_url(&id, connection)
            .map_err(|message| Error::refresh_failed(host, Some(status), message))?;
        debug!(%identity_url, "Identity URL pointed at instance host");

        Ok(AuthSession {
            access_token,
            identity_url,
            instance_url: token.instance_url,
            token_type: token.token_type,
            issued_at: token.issued_at,
        })
    }
}

/// Point an identity URL at the connection's instance, keeping path and query.
///
/// The token endpoint reports identity URLs on the generic login host even
/// for sandboxes and custom domains, where that host does not answer for the org.
pub fn rewrite_identity_url(
    identity_url: &str,
    connection: &ConnectionUrl,
) -> std::result::Result<String, String> {
    let mut url =
        Url::parse(identity_url).map_err(|e| format!("\"id\" is not an absolute URL: {e}"))?;
    let origin = Url::parse(&connection.instance_url())
        .map_err(|e| format!("instance URL is not valid: {e}"))?;

    url.set_scheme(origin.scheme())
        .map_err(|()| format!("cannot use scheme {} for the identity URL", origin.scheme()))?;
    url.set_host(origin.host_str())
        .map_err(|e| format!("cannot use the instance host for the identity URL: {e}"))?;
    url.set_port(origin.port())
        .map_err(|()| "cannot use the instance port for the identity URL".to_string())?;

    Ok(url.to_string())
}

/// Render a non-2xx token response body for an error message.
fn describe_error_body(body: &str) -> String {
    if body.trim().is_empty() {
        return "empty response body".to_string();
    }

    match serde_json::from_str::<OAuthErrorResponse>(body) {
        Ok(err) => {
            let mut message = match err.error_description {
                Some(description) => format!("{} - {}", err.error, description),
                None => err.error,
            };
            if message.starts_with("invalid_grant") {
                message.push_str(
                    " (the refresh token is expired or revoked; regenerate the connection URL)",
                );
            }
            sanitize_error_message(&message)
        }
        Err(_) => sanitize_error_message(body),
    }
}

/// Token response from the refresh grant.
#[derive(Deserialize)]
struct TokenResponse {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    id: Option<String>,
    #[serde(default)]
    instance_url: Option<String>,
    #[serde(default)]
    token_type: Option<String>,
    #[serde(default)]
    issued_at: Option<String>,
}

/// OAuth error response.
#[derive(Debug, Deserialize)]
struct OAuthErrorResponse {
    error: String,
    #[serde(default)]
    error_description: Option<String>,
}
