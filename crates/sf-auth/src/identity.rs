//! Identity lookup for the authenticated user.

use serde::Deserialize;
use sf_buildpack_client::{ErrorKind as ClientErrorKind, SfHttpClient};
use tracing::{info, instrument};

use crate::error::{Error, ErrorKind, Result};
use crate::oauth::AuthSession;

/// Org and user behind an access token.
///
/// Descriptive only; nothing downstream depends on it beyond diagnostics.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Identity {
    /// Org id (`00D...`).
    pub organization_id: String,
    /// User id (`005...`).
    pub user_id: String,
    /// Username, usually an email address.
    pub username: String,
}

/// Client for the identity endpoint returned by the token exchange.
#[derive(Debug, Clone)]
pub struct IdentityClient {
    http: SfHttpClient,
}

impl IdentityClient {
    /// Create a new identity client over the given HTTP client.
    pub fn new(http: SfHttpClient) -> Self {
        Self { http }
    }

    /// Fetch the identity for a session.
    #[instrument(skip(self, session), fields(url = %session.identity_url()))]
    pub async fn fetch(&self, session: &AuthSession) -> Result<Identity> {
        let url = session.identity_url();
        info!("Getting Salesforce identity");

        let request = self
            .http
            .get(url)
            .bearer_auth(session.access_token())
            .accept_json();

        let response = self.http.send(request).await.map_err(|e| {
            let status = e.status();
            let message = match &e.kind {
                ClientErrorKind::Http { message, .. } => message.clone(),
                _ => e.to_string(),
            };
            Error::with_source(
                ErrorKind::IdentityLookupFailed {
                    url: url.to_string(),
                    status,
                    message,
                },
                e,
            )
        })?;

        let status = response.status();
        let identity: Identity = response.json().await.map_err(|e| {
            let message = format!("unexpected identity response: {e}");
            Error::with_source(
                ErrorKind::IdentityLookupFailed {
                    url: url.to_string(),
                    status: Some(status),
                    message,
                },
                e,
            )
        })?;

        info!(
            organization_id = %identity.organization_id,
            user_id = %identity.user_id,
            username = %identity.username,
            "Salesforce identity resolved"
        );

        Ok(identity)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sf_buildpack_client::ClientConfig;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn identity_client() -> IdentityClient {
        let config = ClientConfig::builder().with_tracing(false).build();
        IdentityClient::new(SfHttpClient::new(config).unwrap())
    }

    #[tokio::test]
    async fn test_fetch_identity() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/id/00D1/0051"))
            .and(header("Authorization", "Bearer T"))
            .and(header("Accept", "application/json"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organization_id": "00D1",
                "user_id": "0051",
                "username": "a@b.com",
                "display_name": "Admin User",
                "active": true
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let session = AuthSession::new("T", format!("{}/id/00D1/0051", mock_server.uri()));
        let identity = identity_client().fetch(&session).await.unwrap();

        assert_eq!(
            identity,
            Identity {
                organization_id: "00D1".to_string(),
                user_id: "0051".to_string(),
                username: "a@b.com".to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_fetch_identity_error_status() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/id/00D1/0051"))
            .respond_with(ResponseTemplate::new(403).set_body_string("Bad_OAuth_Token"))
            .mount(&mock_server)
            .await;

        let url = format!("{}/id/00D1/0051", mock_server.uri());
        let session = AuthSession::new("T", url.clone());
        let err = identity_client().fetch(&session).await.unwrap_err();

        assert!(matches!(err.kind, ErrorKind::IdentityLookupFailed { .. }));
        assert_eq!(err.status(), Some(403));
        let msg = err.to_string();
        assert!(msg.contains(&url));
        assert!(msg.contains("403"));
        assert!(msg.contains("Bad_OAuth_Token"));
    }

    #[tokio::test]
    async fn test_fetch_identity_empty_error_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/id/00D1/0051"))
            .respond_with(ResponseTemplate::new(401))
            .expect(1)
            .mount(&mock_server)
            .await;

        let session = AuthSession::new("T", format!("{}/id/00D1/0051", mock_server.uri()));
        let err = identity_client().fetch(&session).await.unwrap_err();

        assert_eq!(err.status(), Some(401));
        assert!(err.to_string().ends_with("(HTTP 401): empty response body"));
    }

    #[tokio::test]
    async fn test_fetch_identity_missing_fields() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/id/00D1/0051"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "organization_id": "00D1"
            })))
            .mount(&mock_server)
            .await;

        let session = AuthSession::new("T", format!("{}/id/00D1/0051", mock_server.uri()));
        let err = identity_client().fetch(&session).await.unwrap_err();

        assert!(matches!(err.kind, ErrorKind::IdentityLookupFailed { .. }));
        assert_eq!(err.status(), Some(200));
        assert!(err.to_string().contains("unexpected identity response"));
    }
}
