//! # sf-buildpack
//!
//! Salesforce connection handshake for deployment buildpacks.
//!
//! Turns a `force://<client_id>:<client_secret>:<refresh_token>@<host>`
//! connection string into an authenticated [`ConnectionHandle`] that deploy,
//! push and retrieve tooling can use.
//!
//! ## Security
//!
//! - Sensitive data (tokens, secrets) are redacted in Debug output
//! - Tracing/logging skips credential parameters
//! - Error messages sanitize any credential data
//!
//! ## Crates
//!
//! - **sf-buildpack-client** - HTTP transport with timeouts and error sanitization
//! - **sf-buildpack-auth** - Connection-string parsing, token refresh, identity lookup
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use sf_buildpack::{ConnectionUrl, Connector, Credentials, DEFAULT_ENV_VAR};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let url = ConnectionUrl::from_env(DEFAULT_ENV_VAR)?;
//!     let connection = Connector::default_connector()?.connect_url(url).await?;
//!
//!     println!("{}", connection.handle.soap_server_url());
//!     Ok(())
//! }
//! ```

pub mod output;

pub use sf_buildpack_auth as auth;
pub use sf_buildpack_client as client;

pub use sf_buildpack_auth::{
    AuthSession, Connection, ConnectionHandle, ConnectionUrl, Connector, Credentials, Identity,
    IdentityPolicy, DEFAULT_ENV_VAR,
};
pub use sf_buildpack_client::{ClientConfig, SfHttpClient, DEFAULT_API_VERSION};
