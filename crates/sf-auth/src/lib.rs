//! # sf-buildpack-auth
//!
//! Connection-string parsing and the OAuth refresh handshake for Salesforce
//! buildpacks.
//!
//! ## Security
//!
//! - Sensitive data (tokens, secrets) are redacted in Debug output
//! - Tracing/logging skips credential parameters
//! - Error messages sanitize any credential data
//! - Refresh credentials travel in the request body, never the URL
//!
//! ## Flow
//!
//! ```text
//! SALESFORCE_URL ─► ConnectionUrl ─► OAuthClient::refresh ─► AuthSession
//!                                                               │
//!                      ConnectionHandle ◄── IdentityClient::fetch
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use sf_buildpack_auth::{Connector, ConnectionUrl, Credentials, DEFAULT_ENV_VAR};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sf_buildpack_auth::Error> {
//!     let url = ConnectionUrl::from_env(DEFAULT_ENV_VAR)?;
//!     let connection = Connector::default_connector()?.connect_url(url).await?;
//!
//!     println!("{}", connection.handle.instance_url());
//!     Ok(())
//! }
//! ```

mod connection_url;
mod credentials;
mod error;
mod flow;
mod identity;
mod oauth;

pub use connection_url::{ConnectionUrl, DEFAULT_ENV_VAR};
pub use credentials::{ConnectionHandle, Credentials};
pub use error::{Error, ErrorKind, Result};
pub use flow::{Connection, Connector, FlowState, IdentityPolicy, ProgressFn};
pub use identity::{Identity, IdentityClient};
pub use oauth::{rewrite_identity_url, AuthSession, OAuthClient};
