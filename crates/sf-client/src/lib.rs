//! # sf-buildpack-client
//!
//! HTTP transport used by the buildpack connection handshake.
//!
//! This crate provides the HTTP layer underneath the auth crate:
//! - Configurable request and connect timeouts
//! - Request building with bearer auth, query parameters and form bodies
//! - Response handling with sanitized, truncated error bodies
//! - Request/response tracing
//!
//! Requests are attempted exactly once. Retrying a failed handshake is the
//! caller's decision.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    Auth Layer                               │
//! │  (token refresh, identity lookup)                           │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │                    SfHttpClient                             │
//! │  - Single-attempt HTTP with timeouts                        │
//! │  - Request building                                         │
//! │  - Response handling                                        │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Example
//!
//! ```rust,ignore
//! use sf_buildpack_client::{ClientConfig, SfHttpClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), sf_buildpack_client::Error> {
//!     let client = SfHttpClient::new(ClientConfig::default())?;
//!
//!     let response = client
//!         .send(client.get("https://my.salesforce.com/id/00D/005").bearer_auth(token))
//!         .await?;
//!     let identity: serde_json::Value = response.json().await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod request;
mod response;
pub mod security;

pub use client::SfHttpClient;
pub use config::{ClientConfig, ClientConfigBuilder};
pub use error::{Error, ErrorKind, Result};
pub use request::{RequestBody, RequestBuilder, RequestMethod};
pub use response::Response;

/// Default Salesforce API version handed to deploy collaborators.
pub const DEFAULT_API_VERSION: &str = "37.0";

/// User-Agent string for the client
pub const USER_AGENT: &str = concat!("sf-buildpack/", env!("CARGO_PKG_VERSION"));
