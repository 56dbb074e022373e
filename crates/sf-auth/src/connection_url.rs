//! Connection string parsing.
//!
//! The connection string packs a connected app's credentials, a refresh
//! token and the target instance host into one value:
//!
//! ```text
//! force://<client_id>:<client_secret>:<refresh_token>@<host>[:port]
//! ```
//!
//! The separators are not escaped, so a field containing `:` or `@` cannot be
//! represented. Rather than guessing where such a field ends, parsing fails
//! with [`ErrorKind::InvalidCredentialFormat`](crate::ErrorKind::InvalidCredentialFormat).

use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ErrorKind, Result};

/// Environment variable the hosting platform sets with the connection string.
pub const DEFAULT_ENV_VAR: &str = "SALESFORCE_URL";

const DEFAULT_SCHEME: &str = "force";
const DEFAULT_INSTANCE_SCHEME: &str = "https";

/// A parsed connection string.
///
/// Immutable once parsed. All four credential fields are non-empty.
/// The client secret and refresh token are redacted in Debug and Display output.
#[derive(Clone, PartialEq, Eq)]
pub struct ConnectionUrl {
    scheme: String,
    client_id: String,
    client_secret: String,
    refresh_token: String,
    instance_host: String,
    instance_scheme: String,
}

impl fmt::Debug for ConnectionUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConnectionUrl")
            .field("client_id", &self.client_id)
            .field("client_secret", &"[REDACTED]")
            .field("refresh_token", &"[REDACTED]")
            .field("instance_host", &self.instance_host)
            .field("instance_scheme", &self.instance_scheme)
            .finish()
    }
}

impl fmt::Display for ConnectionUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}://{}:[REDACTED]:[REDACTED]@{}",
            self.scheme,
            self.client_id,
            self.host_segment()
        )
    }
}

impl ConnectionUrl {
    /// Build a connection from its parts, applying the same validation as parsing.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        refresh_token: impl Into<String>,
        instance_host: impl Into<String>,
    ) -> Result<Self> {
        let client_id = client_id.into();
        let client_secret = client_secret.into();
        let refresh_token = refresh_token.into();
        validate_field("client id", &client_id)?;
        validate_field("client secret", &client_secret)?;
        validate_field("refresh token", &refresh_token)?;

        let (instance_scheme, instance_host) = parse_host_segment(&instance_host.into())?;

        Ok(Self {
            scheme: DEFAULT_SCHEME.to_string(),
            client_id,
            client_secret,
            refresh_token,
            instance_host,
            instance_scheme,
        })
    }

    /// Parse a connection string.
    ///
    /// Surrounding whitespace is ignored. An empty string is a configuration
    /// problem rather than a malformed value and yields
    /// [`ErrorKind::ConfigurationMissing`].
    pub fn parse(raw: &str) -> Result<Self> {
        let raw = raw.trim();
        if raw.is_empty() {
            return Err(Error::new(ErrorKind::ConfigurationMissing(
                "connection URL is empty".to_string(),
            )));
        }

        let (scheme, rest) = raw
            .split_once("://")
            .ok_or_else(|| Error::invalid_format("missing '<scheme>://' prefix"))?;
        if !is_valid_scheme(scheme) {
            return Err(Error::invalid_format("scheme is empty or malformed"));
        }

        let (credentials, host_segment) = match rest.matches('@').count() {
            0 => return Err(Error::invalid_format("missing '@' before the instance host")),
            1 => rest
                .split_once('@')
                .ok_or_else(|| Error::invalid_format("missing '@' before the instance host"))?,
            _ => {
                return Err(Error::invalid_format(
                    "more than one '@'; fields may not contain '@'",
                ))
            }
        };

        let fields: Vec<&str> = credentials.split(':').collect();
        let [client_id, client_secret, refresh_token] = fields.as_slice() else {
            return Err(Error::invalid_format(format!(
                "expected <client_id>:<client_secret>:<refresh_token>, found {} ':'-separated fields; \
                 fields may not contain ':'",
                fields.len()
            )));
        };

        let mut url = Self::new(*client_id, *client_secret, *refresh_token, host_segment)?;
        url.scheme = scheme.to_string();
        Ok(url)
    }

    /// Read and parse the connection string from an environment variable.
    ///
    /// An unset or empty variable yields [`ErrorKind::ConfigurationMissing`].
    pub fn from_env(name: &str) -> Result<Self> {
        match std::env::var(name) {
            Ok(value) if !value.trim().is_empty() => Self::parse(&value),
            _ => Err(Error::new(ErrorKind::ConfigurationMissing(format!(
                "environment variable \"{name}\" is required"
            )))),
        }
    }

    /// Get the OAuth client id (connected app consumer key).
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Get the OAuth client secret.
    pub fn client_secret(&self) -> &str {
        &self.client_secret
    }

    /// Get the refresh token.
    pub fn refresh_token(&self) -> &str {
        &self.refresh_token
    }

    /// Get the instance host, including the port when one was given.
    pub fn instance_host(&self) -> &str {
        &self.instance_host
    }

    /// Get the scheme used to reach the instance (`https` unless overridden).
    pub fn instance_scheme(&self) -> &str {
        &self.instance_scheme
    }

    /// Get the instance URL, e.g. `https://my.salesforce.com`.
    pub fn instance_url(&self) -> String {
        format!("{}://{}", self.instance_scheme, self.instance_host)
    }

    /// Get the OAuth token endpoint on the instance.
    pub fn token_url(&self) -> String {
        format!("{}/services/oauth2/token", self.instance_url())
    }

    /// Compose the connection string back, secrets included.
    pub fn to_connection_string(&self) -> String {
        format!(
            "{}://{}:{}:{}@{}",
            self.scheme,
            self.client_id,
            self.client_secret,
            self.refresh_token,
            self.host_segment()
        )
    }

    fn host_segment(&self) -> String {
        if self.instance_scheme == DEFAULT_INSTANCE_SCHEME {
            self.instance_host.clone()
        } else {
            self.instance_url()
        }
    }
}

impl FromStr for ConnectionUrl {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

fn is_valid_scheme(scheme: &str) -> bool {
    let mut chars = scheme.chars();
    matches!(chars.next(), Some(c) if c.is_ascii_alphabetic())
        && chars.all(|c| c.is_ascii_alphanumeric() || matches!(c, '+' | '-' | '.'))
}

fn validate_field(name: &str, value: &str) -> Result<()> {
    if value.is_empty() {
        return Err(Error::invalid_format(format!("{name} is empty")));
    }
    if value
        .chars()
        .any(|c| c.is_whitespace() || c.is_control() || c == ':' || c == '@')
    {
        return Err(Error::invalid_format(format!(
            "{name} contains whitespace, control characters, ':' or '@'"
        )));
    }
    Ok(())
}

/// Split the part after `@` into (instance scheme, host[:port]).
///
/// The segment may carry an explicit `http://` or `https://` origin.
fn parse_host_segment(segment: &str) -> Result<(String, String)> {
    let (scheme, host) = if let Some(host) = segment.strip_prefix("https://") {
        ("https", host)
    } else if let Some(host) = segment.strip_prefix("http://") {
        ("http", host)
    } else {
        (DEFAULT_INSTANCE_SCHEME, segment)
    };
    let host = host.strip_suffix('/').unwrap_or(host);

    if host.is_empty() {
        return Err(Error::invalid_format("instance host is empty"));
    }
    if host.chars().any(|c| c.is_whitespace() || c.is_control()) {
        return Err(Error::invalid_format(
            "instance host contains whitespace or control characters",
        ));
    }
    if host.chars().any(|c| matches!(c, '/' | '?' | '#' | '@')) {
        return Err(Error::invalid_format(
            "instance host must be a bare host[:port] without a path",
        ));
    }

    let parsed = url::Url::parse(&format!("{scheme}://{host}/")).map_err(|e| {
        Error::with_source(
            ErrorKind::InvalidCredentialFormat(format!("instance host is not valid: {e}")),
            e,
        )
    })?;
    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(Error::invalid_format("instance host is empty"));
    }

    Ok((scheme.to_string(), host.to_string()))
}
