//! The connection handshake: parse, refresh, identity, build.
//!
//! Each [`Connector::connect`] call owns its values from start to finish.
//! Nothing is cached between calls, so connecting to several orgs means
//! running several independent flows.

use std::fmt;
use std::sync::Arc;

use sf_buildpack_client::{SfHttpClient, DEFAULT_API_VERSION};
use tracing::{debug, instrument, warn};

use crate::connection_url::ConnectionUrl;
use crate::credentials::ConnectionHandle;
use crate::error::{Error, ErrorKind, Result};
use crate::identity::{Identity, IdentityClient};
use crate::oauth::OAuthClient;

/// Where a handshake currently is.
///
/// The flow is strictly linear and single-attempt. Any step may move it
/// straight to `Failed`, which is terminal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlowState {
    Unparsed,
    Parsed,
    Authenticating,
    Authenticated,
    IdentityResolved,
    Ready,
    Failed(String),
}

impl FlowState {
    /// True for `Ready` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        matches!(self, FlowState::Ready | FlowState::Failed(_))
    }
}

impl fmt::Display for FlowState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FlowState::Unparsed => f.write_str("unparsed"),
            FlowState::Parsed => f.write_str("parsed"),
            FlowState::Authenticating => f.write_str("authenticating"),
            FlowState::Authenticated => f.write_str("authenticated"),
            FlowState::IdentityResolved => f.write_str("identity resolved"),
            FlowState::Ready => f.write_str("ready"),
            FlowState::Failed(reason) => write!(f, "failed: {reason}"),
        }
    }
}

/// What to do when the identity lookup fails.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum IdentityPolicy {
    /// Abort the handshake.
    #[default]
    Required,
    /// Log a warning and continue without identity.
    BestEffort,
}

/// Result of a successful handshake.
#[derive(Debug, Clone)]
pub struct Connection {
    /// Handle for deploy, push and retrieve collaborators.
    pub handle: ConnectionHandle,
    /// Org and user, absent only under [`IdentityPolicy::BestEffort`].
    pub identity: Option<Identity>,
}

/// Callback invoked on every state change of a handshake.
pub type ProgressFn = Arc<dyn Fn(&FlowState) + Send + Sync>;

/// Runs the handshake against one org per call.
///
/// # Example
///
/// ```rust,ignore
/// use sf_buildpack_auth::{Connector, ConnectionUrl, DEFAULT_ENV_VAR};
///
/// let connector = Connector::default_connector()?;
/// let connection = connector.connect_url(ConnectionUrl::from_env(DEFAULT_ENV_VAR)?).await?;
/// println!("{}", connection.handle.soap_server_url());
/// ```
#[derive(Clone)]
pub struct Connector {
    oauth: OAuthClient,
    identity: IdentityClient,
    api_version: String,
    identity_policy: IdentityPolicy,
    progress: Option<ProgressFn>,
}

impl fmt::Debug for Connector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Connector")
            .field("oauth", &self.oauth)
            .field("identity", &self.identity)
            .field("api_version", &self.api_version)
            .field("identity_policy", &self.identity_policy)
            .field("progress", &self.progress.as_ref().map(|_| "Fn(&FlowState)"))
            .finish()
    }
}

impl Connector {
    /// Create a connector over the given HTTP client.
    pub fn new(http: SfHttpClient) -> Self {
        Self {
            oauth: OAuthClient::new(http.clone()),
            identity: IdentityClient::new(http),
            api_version: DEFAULT_API_VERSION.to_string(),
            identity_policy: IdentityPolicy::default(),
            progress: None,
        }
    }

    /// Create a connector with a default HTTP client.
    pub fn default_connector() -> Result<Self> {
        let http = SfHttpClient::default_client()
            .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;
        Ok(Self::new(http))
    }

    /// Set the API version put on the handle.
    pub fn with_api_version(mut self, version: impl Into<String>) -> Self {
        self.api_version = version.into();
        self
    }

    /// Set the identity failure policy.
    pub fn with_identity_policy(mut self, policy: IdentityPolicy) -> Self {
        self.identity_policy = policy;
        self
    }

    /// Report every state change to `progress`, after it is logged.
    pub fn with_progress<F>(mut self, progress: F) -> Self
    where
        F: Fn(&FlowState) + Send + Sync + 'static,
    {
        self.progress = Some(Arc::new(progress));
        self
    }

    /// Get the API version put on the handle.
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Get the identity failure policy.
    pub fn identity_policy(&self) -> IdentityPolicy {
        self.identity_policy
    }

    /// Parse a raw connection string and run the handshake.
    pub async fn connect(&self, raw: &str) -> Result<Connection> {
        let mut state = FlowState::Unparsed;
        debug!(%state, "Connection flow started");

        let connection = match ConnectionUrl::parse(raw) {
            Ok(connection) => connection,
            Err(e) => return Err(self.fail(&mut state, e)),
        };

        self.run(connection, state).await
    }

    /// Run the handshake for an already parsed connection string.
    pub async fn connect_url(&self, connection: ConnectionUrl) -> Result<Connection> {
        self.run(connection, FlowState::Unparsed).await
    }

    #[instrument(skip_all, fields(host = %connection.instance_host()))]
    async fn run(&self, connection: ConnectionUrl, mut state: FlowState) -> Result<Connection> {
        self.advance(&mut state, FlowState::Parsed);

        self.advance(&mut state, FlowState::Authenticating);
        let session = match self.oauth.refresh(&connection).await {
            Ok(session) => session,
            Err(e) => return Err(self.fail(&mut state, e)),
        };
        self.advance(&mut state, FlowState::Authenticated);

        let identity = match self.identity.fetch(&session).await {
            Ok(identity) => {
                self.advance(&mut state, FlowState::IdentityResolved);
                Some(identity)
            }
            Err(e) => match self.identity_policy {
                IdentityPolicy::Required => return Err(self.fail(&mut state, e)),
                IdentityPolicy::BestEffort => {
                    warn!(error = %e, "Identity lookup failed, continuing without identity");
                    None
                }
            },
        };

        let handle = ConnectionHandle::from_session(&connection, &session, &self.api_version);
        self.advance(&mut state, FlowState::Ready);

        Ok(Connection { handle, identity })
    }

    fn advance(&self, state: &mut FlowState, next: FlowState) {
        debug!(from = %state, to = %next, "Connection flow transition");
        *state = next;
        if let Some(progress) = &self.progress {
            progress(state);
        }
    }

    fn fail(&self, state: &mut FlowState, err: Error) -> Error {
        self.advance(state, FlowState::Failed(err.step().to_string()));
        err
    }
}
