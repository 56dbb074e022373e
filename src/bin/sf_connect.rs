//! Establish a Salesforce connection from a buildpack environment.
//!
//! Reads the connection string from `SALESFORCE_URL`, refreshes the access
//! token and reports who the token belongs to.
//!
//! ```sh
//! export SALESFORCE_URL='force://<client_id>:<client_secret>:<refresh_token>@my.salesforce.com'
//! cargo run --bin sf-connect -- --verbose
//! ```

use std::process::ExitCode;
use std::time::Duration;

use clap::builder::FalseyValueParser;
use clap::Parser;
use sf_buildpack::auth::{Error, ErrorKind, FlowState, Result};
use sf_buildpack::output;
use sf_buildpack::{
    ClientConfig, Connection, ConnectionUrl, Connector, Credentials, IdentityPolicy, SfHttpClient,
    DEFAULT_API_VERSION, DEFAULT_ENV_VAR,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(name = "sf-connect", version)]
#[command(about = "Authenticate to Salesforce from a buildpack connection URL", long_about = None)]
struct Cli {
    /// Environment variable holding the connection URL
    #[arg(long, default_value = DEFAULT_ENV_VAR)]
    env_var: String,

    /// Salesforce API version for the connection
    #[arg(long, env = "SALESFORCE_API_VERSION", default_value = DEFAULT_API_VERSION)]
    api_version: String,

    /// HTTP timeout in seconds for each request
    #[arg(long, env = "SALESFORCE_HTTP_TIMEOUT", default_value_t = 30)]
    timeout: u64,

    /// Continue when the identity lookup fails
    #[arg(long)]
    best_effort_identity: bool,

    /// Verbose output
    #[arg(
        short,
        long,
        env = "SALESFORCE_BUILDPACK_VERBOSE",
        value_parser = FalseyValueParser::new()
    )]
    verbose: bool,
}

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    println!("{}", output::action("Force.com connecting"));

    match connect(&cli).await {
        Ok(connection) => {
            report(&connection);
            ExitCode::SUCCESS
        }
        Err(err) => {
            eprintln!("{}", output::failure(&err, cli.verbose));
            ExitCode::FAILURE
        }
    }
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}

async fn connect(cli: &Cli) -> Result<Connection> {
    debug!(
        env_var = %cli.env_var,
        api_version = %cli.api_version,
        timeout_secs = cli.timeout,
        "Reading connection URL"
    );
    let url = ConnectionUrl::from_env(&cli.env_var)?;

    let config = ClientConfig::builder()
        .with_timeout(Duration::from_secs(cli.timeout))
        .build();
    let http = SfHttpClient::new(config)
        .map_err(|e| Error::with_source(ErrorKind::Config(e.to_string()), e))?;

    let policy = if cli.best_effort_identity {
        IdentityPolicy::BestEffort
    } else {
        IdentityPolicy::Required
    };

    Connector::new(http)
        .with_api_version(&cli.api_version)
        .with_identity_policy(policy)
        .with_progress(announce_step)
        .connect_url(url)
        .await
}

fn announce_step(state: &FlowState) {
    match state {
        FlowState::Authenticating => println!("{}", output::action("Refresh Salesforce auth")),
        FlowState::Authenticated => println!("{}", output::action("Get Salesforce identity")),
        _ => {}
    }
}

fn report(connection: &Connection) {
    let handle = &connection.handle;
    println!("{}", output::info(&format!("Instance URL: {}", handle.instance_url())));
    println!("{}", output::info(&format!("API version: {}", handle.api_version())));

    match &connection.identity {
        Some(identity) => {
            println!("{}", output::info(&format!("Org ID: {}", identity.organization_id)));
            println!("{}", output::info(&format!("Admin user ID: {}", identity.user_id)));
            println!("{}", output::info(&format!("Username: {}", identity.username)));
        }
        None => eprintln!("{}", output::error("Identity unavailable")),
    }

    println!("{}", output::action("Force.com connected"));
}
