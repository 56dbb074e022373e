//! Buildpack-style progress lines.
//!
//! Buildpack build logs use a fixed prefix per line kind so output lines up
//! with the platform's own messages.

use std::error::Error as StdError;

/// Prefix for a step the buildpack is taking.
pub const ACTION_PREFIX: &str = "-----> ";

/// Indent for details under an action.
pub const INFO_PREFIX: &str = "       ";

/// Prefix for errors and warnings.
pub const ERROR_PREFIX: &str = " !     ";

/// Format a step line.
pub fn action(message: &str) -> String {
    prefix_lines(ACTION_PREFIX, INFO_PREFIX, message)
}

/// Format a detail line under the current step.
pub fn info(message: &str) -> String {
    prefix_lines(INFO_PREFIX, INFO_PREFIX, message)
}

/// Format an error or warning line.
pub fn error(message: &str) -> String {
    prefix_lines(ERROR_PREFIX, ERROR_PREFIX, message)
}

/// Render an auth failure for stderr.
///
/// The first line names the failed step. With `verbose`, every source in the
/// chain follows on its own line.
pub fn failure(err: &sf_buildpack_auth::Error, verbose: bool) -> String {
    let mut message = format!("Connection failed during {} step: {err}", err.step());

    if verbose {
        let mut source = err.source();
        while let Some(cause) = source {
            message.push_str(&format!("\ncaused by: {cause}"));
            source = cause.source();
        }
    }

    error(&message)
}

// Continuation lines get `rest` so multi-line messages stay aligned.
fn prefix_lines(first: &str, rest: &str, message: &str) -> String {
    message
        .lines()
        .enumerate()
        .map(|(i, line)| {
            let prefix = if i == 0 { first } else { rest };
            format!("{prefix}{line}")
        })
        .collect::<Vec<_>>()
        .join("\n")
}
