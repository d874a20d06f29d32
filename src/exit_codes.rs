//! Process exit codes, so scripts can tell failures apart.

use crate::error::CliError;
use reqwest::StatusCode;

/// Success - command completed successfully.
pub const SUCCESS: i32 = 0;

/// Generic failure that fits no other code.
pub const FAILURE: i32 = 1;

/// Usage error - invalid arguments, form fields or dates.
pub const USAGE: i32 = 2;

/// Not found - the requested service does not exist.
pub const NOT_FOUND: i32 = 3;

/// Network error - the API could not be reached or timed out.
pub const NETWORK: i32 = 4;

/// Server error - the API answered with a 5xx status.
pub const SERVER: i32 = 5;

/// Config error - the config file could not be read or written.
pub const CONFIG: i32 = 6;

/// Internal error - unexpected error occurred.
pub const INTERNAL: i32 = 7;

/// Map an error to its exit code.
pub fn from_error(err: &anyhow::Error) -> i32 {
    if let Some(cli_err) = err.downcast_ref::<CliError>() {
        return from_cli_error(cli_err);
    }

    let msg = err.to_string().to_lowercase();
    if msg.contains("not found") {
        NOT_FOUND
    } else if msg.contains("timeout") || msg.contains("connection") || msg.contains("network") {
        NETWORK
    } else {
        INTERNAL
    }
}

fn from_cli_error(err: &CliError) -> i32 {
    match err {
        CliError::ServiceNotFound(_) => NOT_FOUND,
        CliError::Network(_) => NETWORK,
        CliError::Validation(_) | CliError::InvalidDate(_) => USAGE,
        CliError::Http { status, .. } if *status == StatusCode::NOT_FOUND => NOT_FOUND,
        CliError::Http { status, .. } if status.is_server_error() => SERVER,
        CliError::Http { .. } => FAILURE,
        CliError::ConfigRead(_)
        | CliError::ConfigWrite(_)
        | CliError::ConfigParse(_)
        | CliError::ConfigSerialize(_) => CONFIG,
        CliError::Json(_) => INTERNAL,
        CliError::Other(msg) => {
            let msg = msg.to_lowercase();
            if msg.contains("unknown") || msg.contains("invalid") || msg.contains("must") {
                USAGE
            } else {
                FAILURE
            }
        }
    }
}
