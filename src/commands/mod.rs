pub mod completion;
pub mod config;
pub mod report;
pub mod services;

use crate::error::CliError;

/// Interactive commands need a terminal on stdin.
pub(crate) fn require_tty(command: &str) -> Result<(), CliError> {
    if atty::is(atty::Stream::Stdin) {
        Ok(())
    } else {
        Err(CliError::Other(format!(
            "'{}' is interactive and needs a terminal",
            command
        )))
    }
}
