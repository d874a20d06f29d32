use crate::cli::Cli;
use anyhow::Result;
use clap::CommandFactory;
use clap_complete::{Shell, generate};
use std::io;

/// Write a completion script for `shell` to stdout.
///
///   uptimex completion bash > ~/.local/share/bash-completion/completions/uptimex
///   uptimex completion zsh > ~/.zfunc/_uptimex
pub fn generate_completions(shell: Shell) -> Result<()> {
    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();

    generate(shell, &mut cmd, name, &mut io::stdout());

    // Hints go to stderr so redirected stdout stays a clean script
    let hint = match shell {
        Shell::Bash => Some("uptimex completion bash > ~/.local/share/bash-completion/completions/uptimex"),
        Shell::Zsh => Some("uptimex completion zsh > ~/.zfunc/_uptimex  (then add ~/.zfunc to fpath)"),
        Shell::Fish => Some("uptimex completion fish > ~/.config/fish/completions/uptimex.fish"),
        Shell::PowerShell => Some("uptimex completion powershell >> $PROFILE"),
        _ => None,
    };
    if let Some(hint) = hint {
        eprintln!();
        eprintln!("# Install with:");
        eprintln!("# {}", hint);
    }

    Ok(())
}
