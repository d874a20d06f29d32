use anyhow::Result;
use clap::Parser;
use std::process::ExitCode;
use std::str::FromStr;
use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};
use uptimex_cli::cli::{Cli, Commands};
use uptimex_cli::config::{self, DisplayTz};
use uptimex_cli::output::{OutputConfig, print_error, print_info};
use uptimex_cli::{commands, exit_codes};

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let ctx = match build_context(&cli) {
        Ok(ctx) => ctx,
        Err(e) => {
            print_error(&e.to_string(), &OutputConfig::default());
            return exit_code(exit_codes::from_error(&e));
        }
    };

    match execute_command(cli, &ctx).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(error = ?e, "command failed");
            print_error(&e.to_string(), &OutputConfig::from_context(&ctx));
            exit_code(exit_codes::from_error(&e))
        }
    }
}

fn exit_code(code: i32) -> ExitCode {
    ExitCode::from(u8::try_from(code).unwrap_or(1))
}

/// Logs go to stderr. `-v` turns on debug output for this crate; RUST_LOG wins.
fn init_tracing(verbose: bool) {
    let default = if verbose { "warn,uptimex_cli=debug" } else { "warn" };
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().with_writer(std::io::stderr).with_target(false))
        .init();
}

/// Load config with CLI overrides
fn build_context(cli: &Cli) -> Result<config::Context> {
    let mut ctx = config::Context::load()?;
    if let Some(url) = cli.api_url.clone() {
        ctx.override_api_url(url);
    }
    if let Some(format) = cli.format {
        ctx.set_format(format);
    }
    if let Some(tz) = cli.tz.as_deref() {
        ctx.set_timezone(DisplayTz::from_str(tz)?);
    }
    ctx.set_no_color(cli.no_color);
    ctx.set_plain(cli.plain);
    Ok(ctx)
}

async fn execute_command(cli: Cli, ctx: &config::Context) -> Result<()> {
    match cli.command {
        Some(Commands::Services(command)) => commands::services::handle(ctx, command).await,
        Some(Commands::Report(args)) => commands::report::handle(ctx, args).await,
        Some(Commands::Config(command)) => commands::config::handle(ctx, command),
        Some(Commands::Completion { shell }) => commands::completion::generate_completions(shell),
        None => {
            let config = OutputConfig::from_context(ctx);
            println!("Welcome to UptimeX");
            print_info("Run `uptimex --help` to see available commands", &config);
            Ok(())
        }
    }
}
