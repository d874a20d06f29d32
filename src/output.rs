use crate::cli::OutputFormat;
use crate::config::{Context, DisplayTz};
use chrono::{DateTime, Local, NaiveDateTime, Utc};
use console::style;
use serde::Serialize;
use tabled::{Table, Tabled};

/// Configuration for output formatting.
#[derive(Debug, Clone, Default)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub tz: DisplayTz,
    pub no_color: bool,
    pub plain: bool,
}

impl OutputConfig {
    /// Create from context settings.
    pub fn from_context(ctx: &Context) -> Self {
        Self {
            format: ctx.output_format(),
            tz: ctx.timezone(),
            no_color: ctx.no_color(),
            plain: ctx.plain(),
        }
    }
}

/// Print data as a table
pub fn print_table<T: Tabled>(data: Vec<T>) {
    if data.is_empty() {
        println!("{}", style("No data to display.").dim());
        return;
    }
    let table = Table::new(data).to_string();
    println!("{}", table);
}

/// Print data as JSON
pub fn print_json<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    let json = serde_json::to_string_pretty(data)?;
    println!("{}", json);
    Ok(())
}

/// Print data as YAML
pub fn print_yaml<T: Serialize + ?Sized>(data: &T) -> anyhow::Result<()> {
    let yaml = serde_yaml::to_string(data)?;
    print!("{}", yaml);
    Ok(())
}

/// Print rows in table mode, the raw records otherwise.
pub fn print_output<T: Tabled, R: Serialize + ?Sized>(
    config: &OutputConfig,
    rows: Vec<T>,
    raw: &R,
) -> anyhow::Result<()> {
    match config.format {
        OutputFormat::Table => print_table(rows),
        OutputFormat::Json => print_json(raw)?,
        OutputFormat::Yaml => print_yaml(raw)?,
    }
    Ok(())
}

/// Print a pre-rendered block in table mode, the raw record otherwise.
pub fn print_rendered<R: Serialize + ?Sized>(
    config: &OutputConfig,
    rendered: &str,
    raw: &R,
) -> anyhow::Result<()> {
    match config.format {
        OutputFormat::Table => println!("{}", rendered),
        OutputFormat::Json => print_json(raw)?,
        OutputFormat::Yaml => print_yaml(raw)?,
    }
    Ok(())
}

// =============================================================================
// Symbols
// =============================================================================

pub fn symbol_success(plain: bool) -> &'static str {
    if plain { "[OK]" } else { "✓" }
}

pub fn symbol_error(plain: bool) -> &'static str {
    if plain { "[ERROR]" } else { "✗" }
}

pub fn symbol_warning(plain: bool) -> &'static str {
    if plain { "[WARN]" } else { "!" }
}

pub fn symbol_info(plain: bool) -> &'static str {
    if plain { "[INFO]" } else { "ℹ" }
}

// =============================================================================
// Messages
// =============================================================================

pub fn print_success(msg: &str, config: &OutputConfig) {
    let symbol = symbol_success(config.plain);
    if config.no_color {
        println!("{} {}", symbol, msg);
    } else {
        println!("{} {}", style(symbol).green().bold(), msg);
    }
}

pub fn print_error(msg: &str, config: &OutputConfig) {
    let symbol = symbol_error(config.plain);
    if config.no_color {
        eprintln!("{} {}", symbol, msg);
    } else {
        eprintln!("{} {}", style(symbol).red().bold(), msg);
    }
}

pub fn print_warning(msg: &str, config: &OutputConfig) {
    let symbol = symbol_warning(config.plain);
    if config.no_color {
        println!("{} {}", symbol, msg);
    } else {
        println!("{} {}", style(symbol).yellow().bold(), msg);
    }
}

pub fn print_info(msg: &str, config: &OutputConfig) {
    let symbol = symbol_info(config.plain);
    if config.no_color {
        println!("{} {}", symbol, msg);
    } else {
        println!("{} {}", style(symbol).blue().bold(), msg);
    }
}

// =============================================================================
// Timestamp Formatting
// =============================================================================

/// Parse an API timestamp. Values without an offset are taken as UTC.
pub fn parse_api_timestamp(value: &str) -> Option<DateTime<Utc>> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f")
        .ok()
        .map(|naive| naive.and_utc())
}

/// Format a UTC timestamp in the display timezone.
pub fn format_timestamp(dt: DateTime<Utc>, tz: DisplayTz) -> String {
    match tz {
        DisplayTz::Utc => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        DisplayTz::Local => {
            let local: DateTime<Local> = dt.into();
            local.format("%Y-%m-%d %H:%M:%S %Z").to_string()
        }
        DisplayTz::Named(zone) => dt
            .with_timezone(&zone)
            .format("%Y-%m-%d %H:%M:%S %Z")
            .to_string(),
    }
}

/// Format a raw API timestamp; unparseable values are shown verbatim.
pub fn format_api_timestamp(value: &str, tz: DisplayTz) -> String {
    match parse_api_timestamp(value) {
        Some(dt) => format_timestamp(dt, tz),
        None => value.to_string(),
    }
}

/// Format a datetime as relative time (e.g., "5m ago", "2h ago").
pub fn format_relative_time(dt: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let diff = now.signed_duration_since(dt);

    if diff.num_seconds() < 0 {
        "in the future".to_string()
    } else if diff.num_seconds() < 60 {
        "just now".to_string()
    } else if diff.num_minutes() < 60 {
        format!("{}m ago", diff.num_minutes())
    } else if diff.num_hours() < 24 {
        format!("{}h ago", diff.num_hours())
    } else {
        format!("{}d ago", diff.num_days())
    }
}
