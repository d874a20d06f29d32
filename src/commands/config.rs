//! `uptimex config ...`: local settings.

use crate::cli::ConfigCommands;
use crate::config::{Config, Context};
use crate::output::{OutputConfig, print_output, print_success};
use anyhow::Result;
use serde::Serialize;
use tabled::Tabled;

#[derive(Debug, Tabled)]
struct SettingRow {
    #[tabled(rename = "KEY")]
    key: &'static str,
    #[tabled(rename = "VALUE")]
    value: String,
}

/// What the current invocation will actually use, after flags and env.
#[derive(Debug, Serialize)]
struct EffectiveConfig {
    api_url: String,
    format: String,
    color: bool,
    timezone: String,
}

impl EffectiveConfig {
    fn from_context(ctx: &Context) -> Self {
        let format = format!("{:?}", ctx.output_format()).to_lowercase();
        Self {
            api_url: ctx.api_url(),
            format,
            color: !ctx.no_color(),
            timezone: ctx.config.timezone.clone(),
        }
    }

    fn rows(&self) -> Vec<SettingRow> {
        vec![
            SettingRow {
                key: "api_url",
                value: self.api_url.clone(),
            },
            SettingRow {
                key: "format",
                value: self.format.clone(),
            },
            SettingRow {
                key: "color",
                value: self.color.to_string(),
            },
            SettingRow {
                key: "timezone",
                value: self.timezone.clone(),
            },
        ]
    }
}

/// Handle config subcommands
pub fn handle(ctx: &Context, command: ConfigCommands) -> Result<()> {
    let config = OutputConfig::from_context(ctx);

    match command {
        ConfigCommands::Show => {
            let effective = EffectiveConfig::from_context(ctx);
            print_output(&config, effective.rows(), &effective)
        }
        ConfigCommands::Path => {
            println!("{}", Config::path()?.display());
            Ok(())
        }
        ConfigCommands::Set { key, value } => {
            let path = Config::path()?;
            let mut stored = Config::load_from_path(&path)?;
            stored.set(&key, &value)?;
            stored.save_to_path(&path)?;
            tracing::debug!(path = %path.display(), key = %key, "config saved");
            print_success(&format!("Set {} = {}", key, value), &config);
            Ok(())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::OutputFormat;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_effective_config_reflects_overrides() {
        let mut ctx = Context::with_config(Config::default());
        ctx.override_api_url("http://localhost:8080".to_string());
        ctx.set_format(OutputFormat::Yaml);
        ctx.set_no_color(true);

        let effective = EffectiveConfig::from_context(&ctx);

        assert_eq!(effective.api_url, "http://localhost:8080");
        assert_eq!(effective.format, "yaml");
        assert!(!effective.color);
        assert_eq!(effective.rows().len(), 4);
    }
}
