use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;

#[derive(Parser)]
#[command(name = "uptimex")]
#[command(author, version, about = "Terminal dashboard for UptimeX monitored services")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Override the API base URL (also UPTIMEX_API_URL)
    #[arg(long, global = true)]
    pub api_url: Option<String>,

    /// Output format
    #[arg(long, global = true, value_enum, env = "UPTIMEX_FORMAT")]
    pub format: Option<OutputFormat>,

    /// Timezone for displayed timestamps: local, utc, or an IANA name
    #[arg(long, global = true, value_name = "TZ", env = "UPTIMEX_TZ")]
    pub tz: Option<String>,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    /// ASCII symbols instead of emoji
    #[arg(long, global = true)]
    pub plain: bool,

    /// Verbose output (debug logging)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Monitored service management
    #[command(subcommand)]
    Services(ServiceCommands),

    /// Uptime and SLA report
    Report(ReportArgs),

    /// Show or change local configuration
    #[command(subcommand)]
    Config(ConfigCommands),

    /// Generate shell completions
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

#[derive(Subcommand, Clone)]
pub enum ServiceCommands {
    /// List all monitored services
    List,

    /// Show monitored services as cards
    Cards,

    /// Show one service
    Show {
        /// Service ID
        id: String,
    },

    /// Create a new monitored service
    Create {
        #[command(flatten)]
        fields: ServiceFields,

        /// Prompt for every field
        #[arg(short, long)]
        interactive: bool,
    },

    /// Edit a service (full replace of all fields)
    Edit {
        /// Service ID
        id: String,

        #[command(flatten)]
        fields: ServiceFields,

        /// Prompt for every field, pre-filled with current values
        #[arg(short, long)]
        interactive: bool,
    },

    /// Delete a service
    Delete {
        /// Service ID
        id: String,

        /// Skip confirmation prompt
        #[arg(long, short)]
        yes: bool,
    },

    /// Browse services interactively (reload, add, edit, delete)
    Browse,
}

/// Form fields settable from the command line. Pass "" to clear a field on edit.
#[derive(Args, Clone, Debug, Default)]
pub struct ServiceFields {
    /// Display name
    #[arg(long)]
    pub name: Option<String>,

    /// Endpoint URL to check
    #[arg(long)]
    pub url: Option<String>,

    /// Free-form description
    #[arg(long)]
    pub description: Option<String>,

    /// Service type (e.g. http, api)
    #[arg(long = "type", value_name = "TYPE")]
    pub service_type: Option<String>,

    /// Environment (e.g. production, staging)
    #[arg(long)]
    pub environment: Option<String>,

    /// Expected response time in milliseconds
    #[arg(long, value_name = "MS")]
    pub expected_response_time_ms: Option<u32>,

    /// Owning team
    #[arg(long)]
    pub owner_team: Option<String>,

    /// Contact email
    #[arg(long)]
    pub contact_email: Option<String>,

    /// Project name
    #[arg(long)]
    pub project_name: Option<String>,

    /// Maximum allowed downtime per month (e.g. "43m")
    #[arg(long = "max-downtime", value_name = "DURATION")]
    pub max_allowed_downtime_per_month: Option<String>,

    /// Check interval (e.g. "1m")
    #[arg(long)]
    pub check_interval: Option<String>,

    /// Tags (comma-separated, replaces existing)
    #[arg(long)]
    pub tags: Option<String>,
}

#[derive(Args, Clone, Debug)]
pub struct ReportArgs {
    /// Only report on this service ID
    #[arg(long)]
    pub service: Option<String>,

    /// Start of the window (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_name = "DATE")]
    pub from: Option<String>,

    /// End of the window (YYYY-MM-DD or RFC 3339)
    #[arg(long, value_name = "DATE")]
    pub to: Option<String>,

    /// Page to fetch
    #[arg(long, default_value = "1")]
    pub page: u32,

    /// Show individual checks for this service ID (repeatable)
    #[arg(long, value_name = "ID")]
    pub expand: Vec<String>,

    /// Show individual checks for every service
    #[arg(long, conflicts_with = "expand")]
    pub expand_all: bool,

    /// Navigate pages and filters interactively
    #[arg(short, long)]
    pub interactive: bool,
}

#[derive(Subcommand, Clone)]
pub enum ConfigCommands {
    /// Print the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Set a config value (api_url, format, color, timezone)
    Set {
        /// Config key
        key: String,

        /// New value
        value: String,
    },
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Display as formatted table
    #[default]
    Table,
    /// Display as JSON
    Json,
    /// Display as YAML
    Yaml,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        <Self as ValueEnum>::from_str(s, true)
    }
}
