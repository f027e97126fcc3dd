//! CLI command definitions and subcommands

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::debug;

/// ac - conformity analyzer client
#[derive(Parser)]
#[command(
    name = "ac",
    about = "Conformity analyzer client: text analysis, history and property listings",
    version
)]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true, help = "Path to config file")]
    pub config: Option<PathBuf>,

    /// Log level (TRACE, DEBUG, INFO, WARN, ERROR)
    #[arg(
        short = 'l',
        long = "log-level",
        global = true,
        help = "Log level (TRACE, DEBUG, INFO, WARN, ERROR)"
    )]
    pub log_level: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Command,
}

/// CLI subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Submit a text for conformity analysis
    Analyze {
        /// Text to analyze
        #[arg(required_unless_present = "file", conflicts_with = "file")]
        text: Option<String>,

        /// Read the text from a file
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Browse past analyses
    History {
        /// Page to show (starts at 1)
        #[arg(short, long, default_value = "1")]
        page: u32,

        /// Entries per page (defaults to history.page-size)
        #[arg(long)]
        limit: Option<u32>,

        /// Only analyses whose text matches
        #[arg(short, long)]
        search: Option<String>,

        /// Minimum score, 1 to 100
        #[arg(short, long)]
        min_score: Option<u32>,

        /// Output format
        #[arg(short, long, default_value = "text")]
        format: OutputFormat,
    },

    /// List published properties
    Properties,

    /// Sign in to the property backend
    Login {
        #[arg(short, long)]
        email: String,

        /// Read from stdin when omitted
        #[arg(short, long)]
        password: Option<String>,
    },

    /// Sign out and forget the stored session
    Logout,

    /// Show the signed-in user
    Whoami {
        /// Check that the user has this role
        #[arg(short, long)]
        role: Option<String>,
    },

    /// Show recent request activity
    Activity {
        /// Number of entries to show
        #[arg(short = 'n', long, default_value = "20")]
        lines: usize,
    },
}

/// Get the log file path
pub fn get_log_path() -> PathBuf {
    debug!("get_log_path: called");
    let path = dirs::data_local_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("analyzer")
        .join("logs")
        .join("analyzer.log");
    debug!(?path, "get_log_path: returning path");
    path
}

/// Generate the after_help text with config and log locations
pub fn generate_after_help() -> String {
    debug!("generate_after_help: called");
    let mut help = String::new();

    help.push_str("Config files (first found wins):\n");
    help.push_str("  ./analyzer.yml\n");
    if let Some(dir) = dirs::config_dir() {
        help.push_str(&format!("  {}\n", dir.join("analyzer").join("analyzer.yml").display()));
    }

    help.push('\n');
    help.push_str("Environment:\n");
    help.push_str("  ANALYZER_API_URL     analysis server base URL\n");
    help.push_str("  BACKSTORE_URL        property backend URL\n");
    help.push_str("  BACKSTORE_ANON_KEY   property backend API key\n");

    help.push('\n');
    help.push_str(&format!("Logs are written to: {}\n", get_log_path().display()));
    help
}

/// Output format for listing commands
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

impl std::str::FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        debug!(%s, "OutputFormat::from_str: called");
        match s.to_lowercase().as_str() {
            "text" | "plain" => Ok(Self::Text),
            "json" => Ok(Self::Json),
            _ => Err(format!("Unknown format: {}. Use: text or json", s)),
        }
    }
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Text => write!(f, "text"),
            Self::Json => write!(f, "json"),
        }
    }
}
