//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Parser, Subcommand, ValueEnum};

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Input format for history imports
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ImportFormat {
    Json,
    Csv,
}

#[derive(Parser)]
#[command(name = "incubator")]
#[command(author, version, about = "Egg incubation tracker", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Disable colored output
    #[arg(
        long,
        global = true,
        env = "NO_COLOR",
        value_parser = clap::builder::FalseyValueParser::new()
    )]
    pub no_color: bool,

    /// Write output to file instead of stdout
    #[arg(short, long, global = true)]
    pub output: Option<PathBuf>,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "INCUBATOR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file (overrides storage.path)
    #[arg(long, global = true, env = "INCUBATOR_DB")]
    pub db: Option<PathBuf>,

    /// Controller address (overrides controller.address)
    #[arg(long, global = true, env = "INCUBATOR_CONTROLLER")]
    pub controller: Option<String>,

    /// Species catalog file (overrides catalog.path)
    #[arg(long, global = true)]
    pub catalog: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List the species in the catalog
    Species {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Start a new incubation and send the species setpoints to the controller
    Start {
        /// Species name, as listed by `species`
        species: String,

        /// Number of eggs set
        eggs: u32,

        /// Free-text notes
        #[arg(short, long, default_value = "")]
        notes: String,
    },

    /// Show the active incubation and what it is waiting for
    Status {
        /// Output format (text, json)
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Record how many eggs are still fertile after candling
    Fertility {
        /// Fertile egg count
        count: u32,
    },

    /// Record the hatch count and archive the incubation
    Hatch {
        /// Hatched chick count
        count: u32,
    },

    /// Send the active species' setpoints to the controller again
    Push,

    /// Show or export completed incubations
    History {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Show totals instead of individual cycles
        #[arg(long)]
        stats: bool,
    },

    /// Read the controller's temperature/humidity log
    Sensors {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,

        /// Sensor log file (overrides sensors.path)
        #[arg(long)]
        file: Option<PathBuf>,

        /// Only readings at or after this time (YYYY-MM-DD HH:MM:SS)
        #[arg(long)]
        since: Option<String>,

        /// Only the most recent N readings
        #[arg(short = 'n', long)]
        last: Option<usize>,

        /// Show min/max/average instead of individual readings
        #[arg(long)]
        summary: bool,

        /// Species whose ideal ranges the summary is checked against
        /// (defaults to the active incubation's species)
        #[arg(long)]
        species: Option<String>,
    },

    /// Import records from files written by earlier versions
    #[command(group(
        clap::ArgGroup::new("source")
            .required(true)
            .multiple(true)
            .args(["active", "history"]),
    ))]
    Import {
        /// Legacy active-incubation CSV (`incubacao_atual.csv`)
        #[arg(long, value_name = "FILE")]
        active: Option<PathBuf>,

        /// History file (JSON or CSV)
        #[arg(long, value_name = "FILE")]
        history: Option<PathBuf>,

        /// History file format (defaults to the file extension)
        #[arg(long, value_enum)]
        format: Option<ImportFormat>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,
    /// Show config file path
    Path,
    /// Write a default config file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}
