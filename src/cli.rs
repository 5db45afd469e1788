use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Args {
    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// List destination languages and their FLORES-200 codes
    Languages,

    /// Translate English text into one destination language
    Translate {
        /// Text to translate (read from stdin when omitted)
        #[arg(short, long)]
        text: Option<String>,

        /// Destination language display name, e.g. "French"
        #[arg(long)]
        to: String,

        /// Use the smaller CPU-friendly model
        #[arg(long)]
        small_model: bool,
    },

    /// Translate line by line in an interactive prompt
    Interactive {
        /// Initial destination language
        #[arg(long)]
        to: Option<String>,

        /// Start with the smaller CPU-friendly model
        #[arg(long)]
        small_model: bool,
    },

    /// Serve translations over HTTP
    Serve {
        /// Socket address to bind (overrides the configuration)
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Manage the configuration file
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Write the default configuration
    Init {
        /// Destination path
        #[arg(default_value = "polyglot.toml")]
        path: PathBuf,

        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the effective configuration
    Show,
}
