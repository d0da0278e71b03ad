//! Command-line interface definitions and parsing

use clap::{Parser, Subcommand};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long)]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Decode an import string and print it as JSON
    Decode {
        /// The import string (read from stdin when omitted)
        input: Option<String>,

        /// Print compact JSON instead of pretty-printed
        #[arg(long)]
        compact: bool,
    },
    /// Encode a JSON value as an import string
    Encode {
        /// The JSON value (read from stdin when omitted)
        input: Option<String>,

        /// Produce the legacy `!` generation instead of `!WA:2!`
        #[arg(long)]
        legacy: bool,
    },
    /// Serve relay requests as line-delimited JSON over stdin/stdout
    Serve,
}
