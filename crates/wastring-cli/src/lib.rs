//! WAstring CLI library
//!
//! Components for the `wastring` command-line tool: argument parsing,
//! configuration loading, and the command handlers, including the
//! line-delimited JSON server built on the relay.

pub mod cli;
pub mod commands;
pub mod config;
pub mod error;

pub use cli::{Cli, Commands};
pub use commands::CommandDispatcher;
pub use config::AppConfig;
pub use error::{CliError, Result};
