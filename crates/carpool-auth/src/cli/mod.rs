//! Command-line interface for carpool-auth.
//!
//! This module provides the CLI structure for the `carpool-auth` admin
//! binary.

mod commands;

use std::path::PathBuf;

use clap::{Parser, Subcommand};

pub use commands::{
    ConfigCommand, CreateCommand, ListCommand, OutputFormat, ShowCommand, StatusCommand,
    UpdateCommand,
};

use crate::logging::Verbosity;

/// carpool-auth - Manage carpool user accounts
///
/// Creates, inspects and deactivates the accounts riders and drivers log in
/// with.
#[derive(Debug, Parser)]
#[command(name = "carpool-auth")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Path to custom configuration file
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Increase verbosity (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// The command to execute
    #[command(subcommand)]
    pub command: Command,
}

/// Available commands.
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Create a regular account
    Create(CreateCommand),

    /// Create a staff account with every permission
    CreateSuperuser(CreateCommand),

    /// Show one account
    Show(ShowCommand),

    /// List accounts
    List(ListCommand),

    /// Change fields of an account and save it
    Update(UpdateCommand),

    /// Deactivate an account (it is kept, but can no longer log in)
    Deactivate {
        /// Email of the account
        email: String,
    },

    /// Reactivate a deactivated account
    Activate {
        /// Email of the account
        email: String,
    },

    /// Show database status
    Status(StatusCommand),

    /// View or check configuration
    #[command(subcommand)]
    Config(ConfigCommand),
}

impl Command {
    /// Whether the command runs against the loaded configuration.
    ///
    /// `config path` and `config validate` only inspect files, so a broken
    /// configuration must not stop them.
    #[must_use]
    pub fn loads_config(&self) -> bool {
        !matches!(
            self,
            Self::Config(ConfigCommand::Path | ConfigCommand::Validate { .. })
        )
    }
}

impl Cli {
    /// Get the verbosity level based on flags.
    #[must_use]
    pub fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.verbose, self.quiet)
    }
}
