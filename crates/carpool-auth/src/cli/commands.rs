//! CLI command definitions.
//!
//! This module defines the structure of all CLI subcommands.

use std::path::PathBuf;

use chrono::NaiveDate;
use clap::{Args, Subcommand, ValueEnum};

use crate::account::NewUser;

/// Fields for creating an account.
#[derive(Debug, Args)]
pub struct CreateCommand {
    /// Login email address
    #[arg(short, long)]
    pub email: String,

    /// Given name
    #[arg(long)]
    pub first_name: String,

    /// Family name
    #[arg(long)]
    pub last_name: String,

    /// Date of birth (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub birth_date: NaiveDate,

    /// Eight-digit national document number
    #[arg(short, long)]
    pub document_number: String,

    /// Profile text
    #[arg(long, default_value = "")]
    pub about_me: String,

    /// Password; omit to create the account with an unusable password
    #[arg(short, long)]
    pub password: Option<String>,
}

impl CreateCommand {
    /// The account fields, without the password.
    #[must_use]
    pub fn to_new_user(&self) -> NewUser {
        NewUser::new(
            self.email.clone(),
            self.first_name.clone(),
            self.last_name.clone(),
            self.birth_date,
            self.document_number.clone(),
        )
        .with_about_me(self.about_me.clone())
    }
}

/// Show one account.
#[derive(Debug, Args)]
pub struct ShowCommand {
    /// Email of the account
    pub email: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "plain")]
    pub format: OutputFormat,
}

/// List accounts.
#[derive(Debug, Args)]
pub struct ListCommand {
    /// Include deactivated accounts
    #[arg(short, long)]
    pub all: bool,

    /// Maximum number of results
    #[arg(short, long, default_value = "50")]
    pub limit: usize,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,
}

/// Change fields of an existing account. Unset flags keep their value.
#[derive(Debug, Args)]
pub struct UpdateCommand {
    /// Email of the account to change
    pub email: String,

    /// New email address
    #[arg(long)]
    pub new_email: Option<String>,

    /// New given name
    #[arg(long)]
    pub first_name: Option<String>,

    /// New family name
    #[arg(long)]
    pub last_name: Option<String>,

    /// New date of birth (YYYY-MM-DD)
    #[arg(long, value_name = "DATE")]
    pub birth_date: Option<NaiveDate>,

    /// New document number
    #[arg(short, long)]
    pub document_number: Option<String>,

    /// New profile text
    #[arg(long)]
    pub about_me: Option<String>,

    /// New password
    #[arg(short, long)]
    pub password: Option<String>,
}

impl UpdateCommand {
    /// Whether any field was given.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        self.new_email.is_some()
            || self.first_name.is_some()
            || self.last_name.is_some()
            || self.birth_date.is_some()
            || self.document_number.is_some()
            || self.about_me.is_some()
            || self.password.is_some()
    }
}

/// Status command arguments.
#[derive(Debug, Args)]
pub struct StatusCommand {
    /// Output as JSON
    #[arg(short, long)]
    pub json: bool,
}

/// Configuration commands.
#[derive(Debug, Subcommand)]
pub enum ConfigCommand {
    /// Show current configuration
    Show {
        /// Output as JSON
        #[arg(short, long)]
        json: bool,
    },

    /// Show the configuration file path
    Path,

    /// Validate configuration
    Validate {
        /// Path to configuration file to validate
        #[arg(short, long)]
        file: Option<PathBuf>,
    },
}

/// Output format for commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// Formatted table
    Table,
    /// JSON output
    Json,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_command() -> CreateCommand {
        CreateCommand {
            email: "ana@example.com".to_string(),
            first_name: "Ana".to_string(),
            last_name: "Gomez".to_string(),
            birth_date: NaiveDate::from_ymd_opt(1996, 4, 1).unwrap(),
            document_number: "12345678".to_string(),
            about_me: "Early riser".to_string(),
            password: Some("pw".to_string()),
        }
    }

    #[test]
    fn test_create_command_to_new_user() {
        let new_user = create_command().to_new_user();
        assert_eq!(new_user.email, "ana@example.com");
        assert_eq!(new_user.first_name, "Ana");
        assert_eq!(new_user.last_name, "Gomez");
        assert_eq!(new_user.document_number, "12345678");
        assert_eq!(new_user.about_me, "Early riser");
    }

    #[test]
    fn test_create_command_debug() {
        let debug_str = format!("{:?}", create_command());
        assert!(debug_str.contains("document_number"));
    }

    #[test]
    fn test_update_has_changes() {
        let mut cmd = UpdateCommand {
            email: "ana@example.com".to_string(),
            new_email: None,
            first_name: None,
            last_name: None,
            birth_date: None,
            document_number: None,
            about_me: None,
            password: None,
        };
        assert!(!cmd.has_changes());

        cmd.about_me = Some(String::new());
        assert!(cmd.has_changes());
    }

    #[test]
    fn test_output_format_default() {
        assert_eq!(OutputFormat::default(), OutputFormat::Plain);
    }
}
