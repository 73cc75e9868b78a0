//! `carpool-auth` - admin CLI for carpool user accounts
//!
//! This binary wraps the account manager for operators: creating accounts,
//! inspecting them, editing profile fields and deactivating them.

#![warn(missing_debug_implementations)]
#![deny(unsafe_code)]

use anyhow::{bail, Context};
use clap::Parser;

use carpool_auth::cli::{
    Cli, Command, ConfigCommand, CreateCommand, ListCommand, OutputFormat, ShowCommand,
    UpdateCommand,
};
use carpool_auth::{init_logging, Config, Storage, User, UserManager};

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    init_logging(cli.verbosity());

    let config = if cli.command.loads_config() {
        Config::load_from(cli.config.clone()).context("loading configuration")?
    } else {
        Config::default()
    };

    match cli.command {
        Command::Config(cmd) => handle_config(&config, cmd),
        Command::Status(cmd) => handle_status(&config, cmd.json),
        Command::Create(cmd) => handle_create(&open_manager(&config)?, &cmd, false),
        Command::CreateSuperuser(cmd) => handle_create(&open_manager(&config)?, &cmd, true),
        Command::Show(cmd) => handle_show(&open_manager(&config)?, &cmd),
        Command::List(cmd) => handle_list(&open_manager(&config)?, &cmd),
        Command::Update(cmd) => handle_update(&open_manager(&config)?, cmd),
        Command::Deactivate { email } => {
            open_manager(&config)?.deactivate(&email)?;
            println!("Deactivated {email}");
            Ok(())
        }
        Command::Activate { email } => {
            open_manager(&config)?.activate(&email)?;
            println!("Activated {email}");
            Ok(())
        }
    }
}

fn open_manager(config: &Config) -> anyhow::Result<UserManager<Storage>> {
    let path = config.database_path();
    let storage =
        Storage::open(&path).with_context(|| format!("opening {}", path.display()))?;
    Ok(UserManager::new(storage, config.accounts.clone()))
}

fn handle_create(
    manager: &UserManager<Storage>,
    cmd: &CreateCommand,
    superuser: bool,
) -> anyhow::Result<()> {
    let new_user = cmd.to_new_user();
    let user = if superuser {
        let Some(password) = cmd.password.as_deref() else {
            bail!("a superuser needs --password");
        };
        manager.create_superuser(new_user, password)?
    } else {
        manager.create_user(new_user, cmd.password.as_deref())?
    };

    println!(
        "Created {} \"{}\" <{}> with id {}",
        if superuser { "superuser" } else { "user" },
        user.username,
        user.email,
        user.id.unwrap_or_default()
    );
    Ok(())
}

fn handle_show(manager: &UserManager<Storage>, cmd: &ShowCommand) -> anyhow::Result<()> {
    let user = manager.require(&cmd.email)?;
    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&user)?),
        OutputFormat::Plain | OutputFormat::Table => print_user(&user),
    }
    Ok(())
}

fn handle_list(manager: &UserManager<Storage>, cmd: &ListCommand) -> anyhow::Result<()> {
    let users = manager.list(cmd.all, cmd.limit)?;
    match cmd.format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&users)?),
        OutputFormat::Plain => {
            for user in &users {
                println!("{user}");
            }
        }
        OutputFormat::Table => {
            println!(
                "{:>5}  {:<32}  {:<28}  {:<6}  {:<5}",
                "ID", "EMAIL", "NAME", "ACTIVE", "STAFF"
            );
            for user in &users {
                println!(
                    "{:>5}  {:<32}  {:<28}  {:<6}  {:<5}",
                    user.id.unwrap_or_default(),
                    user.email,
                    user.username,
                    yes_no(user.is_active),
                    yes_no(user.is_staff)
                );
            }
            println!();
            println!("{} account(s)", users.len());
        }
    }
    Ok(())
}

fn handle_update(manager: &UserManager<Storage>, cmd: UpdateCommand) -> anyhow::Result<()> {
    if !cmd.has_changes() {
        bail!("nothing to update; pass at least one field flag");
    }

    let mut user = manager.require(&cmd.email)?;
    if let Some(email) = cmd.new_email {
        user.email = email;
    }
    if let Some(first_name) = cmd.first_name {
        user.first_name = first_name;
    }
    if let Some(last_name) = cmd.last_name {
        user.last_name = last_name;
    }
    if let Some(birth_date) = cmd.birth_date {
        user.birth_date = birth_date;
    }
    if let Some(document_number) = cmd.document_number {
        user.document_number = document_number;
    }
    if let Some(about_me) = cmd.about_me {
        user.about_me = about_me;
    }
    if let Some(password) = cmd.password.as_deref() {
        manager.set_password(&mut user, Some(password))?;
    }

    manager.save(&mut user)?;
    println!("Updated {} \"{}\"", user.email, user.username);
    Ok(())
}

fn handle_status(config: &Config, json: bool) -> anyhow::Result<()> {
    let path = config.database_path();
    let stats = if path.exists() {
        Some(Storage::open(&path)?.stats()?)
    } else {
        None
    };

    if json {
        let status = serde_json::json!({
            "database_path": path,
            "database_exists": stats.is_some(),
            "total_users": stats.as_ref().map(|s| s.total_users),
            "active_users": stats.as_ref().map(|s| s.active_users),
            "staff_users": stats.as_ref().map(|s| s.staff_users),
            "schema_version": stats.as_ref().map(|s| s.schema_version),
            "newest_join": stats.as_ref().and_then(|s| s.newest_join),
            "db_size_bytes": stats.as_ref().map(|s| s.db_size_bytes),
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("carpool-auth status");
    println!("-------------------");
    println!("Database:      {}", path.display());
    match stats {
        Some(stats) => {
            println!("Schema:        v{}", stats.schema_version);
            println!("Accounts:      {}", stats.total_users);
            println!("  active:      {}", stats.active_users);
            println!("  staff:       {}", stats.staff_users);
            if let Some(newest) = stats.newest_join {
                println!("Newest join:   {}", newest.to_rfc3339());
            }
            println!("Size:          {} bytes", stats.db_size_bytes);
        }
        None => println!("(not created yet)"),
    }
    Ok(())
}

fn handle_config(config: &Config, cmd: ConfigCommand) -> anyhow::Result<()> {
    match cmd {
        ConfigCommand::Show { json } => {
            if json {
                println!("{}", serde_json::to_string_pretty(config)?);
            } else {
                println!("Current Configuration");
                println!("=====================");
                println!();
                println!("[Storage]");
                println!("  Database path:      {}", config.database_path().display());
                println!();
                println!("[Accounts]");
                println!("  Minimum age:        {}", config.accounts.min_age);
                println!("  Maximum age:        {}", config.accounts.max_age);
                println!(
                    "  About-me max chars: {}",
                    config.accounts.about_me_max_length
                );
            }
        }
        ConfigCommand::Path => {
            println!("{}", Config::default_config_path().display());
        }
        ConfigCommand::Validate { file } => {
            let path = file.unwrap_or_else(Config::default_config_path);
            println!("Validating configuration: {}", path.display());
            if let Err(e) = Config::load_from(Some(path)) {
                bail!("configuration error: {e}");
            }
            println!("Configuration is valid.");
        }
    }
    Ok(())
}

fn print_user(user: &User) {
    println!("{}", user.username);
    println!("  Email:           {}", user.email);
    println!("  Id:              {}", user.id.unwrap_or_default());
    println!("  Birth date:      {}", user.birth_date);
    println!("  Document number: {}", user.document_number);
    println!("  Active:          {}", yes_no(user.is_active));
    println!("  Staff:           {}", yes_no(user.is_staff));
    println!("  Superuser:       {}", yes_no(user.is_superuser));
    println!("  Joined:          {}", user.date_joined.to_rfc3339());
    if let Some(last_login) = user.last_login {
        println!("  Last login:      {}", last_login.to_rfc3339());
    }
    if !user.about_me.is_empty() {
        println!("  About me:        {}", user.about_me);
    }
}

fn yes_no(flag: bool) -> &'static str {
    if flag {
        "yes"
    } else {
        "no"
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_config(name: &str, contents: &str) -> PathBuf {
        let path = std::env::temp_dir().join(format!(
            "carpool_auth_main_{name}_{}.toml",
            std::process::id()
        ));
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_config_validate_fails_on_invalid_file() {
        let path = write_config("invalid", "[accounts]\nmin_age = 90\nmax_age = 20\n");

        let result = handle_config(
            &Config::default(),
            ConfigCommand::Validate {
                file: Some(path.clone()),
            },
        );
        let _ = std::fs::remove_file(&path);

        let err = result.unwrap_err().to_string();
        assert!(err.contains("min_age"));
    }

    #[test]
    fn test_config_validate_accepts_valid_file() {
        let path = write_config("valid", "[accounts]\nmin_age = 21\n");

        let result = handle_config(
            &Config::default(),
            ConfigCommand::Validate {
                file: Some(path.clone()),
            },
        );
        let _ = std::fs::remove_file(&path);

        assert!(result.is_ok());
    }
}
