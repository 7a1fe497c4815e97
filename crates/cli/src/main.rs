//! Waterline CLI - Database migrations and user bootstrap.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations
//! wl-cli migrate
//!
//! # Create the first admin
//! WATERLINE_USER_PASSWORD=... wl-cli user create -u admin -n "District Admin" -r admin
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `user create` - Create a user account

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "wl-cli")]
#[command(author, version, about = "Waterline CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Manage user accounts
    User {
        #[command(subcommand)]
        action: UserAction,
    },
}

#[derive(Subcommand)]
enum UserAction {
    /// Create a new user
    Create {
        /// Login name
        #[arg(short, long)]
        username: String,

        /// Display name
        #[arg(short = 'n', long)]
        full_name: String,

        /// Role (`admin`, `engr`, `user`)
        #[arg(short, long, default_value = "user")]
        role: String,

        /// Initial password
        #[arg(long, env = "WATERLINE_USER_PASSWORD", hide_env_values = true)]
        password: String,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), Box<dyn std::error::Error>> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::User { action } => match action {
            UserAction::Create {
                username,
                full_name,
                role,
                password,
            } => {
                commands::user::create(&username, &full_name, &role, &password).await?;
            }
        },
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_user_create() {
        let cli = Cli::try_parse_from([
            "wl-cli", "user", "create", "-u", "admin", "-n", "District Admin", "-r", "admin",
            "--password", "long-enough",
        ])
        .unwrap_or_else(|e| panic!("parse: {e}"));

        let Commands::User {
            action: UserAction::Create { username, role, .. },
        } = cli.command
        else {
            panic!("expected user create");
        };
        assert_eq!(username, "admin");
        assert_eq!(role, "admin");
    }
}
