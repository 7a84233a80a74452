use anyhow::{bail, ensure, Context};
use clap::{ArgAction, Parser, Subcommand};

use crate::app;
use crate::auth::hash_password_blocking;
use crate::config::AppConfig;
use crate::database::{DatabaseManager, SqliteUserRepository, UserRepository};

#[derive(Parser)]
#[command(name = "item-api")]
#[command(about = "Item API - REST backend with JWT authentication")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    #[command(about = "Apply migrations and serve HTTP (default)")]
    Serve,

    #[command(about = "Create the database tables if they are missing")]
    Migrate,

    #[command(about = "Create an API user")]
    CreateUser {
        #[arg(help = "Login name")]
        username: String,
        #[arg(long, env = "ITEM_API_PASSWORD", hide_env_values = true, help = "Password")]
        password: String,
    },

    #[command(about = "Replace a user's password")]
    SetPassword {
        #[arg(help = "Login name")]
        username: String,
        #[arg(long, env = "ITEM_API_PASSWORD", hide_env_values = true, help = "New password")]
        password: String,
    },

    #[command(about = "Enable or disable a user account")]
    SetActive {
        #[arg(help = "Login name")]
        username: String,
        #[arg(action = ArgAction::Set, help = "true or false")]
        active: bool,
    },
}

pub async fn run(cli: Cli, config: AppConfig) -> anyhow::Result<()> {
    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => app::serve(config).await,
        Commands::Migrate => {
            let db = open_database(&config).await?;
            db.close().await;
            println!("Migrations applied");
            Ok(())
        }
        Commands::CreateUser { username, password } => {
            let username = username.trim().to_string();
            ensure!(!username.is_empty(), "username must not be blank");
            ensure!(!password.is_empty(), "password must not be blank");

            let db = open_database(&config).await?;
            let users = SqliteUserRepository::new(db.pool().clone());
            let hash = hash_password_blocking(password).await?;
            let user = users.create(&username, &hash).await?;
            db.close().await;

            println!("Created user '{}' (id {})", user.username, user.id);
            Ok(())
        }
        Commands::SetPassword { username, password } => {
            ensure!(!password.is_empty(), "password must not be blank");

            let db = open_database(&config).await?;
            let users = SqliteUserRepository::new(db.pool().clone());
            let hash = hash_password_blocking(password).await?;
            let updated = users.set_password(&username, &hash).await?;
            db.close().await;

            if !updated {
                bail!("user '{}' does not exist", username);
            }
            println!("Password updated for '{}'", username);
            Ok(())
        }
        Commands::SetActive { username, active } => {
            let db = open_database(&config).await?;
            let users = SqliteUserRepository::new(db.pool().clone());
            let updated = users.set_active(&username, active).await?;
            db.close().await;

            if !updated {
                bail!("user '{}' does not exist", username);
            }
            println!(
                "User '{}' is now {}",
                username,
                if active { "active" } else { "inactive" }
            );
            Ok(())
        }
    }
}

async fn open_database(config: &AppConfig) -> anyhow::Result<DatabaseManager> {
    let db = DatabaseManager::connect(&config.database)
        .await
        .context("failed to connect to database")?;
    db.migrate().await.context("failed to apply migrations")?;
    Ok(db)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_serve() {
        let cli = Cli::try_parse_from(["item-api"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_user_commands() {
        let cli = Cli::try_parse_from(["item-api", "create-user", "alice", "--password", "pw"]).unwrap();
        match cli.command {
            Some(Commands::CreateUser { username, password }) => {
                assert_eq!(username, "alice");
                assert_eq!(password, "pw");
            }
            _ => panic!("expected create-user"),
        }

        let cli = Cli::try_parse_from(["item-api", "set-active", "alice", "false"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::SetActive { active: false, .. })));
    }
}
