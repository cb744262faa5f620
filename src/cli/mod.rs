//! Command-line interface for the PPDB backend.

mod commands;

pub use commands::{cmd_check_config, cmd_init, cmd_user_add, cmd_user_list};

use clap::{Parser, Subcommand};

/// PPDB - school enrollment backend
#[derive(Parser)]
#[command(name = "ppdb")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP API (default)
    #[command(alias = "daemon")]
    Serve,

    /// Create default config file
    #[command(alias = "--init")]
    Init,

    /// Validate the effective configuration
    CheckConfig,

    /// Manage user accounts
    User {
        #[command(subcommand)]
        command: UserCommands,
    },
}

#[derive(Subcommand)]
pub enum UserCommands {
    /// Register an account directly in the database
    Add {
        #[arg(long)]
        name: String,
        #[arg(long)]
        email: String,
        #[arg(long)]
        password: String,
        /// admin, staff, applicant (or 1-3)
        #[arg(long, default_value = "admin")]
        role: String,
    },

    /// List accounts
    #[command(alias = "ls")]
    List,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn no_subcommand_means_serve() {
        let cli = Cli::try_parse_from(["ppdb"]).unwrap();
        assert!(cli.command.is_none());
    }

    #[test]
    fn parses_user_add() {
        let cli = Cli::try_parse_from([
            "ppdb", "user", "add", "--name", "A", "--email", "a@x.com", "--password", "secret1",
            "--role", "staff",
        ])
        .unwrap();

        match cli.command {
            Some(Commands::User {
                command: UserCommands::Add { email, role, .. },
            }) => {
                assert_eq!(email, "a@x.com");
                assert_eq!(role, "staff");
            }
            _ => panic!("expected user add"),
        }
    }

    #[test]
    fn daemon_alias_maps_to_serve() {
        let cli = Cli::try_parse_from(["ppdb", "daemon"]).unwrap();
        assert!(matches!(cli.command, Some(Commands::Serve)));
    }
}
