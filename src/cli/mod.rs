use clap::{Parser, Subcommand};

use crate::app_system::AdminSystem;
use crate::config::AdminConfig;

mod orders;
mod users;

#[derive(Debug, Parser)]
#[command(name = "admin_panel", about = "Users and orders administration", long_about = None)]
pub(crate) struct Cli {
    #[command(flatten)]
    config: AdminConfig,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// Manage users
    #[command(subcommand)]
    Users(users::UserCommand),
    /// Manage orders
    #[command(subcommand)]
    Orders(orders::OrderCommand),
}

impl Cli {
    pub(crate) fn config(&self) -> &AdminConfig {
        &self.config
    }

    pub(crate) async fn run(self, system: &AdminSystem) -> Result<(), String> {
        match self.command {
            Commands::Users(command) => users::run(command, system).await,
            Commands::Orders(command) => orders::run(command, &self.config, system).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_definition_is_consistent() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_order_creation() {
        let cli = Cli::try_parse_from([
            "admin_panel",
            "--backend",
            "memory",
            "orders",
            "create",
            "--user",
            "4",
            "--status",
            "completed",
            "--item",
            "Mug:12.50:2",
            "--item",
            "Poster:7.25:1:poster.png",
        ])
        .unwrap();

        match cli.command {
            Commands::Orders(orders::OrderCommand::Create { user, items, .. }) => {
                assert_eq!(user, "4");
                assert_eq!(items.len(), 2);
                assert_eq!(items[1].image.as_deref(), Some(std::path::Path::new("poster.png")));
            }
            other => panic!("unexpected command: {other:?}"),
        }
    }
}
