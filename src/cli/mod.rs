pub mod commands;

use clap::{Parser, Subcommand};

use crate::config::AppConfig;

#[derive(Parser)]
#[command(name = "task-api")]
#[command(about = "Task API - owner-scoped task management over cookie sessions")]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, PartialEq, Eq)]
pub enum Commands {
    #[command(about = "Apply the database schema, then serve HTTP (default)")]
    Serve,

    #[command(about = "Apply the database schema and exit")]
    Migrate,
}

pub async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = AppConfig::from_env()?;
    tracing::info!("Starting Task API in {:?} mode", config.environment);

    match cli.command.unwrap_or(Commands::Serve) {
        Commands::Serve => commands::serve::handle(config).await,
        Commands::Migrate => commands::migrate::handle(config).await,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_to_no_subcommand() {
        let cli = Cli::try_parse_from(["task-api"]).unwrap();
        assert_eq!(cli.command, None);
    }

    #[test]
    fn parses_migrate() {
        let cli = Cli::try_parse_from(["task-api", "migrate"]).unwrap();
        assert_eq!(cli.command, Some(Commands::Migrate));
    }

    #[test]
    fn rejects_unknown_subcommand() {
        assert!(Cli::try_parse_from(["task-api", "fly"]).is_err());
    }
}
