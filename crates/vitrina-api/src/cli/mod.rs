//! CLI command definitions for the `vitrina` binary.

pub mod chat;
pub mod list;
pub mod serve;
pub mod status;
pub mod sync;

use clap::{Parser, Subcommand};
use clap_complete::Shell;
use vitrina_observe::tracing_setup::LogFormat;

/// Manage a chat-driven product catalog published through git.
#[derive(Parser)]
#[command(name = "vitrina", version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long, global = true)]
    pub json: bool,

    /// Suppress all output except errors.
    #[arg(long, global = true)]
    pub quiet: bool,

    /// Detailed output (-v info, -vv debug, -vvv trace).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Log line format: pretty or json.
    #[arg(long, global = true, env = "VITRINA_LOG_FORMAT", default_value = "pretty")]
    pub log_format: LogFormat,

    /// Also export spans through OpenTelemetry (stdout exporter).
    #[arg(long, global = true)]
    pub otel: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Load the catalog and serve the liveness endpoint.
    Serve {
        /// Port to listen on (defaults to the configured port, 10000).
        #[arg(short, long)]
        port: Option<u16>,

        /// Host to bind to.
        #[arg(long, default_value = "0.0.0.0")]
        host: String,
    },

    /// Talk to the bot from this terminal.
    Chat {
        /// User id to act as (defaults to the first configured admin).
        #[arg(long)]
        user: Option<i64>,

        /// Name shown in saved products.
        #[arg(long)]
        name: Option<String>,
    },

    /// List the products in the catalog.
    #[command(alias = "ls")]
    List,

    /// Pull the catalog and publish any pending local changes.
    Sync,

    /// Show configuration and catalog status.
    Status,

    /// Generate shell completions.
    Completions {
        /// Shell to generate completions for.
        shell: Shell,
    },
}

#[cfg(test)]
mod tests {
    use clap::CommandFactory;

    use super::*;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn parses_serve_with_port() {
        let cli = Cli::try_parse_from(["vitrina", "-v", "serve", "--port", "8080"]).unwrap();
        assert_eq!(cli.verbose, 1);
        assert!(matches!(
            cli.command,
            Commands::Serve { port: Some(8080), .. }
        ));
    }

    #[test]
    fn parses_chat_user() {
        let cli = Cli::try_parse_from(["vitrina", "chat", "--user", "42", "--json"]).unwrap();
        assert!(cli.json);
        assert!(matches!(cli.command, Commands::Chat { user: Some(42), .. }));
    }
}
