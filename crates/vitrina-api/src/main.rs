//! Vitrina entry point.
//!
//! Binary name: `vitrina`
//!
//! Parses CLI arguments, sets up tracing, loads configuration and the
//! catalog, then dispatches to the requested command.

mod cli;
mod http;
mod render;
mod state;

use clap::Parser;
use clap_complete::generate;
use vitrina_observe::tracing_setup::{default_filter, init_tracing, shutdown_tracing};

use cli::{Cli, Commands};
use state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // The server logs at info by default; one-shot commands stay quiet.
    let verbose = match cli.command {
        Commands::Serve { .. } if !cli.quiet => cli.verbose.max(1),
        _ => cli.verbose,
    };
    if let Err(e) = init_tracing(default_filter(verbose, cli.quiet), cli.log_format, cli.otel) {
        eprintln!("Warning: could not initialize logging: {e}");
    }

    // Shell completions don't need app state
    if let Commands::Completions { shell } = &cli.command {
        let mut cmd = <Cli as clap::CommandFactory>::command();
        generate(*shell, &mut cmd, "vitrina", &mut std::io::stdout());
        return Ok(());
    }

    let state = AppState::init().await?;

    let result = match cli.command {
        Commands::Serve { port, host } => cli::serve::serve(state, &host, port).await,
        Commands::Chat { user, name } => cli::chat::chat(&state, user, name, cli.json).await,
        Commands::List => cli::list::list_products(&state, cli.json).await,
        Commands::Sync => cli::sync::sync_catalog(&state, cli.json).await,
        Commands::Status => cli::status::status(&state, cli.json).await,
        Commands::Completions { .. } => unreachable!("handled above"),
    };

    shutdown_tracing();
    result
}
