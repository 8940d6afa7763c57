//! `vitrina sync`: pull the catalog, then flush so pending commits go out.

use anyhow::Result;
use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use vitrina_core::catalog::CatalogMirror;
use vitrina_types::reply::FlushOutcome;

use crate::state::AppState;

pub async fn sync_catalog(state: &AppState, json: bool) -> Result<()> {
    let spinner = ProgressBar::new_spinner();
    spinner.set_style(ProgressStyle::default_spinner().template("{spinner:.cyan} {msg}")?);
    spinner.enable_steady_tick(std::time::Duration::from_millis(80));

    spinner.set_message(format!("Loading catalog from {}...", state.store.mirror().describe()));
    let products = state.store.hydrate().await;

    spinner.set_message("Publishing...");
    let outcome = state.store.flush().await;
    spinner.finish_and_clear();

    if json {
        let report = serde_json::json!({
            "products": products.len(),
            "outcome": outcome,
        });
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        println!();
        println!("  {} {} products loaded", style("✓").green().bold(), products.len());
        println!("  {} {}", outcome_mark(&outcome), outcome);
        println!();
    }

    if outcome.is_durable() {
        Ok(())
    } else {
        anyhow::bail!("catalog could not be written: {outcome}")
    }
}

fn outcome_mark(outcome: &FlushOutcome) -> console::StyledObject<&'static str> {
    match outcome {
        FlushOutcome::Published | FlushOutcome::Stored | FlushOutcome::Unchanged => {
            style("✓").green().bold()
        }
        FlushOutcome::SavedLocally { .. } => style("!").yellow().bold(),
        FlushOutcome::Failed { .. } => style("✗").red().bold(),
    }
}
