//! `vitrina status`: configuration and catalog overview.

use anyhow::Result;
use console::style;
use vitrina_core::catalog::CatalogMirror;

use crate::state::AppState;

pub async fn status(state: &AppState, json: bool) -> Result<()> {
    let products = state.store.hydrate().await;
    let config = &state.config;
    let mirror = state.store.mirror();
    let catalog_url = config.catalog.public_catalog_url();
    let media_host = config.media.imgbb_api_key.is_some();

    if json {
        let status = serde_json::json!({
            "version": env!("CARGO_PKG_VERSION"),
            "data_dir": state.data_dir.display().to_string(),
            "mirror": mirror.describe(),
            "remote": mirror.has_remote(),
            "catalog_url": catalog_url,
            "admins": config.admin_ids.len(),
            "products": products.len(),
            "media_host": media_host,
            "port": config.server.port,
        });
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!();
    println!("  {} Vitrina v{}", style("⚡").bold(), env!("CARGO_PKG_VERSION"));
    println!();

    println!("  {}", style("── Catalog ──").dim());
    println!("  Products: {}", style(products.len()).bold());
    println!("  Mirror:   {}", mirror.describe());
    if !mirror.has_remote() {
        println!("  {}", style("No remote configured, changes stay local").yellow());
    }
    match catalog_url {
        Some(url) => println!("  Site:     {}", style(url).cyan()),
        None => println!("  Site:     {}", style("not configured").dim()),
    }
    println!();

    println!("  {}", style("── Access ──").dim());
    let admins = config.admin_ids.len();
    if admins == 0 {
        println!("  Admins:   {}", style("none, every user is denied").red());
    } else {
        println!("  Admins:   {}", style(admins).bold());
    }
    println!(
        "  Uploads:  {}",
        if media_host {
            style("imgbb").green()
        } else {
            style("links only").dim()
        }
    );
    println!();

    println!("  {}", style("── System ──").dim());
    println!("  Data dir: {}", style(state.data_dir.display()).dim());
    println!("  Port:     {}", config.server.port);
    println!();

    Ok(())
}
