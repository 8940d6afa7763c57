//! `vitrina serve`: hydrate, start the idle sweeper and serve liveness
//! probes until Ctrl+C or SIGTERM.

use anyhow::Result;
use console::style;
use tokio_util::sync::CancellationToken;
use vitrina_core::session::spawn_idle_sweeper;

use crate::http::router::build_router;
use crate::state::AppState;

pub async fn serve(state: AppState, host: &str, port: Option<u16>) -> Result<()> {
    let products = state.store.hydrate().await;
    tracing::info!(count = products.len(), "catalog ready");

    let cancel = CancellationToken::new();
    let sweeper = spawn_idle_sweeper(state.sessions.clone(), cancel.clone());

    let port = port.unwrap_or(state.config.server.port);
    let addr = format!("{host}:{port}");
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    println!(
        "  {} Vitrina listening on {}",
        style("⚡").bold(),
        style(format!("http://{addr}")).cyan()
    );
    println!("  {}", style("Press Ctrl+C to stop").dim());

    let served = axum::serve(listener, build_router(state))
        .with_graceful_shutdown(shutdown_signal())
        .await;

    cancel.cancel();
    if let Err(e) = sweeper.await {
        tracing::warn!(error = %e, "session sweeper ended abnormally");
    }
    served?;

    println!("\n  Server stopped.");
    Ok(())
}

/// Wait for Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %e, "failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("shutdown signal received");
}
