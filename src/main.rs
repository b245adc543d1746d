use std::sync::Arc;

use docroot::config::Config;
use docroot::http::docroot::DocumentRoot;
use docroot::server::context::ServerContext;
use docroot::server::control::{self, Maintenance};
use docroot::server::listener;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = Config::load()?;

    tracing_subscriber::fmt()
        .with_target(false)
        .with_level(true)
        .with_max_level(cfg.log_level()?)
        .init();

    let root = DocumentRoot::bootstrap(&cfg.documents.root).await?;
    let maintenance = Maintenance::new();
    let ctx = Arc::new(ServerContext::from_config(&cfg, root, maintenance.clone())?);

    tracing::info!(root = %ctx.root.path().display(), "Serving documents");
    tracing::info!("Enter 'p' to toggle maintenance pause, or 'q' to quit");

    let console = async {
        if !control::run_console(control::spawn_stdin_reader(), maintenance).await {
            // No console attached; keep serving until Ctrl-C.
            std::future::pending::<()>().await;
        }
    };

    tokio::select! {
        res = listener::run(&cfg.server.listen_addr, ctx) => {
            res?;
        }

        _ = console => {
            tracing::info!("Shutting down");
        }

        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
