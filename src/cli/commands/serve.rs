//! Serve command - JSON-RPC server on stdio.

use std::sync::Arc;

use super::load_registry;
use crate::cli::args::ManifestArgs;
use crate::config::Settings;
use crate::server::{CredentialProviders, EchoExecutor, LiveTestServer, ServerOptions};

/// Run the serve command until stdin closes or Ctrl-C.
pub async fn run(manifests: &ManifestArgs, settings: &Settings) -> anyhow::Result<()> {
    let registry = load_registry(manifests, settings)?;
    eprintln!(
        "Serving {} operation(s) on stdio transport",
        registry.len()
    );

    let server = LiveTestServer::new(
        registry,
        Arc::new(EchoExecutor),
        CredentialProviders::default(),
        ServerOptions::from(&settings.server),
    );

    let shutdown = server.shutdown_token();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            crate::log_event!("serve", "interrupted");
            shutdown.cancel();
        }
    });

    server
        .run(tokio::io::stdin(), tokio::io::stdout())
        .await?;
    Ok(())
}
