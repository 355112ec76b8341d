//! Nuru Language Server - Main entry point
//!
//! Provides LSP support for the Nuru scripting language with:
//! - Go-to-definition for declared names, parameters and packages
//! - Hover documentation for keywords, builtins, declarations and modules
//! - Parse error diagnostics

use nuru_lsp::NuruLanguageServer;
use tower_lsp::{LspService, Server};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Setup logging to stderr (LSP uses stdout for protocol)
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "nuru_lsp=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .try_init()?;

    tracing::info!("Starting Nuru Language Server");

    let stdin = tokio::io::stdin();
    let stdout = tokio::io::stdout();

    let (service, socket) = LspService::new(NuruLanguageServer::new);

    Server::new(stdin, stdout, socket).serve(service).await;
    Ok(())
}
