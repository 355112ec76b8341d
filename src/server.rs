//! LSP Server implementation for Nuru.

use std::sync::Arc;

use tokio::sync::RwLock;
use tower_lsp::jsonrpc::Result;
use tower_lsp::lsp_types::*;
use tower_lsp::{Client, LanguageServer};

use crate::analysis::{DocumentStore, PositionEncoding};
use crate::config::ServerConfig;
use crate::handlers;
use crate::handlers::imports::ImportTable;

/// Nuru Language Server state.
pub struct NuruLanguageServer {
    /// LSP client for sending notifications
    client: Client,
    /// Open documents and their syntax trees
    documents: DocumentStore,
    /// Modules recognized after `tumia`
    imports: Arc<RwLock<ImportTable>>,
    /// Settings from `initializationOptions`
    config: Arc<RwLock<ServerConfig>>,
    /// Unit of `Position::character` agreed with the client
    encoding: Arc<RwLock<PositionEncoding>>,
}

impl NuruLanguageServer {
    /// Create a new language server instance.
    pub fn new(client: Client) -> Self {
        Self {
            client,
            documents: DocumentStore::new(),
            imports: Arc::new(RwLock::new(ImportTable::default())),
            config: Arc::new(RwLock::new(ServerConfig::default())),
            encoding: Arc::new(RwLock::new(PositionEncoding::default())),
        }
    }

    /// Reparse a document and publish its diagnostics.
    async fn analyze_document(&self, uri: Url, text: &str, version: i32) {
        let error = self.documents.upsert(uri.clone(), text, version).await;
        if let Some(err) = &error {
            tracing::debug!("Parse error in {}: {}", uri, err);
        }

        if !self.config.read().await.publish_diagnostics {
            return;
        }

        let encoding = *self.encoding.read().await;
        let (diagnostics, version) = {
            let docs = self.documents.read().await;
            match docs.get(&uri) {
                Some(doc) => (
                    handlers::diagnostics::parse_diagnostics(doc, error.as_ref(), encoding),
                    doc.version,
                ),
                None => return,
            }
        };
        self.client
            .publish_diagnostics(uri, diagnostics, Some(version))
            .await;
    }
}

#[tower_lsp::async_trait]
impl LanguageServer for NuruLanguageServer {
    async fn initialize(&self, params: InitializeParams) -> Result<InitializeResult> {
        tracing::info!("Initializing Nuru Language Server");

        let config = ServerConfig::from_initialization_options(params.initialization_options);
        {
            let mut imports = self.imports.write().await;
            imports.extend(config.extra_imports.iter().cloned());
            tracing::debug!(
                "Known modules: {}",
                imports.iter().collect::<Vec<_>>().join(", ")
            );
        }
        *self.config.write().await = config;

        let encoding = PositionEncoding::negotiate(
            params
                .capabilities
                .general
                .as_ref()
                .and_then(|general| general.position_encodings.as_deref()),
        );
        *self.encoding.write().await = encoding;
        tracing::debug!("Position encoding: {:?}", encoding);

        Ok(InitializeResult {
            capabilities: ServerCapabilities {
                position_encoding: Some(encoding.kind()),

                // Documents are small; full sync keeps the stored lines exact
                text_document_sync: Some(TextDocumentSyncCapability::Kind(
                    TextDocumentSyncKind::FULL,
                )),

                // Hover support
                hover_provider: Some(HoverProviderCapability::Simple(true)),

                // Go to definition
                definition_provider: Some(OneOf::Left(true)),

                ..Default::default()
            },
            server_info: Some(ServerInfo {
                name: "nuru-lsp".to_string(),
                version: Some(env!("CARGO_PKG_VERSION").to_string()),
            }),
        })
    }

    async fn initialized(&self, _: InitializedParams) {
        tracing::info!("Nuru Language Server initialized");

        self.client
            .log_message(MessageType::INFO, "Nuru Language Server ready")
            .await;
    }

    async fn shutdown(&self) -> Result<()> {
        tracing::info!("Shutting down Nuru Language Server");
        if !self.documents.is_empty().await {
            tracing::debug!("{} documents still open", self.documents.len().await);
        }
        Ok(())
    }

    async fn did_open(&self, params: DidOpenTextDocumentParams) {
        tracing::debug!("Document opened: {}", params.text_document.uri);
        self.analyze_document(
            params.text_document.uri,
            &params.text_document.text,
            params.text_document.version,
        )
        .await;
    }

    async fn did_change(&self, params: DidChangeTextDocumentParams) {
        tracing::debug!("Document changed: {}", params.text_document.uri);

        // Full sync: the last change carries the whole document
        if let Some(change) = params.content_changes.into_iter().last() {
            self.analyze_document(
                params.text_document.uri,
                &change.text,
                params.text_document.version,
            )
            .await;
        }
    }

    async fn did_close(&self, params: DidCloseTextDocumentParams) {
        tracing::debug!("Document closed: {}", params.text_document.uri);

        self.documents.remove(&params.text_document.uri).await;
        tracing::debug!("Open documents: {}", self.documents.len().await);

        // Clear diagnostics
        self.client
            .publish_diagnostics(params.text_document.uri, vec![], None)
            .await;
    }

    async fn hover(&self, params: HoverParams) -> Result<Option<Hover>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let encoding = *self.encoding.read().await;
        let docs = self.documents.read().await;
        let Some(doc) = docs.get(uri) else {
            tracing::debug!("Hover: document not found: {}", uri);
            return Ok(None);
        };
        let Some(position) = doc.char_position(position, encoding) else {
            return Ok(None);
        };

        let imports = self.imports.read().await;
        Ok(handlers::hover::get_hover(doc, position, &imports))
    }

    async fn goto_definition(
        &self,
        params: GotoDefinitionParams,
    ) -> Result<Option<GotoDefinitionResponse>> {
        let uri = &params.text_document_position_params.text_document.uri;
        let position = params.text_document_position_params.position;

        let encoding = *self.encoding.read().await;
        let docs = self.documents.read().await;
        let Some(doc) = docs.get(uri) else {
            tracing::debug!("Definition: document not found: {}", uri);
            return Ok(None);
        };
        let Some(position) = doc.char_position(position, encoding) else {
            return Ok(None);
        };

        Ok(handlers::goto_definition::get_definition(doc, uri, position))
    }
}
