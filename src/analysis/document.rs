//! Open document tracking.

use std::collections::HashMap;
use std::sync::Arc;

use tokio::sync::{RwLock, RwLockReadGuard};
use tower_lsp::lsp_types::{Position, Url};

use super::ast::Program;
use super::parser::{parse_program, ParseError};
use super::word::PositionEncoding;

/// State of an open document.
#[derive(Debug, Clone)]
pub struct Document {
    /// Source split into lines (0-indexed, line terminators stripped)
    pub lines: Vec<String>,
    /// Syntax tree, absent when the text failed to parse
    pub tree: Option<Program>,
    /// Client-reported version
    pub version: i32,
}

impl Document {
    /// Split and parse `text`, returning the document with any parse error.
    pub fn parse(text: &str, version: i32) -> (Self, Option<ParseError>) {
        let lines = text.lines().map(str::to_string).collect();
        let (tree, error) = match parse_program(text) {
            Ok(program) => (Some(program), None),
            Err(err) => (None, Some(err)),
        };
        (
            Self {
                lines,
                tree,
                version,
            },
            error,
        )
    }

    /// Build a document from text, discarding any parse error.
    pub fn from_text(text: &str) -> Self {
        Self::parse(text, 0).0
    }

    /// Build a document from already-split lines and an optional tree.
    pub fn from_parts(lines: Vec<String>, tree: Option<Program>) -> Self {
        Self {
            lines,
            tree,
            version: 0,
        }
    }

    /// Get a line by 0-indexed number.
    pub fn get_line(&self, line: u32) -> Option<&str> {
        self.lines.get(line as usize).map(String::as_str)
    }

    /// Translate a client position into one counted in characters.
    pub fn char_position(&self, position: Position, encoding: PositionEncoding) -> Option<Position> {
        let text = self.get_line(position.line)?;
        let character = encoding.char_offset(text, position.character)?;
        Some(Position::new(position.line, character))
    }
}

/// Open documents keyed by URI.
///
/// Lookups hold the read guard for the whole request; lifecycle updates take
/// the write guard, so a request never sees a half-replaced document.
#[derive(Debug, Clone, Default)]
pub struct DocumentStore {
    documents: Arc<RwLock<HashMap<Url, Document>>>,
}

impl DocumentStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse and store `text` for `uri`, replacing any previous state.
    pub async fn upsert(&self, uri: Url, text: &str, version: i32) -> Option<ParseError> {
        let (document, error) = Document::parse(text, version);
        self.documents.write().await.insert(uri, document);
        error
    }

    pub async fn remove(&self, uri: &Url) -> Option<Document> {
        self.documents.write().await.remove(uri)
    }

    /// Shared view over every open document.
    pub async fn read(&self) -> RwLockReadGuard<'_, HashMap<Url, Document>> {
        self.documents.read().await
    }

    pub async fn len(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.documents.read().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn uri(path: &str) -> Url {
        Url::parse(&format!("file:///tmp/{}", path)).unwrap()
    }

    #[test]
    fn test_parse_keeps_lines_and_tree() {
        let (doc, error) = Document::parse("fanya x = 1\r\nandika(x)\n", 3);
        assert!(error.is_none());
        assert_eq!(doc.lines, vec!["fanya x = 1", "andika(x)"]);
        assert_eq!(doc.version, 3);
        assert_eq!(doc.tree.map(|t| t.statements.len()), Some(2));
    }

    #[test]
    fn test_parse_error_drops_tree_but_keeps_lines() {
        let (doc, error) = Document::parse("fanya = 1", 1);
        assert!(error.is_some());
        assert!(doc.tree.is_none());
        assert_eq!(doc.get_line(0), Some("fanya = 1"));
        assert_eq!(doc.get_line(1), None);
    }

    #[tokio::test]
    async fn test_store_lifecycle() {
        let store = DocumentStore::new();
        assert!(store.is_empty().await);

        let error = store.upsert(uri("a.nr"), "fanya a = 1", 1).await;
        assert!(error.is_none());
        store.upsert(uri("b.nr"), "fanya b = ", 1).await;
        assert_eq!(store.len().await, 2);

        store.upsert(uri("a.nr"), "fanya a = 2\nfanya c = 3", 2).await;
        {
            let docs = store.read().await;
            let doc = docs.get(&uri("a.nr")).unwrap();
            assert_eq!(doc.version, 2);
            assert_eq!(doc.lines.len(), 2);
        }

        assert!(store.remove(&uri("a.nr")).await.is_some());
        assert!(store.remove(&uri("a.nr")).await.is_none());
        assert_eq!(store.len().await, 1);
    }
}
