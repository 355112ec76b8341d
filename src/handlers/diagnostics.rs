//! Parse diagnostics for the Nuru Language Server.

use tower_lsp::lsp_types::*;

use crate::analysis::{Document, ParseError, PositionEncoding};

/// Diagnostics for a freshly parsed document.
pub fn parse_diagnostics(
    doc: &Document,
    error: Option<&ParseError>,
    encoding: PositionEncoding,
) -> Vec<Diagnostic> {
    let Some(error) = error else {
        return Vec::new();
    };

    // Tree lines are 1-indexed; an error past the last line sits on the last one.
    let last_line = doc.lines.len().saturating_sub(1) as u32;
    let line = error.line().saturating_sub(1).min(last_line);
    let width = doc
        .get_line(line)
        .map(|text| encoding.width(text))
        .unwrap_or(0);

    vec![Diagnostic {
        range: Range {
            start: Position { line, character: 0 },
            end: Position {
                line,
                character: width,
            },
        },
        severity: Some(DiagnosticSeverity::ERROR),
        code: Some(NumberOrString::String("E001".to_string())),
        source: Some("nuru-lsp".to_string()),
        message: error.to_string(),
        ..Default::default()
    }]
}
