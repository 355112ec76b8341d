//! Go-to-definition handler.

use tower_lsp::lsp_types::*;

use crate::analysis::ast::{Expression, Node, Statement};
use crate::analysis::{word_at_position, Document, WordChars};

/// Declaration site of a name, 0-indexed.
///
/// The tree carries no columns, so `column` is always 0.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DefLocation {
    pub line: u32,
    pub column: u32,
}

impl DefLocation {
    /// Location from a 1-indexed tree line.
    fn at_tree_line(line: u32) -> Self {
        Self {
            line: line.saturating_sub(1),
            column: 0,
        }
    }
}

/// Get definition location for the identifier at `position`.
pub fn get_definition(
    doc: &Document,
    uri: &Url,
    position: Position,
) -> Option<GotoDefinitionResponse> {
    let word = word_at_position(
        &doc.lines,
        position.line,
        position.character,
        WordChars::IDENTIFIER,
    )?;
    tracing::debug!("Definition word: {}", word);

    let tree = doc.tree.as_ref()?;
    let Some(loc) = find_definition_location(tree.into(), &word) else {
        tracing::debug!("No definition found for '{}'", word);
        return None;
    };

    let width = word.chars().count() as u32;
    let range = Range {
        start: Position {
            line: loc.line,
            character: loc.column,
        },
        end: Position {
            line: loc.line,
            character: loc.column + width,
        },
    };

    Some(GotoDefinitionResponse::Link(vec![LocationLink {
        origin_selection_range: None,
        target_uri: target_uri(uri),
        target_range: range,
        target_selection_range: range,
    }]))
}

/// First declaration of `name` in pre-order.
///
/// Only programs, blocks, `fanya` values, expression statements, function
/// literals and packages are descended into. Declarations inside `kama`,
/// loops or call arguments are not reachable.
pub fn find_definition_location(node: Node<'_>, name: &str) -> Option<DefLocation> {
    match node {
        Node::Program(program) => program
            .statements
            .iter()
            .find_map(|stmt| find_definition_location(Node::Statement(stmt), name)),
        Node::Block(block) => block
            .statements
            .iter()
            .find_map(|stmt| find_definition_location(Node::Statement(stmt), name)),
        Node::Statement(Statement::Let(stmt)) => {
            if stmt.name.value == name {
                return Some(DefLocation::at_tree_line(stmt.line));
            }
            stmt.value
                .as_ref()
                .and_then(|value| find_definition_location(Node::Expression(value), name))
        }
        Node::Statement(Statement::Expression(stmt)) => {
            find_definition_location(Node::Expression(&stmt.expression), name)
        }
        Node::Expression(Expression::Assign(assign)) => {
            (assign.name.value == name).then(|| DefLocation::at_tree_line(assign.line))
        }
        Node::Expression(Expression::Function(func)) => {
            if let Some(param) = func.parameters.iter().find(|p| p.value == name) {
                return Some(DefLocation::at_tree_line(param.line));
            }
            find_definition_location(Node::Block(&func.body), name)
        }
        Node::Expression(Expression::Package(pkg)) => {
            if pkg.name.value == name {
                return Some(DefLocation::at_tree_line(pkg.line));
            }
            find_definition_location(Node::Block(&pkg.block), name)
        }
        _ => None,
    }
}

/// Prefix `uri` with `file://` unless it already carries it.
pub fn normalize_uri(uri: &str) -> String {
    if uri.starts_with("file://") {
        uri.to_string()
    } else {
        format!("file://{}", uri)
    }
}

fn target_uri(uri: &Url) -> Url {
    Url::parse(&normalize_uri(uri.as_str())).unwrap_or_else(|_| uri.clone())
}
