//! Hover handler for the Nuru Language Server.

use std::collections::HashMap;
use std::sync::LazyLock;

use tower_lsp::lsp_types::*;

use crate::analysis::ast::{Expression, Node, Statement};
use crate::analysis::{word_at_position, Document, WordChars};
use crate::handlers::builtins;
use crate::handlers::imports::ImportTable;

/// Reserved words and operators with their descriptions.
pub static KEYWORD_DOCS: LazyLock<HashMap<&'static str, &'static str>> = LazyLock::new(|| {
    HashMap::from([
        ("fanya", "Kutangaza kigezo kipya\nMfano: fanya x = 5"),
        ("unda", "Kuunda function mpya\nMfano: unda(a, b) { rudisha a + b }"),
        (
            "kama",
            "Kauli ya masharti (if statement)\nMfano: kama (x > 5) { andika(x) }",
        ),
        (
            "sivyo",
            "Sehemu ya sivyo ya kauli ya masharti (else)\nMfano: kama (x > 5) { ... } sivyo { ... }",
        ),
        (
            "au",
            "Masharti mengine (else if)\nMfano: kama (x > 5) { ... } au (x > 3) { ... }",
        ),
        (
            "wakati",
            "Kitanzi cha wakati (while loop)\nMfano: wakati (x < 10) { x = x + 1 }",
        ),
        (
            "kwa",
            "Kitanzi cha kwa (for loop)\nMfano: kwa i ktk orodha { andika(i) }",
        ),
        (
            "ktk",
            "Ndani ya (in) - kutumika na kitanzi\nMfano: kwa i ktk [1,2,3] { ... }",
        ),
        (
            "rudisha",
            "Kurudisha thamani kutoka kwa function\nMfano: rudisha x + y",
        ),
        ("vunja", "Kuvunja kitanzi (break)\nMfano: vunja"),
        (
            "endelea",
            "Kuendelea na iteration inayofuata (continue)\nMfano: endelea",
        ),
        ("kweli", "Thamani ya kweli (true)"),
        ("sikweli", "Thamani ya sikweli (false)"),
        ("tupu", "Thamani tupu (null)"),
        (
            "badili",
            "Kauli ya kubadili (switch statement)\nMfano: badili x { ikiwa 1 { ... } }",
        ),
        (
            "ikiwa",
            "Kesi katika kauli ya badili (case)\nMfano: ikiwa 1 { andika(\"moja\") }",
        ),
        (
            "kawaida",
            "Kesi ya kawaida katika badili (default)\nMfano: kawaida { andika(\"nyingine\") }",
        ),
        ("tumia", "Kuingiza pakeji/moduli\nMfano: tumia hisabati"),
        ("pakeji", "Kutangaza pakeji\nMfano: pakeji jina { ... }"),
        ("@", "Rejeleo la sasa (this/self reference)"),
    ])
});

/// Get hover information at position.
pub fn get_hover(doc: &Document, position: Position, imports: &ImportTable) -> Option<Hover> {
    let word = word_at_position(&doc.lines, position.line, position.character, WordChars::HOVER)?;
    tracing::debug!("Hover word: {}", word);

    let text = describe(&word, doc, imports)?;
    Some(Hover {
        contents: HoverContents::Markup(MarkupContent {
            kind: MarkupKind::Markdown,
            value: text,
        }),
        range: None,
    })
}

/// Description of `word`: keyword, then builtin, then declaration, then module.
pub fn describe(word: &str, doc: &Document, imports: &ImportTable) -> Option<String> {
    if let Some(text) = KEYWORD_DOCS.get(word) {
        return Some(text.to_string());
    }

    if let Some(text) = builtins::lookup(word) {
        return Some(text.to_string());
    }

    if let Some(text) = doc
        .tree
        .as_ref()
        .and_then(|tree| find_declaration_text(tree.into(), word))
    {
        return Some(text);
    }

    if imports.contains(word) {
        return Some(format!("Pakeji: {}\nTumia: tumia {}", word, word));
    }

    tracing::debug!("No hover text for '{}'", word);
    None
}

/// Render the first declaration of `name`.
///
/// Narrower than the definition search: `fanya` values and function
/// parameters are not searched, and packages are not descended into.
pub fn find_declaration_text(node: Node<'_>, name: &str) -> Option<String> {
    match node {
        Node::Program(program) => program
            .statements
            .iter()
            .find_map(|stmt| find_declaration_text(Node::Statement(stmt), name)),
        Node::Block(block) => block
            .statements
            .iter()
            .find_map(|stmt| find_declaration_text(Node::Statement(stmt), name)),
        Node::Statement(Statement::Let(stmt)) if stmt.name.value == name => {
            Some(match &stmt.value {
                Some(value) => format!("fanya {} = {}", name, value),
                None => format!("fanya {}", name),
            })
        }
        Node::Statement(Statement::Expression(stmt)) => {
            find_declaration_text(Node::Expression(&stmt.expression), name)
        }
        Node::Expression(Expression::Assign(assign)) if assign.name.value == name => {
            Some(format!("{} = {}", name, assign.value))
        }
        Node::Expression(Expression::Function(func)) => {
            find_declaration_text(Node::Block(&func.body), name)
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn hover_text(source: &str, line: u32, character: u32) -> Option<String> {
        let doc = Document::from_text(source);
        let hover = get_hover(&doc, Position::new(line, character), &ImportTable::default())?;
        match hover.contents {
            HoverContents::Markup(content) => {
                assert_eq!(content.kind, MarkupKind::Markdown);
                Some(content.value)
            }
            other => panic!("Expected markup content, got {:?}", other),
        }
    }

    #[test]
    fn test_let_declaration() {
        assert_eq!(
            hover_text("fanya jumla = 10\nandika(jumla)", 1, 8),
            Some("fanya jumla = 10".to_string())
        );
    }

    #[test]
    fn test_let_without_value() {
        assert_eq!(hover_text("fanya x\nx", 1, 0), Some("fanya x".to_string()));
    }

    #[test]
    fn test_assign_renders_value() {
        assert_eq!(
            hover_text("idadi = 2 * 3\nidadi", 1, 1),
            Some("idadi = (2 * 3)".to_string())
        );
    }

    #[test]
    fn test_keyword_table() {
        let text = hover_text("fanya x = 5", 0, 2).unwrap();
        assert!(text.starts_with("Kutangaza kigezo kipya"));
    }

    #[test]
    fn test_self_reference_marker() {
        let text = hover_text("pakeji P {\n  f = unda() { rudisha @.x }\n}", 1, 23);
        assert_eq!(text.as_deref(), Some("Rejeleo la sasa (this/self reference)"));
    }

    #[test]
    fn test_builtin_before_declaration() {
        let text = hover_text("andika = 5\nandika", 1, 0).unwrap();
        assert!(text.starts_with("Kuandika thamani"));
    }

    #[test]
    fn test_keyword_precedes_declaration() {
        let doc = Document::from_parts(
            vec!["kweli".to_string()],
            Some(crate::analysis::parse_program("kweli_ = 1").unwrap()),
        );
        // The tree cannot bind a reserved word, so build the clash by hand.
        let mut tree = doc.tree.clone().unwrap();
        if let Statement::Expression(stmt) = &mut tree.statements[0] {
            if let Expression::Assign(assign) = &mut stmt.expression {
                assign.name.value = "kweli".to_string();
            }
        }
        assert_eq!(
            find_declaration_text((&tree).into(), "kweli"),
            Some("kweli = 1".to_string())
        );
        let doc = Document::from_parts(doc.lines, Some(tree));
        assert_eq!(
            describe("kweli", &doc, &ImportTable::default()),
            Some("Thamani ya kweli (true)".to_string())
        );
    }

    #[test]
    fn test_declaration_precedes_import() {
        assert_eq!(
            hover_text("fanya muda = 3\nmuda", 1, 1),
            Some("fanya muda = 3".to_string())
        );
    }

    #[test]
    fn test_import_only_name() {
        assert_eq!(
            hover_text("tumia hisabati", 0, 8),
            Some("Pakeji: hisabati\nTumia: tumia hisabati".to_string())
        );
    }

    #[test]
    fn test_let_value_is_not_searched() {
        let source = "fanya f = unda() {\n fanya ndani = 1\n}\nndani";
        assert_eq!(hover_text(source, 3, 1), None);
    }

    #[test]
    fn test_function_body_is_searched_but_not_parameters() {
        let source = "unda(param) {\n fanya ndani = 1\n}\nndani param";
        assert_eq!(hover_text(source, 3, 1), Some("fanya ndani = 1".to_string()));
        assert_eq!(hover_text(source, 3, 8), None);
    }

    #[test]
    fn test_package_is_not_descended() {
        let source = "pakeji P {\n fanya ndani = 1\n}\nndani";
        assert_eq!(hover_text(source, 3, 1), None);
    }

    #[test]
    fn test_unknown_and_out_of_range() {
        assert_eq!(hover_text("fanya x = 1", 0, 9), None);
        assert_eq!(hover_text("fanya x = 1\nhaijulikani", 1, 3), None);
        assert_eq!(hover_text("fanya x = 1", 5, 0), None);
        assert_eq!(hover_text("fanya x = 1", 0, 40), None);
    }
}
