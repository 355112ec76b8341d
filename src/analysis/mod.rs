//! Document analysis for the Nuru Language Server.
//!
//! Handles parsing, document tracking, and cursor word lookup.

pub mod ast;
pub mod document;
pub mod parser;
pub mod word;

pub use document::{Document, DocumentStore};
pub use parser::{parse_program, ParseError};
pub use word::{word_at_position, PositionEncoding, WordChars};
