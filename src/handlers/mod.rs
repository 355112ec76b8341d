//! LSP request handlers.

pub mod builtins;
pub mod diagnostics;
pub mod goto_definition;
pub mod hover;
pub mod imports;
