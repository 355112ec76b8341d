//! Nuru Language Server library.
//!
//! Exposes the analysis and handler modules so they can be tested
//! without the stdio transport.

pub mod analysis;
pub mod config;
pub mod handlers;
pub mod server;

pub use server::NuruLanguageServer;
