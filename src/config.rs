//! Server settings supplied by the client.

use serde::Deserialize;
use serde_json::Value;

/// `initializationOptions` understood by the server.
///
/// ```json
/// { "extraImports": ["takwimu"], "publishDiagnostics": true }
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ServerConfig {
    /// Module names recognized in addition to the standard library
    pub extra_imports: Vec<String>,
    /// Publish parse errors as diagnostics
    pub publish_diagnostics: bool,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            extra_imports: Vec::new(),
            publish_diagnostics: true,
        }
    }
}

impl ServerConfig {
    /// Read settings from `initializationOptions`, falling back to defaults.
    pub fn from_initialization_options(options: Option<Value>) -> Self {
        match options {
            None | Some(Value::Null) => Self::default(),
            Some(value) => serde_json::from_value(value).unwrap_or_else(|e| {
                tracing::warn!("Ignoring invalid initializationOptions: {}", e);
                Self::default()
            }),
        }
    }
}
