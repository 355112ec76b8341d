//! Importable module names.

use std::collections::BTreeSet;

/// Modules shipped with the Nuru standard library.
pub const STANDARD_MODULES: &[&str] = &["hisabati", "jsoni", "muda", "mtandao", "os"];

/// Module names recognized after `tumia`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ImportTable {
    modules: BTreeSet<String>,
}

impl Default for ImportTable {
    fn default() -> Self {
        Self::with_modules(STANDARD_MODULES.iter().copied())
    }
}

impl ImportTable {
    /// Table holding exactly `modules`.
    pub fn with_modules<I, S>(modules: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            modules: modules.into_iter().map(Into::into).collect(),
        }
    }

    /// Add project-specific modules.
    pub fn extend<I, S>(&mut self, modules: I)
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.modules.extend(modules.into_iter().map(Into::into));
    }

    /// Exact, case-sensitive membership.
    pub fn contains(&self, name: &str) -> bool {
        self.modules.contains(name)
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.modules.iter().map(String::as_str)
    }
}
