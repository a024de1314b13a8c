//! Static per-language parsing-service registry.
//!
//! Each entry names the JSON-RPC method and TCP port of the external
//! parsing service for one language, plus the file extensions it handles.
//! The table is built once at startup and never mutated; lookups go through
//! [`lookup_language`] and [`language_for_path`].

use std::collections::HashMap;

use once_cell::sync::Lazy;

/// How to reach the parsing service for one language.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LanguageService {
    /// Language key, e.g. `python`.
    pub language: &'static str,
    /// JSON-RPC method name exposed by the service.
    pub method: &'static str,
    /// TCP port the service listens on.
    pub port: u16,
    /// File extensions handled by this language, including the leading dot.
    pub extensions: &'static [&'static str],
}

/// All supported languages.
static REGISTRY: &[LanguageService] = &[
    LanguageService {
        language: "python",
        method: "parse_python_code",
        port: 5000,
        extensions: &[".py"],
    },
    LanguageService {
        language: "typescript",
        method: "parse_typescript_code",
        port: 5001,
        extensions: &[".ts", ".tsx"],
    },
    LanguageService {
        language: "javascript",
        method: "parse_javascript_code",
        port: 5001,
        extensions: &[".js", ".jsx"],
    },
];

/// Extension -> service index, built once on first use.
static EXTENSION_INDEX: Lazy<HashMap<&'static str, &'static LanguageService>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for service in REGISTRY {
        for ext in service.extensions {
            index.insert(*ext, service);
        }
    }
    index
});

/// All registered language services.
pub fn all_languages() -> &'static [LanguageService] {
    REGISTRY
}

/// Look up a service by language key.
pub fn lookup_language(language: &str) -> Option<&'static LanguageService> {
    REGISTRY.iter().find(|s| s.language == language)
}

/// Resolve the service for a file path by its extension.
///
/// Returns `None` for unsupported extensions; callers skip such files.
pub fn language_for_path(path: &str) -> Option<&'static LanguageService> {
    EXTENSION_INDEX
        .iter()
        .find(|(ext, _)| path.ends_with(*ext))
        .map(|(_, service)| *service)
}
