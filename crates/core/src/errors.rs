//! Error types for the semadiff core library.
//!
//! Each subsystem has its own error type derived with `thiserror`, and a
//! top-level [`CoreError`] enum unifies them for callers that want a single
//! error type. Only VCS errors are fatal for a whole diff request;
//! extraction errors degrade to empty structure maps before they can
//! surface.

use thiserror::Error;

// ---------------------------------------------------------------------------
// Top-level error
// ---------------------------------------------------------------------------

/// Unified error type for the entire core library.
#[derive(Debug, Error)]
pub enum CoreError {
    #[error(transparent)]
    Vcs(#[from] VcsError),

    #[error(transparent)]
    Extract(#[from] ExtractError),

    #[error(transparent)]
    Config(#[from] ConfigError),
}

// ---------------------------------------------------------------------------
// VCS errors
// ---------------------------------------------------------------------------

/// Errors from repository access.
#[derive(Debug, Error)]
pub enum VcsError {
    /// The given path does not exist or is not a git repository.
    #[error("git repository not found at '{0}'")]
    RepositoryNotFound(String),

    /// A branch name or revision could not be resolved to a commit.
    #[error("git ref not found: {0}")]
    RefNotFound(String),

    /// A `git2` library error.
    #[error("git2 error: {0}")]
    Git2Error(#[from] git2::Error),
}

// ---------------------------------------------------------------------------
// Extraction errors
// ---------------------------------------------------------------------------

/// Errors from the structure-extraction protocol.
///
/// None of these are fatal: the fallback extractor maps every variant to an
/// empty structure map for the affected file version.
#[derive(Debug, Error)]
pub enum ExtractError {
    /// No parsing service is registered for the language.
    #[error("no parsing service registered for language '{0}'")]
    UnknownLanguage(String),

    /// HTTP-level transport error (connection refused, DNS, TLS).
    #[error("parsing service HTTP error: {0}")]
    HttpError(#[from] reqwest::Error),

    /// The parsing service did not answer within the request timeout.
    #[error("parsing service timed out after {0} ms")]
    Timeout(u64),

    /// The service answered with something that is not a valid structure map.
    #[error("malformed parsing service response: {0}")]
    MalformedResponse(String),
}

// ---------------------------------------------------------------------------
// Configuration errors
// ---------------------------------------------------------------------------

/// Errors from configuration loading and validation.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Config file not found.
    #[error("configuration file not found: {0}")]
    FileNotFound(String),

    /// TOML parse error.
    #[error("configuration parse error: {0}")]
    ParseError(String),

    /// Generic I/O error reading the config file.
    #[error("configuration I/O error: {0}")]
    IoError(#[from] std::io::Error),
}
