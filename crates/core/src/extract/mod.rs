//! Structure extraction: turning source text into a structure map.
//!
//! The [`StructureExtractor`] trait is the seam between the diff engine and
//! the per-language parsing services. [`RemoteExtractor`] is the
//! authoritative implementation speaking JSON-RPC to those services;
//! [`FallbackExtractor`] wraps any extractor and degrades every failure to
//! an empty map so one unreachable service never aborts a diff.

pub mod fallback;
pub mod remote;

pub use fallback::FallbackExtractor;
pub use remote::RemoteExtractor;

use async_trait::async_trait;

use crate::errors::ExtractError;
use crate::models::StructureMap;

/// Extracts the function/class structure of one file version.
///
/// Implementations must recurse into every nesting level so inner
/// definitions are discovered and keyed by their dotted path.
#[async_trait]
pub trait StructureExtractor: Send + Sync {
    async fn extract(&self, source: &str, language: &str) -> Result<StructureMap, ExtractError>;
}
