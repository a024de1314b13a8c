//! Fallback decorator: degrade extraction failures to empty structure maps.
//!
//! Availability wins over completeness for a single file version: the worst
//! outcome of an unreachable or misbehaving parsing service is a file node
//! with no structural children, never a failed diff request.

use async_trait::async_trait;
use tracing::warn;

use crate::errors::ExtractError;
use crate::models::StructureMap;

use super::StructureExtractor;

/// Wraps any extractor and converts every error into an empty map.
pub struct FallbackExtractor<E> {
    inner: E,
}

impl<E: StructureExtractor> FallbackExtractor<E> {
    pub fn new(inner: E) -> Self {
        Self { inner }
    }

    /// Extract a structure map, degrading any failure to an empty map.
    ///
    /// No retries are performed; the failure is logged and swallowed.
    pub async fn extract_or_empty(&self, source: &str, language: &str) -> StructureMap {
        match self.inner.extract(source, language).await {
            Ok(map) => map,
            Err(err) => {
                warn!(language, error = %err, "structure extraction failed, degrading to empty map");
                StructureMap::new()
            }
        }
    }
}

#[async_trait]
impl<E: StructureExtractor> StructureExtractor for FallbackExtractor<E> {
    async fn extract(&self, source: &str, language: &str) -> Result<StructureMap, ExtractError> {
        Ok(self.extract_or_empty(source, language).await)
    }
}
