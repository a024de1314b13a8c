//! JSON-RPC client for the external per-language parsing services.
//!
//! Each supported language runs a small parsing server (see the static
//! table in [`crate::language`]) that accepts
//! `{"jsonrpc": "2.0", "method": <method>, "params": {"code": ...}, "id": N}`
//! on `/api/v1/jsonrpc` and answers with a mapping of qualified names to
//! definition metadata.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tracing::debug;

use crate::config::ServiceConfig;
use crate::errors::ExtractError;
use crate::language;
use crate::models::{CodePosition, Definition, NodeKind, StructureMap};

use super::StructureExtractor;

// ---------------------------------------------------------------------------
// Wire types
// ---------------------------------------------------------------------------

#[derive(Debug, Deserialize)]
struct RpcResponse {
    #[serde(default)]
    result: Option<serde_json::Value>,
    #[serde(default)]
    error: Option<RpcError>,
}

#[derive(Debug, Deserialize)]
struct RpcError {
    code: i64,
    message: String,
}

/// One definition as reported by a parsing service.
#[derive(Debug, Deserialize)]
struct RawDefinition {
    #[serde(rename = "type", default)]
    kind: Option<String>,
    #[serde(default)]
    source: Option<String>,
    #[serde(default)]
    start_line: u32,
    #[serde(default)]
    end_line: u32,
    #[serde(default)]
    start_column: u32,
    #[serde(default)]
    end_column: u32,
}

// ---------------------------------------------------------------------------
// Client
// ---------------------------------------------------------------------------

/// Remote structure extractor backed by the per-language parsing services.
pub struct RemoteExtractor {
    host: String,
    timeout: Duration,
    http: reqwest::Client,
    next_id: AtomicU64,
}

impl RemoteExtractor {
    /// Create an extractor for the services described by `config`.
    pub fn new(config: &ServiceConfig) -> Self {
        Self {
            host: config.host.clone(),
            timeout: Duration::from_millis(config.timeout_ms),
            http: reqwest::Client::new(),
            next_id: AtomicU64::new(1),
        }
    }

    fn timeout_ms(&self) -> u64 {
        self.timeout.as_millis() as u64
    }
}

#[async_trait]
impl StructureExtractor for RemoteExtractor {
    async fn extract(&self, source: &str, language: &str) -> Result<StructureMap, ExtractError> {
        // Nothing to parse; skip the network round-trip entirely.
        if source.is_empty() {
            return Ok(StructureMap::new());
        }

        let service = language::lookup_language(language)
            .ok_or_else(|| ExtractError::UnknownLanguage(language.to_string()))?;

        let url = format!("http://{}:{}/api/v1/jsonrpc", self.host, service.port);
        let id = self.next_id.fetch_add(1, Ordering::Relaxed);
        let payload = serde_json::json!({
            "jsonrpc": "2.0",
            "method": service.method,
            "params": { "code": source },
            "id": id,
        });

        debug!(language, url = %url, bytes = source.len(), "requesting structure extraction");

        let response = self
            .http
            .post(&url)
            .timeout(self.timeout)
            .json(&payload)
            .send()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if !response.status().is_success() {
            return Err(ExtractError::MalformedResponse(format!(
                "HTTP {}",
                response.status()
            )));
        }

        let body: RpcResponse = response
            .json()
            .await
            .map_err(|e| self.map_transport_error(e))?;

        if let Some(err) = body.error {
            return Err(ExtractError::MalformedResponse(format!(
                "rpc error {}: {}",
                err.code, err.message
            )));
        }

        let result = body
            .result
            .ok_or_else(|| ExtractError::MalformedResponse("missing result".into()))?;

        let raw: BTreeMap<String, RawDefinition> = serde_json::from_value(result)
            .map_err(|e| ExtractError::MalformedResponse(e.to_string()))?;

        let map: StructureMap = raw
            .into_iter()
            .map(|(name, def)| {
                let kind = def
                    .kind
                    .as_deref()
                    .map(NodeKind::from_str_val)
                    .unwrap_or(NodeKind::Definition);
                (
                    name,
                    Definition {
                        kind,
                        source: def.source.unwrap_or_default(),
                        position: CodePosition {
                            start_line: def.start_line,
                            end_line: def.end_line,
                            start_column: def.start_column,
                            end_column: def.end_column,
                        },
                    },
                )
            })
            .collect();

        debug!(language, definitions = map.len(), "structure extraction complete");
        Ok(map)
    }
}

impl RemoteExtractor {
    fn map_transport_error(&self, err: reqwest::Error) -> ExtractError {
        if err.is_timeout() {
            ExtractError::Timeout(self.timeout_ms())
        } else {
            ExtractError::HttpError(err)
        }
    }
}
