//! Response envelope for successful Spikkl calls
//!
//! Successful responses arrive as `{"status": "ok", "meta": {...},
//! "results": [...]}`. Result records are domain data the service is free to
//! extend, so they are carried as raw JSON values and only the `results`
//! sequence is surfaced to callers.

use serde::Deserialize;
use serde_json::Value;

/// A successful response, as returned by the lookup and reverse endpoints
#[derive(Debug, Clone, Deserialize)]
pub struct ApiResponse {
    /// Literal `"ok"` on success
    #[serde(default)]
    pub status: String,

    /// Request metadata echoed by the service, not interpreted
    #[serde(default)]
    pub meta: Option<Value>,

    /// The matched address or coordinate records, in service order
    #[serde(default)]
    pub results: Vec<Value>,
}
