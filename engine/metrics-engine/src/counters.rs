//! Raw counter payloads from the analytics endpoint
//!
//! Wire shape: `{"total_requests": n, "backend": {..}, "client": {..}}`.
//! Individual fields may be absent and default to empty; a payload that is
//! not an object, or that carries neither `backend` nor `client`, is
//! rejected outright.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Errors rejecting a counters payload
#[derive(Error, Debug)]
pub enum ParseError {
    /// Payload is not a JSON object
    #[error("counters payload is not a JSON object")]
    NotAnObject,

    /// Payload carries neither backend nor client counters
    #[error("counters payload is missing both backend and client maps")]
    MissingCounters,

    /// Payload fields have the wrong shape
    #[error("invalid counters payload: {0}")]
    Json(#[from] serde_json::Error),
}

/// One poll's worth of cumulative counters from the analytics endpoint
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawCounters {
    /// Cumulative lifetime request count reported by the server
    #[serde(default)]
    pub total_requests: u64,

    /// Cumulative per-endpoint request counts
    #[serde(default)]
    pub backend: BTreeMap<String, u64>,

    /// Cumulative per-action counts; action names may carry semantic
    /// markers (`"user launch"`, the `"ad "` prefix)
    #[serde(default)]
    pub client: BTreeMap<String, u64>,
}

impl RawCounters {
    /// Validate and decode a counters payload
    pub fn from_value(value: serde_json::Value) -> Result<Self, ParseError> {
        let object = value.as_object().ok_or(ParseError::NotAnObject)?;

        if !object.contains_key("backend") && !object.contains_key("client") {
            return Err(ParseError::MissingCounters);
        }

        Ok(serde_json::from_value(value)?)
    }

    /// Sum of all backend endpoint counts
    pub fn backend_total(&self) -> u64 {
        self.backend.values().sum()
    }

    /// Sum of all client action counts
    pub fn client_total(&self) -> u64 {
        self.client.values().sum()
    }
}
