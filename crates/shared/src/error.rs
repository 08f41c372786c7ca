use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error body returned by the chat backend on non-success responses.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorBody {
    #[serde(default)]
    pub detail: serde_json::Value,
}

impl ApiErrorBody {
    /// Renders `detail` as a single log-friendly line.
    pub fn summary(&self) -> Option<String> {
        match &self.detail {
            serde_json::Value::Null => None,
            serde_json::Value::String(s) => Some(s.clone()),
            other => Some(other.to_string()),
        }
    }
}

#[derive(Debug, Error)]
pub enum ProtocolError {
    #[error("malformed chat payload: {0}")]
    Malformed(#[from] serde_json::Error),
}
