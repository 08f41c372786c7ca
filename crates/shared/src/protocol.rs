use serde::{Deserialize, Deserializer, Serialize};

use crate::{
    domain::{RecommendationKind, Role, ThreadId},
    error::ProtocolError,
};

pub const CHAT_PATH: &str = "/api/chat";

/// One history entry as it goes over the wire. Never carries recommendations.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ChatTurn {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatRequest {
    pub thread_id: ThreadId,
    pub messages: Vec<ChatTurn>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatResponse {
    pub reply: String,
    #[serde(default)]
    pub recommendations: Vec<Recommendation>,
}

impl ChatResponse {
    pub fn from_slice(bytes: &[u8]) -> Result<Self, ProtocolError> {
        Ok(serde_json::from_slice(bytes)?)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub id: String,
    pub kind: RecommendationKind,
    pub title: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub subtitle: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub media_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance_km: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(
        default,
        deserialize_with = "meta_or_default",
        skip_serializing_if = "RecommendationMeta::is_empty"
    )]
    pub meta: RecommendationMeta,
}

/// Display metadata attached to a recommendation.
///
/// The backend sends a free-form object here. Only the keys below are kept;
/// anything else is dropped, and keys with an unexpected shape fall back to
/// their empty value instead of failing the whole response.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecommendationMeta {
    #[serde(
        default,
        deserialize_with = "styles_or_empty",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub styles: Vec<String>,
    #[serde(
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub portfolio_url: Option<String>,
}

impl RecommendationMeta {
    pub fn is_empty(&self) -> bool {
        self.styles.is_empty() && self.portfolio_url.is_none()
    }
}

fn meta_or_default<'de, D>(deserializer: D) -> Result<RecommendationMeta, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    if !value.is_object() {
        return Ok(RecommendationMeta::default());
    }
    Ok(serde_json::from_value(value).unwrap_or_default())
}

fn styles_or_empty<'de, D>(deserializer: D) -> Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = serde_json::Value::deserialize(deserializer)?;
    let serde_json::Value::Array(items) = value else {
        return Ok(Vec::new());
    };
    if !items.iter().all(serde_json::Value::is_string) {
        return Ok(Vec::new());
    }
    Ok(items
        .into_iter()
        .filter_map(|item| match item {
            serde_json::Value::String(s) => Some(s),
            _ => None,
        })
        .collect())
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    match serde_json::Value::deserialize(deserializer)? {
        serde_json::Value::String(s) if !s.is_empty() => Ok(Some(s)),
        _ => Ok(None),
    }
}
