use chrono::{DateTime, Utc};
use shared::{
    domain::Role,
    protocol::{ChatTurn, Recommendation},
};

#[derive(Debug, Clone, PartialEq)]
pub struct Message {
    pub role: Role,
    pub content: String,
    /// `Some` only on assistant turns built from a successful reply.
    pub recommendations: Option<Vec<Recommendation>>,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: Role::User,
            content: content.into(),
            recommendations: None,
            created_at: Utc::now(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: Role::Assistant,
            content: content.into(),
            recommendations: None,
            created_at: Utc::now(),
        }
    }

    pub fn assistant_with_recommendations(
        content: impl Into<String>,
        recommendations: Vec<Recommendation>,
    ) -> Self {
        Self {
            recommendations: Some(recommendations),
            ..Self::assistant(content)
        }
    }

    pub fn has_recommendations(&self) -> bool {
        self.recommendations
            .as_ref()
            .is_some_and(|recs| !recs.is_empty())
    }

    pub fn to_turn(&self) -> ChatTurn {
        ChatTurn {
            role: self.role,
            content: self.content.clone(),
        }
    }
}

/// Append-only, display-ordered message list.
#[derive(Debug, Clone, Default)]
pub struct Transcript {
    messages: Vec<Message>,
}

impl Transcript {
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `message` and returns its index.
    pub fn push(&mut self, message: Message) -> usize {
        self.messages.push(message);
        self.messages.len() - 1
    }

    pub fn messages(&self) -> &[Message] {
        &self.messages
    }

    pub fn len(&self) -> usize {
        self.messages.len()
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }

    pub fn outgoing_turns(&self) -> Vec<ChatTurn> {
        self.messages.iter().map(Message::to_turn).collect()
    }

    pub fn latest_with_recommendations(&self) -> Option<&Message> {
        self.messages.iter().rev().find(|m| m.has_recommendations())
    }
}
