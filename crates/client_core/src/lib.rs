use std::sync::Arc;

use shared::{domain::ThreadId, protocol::ChatRequest};
use tokio::sync::{broadcast, Mutex};
use tracing::{info, warn};

pub mod transcript;
pub mod transport;

pub use transcript::{Message, Transcript};
pub use transport::{ChatTransport, HttpChatTransport, TransportError};

pub const DEFAULT_GREETING: &str =
    "Hey! Drop a brief or describe your style. I can line up the right people.";
pub const FALLBACK_REPLY: &str = "Oops, something went wrong.";

#[derive(Debug, Clone)]
pub enum ChatEvent {
    MessageAppended { index: usize, message: Message },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    /// Input was empty after trimming; nothing was appended or sent.
    Ignored,
    Replied,
    /// The request failed and the fallback turn was appended instead.
    Failed,
}

struct ChatState {
    transcript: Transcript,
    draft: String,
}

/// Owns one conversation thread and drives request/reply round trips.
///
/// Sends are serialized: a send holds `send_lock` for its whole round trip,
/// so overlapping callers queue in FIFO order and replies land in request
/// order. The transcript lock is never held across the network call.
pub struct ChatClient {
    thread_id: ThreadId,
    transport: Arc<dyn ChatTransport>,
    inner: Mutex<ChatState>,
    send_lock: Mutex<()>,
    events: broadcast::Sender<ChatEvent>,
}

impl ChatClient {
    pub fn new(transport: Arc<dyn ChatTransport>) -> Arc<Self> {
        Self::with_greeting(transport, DEFAULT_GREETING)
    }

    pub fn with_greeting(
        transport: Arc<dyn ChatTransport>,
        greeting: impl Into<String>,
    ) -> Arc<Self> {
        let (events, _) = broadcast::channel(256);
        let mut transcript = Transcript::new();
        transcript.push(Message::assistant(greeting));
        Arc::new(Self {
            thread_id: ThreadId::generate(),
            transport,
            inner: Mutex::new(ChatState {
                transcript,
                draft: String::new(),
            }),
            send_lock: Mutex::new(()),
            events,
        })
    }

    pub fn thread_id(&self) -> ThreadId {
        self.thread_id
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ChatEvent> {
        self.events.subscribe()
    }

    pub async fn messages(&self) -> Vec<Message> {
        self.inner.lock().await.transcript.messages().to_vec()
    }

    pub async fn latest_with_recommendations(&self) -> Option<Message> {
        let guard = self.inner.lock().await;
        guard.transcript.latest_with_recommendations().cloned()
    }

    pub async fn set_draft(&self, text: impl Into<String>) {
        self.inner.lock().await.draft = text.into();
    }

    pub async fn draft(&self) -> String {
        self.inner.lock().await.draft.clone()
    }

    /// Sends whatever is in the draft buffer, leaving the buffer empty.
    pub async fn send_draft(&self) -> SendOutcome {
        let text = std::mem::take(&mut self.inner.lock().await.draft);
        self.send(&text).await
    }

    pub async fn send(&self, text: &str) -> SendOutcome {
        let text = text.trim();
        if text.is_empty() {
            return SendOutcome::Ignored;
        }

        let _in_flight = self.send_lock.lock().await;

        let request = {
            let mut guard = self.inner.lock().await;
            let index = guard.transcript.push(Message::user(text));
            guard.draft.clear();
            self.emit_appended(index, &guard.transcript);
            ChatRequest {
                thread_id: self.thread_id,
                messages: guard.transcript.outgoing_turns(),
            }
        };

        info!(
            thread_id = %self.thread_id,
            history = request.messages.len(),
            "sending chat message"
        );

        let (reply, outcome) = match self.transport.send_chat(&request).await {
            Ok(response) => {
                info!(
                    thread_id = %self.thread_id,
                    recommendations = response.recommendations.len(),
                    "chat reply received"
                );
                (
                    Message::assistant_with_recommendations(
                        response.reply,
                        response.recommendations,
                    ),
                    SendOutcome::Replied,
                )
            }
            Err(err) => {
                warn!(thread_id = %self.thread_id, "chat request failed: {err}");
                (Message::assistant(FALLBACK_REPLY), SendOutcome::Failed)
            }
        };

        let mut guard = self.inner.lock().await;
        let index = guard.transcript.push(reply);
        self.emit_appended(index, &guard.transcript);
        outcome
    }

    fn emit_appended(&self, index: usize, transcript: &Transcript) {
        if let Some(message) = transcript.messages().get(index) {
            let _ = self.events.send(ChatEvent::MessageAppended {
                index,
                message: message.clone(),
            });
        }
    }
}

#[cfg(test)]
#[path = "tests/lib_tests.rs"]
mod tests;

#[cfg(test)]
#[path = "tests/transport_tests.rs"]
mod transport_tests;
