//! In-memory `CoachBackend` used by the unit tests of this crate.

use crate::conversation::CoachRequest;
use crate::domain::{Gender, Message, Profile, TokenUsage};
use crate::ports::{CoachBackend, CoachReply, ConversationSnapshot, PortError, PortResult};
use async_trait::async_trait;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub fn sample_profile() -> Profile {
    Profile {
        name: Some("Alex Johnson".to_string()),
        age: 28,
        gender: Gender::Male,
        height: 178.0,
        weight: 75.0,
    }
}

pub struct FakeBackend {
    outcome: Result<String, PortError>,
    clear_outcome: PortResult<()>,
    snapshot: ConversationSnapshot,
    requests: Mutex<Vec<CoachRequest>>,
    calls: AtomicUsize,
    clears: AtomicUsize,
}

impl FakeBackend {
    pub fn replying(content: &str) -> Self {
        Self::with_outcome(Ok(content.to_string()))
    }

    pub fn failing(error: PortError) -> Self {
        Self::with_outcome(Err(error))
    }

    fn with_outcome(outcome: Result<String, PortError>) -> Self {
        Self {
            outcome,
            clear_outcome: Ok(()),
            snapshot: ConversationSnapshot {
                conversation_id: None,
                messages: Vec::new(),
            },
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
            clears: AtomicUsize::new(0),
        }
    }

    pub fn with_clear_outcome(mut self, outcome: PortResult<()>) -> Self {
        self.clear_outcome = outcome;
        self
    }

    pub fn with_snapshot(mut self, snapshot: ConversationSnapshot) -> Self {
        self.snapshot = snapshot;
        self
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn clears(&self) -> usize {
        self.clears.load(Ordering::SeqCst)
    }

    pub fn last_request(&self) -> Option<CoachRequest> {
        self.requests.lock().unwrap().last().cloned()
    }

    fn reply_to(&self, message: &str) -> PortResult<CoachReply> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        let content = self.outcome.clone()?;
        Ok(CoachReply {
            conversation_id: Some("conv-1".to_string()),
            user_message: Message::user(message),
            assistant_message: Message::assistant(
                content,
                TokenUsage {
                    input_tokens: 120,
                    output_tokens: 30,
                },
            ),
        })
    }
}

#[async_trait]
impl CoachBackend for FakeBackend {
    async fn send_with_data(&self, request: &CoachRequest) -> PortResult<CoachReply> {
        self.requests.lock().unwrap().push(request.clone());
        self.reply_to(&request.message)
    }

    async fn send_message(&self, message: &str) -> PortResult<CoachReply> {
        self.reply_to(message)
    }

    async fn get_conversation(&self) -> PortResult<ConversationSnapshot> {
        Ok(self.snapshot.clone())
    }

    async fn clear_conversation(&self) -> PortResult<()> {
        self.clears.fetch_add(1, Ordering::SeqCst);
        self.clear_outcome.clone()
    }

    async fn check_connection(&self) -> PortResult<()> {
        Ok(())
    }
}
