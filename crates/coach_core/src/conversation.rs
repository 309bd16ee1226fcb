//! crates/coach_core/src/conversation.rs
//!
//! The conversation client for the data-driven mode: one request per turn carrying
//! the profile, the uploaded data, the workout library and a bounded slice of the
//! prior conversation.

use crate::domain::{AvailableWorkout, HealthRecord, Message, Profile, Role, WorkoutHistoryEntry};
use crate::ports::{CoachBackend, CoachReply, PortError, PortResult};
use std::sync::Arc;
use tracing::{debug, info};

/// Maximum number of prior messages sent along with a new one.
pub const HISTORY_WINDOW: usize = 6;

/// Returns the last `HISTORY_WINDOW` messages, oldest first.
pub fn trim_history(prior: &[Message]) -> &[Message] {
    let start = prior.len().saturating_sub(HISTORY_WINDOW);
    &prior[start..]
}

//=========================================================================================
// Request and Outcome
//=========================================================================================

/// Everything the backend receives for one data-driven turn.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachRequest {
    pub message: String,
    pub profile: Profile,
    pub health_data: Vec<HealthRecord>,
    pub workout_history: Vec<WorkoutHistoryEntry>,
    /// The full library; the backend keeps no copy of it per conversation.
    pub available_workouts: Vec<AvailableWorkout>,
    /// Already trimmed to `HISTORY_WINDOW`.
    pub history: Vec<Message>,
}

impl CoachRequest {
    pub fn assemble(
        message: &str,
        profile: &Profile,
        health_data: &[HealthRecord],
        workout_history: &[WorkoutHistoryEntry],
        available_workouts: &[AvailableWorkout],
        prior_messages: &[Message],
    ) -> Self {
        Self {
            message: message.to_string(),
            profile: profile.clone(),
            health_data: health_data.to_vec(),
            workout_history: workout_history.to_vec(),
            available_workouts: available_workouts.to_vec(),
            history: trim_history(prior_messages).to_vec(),
        }
    }
}

/// The two messages of a completed turn.
#[derive(Debug, Clone, PartialEq)]
pub struct Exchange {
    pub conversation_id: Option<String>,
    pub user: Message,
    pub assistant: Message,
}

impl TryFrom<CoachReply> for Exchange {
    type Error = PortError;

    fn try_from(reply: CoachReply) -> Result<Self, Self::Error> {
        if reply.user_message.content.trim().is_empty() {
            return Err(PortError::InvalidResponse(
                "user_message is missing its content".to_string(),
            ));
        }
        if reply.assistant_message.content.trim().is_empty() {
            return Err(PortError::InvalidResponse(
                "assistant_message is missing its content".to_string(),
            ));
        }

        let mut user = reply.user_message;
        user.role = Role::User;
        user.usage = None;

        let mut assistant = reply.assistant_message;
        assistant.role = Role::Assistant;
        assistant.usage = Some(assistant.usage.unwrap_or_default());

        Ok(Self {
            conversation_id: reply.conversation_id,
            user,
            assistant,
        })
    }
}

//=========================================================================================
// Client
//=========================================================================================

#[derive(Clone)]
pub struct ConversationClient {
    backend: Arc<dyn CoachBackend>,
}

impl ConversationClient {
    pub fn new(backend: Arc<dyn CoachBackend>) -> Self {
        Self { backend }
    }

    pub fn backend(&self) -> &Arc<dyn CoachBackend> {
        &self.backend
    }

    /// Sends one data-driven turn. Makes exactly one backend call and never retries.
    pub async fn send(
        &self,
        message: &str,
        profile: &Profile,
        health_data: &[HealthRecord],
        workout_history: &[WorkoutHistoryEntry],
        available_workouts: &[AvailableWorkout],
        prior_messages: &[Message],
    ) -> PortResult<Exchange> {
        let request = CoachRequest::assemble(
            message,
            profile,
            health_data,
            workout_history,
            available_workouts,
            prior_messages,
        );
        debug!(
            health = request.health_data.len(),
            workouts = request.workout_history.len(),
            library = request.available_workouts.len(),
            history = request.history.len(),
            "Sending data-driven coach message"
        );

        let reply = self.backend.send_with_data(&request).await?;
        let exchange = Exchange::try_from(reply)?;

        if let Some(usage) = exchange.assistant.usage {
            info!(
                input_tokens = usage.input_tokens,
                output_tokens = usage.output_tokens,
                "Coach replied"
            );
        }
        Ok(exchange)
    }

    /// Sends a message in tool mode, where the backend gathers the data itself.
    pub async fn send_tool_mode(&self, message: &str) -> PortResult<Exchange> {
        let reply = self.backend.send_message(message).await?;
        Exchange::try_from(reply)
    }
}
