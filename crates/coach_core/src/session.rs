//! crates/coach_core/src/session.rs
//!
//! The session-scoped context: profile, uploaded data, the conversation log and the
//! state of the current turn. One value per user session; nothing is shared between
//! sessions.

use crate::conversation::ConversationClient;
use crate::demo;
use crate::domain::{AvailableWorkout, Conversation, HealthRecord, Message, Profile, WorkoutHistoryEntry};
use crate::normalizer::{self, Normalized, RowError, ValidationError, WorkoutOrder};
use crate::ports::{CoachBackend, PortError, PortResult};
use std::io::Read;
use std::sync::Arc;
use tracing::{info, warn};

//=========================================================================================
// Turn State and Errors
//=========================================================================================

/// Idle → Sending → {Completed | Failed}. There is no streaming in between.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TurnState {
    Idle,
    Sending,
    Completed,
    Failed,
}

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum TurnError {
    #[error("Please enter a message")]
    EmptyMessage,
    #[error("Please enter a profile before messaging the coach")]
    MissingProfile,
    #[error("Please fill in all profile fields: {}", .0.join(", "))]
    IncompleteProfile(Vec<&'static str>),
    #[error(transparent)]
    Port(#[from] PortError),
}

//=========================================================================================
// CoachSession
//=========================================================================================

pub struct CoachSession {
    client: ConversationClient,
    profile: Option<Profile>,
    health_data: Vec<HealthRecord>,
    workout_history: Vec<WorkoutHistoryEntry>,
    available_workouts: Vec<AvailableWorkout>,
    conversation: Conversation,
    state: TurnState,
    /// Only the latest N days of health data are sent; `None` sends everything.
    health_window_days: Option<usize>,
}

impl CoachSession {
    /// Creates a session pre-loaded with the default workout library.
    pub fn new(backend: Arc<dyn CoachBackend>) -> Self {
        Self {
            client: ConversationClient::new(backend),
            profile: None,
            health_data: Vec::new(),
            workout_history: Vec::new(),
            available_workouts: demo::demo_available_workouts(),
            conversation: Conversation::new(),
            state: TurnState::Idle,
            health_window_days: None,
        }
    }

    pub fn with_health_window(mut self, days: Option<usize>) -> Self {
        self.health_window_days = days.filter(|d| *d > 0);
        self
    }

    // --- Accessors ---

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn health_data(&self) -> &[HealthRecord] {
        &self.health_data
    }

    pub fn workout_history(&self) -> &[WorkoutHistoryEntry] {
        &self.workout_history
    }

    pub fn available_workouts(&self) -> &[AvailableWorkout] {
        &self.available_workouts
    }

    pub fn conversation(&self) -> &Conversation {
        &self.conversation
    }

    pub fn state(&self) -> TurnState {
        self.state
    }

    // --- Data Entry ---

    pub fn set_profile(&mut self, profile: Profile) {
        self.profile = Some(profile);
    }

    pub fn set_health_data(&mut self, records: Vec<HealthRecord>) {
        self.health_data = records;
    }

    pub fn set_workout_history(&mut self, entries: Vec<WorkoutHistoryEntry>) {
        self.workout_history = entries;
    }

    pub fn set_available_workouts(&mut self, workouts: Vec<AvailableWorkout>) {
        self.available_workouts = workouts;
    }

    /// Replaces the health data with the contents of a CSV upload and returns the
    /// rejected rows.
    pub fn load_health_csv<R: Read>(&mut self, reader: R) -> Result<Vec<RowError>, ValidationError> {
        let Normalized { records, errors } = normalizer::parse_health_csv(reader)?;
        info!(records = records.len(), rejected = errors.len(), "Loaded health data");
        self.health_data = records;
        Ok(errors)
    }

    pub fn load_workout_csv<R: Read>(
        &mut self,
        reader: R,
        order: WorkoutOrder,
    ) -> Result<Vec<RowError>, ValidationError> {
        let Normalized { records, errors } = normalizer::parse_workout_csv(reader, order)?;
        info!(records = records.len(), rejected = errors.len(), "Loaded workout history");
        self.workout_history = records;
        Ok(errors)
    }

    pub fn load_demo_data(&mut self) {
        self.profile = Some(demo::demo_profile());
        self.health_data = demo::demo_health_records();
        self.workout_history = demo::demo_workout_history();
    }

    // --- Conversation ---

    /// Sends one data-driven turn. The conversation log only grows when the call
    /// succeeds; on any failure it is left exactly as it was.
    pub async fn send_turn(&mut self, message: &str) -> Result<&Message, TurnError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(TurnError::EmptyMessage);
        }
        let profile = self.profile.as_ref().ok_or(TurnError::MissingProfile)?;
        let missing = profile.missing_fields();
        if !missing.is_empty() {
            return Err(TurnError::IncompleteProfile(missing));
        }

        let health_data = match self.health_window_days {
            Some(days) => normalizer::retain_latest_days(self.health_data.clone(), days),
            None => self.health_data.clone(),
        };

        self.state = TurnState::Sending;
        let result = self
            .client
            .send(
                message,
                profile,
                &health_data,
                &self.workout_history,
                &self.available_workouts,
                self.conversation.messages(),
            )
            .await;

        self.finish_turn(result)
    }

    /// Sends a message in tool mode. Same append-on-success rule as `send_turn`.
    pub async fn send_tool_turn(&mut self, message: &str) -> Result<&Message, TurnError> {
        let message = message.trim();
        if message.is_empty() {
            return Err(TurnError::EmptyMessage);
        }
        self.state = TurnState::Sending;
        let result = self.client.send_tool_mode(message).await;
        self.finish_turn(result)
    }

    fn finish_turn(
        &mut self,
        result: PortResult<crate::conversation::Exchange>,
    ) -> Result<&Message, TurnError> {
        match result {
            Ok(exchange) => {
                if exchange.conversation_id.is_some() {
                    self.conversation.id = exchange.conversation_id;
                }
                self.conversation.append_turn(exchange.user, exchange.assistant);
                self.state = TurnState::Completed;
                self.conversation
                    .messages()
                    .last()
                    .ok_or_else(|| PortError::InvalidResponse("empty conversation".to_string()).into())
            }
            Err(e) => {
                warn!(error = %e, "Coach turn failed");
                self.state = TurnState::Failed;
                Err(e.into())
            }
        }
    }

    /// Clears the local log and asks the backend to delete its history. The local log
    /// is cleared even when the backend call fails; that failure is returned.
    pub async fn clear_conversation(&mut self) -> PortResult<()> {
        let result = self.client.backend().clear_conversation().await;
        if let Err(e) = &result {
            warn!(error = %e, "Failed to clear server-side conversation");
        }
        self.conversation.clear();
        self.state = TurnState::Idle;
        result
    }

    /// Replaces the local log with the backend's copy of the conversation.
    pub async fn refresh_conversation(&mut self) -> PortResult<()> {
        let snapshot = self.client.backend().get_conversation().await?;
        self.conversation
            .replace(snapshot.conversation_id, snapshot.messages);
        Ok(())
    }

    pub async fn check_connection(&self) -> PortResult<()> {
        self.client.backend().check_connection().await
    }
}
