pub mod conversation;
pub mod demo;
pub mod domain;
pub mod normalizer;
pub mod ports;
pub mod session;

pub use conversation::{CoachRequest, ConversationClient, Exchange, HISTORY_WINDOW};
pub use domain::{
    AvailableWorkout, BmiBand, Conversation, Equipment, ExtraFields, Gender, HealthRecord, Message, Profile,
    Role, TokenUsage, WorkoutCategory, WorkoutExercise, WorkoutHistoryEntry,
};
pub use normalizer::{Normalized, RawHealthRow, RawWorkoutRow, RowError, ValidationError, WorkoutOrder};
pub use ports::{CoachBackend, CoachReply, ConversationSnapshot, PortError, PortResult};
pub use session::{CoachSession, TurnError, TurnState};

#[cfg(test)]
mod testing;
