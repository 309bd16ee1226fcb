//! crates/coach_core/src/ports.rs
//!
//! Defines the service contract (trait) between the core and the coach backend.
//! The HTTP implementation lives in the `coach_cli` service; tests plug in fakes.

use async_trait::async_trait;
use crate::conversation::CoachRequest;
use crate::domain::Message;

//=========================================================================================
// Generic Port Error and Result Types
//=========================================================================================

/// A classified failure of a backend call. None of these are retried.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PortError {
    /// Missing bearer token, or the backend rejected it (401/403).
    #[error("Unauthorized")]
    Unauthorized,
    /// Connection refused, DNS failure or similar.
    #[error("Backend unreachable: {0}")]
    Unreachable(String),
    #[error("Backend did not answer within the request timeout")]
    Timeout,
    /// Any other non-2xx status; the body is kept verbatim.
    #[error("Backend returned HTTP {status}: {body}")]
    Server { status: u16, body: String },
    /// A 2xx answer that could not be decoded into the expected shape.
    #[error("Invalid response from backend: {0}")]
    InvalidResponse(String),
}

/// A convenience type alias for `Result<T, PortError>`.
pub type PortResult<T> = Result<T, PortError>;

//=========================================================================================
// Backend Payloads
//=========================================================================================

/// What the backend returns for one sent message.
#[derive(Debug, Clone, PartialEq)]
pub struct CoachReply {
    pub conversation_id: Option<String>,
    pub user_message: Message,
    pub assistant_message: Message,
}

/// The server-side conversation as returned by a refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct ConversationSnapshot {
    pub conversation_id: Option<String>,
    pub messages: Vec<Message>,
}

//=========================================================================================
// Service Ports (Traits)
//=========================================================================================

#[async_trait]
pub trait CoachBackend: Send + Sync {
    /// Data-driven mode: the request carries every piece of context. One call.
    async fn send_with_data(&self, request: &CoachRequest) -> PortResult<CoachReply>;

    /// Tool mode: only the message is sent and the backend fetches data itself.
    async fn send_message(&self, message: &str) -> PortResult<CoachReply>;

    async fn get_conversation(&self) -> PortResult<ConversationSnapshot>;

    /// Deletes the server-side conversation history.
    async fn clear_conversation(&self) -> PortResult<()>;

    /// Checks that the backend answers at all.
    async fn check_connection(&self) -> PortResult<()>;
}
