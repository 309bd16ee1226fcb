//! services/coach_cli/src/adapters/http.rs
//!
//! This module contains the HTTP adapter for the AI Coach backend.
//! It implements the `CoachBackend` port from the `core` crate using `reqwest`.

use crate::adapters::wire::{ConversationRecord, DataMessageBody, MessageBody, SendMessageResponse};
use async_trait::async_trait;
use coach_core::ports::{CoachBackend, CoachReply, ConversationSnapshot, PortError, PortResult};
use coach_core::CoachRequest;
use reqwest::{Client, RequestBuilder, Response, StatusCode};
use serde::de::DeserializeOwned;
use std::time::Duration;
use tracing::{debug, error};

pub const CONVERSATION_PATH: &str = "/api/ai-coach/conversation";
pub const MESSAGES_PATH: &str = "/api/ai-coach/conversation/messages";
pub const MESSAGES_WITH_DATA_PATH: &str = "/api/ai-coach/conversation/messages-with-data";
pub const CLEAR_PATH: &str = "/api/ai-coach/conversation/clear";

const CONNECTION_CHECK_TIMEOUT: Duration = Duration::from_secs(5);

//=========================================================================================
// The Main Adapter Struct
//=========================================================================================

/// An adapter that implements `CoachBackend` over HTTP with a bearer token.
#[derive(Clone)]
pub struct HttpCoachAdapter {
    client: Client,
    base_url: String,
    auth_token: Option<String>,
    timeout: Duration,
}

impl HttpCoachAdapter {
    /// Creates a new `HttpCoachAdapter`. `timeout` bounds every call end to end.
    pub fn new(base_url: &str, auth_token: Option<String>, timeout: Duration) -> Self {
        Self {
            client: Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            auth_token,
            timeout,
        }
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Attaches the bearer token, or fails before anything is sent when there is none.
    fn authorized(&self, builder: RequestBuilder) -> PortResult<RequestBuilder> {
        let token = self
            .auth_token
            .as_deref()
            .filter(|t| !t.trim().is_empty())
            .ok_or(PortError::Unauthorized)?;
        Ok(builder.bearer_auth(token))
    }

    async fn execute(&self, builder: RequestBuilder) -> PortResult<Response> {
        let response = builder
            .timeout(self.timeout)
            .send()
            .await
            .map_err(classify)?;
        ensure_success(response).await
    }

    async fn post_message<B: serde::Serialize + ?Sized>(&self, path: &str, body: &B) -> PortResult<CoachReply> {
        let builder = self.authorized(self.client.post(self.url(path)).json(body))?;
        let response = self.execute(builder).await?;
        read_json::<SendMessageResponse>(response).await?.to_domain()
    }
}

//=========================================================================================
// Response Helpers
//=========================================================================================

fn classify(e: reqwest::Error) -> PortError {
    if e.is_timeout() {
        PortError::Timeout
    } else if e.is_decode() {
        PortError::InvalidResponse(e.to_string())
    } else {
        PortError::Unreachable(e.to_string())
    }
}

async fn ensure_success(response: Response) -> PortResult<Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
        return Err(PortError::Unauthorized);
    }
    let body = response.text().await.unwrap_or_else(|_| "Unknown error".to_string());
    error!("Coach backend returned error {}: {}", status, body);
    Err(PortError::Server {
        status: status.as_u16(),
        body,
    })
}

async fn read_json<T: DeserializeOwned>(response: Response) -> PortResult<T> {
    response.json::<T>().await.map_err(|e| {
        if e.is_timeout() {
            PortError::Timeout
        } else {
            PortError::InvalidResponse(e.to_string())
        }
    })
}

//=========================================================================================
// `CoachBackend` Trait Implementation
//=========================================================================================

#[async_trait]
impl CoachBackend for HttpCoachAdapter {
    async fn send_with_data(&self, request: &CoachRequest) -> PortResult<CoachReply> {
        let body = DataMessageBody::from_request(request);
        debug!(
            health = body.health_data.len(),
            workouts = body.workout_history.len(),
            library = body.available_workouts.len(),
            history = body.conversation_history.len(),
            "POST {}",
            MESSAGES_WITH_DATA_PATH
        );
        self.post_message(MESSAGES_WITH_DATA_PATH, &body).await
    }

    async fn send_message(&self, message: &str) -> PortResult<CoachReply> {
        debug!("POST {}", MESSAGES_PATH);
        self.post_message(MESSAGES_PATH, &MessageBody { message }).await
    }

    async fn get_conversation(&self) -> PortResult<ConversationSnapshot> {
        let builder = self.authorized(self.client.get(self.url(CONVERSATION_PATH)))?;
        let response = self.execute(builder).await?;
        read_json::<ConversationRecord>(response).await?.to_domain()
    }

    async fn clear_conversation(&self) -> PortResult<()> {
        let builder = self.authorized(
            self.client
                .post(self.url(CLEAR_PATH))
                .json(&serde_json::json!({})),
        )?;
        self.execute(builder).await?;
        Ok(())
    }

    /// Succeeds when the backend answers at all: 200, 400 and 401 all prove it is up.
    async fn check_connection(&self) -> PortResult<()> {
        let mut builder = self
            .client
            .get(self.url(CONVERSATION_PATH))
            .timeout(CONNECTION_CHECK_TIMEOUT);
        if let Some(token) = &self.auth_token {
            builder = builder.bearer_auth(token);
        }
        let response = builder.send().await.map_err(classify)?;

        match response.status() {
            StatusCode::OK | StatusCode::BAD_REQUEST | StatusCode::UNAUTHORIZED => Ok(()),
            status => Err(PortError::Server {
                status: status.as_u16(),
                body: response.text().await.unwrap_or_default(),
            }),
        }
    }
}
