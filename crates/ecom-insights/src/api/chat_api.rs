//! POST /api/chat - single-turn completion proxy with a persisted log
//!
//! Flow: validate → insert conversation → call completion API → insert
//! chat message → respond. Each failure ends the request; earlier steps are
//! not compensated, so an upstream failure leaves a conversation without
//! messages behind.

use axum::{
    extract::{rejection::JsonRejection, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Deserializer, Serialize};
use tracing::{debug, error, info};
use validator::Validate;

use crate::metrics;
use crate::shared_state::AppState;

const ROUTE: &str = "/api/chat";

#[derive(Debug, Deserialize, Validate)]
pub struct ChatRequest {
    #[serde(default, deserialize_with = "string_or_number")]
    #[validate(required, length(min = 1))]
    pub user_id: Option<String>,
    #[serde(default)]
    #[validate(required, length(min = 1))]
    pub message: Option<String>,
}

impl ChatRequest {
    /// Validated `(user_id, message)` pair
    pub fn into_parts(self) -> Result<(String, String), ChatError> {
        self.validate().map_err(|_| ChatError::InvalidRequest)?;
        match (self.user_id, self.message) {
            (Some(user_id), Some(message)) => Ok((user_id, message)),
            _ => Err(ChatError::InvalidRequest),
        }
    }
}

/// Accepts `"user_id": "42"` as well as `"user_id": 42`. A zero id counts
/// as absent, like an empty string.
fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Raw {
        Text(String),
        Number(serde_json::Number),
    }

    Ok(Option::<Raw>::deserialize(deserializer)?.and_then(|raw| match raw {
        Raw::Text(text) => Some(text),
        Raw::Number(number) if number.as_f64() == Some(0.0) => None,
        Raw::Number(number) => Some(number.to_string()),
    }))
}

#[derive(Debug, Serialize, Deserialize, PartialEq)]
pub struct ChatResponse {
    pub conversation_id: i64,
    pub user_message: String,
    pub ai_response: String,
}

#[derive(Debug, thiserror::Error)]
pub enum ChatError {
    #[error("Missing user_id or message")]
    InvalidRequest,

    #[error("DB error in conversation")]
    ConversationInsert(anyhow::Error),

    #[error("Failed to fetch response from Groq API")]
    Upstream(anyhow::Error),

    #[error("DB error in chat message insert")]
    MessageInsert(anyhow::Error),
}

impl ChatError {
    pub fn status(&self) -> StatusCode {
        match self {
            ChatError::InvalidRequest => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ChatError {
    fn into_response(self) -> Response {
        match &self {
            ChatError::InvalidRequest => debug!("Rejected chat request: {}", self),
            ChatError::ConversationInsert(e)
            | ChatError::Upstream(e)
            | ChatError::MessageInsert(e) => error!("{}: {:#}", self, e),
        }
        let body = Json(serde_json::json!({ "error": self.to_string() }));
        (self.status(), body).into_response()
    }
}

pub async fn chat(
    State(state): State<AppState>,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Response {
    let response = match handle_chat(&state, payload).await {
        Ok(reply) => Json(reply).into_response(),
        Err(e) => e.into_response(),
    };
    metrics::inc_request(ROUTE, response.status());
    response
}

async fn handle_chat(
    state: &AppState,
    payload: Result<Json<ChatRequest>, JsonRejection>,
) -> Result<ChatResponse, ChatError> {
    let Json(request) = payload.map_err(|rejection| {
        debug!("Unreadable chat body: {}", rejection);
        ChatError::InvalidRequest
    })?;
    let (user_id, message) = request.into_parts()?;

    let conversation_id = state
        .chat_log
        .create_conversation(&user_id)
        .map_err(ChatError::ConversationInsert)?;
    info!("Chat request for user {} opened conversation {}", user_id, conversation_id);

    let ai_response = state
        .completions
        .complete(&message)
        .await
        .map_err(ChatError::Upstream)?;

    state
        .chat_log
        .store_message(conversation_id, &message, &ai_response)
        .map_err(ChatError::MessageInsert)?;

    Ok(ChatResponse { conversation_id, user_message: message, ai_response })
}
