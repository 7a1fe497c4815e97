//! Conversations, messages and live delivery over server-sent events.

use std::convert::Infallible;

use axum::response::sse::{Event, KeepAlive, Sse};
use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    routing::get,
};
use futures::Stream;
use tokio::sync::broadcast::error::RecvError;
use tracing::{debug, warn};

use waterline_core::ConversationId;

use crate::error::AppError;
use crate::middleware::RequireAuth;
use crate::models::{Conversation, Message, OpenConversationInput, SendMessageInput};
use crate::services::MessagingService;
use crate::state::AppState;

pub fn router() -> Router<AppState> {
    Router::new()
        .route(
            "/api/conversations",
            get(list_conversations).post(open_conversation),
        )
        .route(
            "/api/conversations/{id}/messages",
            get(list_messages).post(send_message),
        )
        .route("/api/conversations/{id}/events", get(events))
}

/// GET /api/conversations
async fn list_conversations(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
) -> Result<Json<Vec<Conversation>>, AppError> {
    let conversations = MessagingService::new(state.store(), state.hub())
        .conversations(&user.context())
        .await?;
    Ok(Json(conversations))
}

/// Get or create the conversation with another user.
///
/// POST /api/conversations
async fn open_conversation(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Json(input): Json<OpenConversationInput>,
) -> Result<Json<Conversation>, AppError> {
    let conversation = MessagingService::new(state.store(), state.hub())
        .open(&user.context(), input)
        .await?;
    Ok(Json(conversation))
}

/// GET /api/conversations/:id/messages
async fn list_messages(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ConversationId>,
) -> Result<Json<Vec<Message>>, AppError> {
    let messages = MessagingService::new(state.store(), state.hub())
        .messages(&user.context(), id)
        .await?;
    Ok(Json(messages))
}

/// POST /api/conversations/:id/messages
async fn send_message(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ConversationId>,
    Json(input): Json<SendMessageInput>,
) -> Result<(StatusCode, Json<Message>), AppError> {
    let message = MessagingService::new(state.store(), state.hub())
        .send(&user.context(), id, input)
        .await?;
    Ok((StatusCode::CREATED, Json(message)))
}

/// Stream new messages of one conversation as `message` events.
///
/// GET /api/conversations/:id/events
///
/// Only messages sent after the stream opens are delivered; clients fetch
/// history from `/messages` first. A client that falls too far behind
/// skips what it missed.
async fn events(
    State(state): State<AppState>,
    RequireAuth(user): RequireAuth,
    Path(id): Path<ConversationId>,
) -> Result<Sse<impl Stream<Item = Result<Event, Infallible>>>, AppError> {
    let mut receiver = MessagingService::new(state.store(), state.hub())
        .subscribe(&user.context(), id)
        .await?;
    let user_id = user.id;

    let stream = async_stream::stream! {
        loop {
            match receiver.recv().await {
                Ok(message) if message.conversation_id == id => {
                    match Event::default().event("message").json_data(&message) {
                        Ok(event) => {
                            yield Ok::<_, Infallible>(event);
                        }
                        Err(e) => {
                            warn!(error = %e, message_id = %message.id, "Failed to encode message event");
                        }
                    }
                }
                Ok(_) => {}
                Err(RecvError::Lagged(skipped)) => {
                    warn!(%user_id, conversation_id = %id, skipped, "Message stream lagged");
                }
                Err(RecvError::Closed) => {
                    debug!(%user_id, conversation_id = %id, "Message hub closed");
                    break;
                }
            }
        }
    };

    Ok(Sse::new(stream).keep_alive(KeepAlive::default()))
}
