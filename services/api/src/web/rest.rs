//! services/api/src/web/rest.rs
//!
//! Contains the Axum handlers for the REST API endpoints and the master
//! definition for the OpenAPI specification.

use crate::error::ApiError;
use crate::web::state::{AppState, VisitorContext};
use axum::{
    extract::State,
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Json},
    Extension,
};
use portfolio_core::{
    i18n, submit_user_input, ChatMessage, ChatSession, ConversationManager, Locale, LocaleManager, MessageId,
    UserInput, WindowState,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tracing::{error, info};
use utoipa::{OpenApi, ToSchema};

//=========================================================================================
// OpenAPI Master Definition
//=========================================================================================

#[derive(OpenApi)]
#[openapi(
    paths(
        list_locales_handler,
        set_locale_handler,
        get_chat_handler,
        open_chat_handler,
        close_chat_handler,
        send_message_handler,
    ),
    components(
        schemas(
            LocaleInfo,
            LocalesResponse,
            SetLocaleRequest,
            ChatResponse,
            ChatLabels,
            SendMessageRequest,
            ReplyResponse,
        )
    ),
    tags(
        (name = "Portfolio API", description = "FAQ chat and narrated intro for the portfolio site.")
    )
)]
pub struct ApiDoc;

//=========================================================================================
// API Response and Payload Structs
//=========================================================================================

#[derive(Serialize, ToSchema)]
pub struct LocaleInfo {
    code: String,
    name: String,
}

#[derive(Serialize, ToSchema)]
pub struct LocalesResponse {
    locales: Vec<LocaleInfo>,
    /// The visitor's current locale code.
    current: String,
}

impl LocalesResponse {
    fn new(current: Locale) -> Self {
        Self {
            locales: Locale::ALL
                .iter()
                .map(|locale| LocaleInfo {
                    code: locale.code().to_string(),
                    name: locale.display_name().to_string(),
                })
                .collect(),
            current: current.code().to_string(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
pub struct SetLocaleRequest {
    /// One of the supported locale codes, e.g. `de`.
    locale: String,
}

/// The chat window as the client should render it.
#[derive(Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatResponse {
    #[schema(value_type = String)]
    window: WindowState,
    is_typing: bool,
    #[schema(value_type = String)]
    locale: Locale,
    labels: ChatLabels,
    #[schema(value_type = Object)]
    session: ChatSession,
}

/// Fixed chat texts in the conversation's locale.
#[derive(Debug, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ChatLabels {
    /// The contact action shown under the fallback reply.
    contact: String,
    /// Header above a list of suggested questions.
    suggested_questions: String,
}

impl ChatLabels {
    fn new(locale: Locale) -> Self {
        Self {
            contact: i18n::contact_button_label(locale).to_string(),
            suggested_questions: i18n::suggested_questions_label(locale).to_string(),
        }
    }
}

impl ChatResponse {
    fn from_manager(manager: &ConversationManager) -> Self {
        let locale = manager.locale();
        Self {
            window: manager.window_state(),
            is_typing: manager.is_typing(),
            locale,
            labels: ChatLabels::new(locale),
            session: manager.snapshot(),
        }
    }
}

#[derive(Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SendMessageRequest {
    text: String,
    /// Catalog entry id of a clicked suggestion.
    suggestion_id: Option<String>,
    /// Message whose suggestion list the click came from.
    origin_message_id: Option<i64>,
}

#[derive(Serialize, ToSchema)]
pub struct ReplyResponse {
    #[schema(value_type = Object)]
    reply: ChatMessage,
}

/// Logs a failure and turns it into a 500 response.
fn internal_error(context: &str, e: ApiError) -> (StatusCode, String) {
    error!("{}: {}", context, e);
    (StatusCode::INTERNAL_SERVER_ERROR, format!("{}: {}", context, e))
}

/// First language tag of the `Accept-Language` header.
fn browser_language(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(header::ACCEPT_LANGUAGE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(',').next())
        .and_then(|tag| tag.split(';').next())
        .map(str::trim)
        .filter(|tag| !tag.is_empty())
}

//=========================================================================================
// REST API Handlers
//=========================================================================================

/// List the supported locales and the visitor's current one.
#[utoipa::path(
    get,
    path = "/locales",
    responses(
        (status = 200, description = "Supported locales", body = LocalesResponse),
        (status = 500, description = "Visitor store unavailable")
    )
)]
pub async fn list_locales_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorContext>,
    headers: HeaderMap,
) -> Result<Json<LocalesResponse>, (StatusCode, String)> {
    let locale = app_state
        .locale_manager(&visitor, browser_language(&headers))
        .await
        .map_err(|e| internal_error("Failed to load the locale", e))?
        .current();
    Ok(Json(LocalesResponse::new(locale)))
}

/// Switch the visitor's locale.
///
/// The preference is stored durably and the live conversation, if any, is
/// re-rendered in the new locale.
#[utoipa::path(
    put,
    path = "/locale",
    request_body = SetLocaleRequest,
    responses(
        (status = 200, description = "Locale switched", body = LocalesResponse),
        (status = 400, description = "Unsupported locale code"),
        (status = 500, description = "Visitor store unavailable")
    )
)]
pub async fn set_locale_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorContext>,
    headers: HeaderMap,
    Json(payload): Json<SetLocaleRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let locale = payload.locale.parse::<Locale>().map_err(|e| {
        error!("Rejected locale change: {}", e);
        (StatusCode::BAD_REQUEST, e.to_string())
    })?;

    // The preference must be on disk before other sessions of this visitor mount.
    let store = app_state
        .visitor_store(&visitor)
        .await
        .map_err(|e| internal_error("Failed to load the locale", e))?;
    LocaleManager::initialize(store.clone(), browser_language(&headers)).set_locale(locale);
    store
        .flush()
        .await
        .map_err(|e| internal_error("Failed to store the locale", e.into()))?;

    if let Some(conversation) = app_state.live_conversation(visitor.session_id).await {
        conversation.lock().await.change_locale(locale);
    }
    info!(visitor_id = %visitor.visitor_id, %locale, "Locale switched.");

    Ok(Json(LocalesResponse::new(locale)))
}

/// The current chat state of this browser session.
#[utoipa::path(
    get,
    path = "/chat",
    responses(
        (status = 200, description = "Chat state", body = ChatResponse),
        (status = 500, description = "Session store unavailable")
    )
)]
pub async fn get_chat_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorContext>,
    headers: HeaderMap,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let conversation = app_state
        .conversation(&visitor, browser_language(&headers))
        .await
        .map_err(|e| internal_error("Failed to load the conversation", e))?;
    let manager = conversation.lock().await;
    Ok(Json(ChatResponse::from_manager(&manager)))
}

/// Open the chat window, greeting the visitor if the session is empty.
#[utoipa::path(
    post,
    path = "/chat/open",
    responses(
        (status = 200, description = "Chat opened", body = ChatResponse),
        (status = 500, description = "Session store unavailable")
    )
)]
pub async fn open_chat_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorContext>,
    headers: HeaderMap,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let conversation = app_state
        .conversation(&visitor, browser_language(&headers))
        .await
        .map_err(|e| internal_error("Failed to load the conversation", e))?;
    let mut manager = conversation.lock().await;
    manager.open_session();
    Ok(Json(ChatResponse::from_manager(&manager)))
}

/// Close the chat window. The conversation is kept.
#[utoipa::path(
    post,
    path = "/chat/close",
    responses(
        (status = 200, description = "Chat closed", body = ChatResponse),
        (status = 500, description = "Session store unavailable")
    )
)]
pub async fn close_chat_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorContext>,
    headers: HeaderMap,
) -> Result<Json<ChatResponse>, (StatusCode, String)> {
    let conversation = app_state
        .conversation(&visitor, browser_language(&headers))
        .await
        .map_err(|e| internal_error("Failed to load the conversation", e))?;
    let mut manager = conversation.lock().await;
    manager.close();
    Ok(Json(ChatResponse::from_manager(&manager)))
}

/// Send a chat message and wait for the assistant's reply.
///
/// The reply arrives after a short typing delay; meanwhile `GET /chat`
/// reports `isTyping`.
#[utoipa::path(
    post,
    path = "/chat/messages",
    request_body = SendMessageRequest,
    responses(
        (status = 201, description = "Assistant reply", body = ReplyResponse),
        (status = 400, description = "Empty message"),
        (status = 500, description = "Session store unavailable")
    )
)]
pub async fn send_message_handler(
    State(app_state): State<Arc<AppState>>,
    Extension(visitor): Extension<VisitorContext>,
    headers: HeaderMap,
    Json(payload): Json<SendMessageRequest>,
) -> Result<impl IntoResponse, (StatusCode, String)> {
    let conversation = app_state
        .conversation(&visitor, browser_language(&headers))
        .await
        .map_err(|e| internal_error("Failed to load the conversation", e))?;
    let input = UserInput {
        text: payload.text,
        suggestion_id: payload.suggestion_id,
        origin_message_id: payload.origin_message_id.map(MessageId),
    };

    match submit_user_input(&conversation, app_state.typing_delay.as_ref(), input).await {
        Some(reply) => Ok((StatusCode::CREATED, Json(ReplyResponse { reply }))),
        None => Err((
            StatusCode::BAD_REQUEST,
            "Message text must not be empty".to_string(),
        )),
    }
}
