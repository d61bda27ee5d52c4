use actix_web::http::StatusCode;
use actix_web::{web, HttpResponse, ResponseError};
use anyhow::Context;
use backend::configuration::ApplicationSettings;
use backend::domain::auth_key_store::BOT_TOKEN;
use backend::domain::{AuthKeyStore, Caller, Command};
use backend::pairing::{messages, CommandDispatcher};
use backend::utils::error_chain_fmt;
use secrecy::ExposeSecret;
use serde::{Deserialize, Serialize};

#[derive(thiserror::Error)]
pub enum WebhookError {
    #[error("The webhook payload could not be decoded")]
    InvalidPayload(#[source] serde_json::Error),
    #[error("The webhook token did not match")]
    InvalidToken,
    #[error(transparent)]
    UnexpectedError(#[from] anyhow::Error),
}

impl std::fmt::Debug for WebhookError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        error_chain_fmt(self, f)
    }
}

impl ResponseError for WebhookError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebhookError::InvalidPayload(_) | WebhookError::InvalidToken => StatusCode::NOT_FOUND,
            WebhookError::UnexpectedError(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

/// The parts of Zulip's outgoing webhook payload the bot reads.
#[derive(Deserialize)]
pub struct IncomingWebhook {
    pub data: String,
    pub token: String,
    pub trigger: String,
    pub message: IncomingMessage,
}

#[derive(Deserialize)]
pub struct IncomingMessage {
    pub sender_id: i64,
    pub display_recipient: serde_json::Value,
    pub sender_email: String,
    pub sender_full_name: String,
}

impl IncomingWebhook {
    fn caller(&self) -> Caller {
        Caller::new(
            self.message.sender_id.to_string(),
            self.message.sender_email.clone(),
            self.message.sender_full_name.clone(),
        )
    }

    /// Private messages between the bot and one person list exactly two
    /// recipients. Anything else is a group conversation.
    fn is_one_to_one(&self) -> bool {
        self.message
            .display_recipient
            .as_array()
            .map(|recipients| recipients.len() == 2)
            .unwrap_or(false)
    }
}

/// Zulip expects a JSON body for every webhook call. Empty replies use
/// `response_not_required` so the sender does not see an error.
#[derive(Debug, Serialize, PartialEq, Eq)]
#[serde(untagged)]
pub enum BotResponse {
    Reply { content: String },
    NoReply { response_not_required: bool },
}

impl BotResponse {
    pub fn reply(content: impl Into<String>) -> Self {
        BotResponse::Reply {
            content: content.into(),
        }
    }

    pub fn no_reply() -> Self {
        BotResponse::NoReply {
            response_not_required: true,
        }
    }
}

#[tracing::instrument(
    name = "Handling a chat webhook",
    skip(body, keys, dispatcher, settings),
    fields(recurser_id = tracing::field::Empty)
)]
pub async fn handle_webhook(
    body: web::Bytes,
    keys: web::Data<dyn AuthKeyStore>,
    dispatcher: web::Data<CommandDispatcher>,
    settings: web::Data<ApplicationSettings>,
) -> Result<HttpResponse, WebhookError> {
    let webhook: IncomingWebhook =
        serde_json::from_slice(&body).map_err(WebhookError::InvalidPayload)?;

    let bot_token = keys
        .get(BOT_TOKEN)
        .await
        .context("Failed to read the webhook token")?;
    if webhook.token != *bot_token.expose_secret() {
        tracing::warn!("Unauthorized interaction attempt");
        return Err(WebhookError::InvalidToken);
    }

    let response = respond(&webhook, &dispatcher, &settings).await;

    Ok(HttpResponse::Ok().json(response))
}

async fn respond(
    webhook: &IncomingWebhook,
    dispatcher: &CommandDispatcher,
    settings: &ApplicationSettings,
) -> BotResponse {
    if webhook.trigger != "private_message" {
        return BotResponse::reply(messages::INTRO);
    }
    if !webhook.is_one_to_one() {
        return BotResponse::no_reply();
    }

    let caller = webhook.caller();
    tracing::Span::current().record("recurser_id", caller.id.as_str());

    if settings.maintenance_mode && caller.id != settings.owner_id {
        return BotResponse::reply(messages::MAINTENANCE);
    }

    let command = Command::parse(&webhook.data).unwrap_or_else(|e| {
        tracing::info!(error.message = %e, "Unrecognised command, replying with help");
        Command::Help
    });

    BotResponse::reply(dispatcher.dispatch(command, &caller).await)
}
