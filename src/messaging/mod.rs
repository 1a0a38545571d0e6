/// Inline keyboards of the panel.
pub mod keyboards;
/// HTML texts of the panel and posts.
pub mod render;
/// Small formatting helpers.
pub mod utils;

use async_trait::async_trait;
use mockall::automock;
use teloxide::{
    ApiError, RequestError,
    prelude::*,
    types::{ChatId, ForceReply, InlineKeyboardMarkup, InputFile, MessageId, ParseMode},
    utils::html,
};
use thiserror::Error;
use url::Url;

use crate::{bot_handler::BotHandlerError, destination::Destination};

/// Telegram limit for message texts.
pub const MAX_MESSAGE_LENGTH: usize = 4096;

/// Telegram limit for photo captions.
pub const MAX_CAPTION_LENGTH: usize = 1024;

/// Errors of the messaging service.
#[derive(Debug, Error)]
pub enum MessagingError {
    /// A Telegram request failed.
    #[error("Teloxide API request failed: {0}")]
    TeloxideRequest(#[from] teloxide::RequestError),
}

type Result<T> = std::result::Result<T, MessagingError>;

/// Outgoing Telegram traffic: the admin panel and channel posts.
#[automock]
#[async_trait]
pub trait MessagingService: Send + Sync {
    /// Sends an HTML message to the provided chat. Without a keyboard, a
    /// single button back to the main menu is attached.
    async fn send_response_with_keyboard(
        &self,
        chat_id: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()>;

    /// Replaces the text and keyboard of a panel message. Edits that change
    /// nothing are not an error.
    async fn edit_response_with_keyboard(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()>;

    /// Asks the admin for free text input with a force reply.
    async fn prompt_for_input(&self, chat_id: ChatId, prompt: String) -> Result<()>;

    /// Sends an error message to the provided chat.
    async fn send_error_msg(&self, chat_id: ChatId, error: BotHandlerError) -> Result<()>;

    /// Clears the spinner of a button press, optionally with a toast.
    async fn answer_callback_query(&self, query_id: &str, text: Option<String>) -> Result<()>;

    /// Posts to a destination chat (and topic). With a photo URL the text is
    /// sent as its caption; if the photo is rejected the text is sent alone.
    async fn publish(
        &self,
        destination: &Destination,
        text: String,
        photo: Option<String>,
    ) -> Result<MessageId>;
}

/// Telegram messaging service.
pub struct TelegramMessagingService {
    bot: Bot,
}

impl TelegramMessagingService {
    /// Creates a service sending through `bot`.
    pub fn new(bot: Bot) -> Self {
        Self { bot }
    }

    async fn publish_text(&self, destination: &Destination, text: String) -> Result<MessageId> {
        let mut request = self
            .bot
            .send_message(destination.recipient(), text)
            .parse_mode(ParseMode::Html);
        if let Some(thread_id) = destination.thread_id() {
            request = request.message_thread_id(thread_id);
        }

        request.await.map(|msg| msg.id).map_err(MessagingError::TeloxideRequest)
    }

    async fn publish_photo(
        &self,
        destination: &Destination,
        caption: String,
        photo: Url,
    ) -> Result<MessageId> {
        let mut request = self
            .bot
            .send_photo(destination.recipient(), InputFile::url(photo))
            .caption(caption)
            .parse_mode(ParseMode::Html);
        if let Some(thread_id) = destination.thread_id() {
            request = request.message_thread_id(thread_id);
        }

        request.await.map(|msg| msg.id).map_err(MessagingError::TeloxideRequest)
    }
}

#[async_trait]
impl MessagingService for TelegramMessagingService {
    async fn send_response_with_keyboard(
        &self,
        chat_id: ChatId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let keyboard = keyboard.unwrap_or(keyboards::BACK_TO_MENU.clone());

        self.bot
            .send_message(chat_id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await
            .map(|_| ())
            .map_err(MessagingError::TeloxideRequest)
    }

    async fn edit_response_with_keyboard(
        &self,
        chat_id: ChatId,
        message_id: MessageId,
        text: String,
        keyboard: Option<InlineKeyboardMarkup>,
    ) -> Result<()> {
        let keyboard = keyboard.unwrap_or(keyboards::BACK_TO_MENU.clone());

        match self
            .bot
            .edit_message_text(chat_id, message_id, text)
            .parse_mode(ParseMode::Html)
            .reply_markup(keyboard)
            .await
        {
            Ok(_) | Err(RequestError::Api(ApiError::MessageNotModified)) => Ok(()),
            Err(e) => Err(MessagingError::TeloxideRequest(e)),
        }
    }

    async fn prompt_for_input(&self, chat_id: ChatId, prompt: String) -> Result<()> {
        self.bot
            .send_message(chat_id, prompt)
            .parse_mode(ParseMode::Html)
            .reply_markup(ForceReply::new())
            .await
            .map(|_| ())
            .map_err(MessagingError::TeloxideRequest)
    }

    async fn send_error_msg(&self, chat_id: ChatId, error: BotHandlerError) -> Result<()> {
        let text = format!("❌ {}", html::escape(&error.to_string()));
        self.send_response_with_keyboard(chat_id, text, None).await
    }

    async fn answer_callback_query(&self, query_id: &str, text: Option<String>) -> Result<()> {
        let mut request = self.bot.answer_callback_query(query_id);
        if let Some(text) = text {
            request = request.text(text);
        }

        request.await.map(|_| ()).map_err(MessagingError::TeloxideRequest)
    }

    async fn publish(
        &self,
        destination: &Destination,
        text: String,
        photo: Option<String>,
    ) -> Result<MessageId> {
        let photo = photo.and_then(|p| Url::parse(&p).ok());

        if let Some(photo) = photo.filter(|_| text.chars().count() <= MAX_CAPTION_LENGTH) {
            match self.publish_photo(destination, text.clone(), photo).await {
                Ok(id) => return Ok(id),
                Err(e) => {
                    tracing::warn!("Photo post to {destination} failed, sending text only: {e}")
                }
            }
        }

        self.publish_text(destination, text).await
    }
}
