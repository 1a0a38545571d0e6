mod callback_actions;
mod callbacks;
mod commands;
#[cfg(test)]
mod test_helpers;

use std::sync::Arc;

pub use callback_actions::CallbackAction;
use serde::{Deserialize, Serialize};
use teloxide::{
    dispatching::dialogue::{Dialogue, InMemStorage, InMemStorageError},
    prelude::*,
    types::{InlineKeyboardMarkup, Message, User},
    utils::command::BotCommands,
};
use thiserror::Error;

use crate::{
    ai::NewsAssistant,
    analytics::AnalyticsService,
    calendar::{CalendarError, CalendarService},
    messaging::{MessagingError, MessagingService},
    settings::{SettingsError, SettingsService},
    storage::{ScheduleStorage, StorageError},
};

/// Represents commands that the bot understands.
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "lowercase", description = "Available commands:")]
pub enum Command {
    /// Opens the configuration panel.
    #[command(description = "Open the configuration panel.")]
    Start,
    /// Alias of `/start`.
    #[command(description = "Open the configuration panel.")]
    Config,
    /// Shows the bot status.
    #[command(description = "Show the current status.")]
    Status,
    /// Shows the help text.
    #[command(description = "Show this help text.")]
    Help,
    /// Opens the calendar menu.
    #[command(description = "Crypto events calendar.")]
    Calendar,
    /// Alias of `/calendar`.
    #[command(description = "Crypto events calendar.")]
    Eventos,
}

/// Represents the state of the dialogue, used for handling multi-step
/// interactions.
#[derive(Clone, Default, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum CommandState {
    /// No prompt is pending.
    #[default]
    None,
    /// Waiting for `HH:MM theme count`.
    AwaitingSchedule,
    /// Waiting for a Groq API key.
    AwaitingGroqKey,
    /// Waiting for an OpenAI API key.
    AwaitingOpenAiKey,
    /// Waiting for `name|url[|selectors]`.
    AwaitingSource,
    /// Waiting for `YYYY-MM-DD|title|category|location`.
    AwaitingEvent,
}

/// Errors of the command, button and reply handlers.
#[derive(Error, Debug)]
pub enum BotHandlerError {
    /// The admin typed something that could not be used.
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Reading or writing the dialogue state failed.
    #[error("Failed to get or update dialogue: {0}")]
    DialogueError(InMemStorageError),

    /// A Telegram request failed.
    #[error("Failed to send message: {0}")]
    SendMessageError(#[from] MessagingError),

    /// Loading or saving settings failed.
    #[error("Settings error: {0}")]
    Settings(#[from] SettingsError),

    /// A storage call failed.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),

    /// A calendar operation failed.
    #[error("{0}")]
    Calendar(#[from] CalendarError),

    /// The user is not in `ADMIN_IDS`.
    #[error("You are not allowed to use this bot")]
    Unauthorized,
}

/// Result type for the bot handlers.
pub type BotHandlerResult<T> = Result<T, BotHandlerError>;

type BotDialogue = Dialogue<CommandState, InMemStorage<CommandState>>;

/// Handles the admin panel: commands, button presses and text replies.
pub struct BotHandler {
    messaging_service: Arc<dyn MessagingService>,
    settings: Arc<dyn SettingsService>,
    schedules: Arc<dyn ScheduleStorage>,
    calendar: Arc<dyn CalendarService>,
    analytics: Arc<dyn AnalyticsService>,
    assistant: Arc<NewsAssistant>,
    admin_ids: Vec<UserId>,
}

/// Context groups the data needed by all command and callback handlers.
#[derive(Clone, Copy)]
pub struct Context<'a> {
    /// The handler with every service.
    pub handler: &'a BotHandler,
    /// The message that triggered the update, or the panel message of a button.
    pub message: &'a Message,
    /// Dialogue of the chat.
    pub dialogue: &'a BotDialogue,
    /// The button press, if any. Panels are edited in place when set.
    pub query: Option<&'a CallbackQuery>,
}

impl Context<'_> {
    fn chat_id(&self) -> ChatId {
        self.message.chat.id
    }

    /// Shows a panel. Button presses edit the pressed message in place,
    /// commands and replies send a new one.
    async fn show(&self, text: String, keyboard: InlineKeyboardMarkup) -> BotHandlerResult<()> {
        let messaging = &self.handler.messaging_service;
        if self.query.is_some() {
            messaging
                .edit_response_with_keyboard(self.chat_id(), self.message.id, text, Some(keyboard))
                .await?;
        } else {
            messaging.send_response_with_keyboard(self.chat_id(), text, Some(keyboard)).await?;
        }
        Ok(())
    }

    /// Asks for free text and remembers what the reply is for.
    async fn prompt(&self, state: CommandState, text: String) -> BotHandlerResult<()> {
        self.handler.messaging_service.prompt_for_input(self.chat_id(), text).await?;
        self.dialogue.update(state).await.map_err(BotHandlerError::DialogueError)?;
        Ok(())
    }
}

impl BotHandler {
    /// Creates a new `BotHandler` instance.
    pub fn new(
        messaging_service: Arc<dyn MessagingService>,
        settings: Arc<dyn SettingsService>,
        schedules: Arc<dyn ScheduleStorage>,
        calendar: Arc<dyn CalendarService>,
        analytics: Arc<dyn AnalyticsService>,
        assistant: Arc<NewsAssistant>,
        admin_ids: Vec<UserId>,
    ) -> Self {
        Self { messaging_service, settings, schedules, calendar, analytics, assistant, admin_ids }
    }

    /// An empty admin list leaves the panel open to everyone.
    fn is_admin(&self, user: Option<&User>) -> bool {
        self.admin_ids.is_empty() || user.is_some_and(|u| self.admin_ids.contains(&u.id))
    }

    /// Dispatches the incoming command to the appropriate handler.
    pub async fn handle_commands(
        &self,
        msg: &Message,
        cmd: Command,
        dialogue: BotDialogue,
    ) -> BotHandlerResult<()> {
        if !self.is_admin(msg.from.as_ref()) {
            tracing::warn!("Rejected /{cmd:?} from a non admin in chat {}", msg.chat.id);
            self.messaging_service
                .send_error_msg(msg.chat.id, BotHandlerError::Unauthorized)
                .await?;
            return Ok(());
        }

        let ctx = Context { handler: self, message: msg, dialogue: &dialogue, query: None };
        let result = match cmd {
            Command::Start | Command::Config => commands::start::handle(ctx).await,
            Command::Status => commands::status::handle(ctx).await,
            Command::Help => commands::help::handle(ctx).await,
            Command::Calendar | Command::Eventos => commands::calendar::handle(ctx).await,
        };

        if let Err(e) = result {
            tracing::error!("Command {cmd:?} failed: {e}");
            self.messaging_service.send_error_msg(msg.chat.id, e).await?;
        }
        Ok(())
    }

    /// Handles a button press. The query is always answered, with a short
    /// toast when the action has one.
    pub async fn handle_callback_query(
        &self,
        query: &CallbackQuery,
        dialogue: BotDialogue,
    ) -> BotHandlerResult<()> {
        if !self.is_admin(Some(&query.from)) {
            tracing::warn!("Rejected button press from user {}", query.from.id);
            self.messaging_service
                .answer_callback_query(&query.id, Some(BotHandlerError::Unauthorized.to_string()))
                .await?;
            return Ok(());
        }

        let data = query
            .data
            .as_deref()
            .ok_or_else(|| BotHandlerError::InvalidInput("Callback data is missing".to_string()))?;
        let message = query.message.as_ref().and_then(|m| m.regular_message()).ok_or_else(|| {
            BotHandlerError::InvalidInput("Callback message is missing".to_string())
        })?;

        let result = match serde_json::from_str::<CallbackAction>(data) {
            Ok(action) => {
                tracing::debug!("Callback {action:?} in chat {}", message.chat.id);
                let ctx =
                    Context { handler: self, message, dialogue: &dialogue, query: Some(query) };
                callbacks::handle(ctx, action).await
            }
            Err(e) => Err(BotHandlerError::InvalidInput(format!("Unknown button '{data}': {e}"))),
        };

        match result {
            Ok(toast) => self.messaging_service.answer_callback_query(&query.id, toast).await?,
            Err(e) => {
                tracing::error!("Callback '{data}' failed: {e}");
                self.messaging_service.answer_callback_query(&query.id, None).await?;
                self.messaging_service.send_error_msg(message.chat.id, e).await?;
            }
        }
        Ok(())
    }

    /// Handles a reply to one of the force reply prompts, then resets the
    /// dialogue.
    pub async fn handle_reply(
        &self,
        msg: &Message,
        dialogue: &BotDialogue,
    ) -> BotHandlerResult<()> {
        if !self.is_admin(msg.from.as_ref()) {
            return Ok(());
        }

        let state = dialogue.get().await.map_err(BotHandlerError::DialogueError)?;
        let ctx = Context { handler: self, message: msg, dialogue, query: None };

        let result = match (state, msg.text()) {
            (None | Some(CommandState::None), _) => return Ok(()),
            (Some(_), None) => {
                Err(BotHandlerError::InvalidInput("Expected a text reply".to_string()))
            }
            (Some(CommandState::AwaitingSchedule), Some(text)) => {
                callbacks::schedule::handle_reply(ctx, text).await
            }
            (Some(CommandState::AwaitingGroqKey), Some(text)) => {
                callbacks::ai::handle_groq_key_reply(ctx, text).await
            }
            (Some(CommandState::AwaitingOpenAiKey), Some(text)) => {
                callbacks::ai::handle_openai_key_reply(ctx, text).await
            }
            (Some(CommandState::AwaitingSource), Some(text)) => {
                callbacks::sources::handle_reply(ctx, text).await
            }
            (Some(CommandState::AwaitingEvent), Some(text)) => {
                callbacks::calendar::handle_reply(ctx, text).await
            }
        };

        dialogue.exit().await.map_err(BotHandlerError::DialogueError)?;

        if let Err(e) = result {
            tracing::warn!("Reply in chat {} rejected: {e}", msg.chat.id);
            self.messaging_service.send_error_msg(msg.chat.id, e).await?;
        }
        Ok(())
    }
}
