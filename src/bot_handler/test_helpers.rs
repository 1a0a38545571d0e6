use std::sync::Arc;

use chrono::Utc;
use teloxide::{
    dispatching::dialogue::{Dialogue, InMemStorage},
    types::{
        CallbackQuery, Chat, ChatId, ChatKind, ChatPrivate, MaybeInaccessibleMessage, MediaKind,
        MediaText, Message, MessageCommon, MessageId, MessageKind, User, UserId,
    },
};

use crate::{
    ai::{NewsAssistant, llm::MockLlmClient},
    analytics::MockAnalyticsService,
    bot_handler::{BotDialogue, BotHandler, BotHandlerError, CallbackAction, Command, CommandState},
    calendar::MockCalendarService,
    messaging::MockMessagingService,
    settings::MockSettingsService,
    storage::MockScheduleStorage,
};

pub const CHAT_ID: ChatId = ChatId(123);
pub const ADMIN_ID: UserId = UserId(1);

// Every mock the handler depends on. Mocks without expectations fail the
// test if they are called.
pub struct Mocks {
    pub messaging: MockMessagingService,
    pub settings: MockSettingsService,
    pub schedules: MockScheduleStorage,
    pub calendar: MockCalendarService,
    pub analytics: MockAnalyticsService,
    pub llm: MockLlmClient,
}

impl Mocks {
    pub fn new() -> Self {
        Self {
            messaging: MockMessagingService::new(),
            settings: MockSettingsService::new(),
            schedules: MockScheduleStorage::new(),
            calendar: MockCalendarService::new(),
            analytics: MockAnalyticsService::new(),
            llm: MockLlmClient::new(),
        }
    }
}

// Test harness to encapsulate common test setup and actions.
pub struct TestHarness {
    bot_handler: BotHandler,
    pub dialogue: BotDialogue,
}

impl TestHarness {
    // Creates a new TestHarness where `ADMIN_ID` is the only admin.
    pub fn new(mocks: Mocks) -> Self {
        Self::with_admins(mocks, vec![ADMIN_ID])
    }

    pub fn with_admins(mocks: Mocks, admin_ids: Vec<UserId>) -> Self {
        let bot_handler = BotHandler::new(
            Arc::new(mocks.messaging),
            Arc::new(mocks.settings),
            Arc::new(mocks.schedules),
            Arc::new(mocks.calendar),
            Arc::new(mocks.analytics),
            Arc::new(NewsAssistant::new(Arc::new(mocks.llm))),
            admin_ids,
        );
        let storage = InMemStorage::<CommandState>::new();
        let dialogue = Dialogue::new(storage, CHAT_ID);

        Self { bot_handler, dialogue }
    }

    pub async fn state(&self) -> Option<CommandState> {
        self.dialogue.get().await.unwrap()
    }

    // Simulates handling a command message.
    pub async fn handle_command(&self, command: Command) -> Result<(), BotHandlerError> {
        let msg = mock_message(CHAT_ID, &format!("/{command:?}").to_lowercase());
        self.bot_handler.handle_commands(&msg, command, self.dialogue.clone()).await
    }

    // Simulates handling a reply message.
    pub async fn handle_reply(&self, text: &str) -> Result<(), BotHandlerError> {
        let mut msg = mock_message(CHAT_ID, text);
        if let MessageKind::Common(common) = &mut msg.kind {
            common.reply_to_message = Some(Box::new(mock_message(CHAT_ID, "prompt")));
        }
        self.bot_handler.handle_reply(&msg, &self.dialogue).await
    }

    // Simulates a button press.
    pub async fn handle_callback(
        &self,
        action: &CallbackAction<'_>,
    ) -> Result<(), BotHandlerError> {
        let (_, query) = mock_callback_query(CHAT_ID, action);
        self.bot_handler.handle_callback_query(&query, self.dialogue.clone()).await
    }

    // Simulates a button press carrying arbitrary data.
    pub async fn handle_raw_callback(&self, data: &str) -> Result<(), BotHandlerError> {
        let (_, mut query) = mock_callback_query(CHAT_ID, &CallbackAction::Noop);
        query.data = Some(data.to_string());
        self.bot_handler.handle_callback_query(&query, self.dialogue.clone()).await
    }
}

pub fn mock_user(id: UserId) -> User {
    User {
        id,
        is_bot: false,
        first_name: "Test".to_string(),
        last_name: None,
        username: Some("testuser".to_string()),
        language_code: None,
        is_premium: false,
        added_to_attachment_menu: false,
    }
}

// Helper to create a mock teloxide message sent by `ADMIN_ID`.
pub fn mock_message(chat_id: ChatId, text: &str) -> Message {
    Message {
        id: MessageId(1),
        date: Utc::now(),
        chat: Chat {
            id: chat_id,
            kind: ChatKind::Private(ChatPrivate {
                username: Some("test".to_string()),
                first_name: Some("Test".to_string()),
                last_name: None,
            }),
        },
        kind: MessageKind::Common(MessageCommon {
            media_kind: MediaKind::Text(MediaText {
                text: text.to_string(),
                entities: vec![],
                link_preview_options: None,
            }),
            reply_to_message: None,
            reply_markup: None,
            edit_date: None,
            author_signature: None,
            has_protected_content: false,
            is_automatic_forward: false,
            effect_id: None,
            forward_origin: None,
            external_reply: None,
            quote: None,
            reply_to_story: None,
            sender_boost_count: None,
            is_from_offline: false,
            business_connection_id: None,
        }),
        from: Some(mock_user(ADMIN_ID)),
        is_topic_message: false,
        sender_business_bot: None,
        sender_chat: None,
        thread_id: None,
        via_bot: None,
    }
}

// Helper to create a mock callback query pressed by `ADMIN_ID`.
pub fn mock_callback_query(
    chat_id: ChatId,
    action: &CallbackAction<'_>,
) -> (Message, CallbackQuery) {
    let msg = mock_message(chat_id, "This is a message with a keyboard.");
    let query = CallbackQuery {
        id: "test_callback_id".to_string(),
        from: mock_user(ADMIN_ID),
        message: Some(MaybeInaccessibleMessage::Regular(Box::new(msg.clone()))),
        inline_message_id: None,
        chat_instance: "test_instance".to_string(),
        data: Some(serde_json::to_string(action).unwrap()),
        game_short_name: None,
    };
    (msg, query)
}
