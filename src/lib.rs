#![warn(missing_docs)]
//! A Telegram bot that reposts crypto news.
//!
//! The bot scrapes news sites, optionally translates, summarizes and
//! classifies articles with an LLM, and posts them to channels and forum
//! topics. It also keeps a calendar of crypto events with timed alerts, sends
//! scheduled daily digests and exposes an inline keyboard admin panel.

/// LLM and translation clients.
pub mod ai;
/// Reports over published posts.
pub mod analytics;
/// The main handler for the bot's logic.
pub mod bot_handler;
/// Crypto events calendar.
pub mod calendar;
/// The configuration for the application.
pub mod config;
/// Chats and forum topics that receive posts.
pub mod destination;
/// The dispatcher for routing updates to the correct handlers.
pub mod dispatcher;
/// Fetching pages and extracting links and articles.
pub mod extractor;
/// The service for sending messages to the user.
pub mod messaging;
/// A utility for paginating data.
pub mod pagination;
/// The poller that fetches and posts news.
pub mod poller;
/// Event alerts and scheduled digests.
pub mod scheduler;
/// Runtime settings edited from the admin panel.
pub mod settings;
/// News sources and the built-in catalog.
pub mod sources;
/// The storage layer for persisting data.
pub mod storage;

use std::{sync::Arc, time::Duration};

use teloxide::{dispatching::dialogue::InMemStorage, prelude::*};

use crate::{
    ai::{NewsAssistant, llm::OpenAiCompatibleClient, translate::GoogleTranslator},
    analytics::DefaultAnalyticsService,
    bot_handler::{BotHandler, CommandState},
    calendar::DefaultCalendarService,
    config::Config,
    extractor::DefaultPageFetcher,
    messaging::TelegramMessagingService,
    poller::{NewsPoller, PollerOptions},
    scheduler::{AlertScheduler, DigestScheduler},
    settings::DefaultSettingsService,
    storage::sqlite::SqliteStorage,
};

/// Runs the bot.
pub async fn run() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::from_env()?;
    let storage = Arc::new(SqliteStorage::new(&config.database_url).await?);
    let bot = Bot::new(config.telegram_bot_token.clone());
    tracing::info!("Posting to {} destination(s)", config.destinations.len());

    let messaging_service = Arc::new(TelegramMessagingService::new(bot.clone()));
    let settings = Arc::new(DefaultSettingsService::new(storage.clone()));
    let fetcher = Arc::new(DefaultPageFetcher::new()?);
    let assistant = Arc::new(NewsAssistant::new(Arc::new(OpenAiCompatibleClient::new(&config)?)));
    let calendar = Arc::new(DefaultCalendarService::new(storage.clone(), fetcher.clone()));
    let analytics = Arc::new(DefaultAnalyticsService::new(storage.clone()));

    // Spawn the news fetch loop.
    let news_poller = NewsPoller::new(
        settings.clone(),
        fetcher.clone(),
        storage.clone(),
        storage.clone(),
        messaging_service.clone(),
        assistant.clone(),
        Arc::new(GoogleTranslator::new()?),
        config.destinations.clone(),
        PollerOptions::from(&config),
    );
    tokio::spawn(async move { news_poller.run().await });

    // Spawn the event alert loop.
    let alert_scheduler = AlertScheduler::new(
        settings.clone(),
        storage.clone(),
        calendar.clone(),
        messaging_service.clone(),
        config.destinations.clone(),
        Duration::from_secs(config.alert_check_interval),
        Duration::from_secs(config.calendar_refresh_interval),
    );
    tokio::spawn(async move { alert_scheduler.run().await });

    // Spawn the scheduled digest loop.
    let digest_scheduler = DigestScheduler::new(
        storage.clone(),
        storage.clone(),
        messaging_service.clone(),
        config.destinations.clone(),
        Duration::from_secs(config.digest_check_interval),
    );
    tokio::spawn(async move { digest_scheduler.run().await });

    let handler = Arc::new(BotHandler::new(
        messaging_service,
        settings,
        storage,
        calendar,
        analytics,
        assistant,
        config.admin_ids.clone(),
    ));
    let dialogue_storage = InMemStorage::<CommandState>::new();
    let mut dispatcher = dispatcher::BotDispatcher::new(handler, dialogue_storage).build(bot);
    tracing::debug!("Dispatcher built successfully.");

    dispatcher.dispatch().await;

    Ok(())
}
