#[cfg(test)]
mod tests;

use std::{sync::Arc, time::Duration};

use chrono::Utc;
use futures::future::join_all;
use thiserror::Error;
use url::Url;

use crate::{
    ai::{NewsAssistant, Translator},
    config::Config,
    destination::Destination,
    extractor::{self, Article, FetchError, PageFetcher},
    messaging::{
        MessagingService,
        render::{self, NewsPost},
        utils::truncate_with_ellipsis,
    },
    settings::{BotSettings, PostStyle, SettingsError, SettingsService, Theme},
    sources::{self, Source},
    storage::{AnalyticsStorage, NewPost, PostedStorage, StorageError},
};

/// Characters kept by the `summary` post style.
const SUMMARY_STYLE_CHARS: usize = 300;

/// Errors of a fetch cycle.
#[derive(Debug, Error)]
pub enum PollerError {
    /// Settings could not be loaded.
    #[error("Failed to read settings: {0}")]
    Settings(#[from] SettingsError),
    /// A storage call failed.
    #[error("Failed to access storage: {0}")]
    Storage(#[from] StorageError),
    /// A page could not be fetched or parsed.
    #[error("Failed to fetch page: {0}")]
    Fetch(#[from] FetchError),
    /// The source URL does not parse.
    #[error("Invalid source URL '{0}'")]
    InvalidSourceUrl(String),
}

type Result<T> = std::result::Result<T, PollerError>;

/// Limits applied to every post.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollerOptions {
    /// Pause between two sources of a cycle.
    pub source_delay: Duration,
    /// Paragraphs of body kept per post.
    pub max_paragraphs: usize,
    /// Characters of body kept per post.
    pub max_message_length: usize,
}

impl From<&Config> for PollerOptions {
    fn from(config: &Config) -> Self {
        Self {
            source_delay: Duration::from_secs(config.source_delay),
            max_paragraphs: config.max_paragraphs,
            max_message_length: config.max_message_length,
        }
    }
}

/// What to do with an extracted article.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Processed {
    /// Deliberately not posted. The item is still recorded as seen.
    Filtered(String),
    /// To be posted.
    Ready { post: NewsPost, theme: Theme, photo: Option<String> },
}

/// Polls the news sites and posts new articles to every destination.
pub struct NewsPoller {
    settings: Arc<dyn SettingsService>,
    fetcher: Arc<dyn PageFetcher>,
    posted: Arc<dyn PostedStorage>,
    analytics: Arc<dyn AnalyticsStorage>,
    messaging_service: Arc<dyn MessagingService>,
    assistant: Arc<NewsAssistant>,
    translator: Arc<dyn Translator>,
    destinations: Vec<Destination>,
    options: PollerOptions,
}

impl NewsPoller {
    /// Creates a poller. It does nothing until [`NewsPoller::run`].
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        settings: Arc<dyn SettingsService>,
        fetcher: Arc<dyn PageFetcher>,
        posted: Arc<dyn PostedStorage>,
        analytics: Arc<dyn AnalyticsStorage>,
        messaging_service: Arc<dyn MessagingService>,
        assistant: Arc<NewsAssistant>,
        translator: Arc<dyn Translator>,
        destinations: Vec<Destination>,
        options: PollerOptions,
    ) -> Self {
        Self {
            settings,
            fetcher,
            posted,
            analytics,
            messaging_service,
            assistant,
            translator,
            destinations,
            options,
        }
    }

    /// Run fetch cycles forever. The pause between cycles is re-read from the
    /// settings after each cycle.
    pub async fn run(&self) {
        tracing::info!("Starting news poller for {} destination(s)", self.destinations.len());

        loop {
            match self.poll_once().await {
                Ok(posted) => tracing::info!("Fetch cycle complete, {posted} new post(s)"),
                Err(e) => tracing::error!("Fetch cycle failed: {e}"),
            }

            let pause = match self.settings.get().await {
                Ok(settings) => settings.cycle_interval,
                Err(e) => {
                    tracing::warn!("Could not read cycle interval: {e}");
                    BotSettings::default().cycle_interval
                }
            };
            tokio::time::sleep(Duration::from_secs(pause)).await;
        }
    }

    /// One pass over every enabled source. Returns the number of articles
    /// posted. A failing source is logged and skipped.
    pub async fn poll_once(&self) -> Result<usize> {
        let settings = self.settings.get().await?;
        let sources = sources::resolve_enabled(&settings);
        tracing::debug!("Polling {} source(s)", sources.len());

        let mut posted = 0;
        for (i, source) in sources.iter().enumerate() {
            if i > 0 && !self.options.source_delay.is_zero() {
                tokio::time::sleep(self.options.source_delay).await;
            }

            match self.poll_source(source, &settings).await {
                Ok(count) => posted += count,
                Err(e) => tracing::error!("Error polling {}: {e}", source.name),
            }
        }

        Ok(posted)
    }

    /// Fetch the listing page of `source` and handle every unseen link.
    pub async fn poll_source(&self, source: &Source, settings: &BotSettings) -> Result<usize> {
        tracing::debug!("Fetching {}", source.name);

        let base =
            Url::parse(&source.url).map_err(|_| PollerError::InvalidSourceUrl(source.url.clone()))?;
        let listing = self.fetcher.fetch(&source.url).await?;
        let links = extractor::extract_links(&listing, &base, &source.list_selector)?;

        let mut posted = 0;
        for link in links {
            let hash = extractor::item_hash(&link);
            if self.posted.is_posted(&source.key, &hash).await? {
                continue;
            }

            match self.handle_link(source, settings, &link, &hash).await {
                Ok(true) => posted += 1,
                Ok(false) => {}
                Err(e) => tracing::warn!("Skipping {link}: {e}"),
            }
        }

        Ok(posted)
    }

    /// Returns `true` when the article reached at least one destination.
    async fn handle_link(
        &self,
        source: &Source,
        settings: &BotSettings,
        link: &str,
        hash: &str,
    ) -> Result<bool> {
        let html = self.fetcher.fetch(link).await?;
        let article = extractor::extract_article(
            &html,
            link,
            &source.title_selector,
            &source.content_selector,
        )?;

        let Some(article) = article else {
            tracing::debug!("No title found at {link}, marking as seen");
            self.posted.mark_posted(&source.key, hash, link).await?;
            return Ok(false);
        };

        let (post, theme, photo) = match self.process_article(&article, source, settings).await {
            Processed::Filtered(reason) => {
                tracing::info!("Filtered '{}': {reason}", article.title);
                self.posted.mark_posted(&source.key, hash, link).await?;
                return Ok(false);
            }
            Processed::Ready { post, theme, photo } => (post, theme, photo),
        };

        let text = render::news_post(&post);
        let message_id = self.fan_out(&text, photo).await;
        let Some(message_id) = message_id else {
            tracing::warn!("Every destination rejected '{}', will retry next cycle", post.title);
            return Ok(false);
        };

        self.posted.mark_posted(&source.key, hash, link).await?;
        let record = NewPost {
            message_id: Some(message_id.0),
            source: source.name.clone(),
            title: post.title,
            link: link.to_string(),
            theme: theme.as_str().to_string(),
        };
        if let Err(e) = self.analytics.record_post(record, Utc::now()).await {
            tracing::warn!("Failed to record post analytics: {e}");
        }

        tracing::info!("Posted {link} from {}", source.name);
        Ok(true)
    }

    /// Send `text` to every destination concurrently. Returns the message id
    /// of the first destination that accepted it.
    async fn fan_out(
        &self,
        text: &str,
        photo: Option<String>,
    ) -> Option<teloxide::types::MessageId> {
        let sends = self.destinations.iter().map(|destination| {
            let photo = photo.clone();
            async move {
                let result =
                    self.messaging_service.publish(destination, text.to_string(), photo).await;
                if let Err(e) = &result {
                    tracing::error!("Failed to post to {destination}: {e}");
                }
                result
            }
        });

        join_all(sends).await.into_iter().find_map(|result| result.ok())
    }

    /// Apply filters, translation and formatting to an article.
    pub async fn process_article(
        &self,
        article: &Article,
        source: &Source,
        settings: &BotSettings,
    ) -> Processed {
        let format = &settings.format;
        let content = article.paragraphs.join("\n\n");
        let ai_ready = self.assistant.is_available().await;

        if format.filter_relevance && ai_ready {
            let score = self.assistant.relevance_score(&article.title, &content).await;
            if score < format.min_relevance_score {
                return Processed::Filtered(format!(
                    "relevance {score} below {}",
                    format.min_relevance_score
                ));
            }
        }

        let theme = if ai_ready {
            self.assistant.classify_theme(&article.title, &content).await
        } else {
            Theme::News
        };
        if !settings.is_theme_enabled(theme) {
            return Processed::Filtered(format!("theme {theme} is disabled"));
        }

        let mut title = article.title.clone();
        let mut body = render::compose_body(
            &article.paragraphs,
            self.options.max_paragraphs,
            self.options.max_message_length,
        );

        let mut translated = false;
        let same_language = source
            .language
            .as_deref()
            .is_some_and(|lang| lang.eq_ignore_ascii_case(&settings.language));
        if format.translate && !same_language {
            match self.translator.translate(&title, &settings.language).await {
                Ok(text) => {
                    translated = text != title;
                    title = text;
                }
                Err(e) => tracing::warn!("Title translation failed: {e}"),
            }
            if !body.is_empty() {
                match self.translator.translate(&body, &settings.language).await {
                    Ok(text) => body = text,
                    Err(e) => tracing::warn!("Body translation failed: {e}"),
                }
            }
        }

        if format.summarize && !body.is_empty() {
            body = self.assistant.summarize(&body, &settings.language).await;
        }
        if format.add_emoji && ai_ready {
            title = self.assistant.add_emojis(&title).await;
        }

        // Translations and summaries can come back longer than the source.
        body = truncate_with_ellipsis(&body, self.options.max_message_length);

        match format.style {
            PostStyle::Complete => {}
            PostStyle::Summary => body = truncate_with_ellipsis(&body, SUMMARY_STYLE_CHARS),
            PostStyle::TitleOnly => body.clear(),
        }

        let source_tag = if translated {
            format!("{} ({})", source.name, settings.language.to_uppercase())
        } else {
            source.name.clone()
        };

        Processed::Ready {
            post: NewsPost {
                title,
                body,
                link: format.show_link.then(|| article.link.clone()),
                source_tag,
            },
            theme,
            photo: article.image.clone().filter(|_| format.show_image),
        }
    }
}
