use std::str::FromStr;

use mockall::predicate::*;
use teloxide::{ApiError, RequestError, types::MessageId};

use super::*;
use crate::{
    ai::{AiError, llm::MockLlmClient, translate::MockTranslator},
    extractor::MockPageFetcher,
    messaging::{MessagingError, MockMessagingService},
    settings::MockSettingsService,
    storage::{MockAnalyticsStorage, MockPostedStorage},
};

const LISTING_URL: &str = "https://news.example/";
const NEW_LINK: &str = "https://news.example/new-story";
const OLD_LINK: &str = "https://news.example/old-story";

const LISTING_HTML: &str = r#"
    <html><body>
      <h2><a href="/new-story">New story</a></h2>
      <h2><a href="/old-story">Old story</a></h2>
    </body></html>
"#;

const ARTICLE_HTML: &str = r#"
    <html><head><meta property="og:image" content="https://news.example/cover.jpg"></head>
    <body>
      <h1>Bitcoin hits a new high</h1>
      <div class="content"><p>First paragraph.</p><p>Second paragraph.</p></div>
    </body></html>
"#;

fn source(language: &str) -> Source {
    Source {
        key: "example".to_string(),
        name: "Example News".to_string(),
        url: LISTING_URL.to_string(),
        list_selector: "h2 a".to_string(),
        title_selector: "h1".to_string(),
        content_selector: "div.content".to_string(),
        language: Some(language.to_string()),
    }
}

fn article() -> Article {
    Article {
        link: NEW_LINK.to_string(),
        title: "Bitcoin hits a new high".to_string(),
        paragraphs: vec!["First paragraph.".to_string(), "Second paragraph.".to_string()],
        image: Some("https://news.example/cover.jpg".to_string()),
    }
}

fn destinations() -> Vec<Destination> {
    vec![
        Destination::from_str("-1001").unwrap(),
        Destination::from_str("@second:7").unwrap(),
    ]
}

fn options() -> PollerOptions {
    PollerOptions { source_delay: Duration::ZERO, max_paragraphs: 5, max_message_length: 1000 }
}

fn blocked() -> MessagingError {
    MessagingError::TeloxideRequest(RequestError::Api(ApiError::BotBlocked))
}

fn unconfigured_llm() -> MockLlmClient {
    let mut llm = MockLlmClient::new();
    llm.expect_is_configured().returning(|| false);
    llm.expect_complete().returning(|_, _, _| Err(AiError::NotConfigured));
    llm
}

// Builds a poller. Every mock that is not passed in expects no calls.
struct PollerBuilder {
    settings: MockSettingsService,
    fetcher: MockPageFetcher,
    posted: MockPostedStorage,
    analytics: MockAnalyticsStorage,
    messaging: MockMessagingService,
    llm: MockLlmClient,
    translator: MockTranslator,
}

impl PollerBuilder {
    fn new() -> Self {
        Self {
            settings: MockSettingsService::new(),
            fetcher: MockPageFetcher::new(),
            posted: MockPostedStorage::new(),
            analytics: MockAnalyticsStorage::new(),
            messaging: MockMessagingService::new(),
            llm: unconfigured_llm(),
            translator: MockTranslator::new(),
        }
    }

    fn build(self) -> NewsPoller {
        NewsPoller::new(
            Arc::new(self.settings),
            Arc::new(self.fetcher),
            Arc::new(self.posted),
            Arc::new(self.analytics),
            Arc::new(self.messaging),
            Arc::new(NewsAssistant::new(Arc::new(self.llm))),
            Arc::new(self.translator),
            destinations(),
            options(),
        )
    }
}

fn expect_pages(fetcher: &mut MockPageFetcher) {
    fetcher
        .expect_fetch()
        .with(eq(LISTING_URL))
        .times(1)
        .returning(|_| Ok(LISTING_HTML.to_string()));
    fetcher
        .expect_fetch()
        .with(eq(NEW_LINK))
        .times(1)
        .returning(|_| Ok(ARTICLE_HTML.to_string()));
}

fn expect_old_link_seen(posted: &mut MockPostedStorage) {
    let new_hash = extractor::item_hash(NEW_LINK);
    let old_hash = extractor::item_hash(OLD_LINK);
    posted
        .expect_is_posted()
        .withf(move |key, hash| key == "example" && hash == new_hash)
        .times(1)
        .returning(|_, _| Ok(false));
    posted
        .expect_is_posted()
        .withf(move |key, hash| key == "example" && hash == old_hash)
        .times(1)
        .returning(|_, _| Ok(true));
}

#[tokio::test]
async fn test_poll_source_posts_new_links_only() {
    let mut builder = PollerBuilder::new();
    expect_pages(&mut builder.fetcher);
    expect_old_link_seen(&mut builder.posted);

    builder
        .posted
        .expect_mark_posted()
        .withf(|key, hash, link| {
            key == "example" && hash == extractor::item_hash(NEW_LINK) && link == NEW_LINK
        })
        .times(1)
        .returning(|_, _, _| Ok(true));

    // One destination fails, the other accepts the photo post.
    builder.messaging.expect_publish().times(2).returning(|dest, text, photo| {
        assert!(text.starts_with("<b>Bitcoin hits a new high</b>"));
        assert!(text.contains("First paragraph.\n\nSecond paragraph."));
        assert_eq!(photo.as_deref(), Some("https://news.example/cover.jpg"));
        if dest.topic.is_some() { Ok(MessageId(42)) } else { Err(blocked()) }
    });

    builder
        .analytics
        .expect_record_post()
        .withf(|post, _| {
            post.message_id == Some(42)
                && post.source == "Example News"
                && post.link == NEW_LINK
                && post.theme == "news"
        })
        .times(1)
        .returning(|_, _| Ok(1));

    let settings = BotSettings::default();
    let poller = builder.build();
    let posted = poller.poll_source(&source("pt"), &settings).await.unwrap();

    assert_eq!(posted, 1);
}

#[tokio::test]
async fn test_item_stays_unseen_when_every_destination_fails() {
    let mut builder = PollerBuilder::new();
    expect_pages(&mut builder.fetcher);
    expect_old_link_seen(&mut builder.posted);

    builder.posted.expect_mark_posted().times(0);
    builder.analytics.expect_record_post().times(0);
    builder.messaging.expect_publish().times(2).returning(|_, _, _| Err(blocked()));

    let poller = builder.build();
    let posted = poller.poll_source(&source("pt"), &BotSettings::default()).await.unwrap();

    assert_eq!(posted, 0);
}

#[tokio::test]
async fn test_poll_source_propagates_listing_errors() {
    let mut builder = PollerBuilder::new();
    builder
        .fetcher
        .expect_fetch()
        .returning(|_| Err(FetchError::Status(reqwest::StatusCode::NOT_FOUND)));

    let poller = builder.build();
    let result = poller.poll_source(&source("pt"), &BotSettings::default()).await;

    assert!(matches!(result, Err(PollerError::Fetch(FetchError::Status(_)))));
}

#[tokio::test]
async fn test_poll_once_skips_failing_sources() {
    let mut builder = PollerBuilder::new();
    builder.settings.expect_get().times(1).returning(|| Ok(BotSettings::default()));
    let enabled = sources::resolve_enabled(&BotSettings::default()).len();
    builder
        .fetcher
        .expect_fetch()
        .times(enabled)
        .returning(|_| Err(FetchError::Status(reqwest::StatusCode::BAD_GATEWAY)));

    let poller = builder.build();

    assert_eq!(poller.poll_once().await.unwrap(), 0);
}

#[tokio::test]
async fn test_filtered_item_is_marked_seen_without_posting() {
    let mut builder = PollerBuilder::new();
    expect_pages(&mut builder.fetcher);
    expect_old_link_seen(&mut builder.posted);

    let mut llm = MockLlmClient::new();
    llm.expect_is_configured().returning(|| true);
    llm.expect_complete().returning(|_, _, _| Ok("2".to_string()));
    builder.llm = llm;

    builder.posted.expect_mark_posted().times(1).returning(|_, _, _| Ok(true));
    builder.messaging.expect_publish().times(0);
    builder.analytics.expect_record_post().times(0);

    let mut settings = BotSettings::default();
    settings.format.filter_relevance = true;

    let poller = builder.build();
    let posted = poller.poll_source(&source("pt"), &settings).await.unwrap();

    assert_eq!(posted, 0);
}

#[tokio::test]
async fn test_process_article_filters_disabled_theme() {
    let mut builder = PollerBuilder::new();
    let mut llm = MockLlmClient::new();
    llm.expect_is_configured().returning(|| true);
    llm.expect_complete().returning(|_, _, _| Ok("whale".to_string()));
    builder.llm = llm;

    let poller = builder.build();
    let processed =
        poller.process_article(&article(), &source("pt"), &BotSettings::default()).await;

    assert!(matches!(processed, Processed::Filtered(reason) if reason.contains("whale")));
}

#[tokio::test]
async fn test_process_article_translates_foreign_sources() {
    let mut builder = PollerBuilder::new();
    builder
        .translator
        .expect_translate()
        .with(eq("Bitcoin hits a new high"), eq("pt"))
        .times(1)
        .returning(|_, _| Ok("Bitcoin atinge nova máxima".to_string()));
    builder
        .translator
        .expect_translate()
        .with(eq("First paragraph.\n\nSecond paragraph."), eq("pt"))
        .times(1)
        .returning(|_, _| Ok("Primeiro parágrafo.".to_string()));

    let poller = builder.build();
    let processed =
        poller.process_article(&article(), &source("en"), &BotSettings::default()).await;

    let Processed::Ready { post, theme, photo } = processed else {
        panic!("article should be posted");
    };
    assert_eq!(post.title, "Bitcoin atinge nova máxima");
    assert_eq!(post.body, "Primeiro parágrafo.");
    assert_eq!(post.source_tag, "Example News (PT)");
    assert_eq!(post.link.as_deref(), Some(NEW_LINK));
    assert_eq!(theme, Theme::News);
    assert!(photo.is_some());
}

#[tokio::test]
async fn test_process_article_caps_translated_body() {
    let mut builder = PollerBuilder::new();
    builder.translator.expect_translate().returning(|text, _| Ok(text.repeat(2)));

    let mut long = article();
    long.paragraphs = vec!["a".repeat(995)];
    let poller = builder.build();
    let processed = poller.process_article(&long, &source("en"), &BotSettings::default()).await;

    let Processed::Ready { post, .. } = processed else {
        panic!("article should be posted");
    };
    let max = options().max_message_length;
    assert_eq!(post.body.chars().count(), max + 3);
    assert!(post.body.ends_with("..."));
}

#[tokio::test]
async fn test_process_article_keeps_tag_when_translation_fails() {
    let mut builder = PollerBuilder::new();
    builder
        .translator
        .expect_translate()
        .returning(|_, _| Err(AiError::Translation("HTTP 503".to_string())));

    let poller = builder.build();
    let processed =
        poller.process_article(&article(), &source("en"), &BotSettings::default()).await;

    let Processed::Ready { post, .. } = processed else {
        panic!("article should be posted");
    };
    assert_eq!(post.title, "Bitcoin hits a new high");
    assert_eq!(post.source_tag, "Example News");
}

#[tokio::test]
async fn test_process_article_styles() {
    let mut settings = BotSettings::default();
    settings.format.show_link = false;
    settings.format.show_image = false;
    settings.set_style(PostStyle::TitleOnly);

    let poller = PollerBuilder::new().build();
    let processed = poller.process_article(&article(), &source("pt"), &settings).await;

    let Processed::Ready { post, photo, .. } = processed else {
        panic!("article should be posted");
    };
    assert!(post.body.is_empty());
    assert!(post.link.is_none());
    assert!(photo.is_none());

    let mut long = article();
    long.paragraphs = vec!["word ".repeat(100)];
    settings.set_style(PostStyle::Summary);
    let processed = poller.process_article(&long, &source("pt"), &settings).await;

    let Processed::Ready { post, .. } = processed else {
        panic!("article should be posted");
    };
    assert_eq!(post.body.chars().count(), SUMMARY_STYLE_CHARS + 3);
}
