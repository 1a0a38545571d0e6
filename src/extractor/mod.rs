
use std::{collections::HashSet, time::Duration};

use async_trait::async_trait;
use backoff::{Error as BackoffError, ExponentialBackoff, future::retry};
use mockall::automock;
use reqwest::{Client, StatusCode};
use scraper::{ElementRef, Html, Selector};
use thiserror::Error;
use url::Url;

const USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) AppleWebKit/537.36 (KHTML, \
                          like Gecko) Chrome/120.0 Safari/537.36";
const REQUEST_TIMEOUT: Duration = Duration::from_secs(15);
const ITEM_HASH_LEN: usize = 10;

/// Errors fetching or parsing pages.
#[derive(Debug, Error)]
pub enum FetchError {
    /// The HTTP call failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The server answered with a non-success status.
    #[error("Unexpected HTTP status {0}")]
    Status(StatusCode),
    /// A CSS selector does not parse.
    #[error("Invalid CSS selector '{0}'")]
    InvalidSelector(String),
    /// A URL does not parse.
    #[error("Invalid URL '{0}'")]
    InvalidUrl(String),
}

/// Fetches raw HTML pages.
#[automock]
#[async_trait]
pub trait PageFetcher: Send + Sync {
    /// Body of the page at `url`.
    async fn fetch(&self, url: &str) -> Result<String, FetchError>;
}

/// `reqwest` based fetcher retrying transient failures with exponential
/// backoff.
pub struct DefaultPageFetcher {
    client: Client,
}

impl DefaultPageFetcher {
    /// Creates a fetcher with a browser user agent.
    pub fn new() -> Result<Self, FetchError> {
        let client = Client::builder().user_agent(USER_AGENT).timeout(REQUEST_TIMEOUT).build()?;
        Ok(Self { client })
    }

    fn backoff_config() -> ExponentialBackoff {
        ExponentialBackoff {
            initial_interval: Duration::from_secs(1),
            max_interval: Duration::from_secs(10),
            max_elapsed_time: Some(Duration::from_secs(30)),
            ..Default::default()
        }
    }
}

#[async_trait]
impl PageFetcher for DefaultPageFetcher {
    async fn fetch(&self, url: &str) -> Result<String, FetchError> {
        let operation = || async {
            let response = self.client.get(url).send().await.map_err(|e| {
                tracing::warn!("Request to {url} failed: {e}. Retrying...");
                BackoffError::transient(FetchError::Request(e))
            })?;

            let status = response.status();
            if !status.is_success() {
                let err = FetchError::Status(status);
                return Err(
                    if status.is_server_error() || status == StatusCode::TOO_MANY_REQUESTS {
                        tracing::warn!("HTTP {status} from {url}. Retrying...");
                        BackoffError::transient(err)
                    } else {
                        BackoffError::permanent(err)
                    },
                );
            }

            response.text().await.map_err(|e| BackoffError::transient(FetchError::Request(e)))
        };

        retry(Self::backoff_config(), operation).await
    }
}

/// An article extracted from a page.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Article {
    /// Absolute URL of the article.
    pub link: String,
    /// Text of the title element.
    pub title: String,
    /// Non-empty paragraphs of the content element.
    pub paragraphs: Vec<String>,
    /// `og:image` of the page.
    pub image: Option<String>,
}

/// Short stable identifier of a link: the first 10 hex chars of its MD5.
pub fn item_hash(link: &str) -> String {
    let mut hash = format!("{:x}", md5::compute(link.as_bytes()));
    hash.truncate(ITEM_HASH_LEN);
    hash
}

fn selector(raw: &str) -> Result<Selector, FetchError> {
    Selector::parse(raw).map_err(|_| FetchError::InvalidSelector(raw.to_string()))
}

fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn element_text(element: ElementRef<'_>) -> String {
    collapse_whitespace(&element.text().collect::<String>())
}

fn resolve_http(base: &Url, href: &str) -> Option<Url> {
    let mut url = base.join(href.trim()).ok()?;
    if !matches!(url.scheme(), "http" | "https") {
        return None;
    }
    url.set_fragment(None);
    Some(url)
}

/// Collect article links from a listing page.
///
/// Each element matched by `list_selector` contributes its own `href`, or the
/// `href` of its first descendant link. Links are resolved against `base`,
/// non-http(s) links are dropped and duplicates removed keeping the first
/// occurrence.
pub fn extract_links(
    html: &str,
    base: &Url,
    list_selector: &str,
) -> Result<Vec<String>, FetchError> {
    let document = Html::parse_document(html);
    let list = selector(list_selector)?;
    let anchor = selector("a[href]")?;

    let mut seen = HashSet::new();
    let links = document
        .select(&list)
        .filter_map(|element| {
            element
                .value()
                .attr("href")
                .or_else(|| element.select(&anchor).next().and_then(|a| a.value().attr("href")))
        })
        .filter_map(|href| resolve_http(base, href))
        .map(String::from)
        .filter(|link| seen.insert(link.clone()))
        .collect();

    Ok(links)
}

/// Extract the article at `link` from its HTML. Returns `None` when the page
/// has no title.
pub fn extract_article(
    html: &str,
    link: &str,
    title_selector: &str,
    body_selector: &str,
) -> Result<Option<Article>, FetchError> {
    let base = Url::parse(link).map_err(|_| FetchError::InvalidUrl(link.to_string()))?;
    let document = Html::parse_document(html);

    let title = document.select(&selector(title_selector)?).next().map(element_text);
    let Some(title) = title.filter(|t| !t.is_empty()) else {
        return Ok(None);
    };

    let paragraph = selector("p")?;
    let body = document.select(&selector(body_selector)?).next();
    let paragraphs = match body {
        Some(body) => {
            let mut texts: Vec<String> = body.select(&paragraph).map(element_text).collect();
            if texts.is_empty() {
                texts.push(element_text(body));
            }
            texts.into_iter().filter(|t| !t.is_empty()).collect()
        }
        None => Vec::new(),
    };

    let og_image = selector(r#"meta[property="og:image"]"#)?;
    let img = selector("img[src]")?;
    let image = document
        .select(&og_image)
        .find_map(|meta| meta.value().attr("content"))
        .or_else(|| body.and_then(|b| b.select(&img).next()).and_then(|i| i.value().attr("src")))
        .and_then(|src| resolve_http(&base, src))
        .map(String::from);

    Ok(Some(Article { link: link.to_string(), title, paragraphs, image }))
}
