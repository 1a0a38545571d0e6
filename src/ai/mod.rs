/// OpenAI compatible chat completion clients.
pub mod llm;
/// Machine translation.
pub mod translate;

use std::{str::FromStr, sync::Arc};

pub use llm::{LlmClient, OpenAiCompatibleClient, Provider};
use thiserror::Error;
pub use translate::{GoogleTranslator, Translator};

use crate::{messaging::utils::truncate_with_ellipsis, settings::Theme};

const SYSTEM_PROMPT: &str = "You are an assistant specialised in cryptocurrency news.";
const SUMMARY_FALLBACK_CHARS: usize = 200;
const DEFAULT_RELEVANCE: u8 = 5;

/// Errors of the LLM and translation clients.
#[derive(Debug, Error)]
pub enum AiError {
    /// No provider has an API key.
    #[error("No LLM provider is configured")]
    NotConfigured,
    /// The HTTP call itself failed.
    #[error("HTTP request failed: {0}")]
    Request(#[from] reqwest::Error),
    /// The provider answered with a non-success status.
    #[error("{provider} returned HTTP {status}: {text}")]
    Api { provider: Provider, status: u16, text: String },
    /// The answer had no message content.
    #[error("{0} returned an empty answer")]
    EmptyResponse(Provider),
    /// The translation endpoint failed or returned an unexpected body.
    #[error("Translation failed: {0}")]
    Translation(String),
}

/// Result type for AI operations.
pub type AiResult<T> = Result<T, AiError>;

/// Read a 1..=10 score from the first token of an LLM answer.
pub fn parse_relevance_score(answer: &str) -> Option<u8> {
    let token = answer.split_whitespace().next()?;
    let digits: String = token.chars().take_while(|c| c.is_ascii_digit()).collect();
    let score = digits.parse::<u32>().ok()?;
    Some(score.clamp(1, 10) as u8)
}

/// Read a theme from the first word of an LLM answer.
pub fn parse_theme(answer: &str) -> Option<Theme> {
    let word = answer.split_whitespace().next()?;
    let word = word.trim_matches(|c: char| !c.is_alphanumeric());
    Theme::from_str(word).ok()
}

/// Editorial helpers on top of the LLM. Every operation degrades to a
/// neutral result when no provider is configured or the call fails.
pub struct NewsAssistant {
    llm: Arc<dyn LlmClient>,
}

impl NewsAssistant {
    /// Creates an assistant on top of `llm`.
    pub fn new(llm: Arc<dyn LlmClient>) -> Self {
        Self { llm }
    }

    /// The underlying client, used to manage API keys.
    pub fn llm(&self) -> &Arc<dyn LlmClient> {
        &self.llm
    }

    /// Whether any LLM provider is configured.
    pub async fn is_available(&self) -> bool {
        self.llm.is_configured().await
    }

    /// Relevance of an article from 1 to 10. Defaults to 5.
    pub async fn relevance_score(&self, title: &str, content: &str) -> u8 {
        let excerpt: String = content.chars().take(500).collect();
        let prompt = format!(
            "Rate the relevance of this cryptocurrency news item from 1 to 10.\nConsider market \
             impact, novelty and reader interest.\n\nTitle: {title}\nContent: {excerpt}\n\nAnswer \
             ONLY with the number (1-10):"
        );

        match self.llm.complete(&prompt, SYSTEM_PROMPT, 10).await {
            Ok(answer) => parse_relevance_score(&answer).unwrap_or(DEFAULT_RELEVANCE),
            Err(e) => {
                tracing::debug!("Relevance scoring unavailable: {e}");
                DEFAULT_RELEVANCE
            }
        }
    }

    /// Classify an article into one of the known themes. Defaults to news.
    pub async fn classify_theme(&self, title: &str, content: &str) -> Theme {
        let excerpt: String = content.chars().take(300).collect();
        let options = Theme::ALL.iter().map(|t| format!("- {}", t.as_str())).collect::<Vec<_>>();
        let prompt = format!(
            "Classify this news item into ONE of the categories:\n{}\n\nTitle: {title}\nContent: \
             {excerpt}\n\nAnswer ONLY with the category:",
            options.join("\n")
        );

        match self.llm.complete(&prompt, SYSTEM_PROMPT, 20).await {
            Ok(answer) => parse_theme(&answer).unwrap_or(Theme::News),
            Err(e) => {
                tracing::debug!("Theme classification unavailable: {e}");
                Theme::News
            }
        }
    }

    /// Summarise `text` in at most two sentences in `language`. Without an LLM
    /// the text is cut to 200 characters.
    pub async fn summarize(&self, text: &str, language: &str) -> String {
        let excerpt: String = text.chars().take(2000).collect();
        let prompt = format!(
            "Summarise this cryptocurrency news item in the language '{language}', in at most two \
             concise and informative sentences:\n\n{excerpt}"
        );

        match self.llm.complete(&prompt, SYSTEM_PROMPT, 300).await {
            Ok(summary) => summary,
            Err(e) => {
                tracing::debug!("Summary unavailable: {e}");
                truncate_with_ellipsis(text, SUMMARY_FALLBACK_CHARS)
            }
        }
    }

    /// Prefix a headline with one or two fitting emojis.
    pub async fn add_emojis(&self, title: &str) -> String {
        let prompt = format!(
            "Add 1-2 relevant emojis at the START of this crypto news headline.\nReturn ONLY the \
             headline with the emojis, nothing else.\n\nHeadline: {title}"
        );

        match self.llm.complete(&prompt, SYSTEM_PROMPT, 100).await {
            Ok(answer) => answer,
            Err(e) => {
                tracing::debug!("Emoji decoration unavailable: {e}");
                title.to_string()
            }
        }
    }

    /// Short round trip used to validate a freshly entered key.
    pub async fn ping(&self) -> AiResult<String> {
        self.llm.complete("Reply with 'OK' if you can read this.", SYSTEM_PROMPT, 10).await
    }
}
