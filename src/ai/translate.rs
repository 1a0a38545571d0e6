use std::time::Duration;

use async_trait::async_trait;
use mockall::automock;
use reqwest::Client;
use serde_json::Value;

use super::{AiError, AiResult};

const TRANSLATE_URL: &str = "https://translate.googleapis.com/translate_a/single";
const MAX_INPUT_CHARS: usize = 4000;

/// Translates article titles and bodies.
#[automock]
#[async_trait]
pub trait Translator: Send + Sync {
    /// Translate `text` into the `target` language (ISO 639-1 code).
    async fn translate(&self, text: &str, target: &str) -> AiResult<String>;
}

/// Translator backed by the public Google translate endpoint.
pub struct GoogleTranslator {
    client: Client,
}

impl GoogleTranslator {
    /// Creates a translator with its own HTTP client.
    pub fn new() -> AiResult<Self> {
        let client = Client::builder().timeout(Duration::from_secs(20)).build()?;
        Ok(Self { client })
    }
}

/// Join the translated segments of a `translate_a/single` response.
pub(crate) fn parse_translation(body: &Value) -> Option<String> {
    let segments = body.get(0)?.as_array()?;
    let text: String =
        segments.iter().filter_map(|segment| segment.get(0).and_then(Value::as_str)).collect();
    (!text.trim().is_empty()).then_some(text)
}

#[async_trait]
impl Translator for GoogleTranslator {
    async fn translate(&self, text: &str, target: &str) -> AiResult<String> {
        if text.trim().is_empty() {
            return Ok(text.to_string());
        }
        let input: String = text.chars().take(MAX_INPUT_CHARS).collect();

        let response = self
            .client
            .post(TRANSLATE_URL)
            .query(&[("client", "gtx"), ("sl", "auto"), ("tl", target), ("dt", "t")])
            .form(&[("q", input.as_str())])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(AiError::Translation(format!("HTTP {status}")));
        }

        let body: Value = response.json().await?;
        parse_translation(&body)
            .ok_or_else(|| AiError::Translation("Unexpected response shape".to_string()))
    }
}
