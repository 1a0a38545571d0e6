/// Sources shipped with the bot.
pub mod catalog;
#[cfg(test)]
mod tests;

use thiserror::Error;
use url::Url;

use crate::settings::{BotSettings, SourceSpec};

const DEFAULT_LIST_SELECTOR: &str = "h2 a, h3 a, article a";
const DEFAULT_TITLE_SELECTOR: &str = "h1";
const DEFAULT_CONTENT_SELECTOR: &str = "div.content, div.post-content, div.entry-content, article";
const MAX_KEY_LEN: usize = 20;

/// Errors parsing a custom source.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SourceInputError {
    /// Wrong number of fields.
    #[error("Expected name|url or name|url|list_selector|title_selector|content_selector")]
    Format,
    /// The name has nothing to build a key from.
    #[error("Source name must contain letters or digits")]
    EmptyName,
    /// The URL is not http(s).
    #[error("Invalid source URL: {0}")]
    InvalidUrl(String),
}

/// A news site ready to be scraped.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Source {
    /// Settings key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Listing page.
    pub url: String,
    /// Selects article links on the listing page.
    pub list_selector: String,
    /// Selects the title on an article page.
    pub title_selector: String,
    /// Selects the body on an article page.
    pub content_selector: String,
    /// ISO 639-1 code, unknown for some custom sources.
    pub language: Option<String>,
}

impl From<&catalog::CatalogEntry> for Source {
    fn from(entry: &catalog::CatalogEntry) -> Self {
        Self {
            key: entry.key.to_string(),
            name: entry.name.to_string(),
            url: entry.url.to_string(),
            list_selector: entry.list_selector.to_string(),
            title_selector: entry.title_selector.to_string(),
            content_selector: entry.content_selector.to_string(),
            language: Some(entry.language.to_string()),
        }
    }
}

impl Source {
    fn from_spec(key: &str, spec: &SourceSpec) -> Self {
        Self {
            key: key.to_string(),
            name: spec.name.clone(),
            url: spec.url.clone(),
            list_selector: spec.list_selector.clone(),
            title_selector: spec.title_selector.clone(),
            content_selector: spec.content_selector.clone(),
            language: spec.language.clone(),
        }
    }
}

/// Look up a source by key: built-in catalog first, then admin defined
/// sources, then the popular catalog.
pub fn lookup(settings: &BotSettings, key: &str) -> Option<Source> {
    catalog::builtin(key)
        .map(Source::from)
        .or_else(|| settings.custom_sources.get(key).map(|spec| Source::from_spec(key, spec)))
        .or_else(|| catalog::popular(key).map(Source::from))
}

/// Display name for a source key, falling back to the key itself.
pub fn display_name(settings: &BotSettings, key: &str) -> String {
    lookup(settings, key).map(|s| s.name).unwrap_or_else(|| key.to_string())
}

/// Every enabled source that can be resolved. Unknown keys are skipped.
pub fn resolve_enabled(settings: &BotSettings) -> Vec<Source> {
    settings
        .sources_enabled
        .iter()
        .filter(|(_, enabled)| **enabled)
        .filter_map(|(key, _)| {
            let source = lookup(settings, key);
            if source.is_none() {
                tracing::debug!("Skipping unknown source: {key}");
            }
            source
        })
        .collect()
}

/// A row of the sources menu.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceEntry {
    /// Settings key.
    pub key: String,
    /// Display name.
    pub name: String,
    /// Whether the source is fetched.
    pub enabled: bool,
}

/// Every configured source, enabled or not, in key order.
pub fn entries(settings: &BotSettings) -> Vec<SourceEntry> {
    settings
        .sources_enabled
        .iter()
        .map(|(key, enabled)| SourceEntry {
            key: key.clone(),
            name: display_name(settings, key),
            enabled: *enabled,
        })
        .collect()
}

/// Derive a source key from its display name: lowercase alphanumerics, at most
/// 20 characters.
pub fn source_key(name: &str) -> String {
    name.chars()
        .filter(|c| c.is_alphanumeric())
        .flat_map(char::to_lowercase)
        .take(MAX_KEY_LEN)
        .collect()
}

/// Parse admin input `name|url[|list|title|content]` into a key and a source
/// definition. Missing selectors fall back to generic ones.
pub fn parse_source_input(text: &str) -> Result<(String, SourceSpec), SourceInputError> {
    let parts: Vec<&str> = text.trim().split('|').map(str::trim).collect();
    if parts.len() < 2 {
        return Err(SourceInputError::Format);
    }

    let name = parts[0];
    let key = source_key(name);
    if key.is_empty() {
        return Err(SourceInputError::EmptyName);
    }

    let url = Url::parse(parts[1]).map_err(|_| SourceInputError::InvalidUrl(parts[1].into()))?;
    if !matches!(url.scheme(), "http" | "https") {
        return Err(SourceInputError::InvalidUrl(parts[1].to_string()));
    }

    let selector = |idx: usize, default: &str| {
        parts.get(idx).filter(|s| !s.is_empty()).map_or(default.to_string(), |s| s.to_string())
    };

    let spec = SourceSpec {
        name: name.to_string(),
        url: url.to_string(),
        list_selector: selector(2, DEFAULT_LIST_SELECTOR),
        title_selector: selector(3, DEFAULT_TITLE_SELECTOR),
        content_selector: selector(4, DEFAULT_CONTENT_SELECTOR),
        language: None,
    };

    Ok((key, spec))
}
