
use std::{collections::BTreeMap, fmt, str::FromStr, sync::Arc};

use async_trait::async_trait;
use mockall::automock;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use crate::storage::{SettingsStorage, StorageError};

/// Key of the settings document in the `bot_config` table.
pub const SETTINGS_KEY: &str = "main_config";

/// Errors of the settings layer.
#[derive(Debug, Error)]
pub enum SettingsError {
    /// The settings row could not be read or written.
    #[error("Storage error: {0}")]
    Storage(#[from] StorageError),
    /// The settings document could not be encoded.
    #[error("Failed to serialize settings: {0}")]
    Serialization(#[from] serde_json::Error),
    /// A toggle or theme key is unknown.
    #[error("Unknown setting: {0}")]
    UnknownKey(String),
}

/// Result type for settings operations.
pub type SettingsResult<T> = Result<T, SettingsError>;

/// Topic of a news item, as assigned by the classifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Theme {
    /// General news.
    News,
    /// Market analysis.
    Analysis,
    /// On-chain data.
    Onchain,
    /// Large wallet moves.
    Whale,
    /// Liquidations.
    Liquidation,
    /// Exchange news.
    Exchange,
    /// Regulation.
    Regulation,
    /// DeFi.
    Defi,
    /// NFTs.
    Nft,
}

impl Theme {
    /// Every theme, in menu order.
    pub const ALL: [Theme; 9] = [
        Self::News,
        Self::Analysis,
        Self::Onchain,
        Self::Whale,
        Self::Liquidation,
        Self::Exchange,
        Self::Regulation,
        Self::Defi,
        Self::Nft,
    ];

    /// Key used in settings, callbacks and the classifier prompt.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::News => "news",
            Self::Analysis => "analysis",
            Self::Onchain => "onchain",
            Self::Whale => "whale",
            Self::Liquidation => "liquidation",
            Self::Exchange => "exchange",
            Self::Regulation => "regulation",
            Self::Defi => "defi",
            Self::Nft => "nft",
        }
    }

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::News => "📰 News",
            Self::Analysis => "📊 Analysis",
            Self::Onchain => "🔗 On-Chain",
            Self::Whale => "🐋 Whales",
            Self::Liquidation => "💥 Liquidations",
            Self::Exchange => "🏦 Exchanges",
            Self::Regulation => "⚖️ Regulation",
            Self::Defi => "🌾 DeFi",
            Self::Nft => "🖼️ NFT",
        }
    }
}

impl FromStr for Theme {
    type Err = SettingsError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        Self::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s))
            .ok_or_else(|| SettingsError::UnknownKey(s.to_string()))
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How much of an article goes into a post.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PostStyle {
    /// The article body as extracted.
    #[default]
    Complete,
    /// The first characters of the body.
    Summary,
    /// No body at all.
    TitleOnly,
}

impl PostStyle {
    /// Every style, in menu order.
    pub const ALL: [PostStyle; 3] = [Self::Complete, Self::Summary, Self::TitleOnly];

    /// Menu label.
    pub fn label(&self) -> &'static str {
        match self {
            Self::Complete => "Complete",
            Self::Summary => "Summary",
            Self::TitleOnly => "Title only",
        }
    }
}

/// Post format switches.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormatSettings {
    /// Append the article link.
    pub show_link: bool,
    /// Send the `og:image` as a photo.
    pub show_image: bool,
    /// Kept for the panel. Videos are not sent.
    pub show_video: bool,
    /// Translate titles and bodies.
    pub translate: bool,
    /// Replace the body with an LLM summary.
    pub summarize: bool,
    /// Drop articles below `min_relevance_score`.
    pub filter_relevance: bool,
    /// Prefix titles with emojis.
    pub add_emoji: bool,
    /// 1..=10
    pub min_relevance_score: u8,
    /// How much of the body is posted.
    pub style: PostStyle,
}

impl Default for FormatSettings {
    fn default() -> Self {
        Self {
            show_link: true,
            show_image: true,
            show_video: false,
            translate: true,
            summarize: false,
            filter_relevance: false,
            add_emoji: false,
            min_relevance_score: 5,
            style: PostStyle::Complete,
        }
    }
}

impl FormatSettings {
    /// Keys accepted by [`FormatSettings::toggle`].
    pub const FLAGS: [&'static str; 7] = [
        "show_link",
        "show_image",
        "show_video",
        "translate",
        "summarize",
        "filter_relevance",
        "add_emoji",
    ];

    fn flag_mut(&mut self, key: &str) -> Option<&mut bool> {
        match key {
            "show_link" => Some(&mut self.show_link),
            "show_image" => Some(&mut self.show_image),
            "show_video" => Some(&mut self.show_video),
            "translate" => Some(&mut self.translate),
            "summarize" => Some(&mut self.summarize),
            "filter_relevance" => Some(&mut self.filter_relevance),
            "add_emoji" => Some(&mut self.add_emoji),
            _ => None,
        }
    }

    /// Current value of a boolean flag.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match key {
            "show_link" => Some(self.show_link),
            "show_image" => Some(self.show_image),
            "show_video" => Some(self.show_video),
            "translate" => Some(self.translate),
            "summarize" => Some(self.summarize),
            "filter_relevance" => Some(self.filter_relevance),
            "add_emoji" => Some(self.add_emoji),
            _ => None,
        }
    }

    /// Flip a boolean flag and return its new value.
    pub fn toggle(&mut self, key: &str) -> SettingsResult<bool> {
        let flag = self.flag_mut(key).ok_or_else(|| SettingsError::UnknownKey(key.to_string()))?;
        *flag = !*flag;
        Ok(*flag)
    }
}

/// Switches for calendar alerts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CalendarSettings {
    /// Master switch.
    pub alerts_enabled: bool,
    /// Alert the day before.
    pub alert_1day: bool,
    /// Alert one hour before.
    pub alert_1hour: bool,
    /// Day-before alerts for conferences.
    pub alert_conferences: bool,
    /// Day-before alerts for speeches.
    pub alert_speeches: bool,
    /// Day-before alerts for launches.
    pub alert_launches: bool,
}

impl Default for CalendarSettings {
    fn default() -> Self {
        Self {
            alerts_enabled: true,
            alert_1day: true,
            alert_1hour: true,
            alert_conferences: true,
            alert_speeches: true,
            alert_launches: true,
        }
    }
}

impl CalendarSettings {
    /// Keys accepted by [`CalendarSettings::toggle`].
    pub const FLAGS: [&'static str; 6] =
        ["alerts", "1day", "1hour", "conferences", "speeches", "launches"];

    /// Value of a switch, `None` for unknown keys.
    pub fn flag(&self, key: &str) -> Option<bool> {
        match key {
            "alerts" => Some(self.alerts_enabled),
            "1day" => Some(self.alert_1day),
            "1hour" => Some(self.alert_1hour),
            "conferences" => Some(self.alert_conferences),
            "speeches" => Some(self.alert_speeches),
            "launches" => Some(self.alert_launches),
            _ => None,
        }
    }

    /// Flip a switch and return its new value.
    pub fn toggle(&mut self, key: &str) -> SettingsResult<bool> {
        let flag = match key {
            "alerts" => &mut self.alerts_enabled,
            "1day" => &mut self.alert_1day,
            "1hour" => &mut self.alert_1hour,
            "conferences" => &mut self.alert_conferences,
            "speeches" => &mut self.alert_speeches,
            "launches" => &mut self.alert_launches,
            _ => return Err(SettingsError::UnknownKey(key.to_string())),
        };
        *flag = !*flag;
        Ok(*flag)
    }
}

/// A source definition entered by an admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceSpec {
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
    /// Language of the articles. Translation is skipped when it matches the
    /// target language.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

/// The runtime settings document edited from the admin panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BotSettings {
    /// Source keys and whether they are enabled.
    pub sources_enabled: BTreeMap<String, bool>,
    /// Sources added from the panel.
    pub custom_sources: BTreeMap<String, SourceSpec>,
    /// Post format.
    pub format: FormatSettings,
    /// Theme keys and whether they are enabled.
    pub themes: BTreeMap<String, bool>,
    /// Alert switches.
    pub calendar: CalendarSettings,
    /// Target language for translation.
    pub language: String,
    /// Seconds between two news fetch cycles.
    pub cycle_interval: u64,
}

impl Default for BotSettings {
    fn default() -> Self {
        let sources_enabled = [
            ("coindesk", true),
            ("cointelegraph", true),
            ("decrypt", true),
            ("bitcoinmagazine", true),
            ("cryptoslate", true),
            ("utoday", true),
            ("portaldobitcoin", true),
            ("cointelegraphbr", true),
            ("criptofacil", true),
            ("whaletracker", false),
            ("lookonchain", false),
        ];
        let themes = [
            ("news", true),
            ("analysis", true),
            ("onchain", false),
            ("whale", false),
            ("liquidation", false),
            ("exchange", false),
        ];

        Self {
            sources_enabled: sources_enabled.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            custom_sources: BTreeMap::new(),
            format: FormatSettings::default(),
            themes: themes.iter().map(|(k, v)| (k.to_string(), *v)).collect(),
            calendar: CalendarSettings::default(),
            language: "pt".to_string(),
            cycle_interval: 300,
        }
    }
}

impl BotSettings {
    /// Flip a source on or off. Unknown keys are added enabled.
    pub fn toggle_source(&mut self, key: &str) -> bool {
        let enabled = self.sources_enabled.entry(key.to_string()).or_insert(false);
        *enabled = !*enabled;
        *enabled
    }

    /// Remove a source and its custom definition. Returns `false` when the
    /// source was unknown.
    pub fn delete_source(&mut self, key: &str) -> bool {
        let removed = self.sources_enabled.remove(key).is_some();
        self.custom_sources.remove(key).is_some() || removed
    }

    /// Add (or replace) an admin defined source and enable it.
    pub fn add_custom_source(&mut self, key: &str, spec: SourceSpec) {
        self.sources_enabled.insert(key.to_string(), true);
        self.custom_sources.insert(key.to_string(), spec);
    }

    /// Enable a source from the popular catalog. Returns `false` if it was
    /// already enabled.
    pub fn quick_add_source(&mut self, key: &str) -> bool {
        self.sources_enabled.insert(key.to_string(), true) != Some(true)
    }

    /// Flip a format flag.
    pub fn toggle_format(&mut self, key: &str) -> SettingsResult<bool> {
        self.format.toggle(key)
    }

    /// Select the post style.
    pub fn set_style(&mut self, style: PostStyle) {
        self.format.style = style;
    }

    /// Flip a theme. Themes without an entry count as enabled.
    pub fn toggle_theme(&mut self, key: &str) -> SettingsResult<bool> {
        let theme = Theme::from_str(key)?;
        let enabled = !self.is_theme_enabled(theme);
        self.themes.insert(theme.as_str().to_string(), enabled);
        Ok(enabled)
    }

    /// Flip an alert switch.
    pub fn toggle_calendar(&mut self, key: &str) -> SettingsResult<bool> {
        self.calendar.toggle(key)
    }

    /// Themes without an entry count as enabled.
    pub fn is_theme_enabled(&self, theme: Theme) -> bool {
        self.themes.get(theme.as_str()).copied().unwrap_or(true)
    }

    /// Number of enabled sources.
    pub fn enabled_sources_count(&self) -> usize {
        self.sources_enabled.values().filter(|v| **v).count()
    }

    /// Number of enabled themes.
    pub fn enabled_themes_count(&self) -> usize {
        Theme::ALL.iter().filter(|t| self.is_theme_enabled(**t)).count()
    }
}

/// Access to the cached settings document.
#[automock]
#[async_trait]
pub trait SettingsService: Send + Sync {
    /// Current settings. Falls back to defaults when nothing is stored or the
    /// stored document is unreadable.
    async fn get(&self) -> SettingsResult<BotSettings>;

    /// Persist `settings` and refresh the cache.
    async fn save(&self, settings: BotSettings) -> SettingsResult<()>;
}

/// Settings stored as JSON, cached after the first read.
pub struct DefaultSettingsService {
    storage: Arc<dyn SettingsStorage>,
    cache: RwLock<Option<BotSettings>>,
}

impl DefaultSettingsService {
    /// Creates a service over `storage`.
    pub fn new(storage: Arc<dyn SettingsStorage>) -> Self {
        Self { storage, cache: RwLock::new(None) }
    }
}

#[async_trait]
impl SettingsService for DefaultSettingsService {
    async fn get(&self) -> SettingsResult<BotSettings> {
        if let Some(settings) = self.cache.read().await.as_ref() {
            return Ok(settings.clone());
        }

        let settings = match self.storage.get_setting(SETTINGS_KEY).await? {
            Some(raw) => serde_json::from_str(&raw).unwrap_or_else(|e| {
                tracing::warn!("Stored settings are unreadable, using defaults: {e}");
                BotSettings::default()
            }),
            None => BotSettings::default(),
        };

        *self.cache.write().await = Some(settings.clone());
        Ok(settings)
    }

    async fn save(&self, settings: BotSettings) -> SettingsResult<()> {
        let raw = serde_json::to_string(&settings)?;
        self.storage.set_setting(SETTINGS_KEY, &raw).await?;
        *self.cache.write().await = Some(settings);
        tracing::debug!("Settings saved");
        Ok(())
    }
}
