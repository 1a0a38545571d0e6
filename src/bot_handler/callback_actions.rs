use serde::{Deserialize, Serialize};

use crate::{calendar::CalendarView, settings::PostStyle};

/// Payload of inline keyboard buttons. Names are kept short because Telegram
/// limits callback data to 64 bytes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum CallbackAction<'a> {
    /// Opens the main menu.
    #[serde(rename = "mm")]
    MainMenu,
    /// Shows the bot status.
    #[serde(rename = "st")]
    Status,
    /// Shows the help text.
    #[serde(rename = "hlp")]
    Help,
    /// Section headers. Does nothing.
    #[serde(rename = "noop")]
    Noop,

    // Sources
    /// Sources menu at a page.
    #[serde(rename = "src")]
    Sources(usize), // Sources(page)
    /// Enables or disables a source, then redraws its page.
    #[serde(rename = "ts")]
    ToggleSource(&'a str, usize), // ToggleSource("coindesk", page)
    /// Removes a custom source, then redraws its page.
    #[serde(rename = "ds")]
    DeleteSource(&'a str, usize),
    /// Asks for a custom source definition.
    #[serde(rename = "as")]
    AddSource,
    /// Lists the popular sources.
    #[serde(rename = "pop")]
    PopularSources,
    /// Enables a popular source.
    #[serde(rename = "qa")]
    QuickAdd(&'a str),

    // Format
    /// Post format menu.
    #[serde(rename = "fmt")]
    Format,
    /// Flips a post format flag.
    #[serde(rename = "tf")]
    ToggleFormat(&'a str),
    /// Selects a post style.
    #[serde(rename = "sty")]
    SetStyle(PostStyle),

    // Themes
    /// Themes menu.
    #[serde(rename = "th")]
    Themes,
    /// Enables or disables a theme.
    #[serde(rename = "tt")]
    ToggleTheme(&'a str),

    // Schedule
    /// Scheduled digests menu.
    #[serde(rename = "sch")]
    Schedule,
    /// Enables or disables a digest by id.
    #[serde(rename = "tsch")]
    ToggleSchedule(i64),
    /// Asks for a new digest schedule.
    #[serde(rename = "asch")]
    AddSchedule,

    // AI
    /// AI menu.
    #[serde(rename = "ai")]
    Ai,
    /// Flips one of the AI format flags.
    #[serde(rename = "tai")]
    ToggleAi(&'a str),
    /// Asks for a Groq API key.
    #[serde(rename = "gk")]
    SetGroqKey,
    /// Asks for an OpenAI API key.
    #[serde(rename = "ok")]
    SetOpenAiKey,

    // Analytics
    /// Analytics menu.
    #[serde(rename = "an")]
    Analytics,
    /// Today's report.
    #[serde(rename = "at")]
    AnalyticsToday,
    /// Report of the last 7 days.
    #[serde(rename = "aw")]
    AnalyticsWeek,
    /// Most viewed posts.
    #[serde(rename = "atop")]
    AnalyticsTop,
    /// Posts grouped by source.
    #[serde(rename = "asrc")]
    AnalyticsBySource,
    /// Posts grouped by theme.
    #[serde(rename = "athm")]
    AnalyticsByTheme,
    /// Redraws the analytics menu.
    #[serde(rename = "aref")]
    AnalyticsRefresh,

    // Calendar
    /// Calendar menu.
    #[serde(rename = "cal")]
    Calendar,
    /// Events of a calendar view.
    #[serde(rename = "cv")]
    CalendarView(CalendarView),
    /// Alert switches.
    #[serde(rename = "calr")]
    CalendarAlerts,
    /// Flips an alert switch.
    #[serde(rename = "tcal")]
    ToggleCalendar(&'a str),
    /// Asks for a manual event.
    #[serde(rename = "cadd")]
    CalendarAdd,
    /// Reloads the built-in and scraped events.
    #[serde(rename = "cref")]
    CalendarRefresh,
}
