//! HTML texts of the admin panel, channel posts and alerts.

use std::fmt::Write;

use chrono::Timelike;
use teloxide::utils::html::escape;

use super::{
    MAX_MESSAGE_LENGTH,
    utils::{check_mark, stars, truncate_with_ellipsis},
};
use crate::{
    analytics::{Breakdown, DailyReport, WeeklyReport},
    calendar::CalendarView,
    pagination::Paginated,
    settings::{BotSettings, SourceSpec, Theme},
    sources::SourceEntry,
    scheduler::MAX_DIGEST_POSTS,
    storage::{AlertWindow, CryptoEvent, PostRecord, ScheduledPost},
};

const MONTH_TITLE_CHARS: usize = 40;
const TOP_TITLE_CHARS: usize = 40;
const ALERT_DESCRIPTION_CHARS: usize = 200;
const WEEK_BAR_MAX: usize = 20;

/// Main menu title.
pub fn main_menu() -> String {
    "🤖 <b>Configuration Panel</b>\n\nChoose an option:".to_string()
}

/// Command list.
pub fn help() -> String {
    "📖 <b>Available Commands</b>\n\n\
     /start or /config - Open the configuration panel\n\
     /status - Show the current status\n\
     /calendar or /eventos - Crypto events calendar\n\
     /help - This message\n\n\
     <b>Features:</b>\n\
     • Configure news sources\n\
     • Schedule daily digests\n\
     • Choose the message format\n\
     • Automatic translation\n\
     • Summarize news with AI\n\
     • Filter by theme\n\
     • Alerts for crypto events"
        .to_string()
}

/// Summary of the current settings and keys.
pub fn status(settings: &BotSettings, groq_key: bool, openai_key: bool) -> String {
    let format = &settings.format;
    format!(
        "📊 <b>Bot Status</b>\n\n\
         📰 Active sources: {}\n\
         🏷️ Active themes: {}\n\
         🌐 Translation: {} ({})\n\
         🤖 AI summary: {}\n\
         🔗 Show link: {}\n\
         🖼️ Show image: {}\n\
         📝 Style: {}\n\n\
         ⏱️ Interval: {}s\n\
         🔑 Groq: {}\n\
         🔑 OpenAI: {}",
        settings.enabled_sources_count(),
        settings.enabled_themes_count(),
        check_mark(format.translate),
        escape(&settings.language),
        check_mark(format.summarize),
        check_mark(format.show_link),
        check_mark(format.show_image),
        format.style.label(),
        settings.cycle_interval,
        check_mark(groq_key),
        check_mark(openai_key),
    )
}

/// Header of a sources page.
pub fn sources_menu(page: &Paginated<SourceEntry>) -> String {
    let mut text = "📰 <b>News Sources</b>\n\nTap a source to enable or disable it.".to_string();
    if page.total_pages > 1 {
        let _ = write!(text, "\n\nPage {} of {}", page.page, page.total_pages);
    }
    text
}

/// Header of the popular sources list.
pub fn popular_sources_menu() -> String {
    "📋 <b>Popular Sources</b>\n\nTap a source to add it. ✅ marks sources already enabled."
        .to_string()
}

/// Header of the format menu.
pub fn format_menu() -> String {
    "📝 <b>Message Format</b>\n\nChoose what goes into each post:".to_string()
}

/// Header of the themes menu.
pub fn themes_menu() -> String {
    "🏷️ <b>Themes</b>\n\nOnly news classified into an enabled theme is posted:".to_string()
}

/// Digest schedules and their state.
pub fn schedule_menu(schedules: &[ScheduledPost]) -> String {
    let mut text = "⏰ <b>Posting Schedule</b>\n\nDaily digests, times in UTC.".to_string();
    if schedules.is_empty() {
        text.push_str("\n\n<i>No schedule configured.</i>");
    }
    text
}

/// AI menu with key status.
pub fn ai_menu(groq_key: bool, openai_key: bool) -> String {
    format!(
        "🤖 <b>AI Settings</b>\n\nGroq key: {}\nOpenAI key: {}",
        check_mark(groq_key),
        check_mark(openai_key)
    )
}

/// Header of the analytics menu.
pub fn analytics_menu() -> String {
    "📊 <b>Analytics</b>\n\nChoose a report:".to_string()
}

/// Header of the calendar menu.
pub fn calendar_menu() -> String {
    "📅 <b>Crypto Calendar</b>\n\nConferences, macro speeches and launches:".to_string()
}

/// Header of the alerts menu.
pub fn calendar_alerts_menu() -> String {
    "🔔 <b>Event Alerts</b>\n\nChoose which alerts are sent to the channels:".to_string()
}

/// Today's report.
pub fn daily_report(report: &DailyReport) -> String {
    let totals = &report.totals;
    let mut text = format!(
        "📈 <b>Today's Report</b>\n\n\
         📊 <b>Summary:</b>\n\
         • Posts sent: {}\n\
         • Views: {}\n\
         • Forwards: {}\n\
         • Reactions: {}\n\n\
         📰 <b>By Source:</b>\n",
        totals.posts, totals.views, totals.forwards, totals.reactions
    );

    if report.by_source.is_empty() {
        text.push_str("<i>No posts today yet.</i>\n");
    }
    for source in &report.by_source {
        let _ = writeln!(
            text,
            "• {}: {} posts, {} views",
            escape(&source.key),
            source.posts,
            source.views
        );
    }
    text
}

/// Weekly report with a bar per day.
pub fn weekly_report(report: &WeeklyReport) -> String {
    let totals = &report.totals;
    let mut text = format!(
        "📊 <b>Weekly Report</b>\n\n\
         📈 <b>Totals (7 days):</b>\n\
         • Posts: {}\n\
         • Views: {}\n\
         • Forwards: {}\n\n\
         📅 <b>By Day:</b>\n",
        totals.posts, totals.views, totals.forwards
    );

    for (day, posts) in &report.by_day {
        let bar = "█".repeat((*posts).min(WEEK_BAR_MAX));
        let _ = writeln!(text, "{}: {bar} {posts}", day.format("%a %d/%m"));
    }

    text.push_str("\n📰 <b>Top Sources:</b>\n");
    for source in &report.top_sources {
        let _ = writeln!(text, "• {}: {} views", escape(&source.key), source.views);
    }
    text
}

/// Ranking of the most viewed posts.
pub fn top_posts(posts: &[PostRecord]) -> String {
    let mut text = format!("🏆 <b>Top {} Posts (by views)</b>\n\n", posts.len().max(1));

    if posts.is_empty() {
        text.push_str("<i>No posts recorded yet.</i>");
    }
    for (i, post) in posts.iter().enumerate() {
        let _ = write!(
            text,
            "{}. {} 👁 | {}\n   <i>{} - {}</i>\n\n",
            i + 1,
            post.views,
            escape(&truncate_with_ellipsis(&post.title, TOP_TITLE_CHARS)),
            escape(&post.source),
            post.posted_at.format("%d/%m")
        );
    }
    text
}

/// Posts grouped by source or theme over the last 7 days.
pub fn breakdown(title: &str, groups: &[Breakdown]) -> String {
    let mut text = format!("<b>{}</b> (7 days)\n\n", escape(title));
    if groups.is_empty() {
        text.push_str("<i>No posts recorded yet.</i>");
    }
    for group in groups {
        let _ = writeln!(
            text,
            "• {}: {} posts, {} views",
            escape(&group.key),
            group.posts,
            group.views
        );
    }
    text
}

fn event_title(event: &CryptoEvent) -> String {
    match &event.source_url {
        Some(url) => format!("<a href=\"{}\">{}</a>", escape(url), escape(&event.title)),
        None => escape(&event.title),
    }
}

/// One event of a calendar listing.
pub fn event_line(event: &CryptoEvent) -> String {
    let mut date = event.starts_at.format("%d/%m/%Y").to_string();
    if let Some(end) = event.ends_at.filter(|end| *end != event.starts_at) {
        let _ = write!(date, " - {}", end.format("%d/%m/%Y"));
    }

    let mut text =
        format!("{} <b>{}</b>\n📅 {date}\n", event.category.icon(), event_title(event));
    if let Some(location) = &event.location {
        let _ = writeln!(text, "📍 {}", escape(location));
    }
    if let Some(coin) = &event.coin {
        let _ = writeln!(text, "🪙 {}", escape(coin));
    }
    if event.importance >= 8 {
        let _ = writeln!(text, "⭐ Importance: {}", stars(event.importance, 10));
    }
    if let Some(url) = &event.source_url {
        let _ = writeln!(text, "🔗 <a href=\"{}\">More info</a>", escape(url));
    }
    text
}

/// Events of a calendar view.
pub fn calendar_view(view: CalendarView, events: &[CryptoEvent]) -> String {
    let limit = view.limit().unwrap_or(events.len());
    let shown = &events[..limit.min(events.len())];

    match view {
        CalendarView::Today => {
            let mut text = "📅 <b>Today's Events</b>\n\n".to_string();
            if events.is_empty() {
                text.push_str("<i>No events today.</i>\n");
            }
            for event in shown {
                text.push_str(&event_line(event));
                text.push('\n');
            }
            text
        }
        CalendarView::Week => {
            let mut text = "📆 <b>Next 7 Days</b>\n\n".to_string();
            if events.is_empty() {
                text.push_str("<i>No events in the next 7 days.</i>\n");
            }
            let mut current_day = None;
            for event in shown {
                let day = event.starts_at.date_naive();
                if current_day != Some(day) {
                    current_day = Some(day);
                    let _ = writeln!(text, "\n<b>📅 {}</b>", day.format("%d/%m (%a)"));
                }
                let _ = write!(text, "  • {}", escape(&event.title));
                if let Some(coin) = &event.coin {
                    let _ = write!(text, " [{}]", escape(coin));
                }
                text.push('\n');
            }
            text
        }
        CalendarView::Month => {
            let mut text = "🗓️ <b>Next 30 Days</b>\n\n".to_string();
            if events.is_empty() {
                text.push_str("<i>No events in the next 30 days.</i>\n");
            }
            for event in shown {
                let _ = writeln!(
                    text,
                    "{} <b>{}</b> - {}",
                    event.category.icon(),
                    event.starts_at.format("%d/%m"),
                    escape(&truncate_with_ellipsis(&event.title, MONTH_TITLE_CHARS))
                );
            }
            if events.len() > shown.len() {
                let _ = write!(text, "\n<i>... and {} more events</i>", events.len() - shown.len());
            }
            text
        }
        CalendarView::Speeches => {
            let mut text = "🎤 <b>Key Speeches</b>\n\n<i>Direct impact on the crypto market!</i>\n\n"
                .to_string();
            if events.is_empty() {
                text.push_str("<i>No speeches scheduled.</i>\n");
            }
            for event in shown {
                let _ = write!(
                    text,
                    "🎤 <b>{}</b>\n   📅 {}",
                    escape(&event.title),
                    event.starts_at.format("%d/%m/%Y")
                );
                if let Some(location) = &event.location {
                    let _ = write!(text, " | 📍 {}", escape(location));
                }
                text.push_str("\n\n");
            }
            text.push_str(
                "\n⚠️ <b>Tip:</b> FOMC meetings and Fed speeches can cause high volatility!",
            );
            text
        }
        CalendarView::Conferences => {
            let mut text = "🎪 <b>Crypto Conferences</b>\n\n".to_string();
            if events.is_empty() {
                text.push_str("<i>No conferences registered.</i>\n");
            }
            for event in shown {
                let mut date = event.starts_at.format("%d/%m").to_string();
                if let Some(end) = event.ends_at {
                    let _ = write!(date, "-{}", end.format("%d/%m"));
                }
                let rating = if event.importance >= 8 {
                    stars(event.importance / 2, 5)
                } else {
                    String::new()
                };

                let _ = write!(text, "🎪 <b>{}</b> {rating}\n   📅 {date}", escape(&event.title));
                if let Some(location) = &event.location {
                    let _ = write!(text, " | 📍 {}", escape(location));
                }
                text.push_str("\n\n");
            }
            text
        }
        CalendarView::Launches => {
            let mut text = "🚀 <b>Launches &amp; Updates</b>\n\n".to_string();
            if events.is_empty() {
                text.push_str("<i>No launches scheduled.</i>\n");
            }
            for event in shown {
                let _ = write!(
                    text,
                    "🚀 <b>{}</b>\n   📅 {}",
                    escape(&event.title),
                    event.starts_at.format("%d/%m/%Y")
                );
                if let Some(coin) = &event.coin {
                    let _ = write!(text, " | 🪙 {}", escape(coin));
                }
                text.push_str("\n\n");
            }
            text
        }
    }
}

/// Alert sent to the destinations ahead of an event.
pub fn event_alert(event: &CryptoEvent, window: AlertWindow) -> String {
    let header = match window {
        AlertWindow::OneDay => "⏰ <b>TOMORROW!</b>",
        AlertWindow::OneHour => "🔔 <b>IN 1 HOUR!</b>",
    };
    let date = if event.starts_at.hour() != 0 || event.starts_at.minute() != 0 {
        event.starts_at.format("%d/%m/%Y at %H:%M UTC").to_string()
    } else {
        event.starts_at.format("%d/%m/%Y").to_string()
    };

    let mut text = format!(
        "{header}\n\n{} <b>{}</b>\n\n📅 Date: {date}",
        event.category.icon(),
        escape(&event.title)
    );
    if let Some(location) = &event.location {
        let _ = write!(text, "\n📍 Location: {}", escape(location));
    }
    if let Some(coin) = &event.coin {
        let _ = write!(text, "\n🪙 Coin: {}", escape(coin));
    }
    if let Some(description) = event.description.as_deref().filter(|d| !d.is_empty()) {
        let description: String = description.chars().take(ALERT_DESCRIPTION_CHARS).collect();
        let _ = write!(text, "\n\n{}", escape(&description));
    }
    let _ = write!(
        text,
        "\n\n{} Importance: {}/10",
        stars(event.importance, 5),
        event.importance
    );
    if let Some(url) = &event.source_url {
        let _ = write!(text, "\n\n🔗 <a href=\"{}\">More info</a>", escape(url));
    }
    text
}

/// Instructions for adding a custom source.
pub fn add_source_prompt() -> String {
    "➕ <b>Add a source</b>\n\n\
     Reply in the format:\n\
     <code>name|url|list_selector|title_selector|content_selector</code>\n\n\
     <b>Example:</b>\n\
     <code>MySite|https://mysite.com/|h3 a|h1|div.content</code>\n\n\
     Or send only <code>name|url</code> to use generic selectors."
        .to_string()
}

/// Confirmation of a custom source.
pub fn source_added(spec: &SourceSpec) -> String {
    format!(
        "✅ Source <b>{}</b> added!\n\n\
         🔗 URL: {}\n\
         📋 List: <code>{}</code>\n\
         📰 Title: <code>{}</code>\n\
         📝 Content: <code>{}</code>",
        escape(&spec.name),
        escape(&spec.url),
        escape(&spec.list_selector),
        escape(&spec.title_selector),
        escape(&spec.content_selector)
    )
}

/// Instructions for adding a digest schedule.
pub fn schedule_prompt() -> String {
    let themes = Theme::ALL.iter().map(Theme::as_str).collect::<Vec<_>>().join(", ");
    format!(
        "📝 Reply with the time in the format:\n<code>HH:MM theme count</code>\n\n\
         Example: <code>09:00 news 5</code>\n\nThemes: {themes}\n\
         Count: 1 to {MAX_DIGEST_POSTS} posts"
    )
}

/// Confirmation of a digest schedule.
pub fn schedule_added(hour: u8, minute: u8, theme: Theme, max_posts: u32) -> String {
    format!("✅ Schedule added: {hour:02}:{minute:02} - {theme} ({max_posts} posts)")
}

/// Instructions for the Groq key.
pub fn groq_key_prompt() -> String {
    "🔑 Reply with your Groq API key.\n\nGet one for free at https://console.groq.com/keys"
        .to_string()
}

/// Instructions for the OpenAI key.
pub fn openai_key_prompt() -> String {
    "🔑 Reply with your OpenAI API key (fallback provider):".to_string()
}

/// Instructions for adding a manual event.
pub fn add_event_prompt() -> String {
    "➕ <b>Add an event</b>\n\n\
     Reply in the format:\n\
     <code>YYYY-MM-DD|Title|category|location</code>\n\n\
     <b>Categories:</b> conference, speech, launch, update, airdrop, ama\n\n\
     <b>Example:</b>\n\
     <code>2026-03-15|ETH Mainnet Update|launch|Virtual</code>"
        .to_string()
}

/// Result of a calendar refresh.
pub fn calendar_refreshed(added: usize) -> String {
    format!(
        "🔄 Events refreshed!\n\n✅ {added} new event(s) added.\n\n\
         Events are loaded from:\n\
         • CoinMarketCal\n\
         • The built-in 2026 conference and FOMC list"
    )
}

/// Shown after an analytics refresh.
pub fn analytics_refreshed() -> String {
    "🔄 Reports refreshed!\n\n\
     <i>Note: the Telegram Bot API does not expose view counts to bots, so views only \
     change when they are recorded elsewhere.</i>"
        .to_string()
}

/// Confirmation of an event added by an admin.
pub fn event_added(event: &CryptoEvent) -> String {
    format!(
        "✅ Event added!\n\n{} <b>{}</b>\n📅 {}\n📍 {}\n🏷️ {}\n\n\
         Alerts will be sent 1 day and 1 hour before!",
        event.category.icon(),
        escape(&event.title),
        event.starts_at.format("%d/%m/%Y"),
        escape(event.location.as_deref().unwrap_or("Not specified")),
        event.category
    )
}

/// Daily digest of the latest posts of a theme. Entries that would push the
/// text past the Telegram message limit are left out.
pub fn digest(theme: Theme, posts: &[PostRecord]) -> String {
    let mut text = format!("🗞️ <b>Daily digest: {}</b>\n\n", escape(theme.label()));
    let mut chars = text.chars().count();
    for (i, post) in posts.iter().enumerate() {
        let entry = format!(
            "{}. <a href=\"{}\">{}</a>\n   <i>{}</i>\n\n",
            i + 1,
            escape(&post.link),
            escape(&post.title),
            escape(&post.source)
        );
        let entry_chars = entry.chars().count();
        if chars + entry_chars > MAX_MESSAGE_LENGTH {
            tracing::debug!("Digest cut to {i} of {} posts", posts.len());
            break;
        }
        chars += entry_chars;
        text.push_str(&entry);
    }
    text.trim_end().to_string()
}

/// Body of a news post: at most `max_paragraphs` paragraphs, cut to
/// `max_chars` characters.
pub fn compose_body(paragraphs: &[String], max_paragraphs: usize, max_chars: usize) -> String {
    let body = paragraphs
        .iter()
        .map(|p| p.trim())
        .filter(|p| !p.is_empty())
        .take(max_paragraphs)
        .collect::<Vec<_>>()
        .join("\n\n");
    truncate_with_ellipsis(&body, max_chars)
}

/// A processed article ready for the destinations.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewsPost {
    /// Title, possibly translated.
    pub title: String,
    /// Body, empty for the title only style.
    pub body: String,
    /// Article link, when links are shown.
    pub link: Option<String>,
    /// Source name, with the language tag when translated.
    pub source_tag: String,
}

/// Channel text of a post.
pub fn news_post(post: &NewsPost) -> String {
    let mut text = format!("<b>{}</b>", escape(&post.title));
    if !post.body.is_empty() {
        let _ = write!(text, "\n\n{}", escape(&post.body));
    }
    text.push_str("\n\n");
    if let Some(link) = &post.link {
        let _ = writeln!(text, "🔗 <a href=\"{}\">Read more</a>", escape(link));
    }
    let _ = write!(text, "📰 <i>{}</i>", escape(&post.source_tag));
    text
}
