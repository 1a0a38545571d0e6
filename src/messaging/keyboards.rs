use lazy_static::lazy_static;
use teloxide::types::{InlineKeyboardButton, InlineKeyboardMarkup};

use super::utils::{check_mark, serialize_action};
use crate::{
    bot_handler::CallbackAction,
    calendar::CalendarView,
    pagination::Paginated,
    settings::{BotSettings, CalendarSettings, PostStyle, Theme},
    sources::{
        SourceEntry,
        catalog::{self, SourceGroup},
    },
    storage::ScheduledPost,
};

/// Format flags shown in the format menu.
const FORMAT_FLAGS: [(&str, &str); 3] =
    [("show_link", "🔗 Link"), ("show_image", "🖼️ Image"), ("show_video", "🎬 Video")];

/// Format flags driven by the AI menu.
const AI_FLAGS: [(&str, &str); 4] = [
    ("translate", "🌐 Translate"),
    ("summarize", "📝 AI summary"),
    ("filter_relevance", "🎯 Relevance filter"),
    ("add_emoji", "😀 Emojis"),
];

fn button(text: impl Into<String>, action: &CallbackAction) -> InlineKeyboardButton {
    InlineKeyboardButton::callback(text, serialize_action(action))
}

fn back_row(action: &CallbackAction) -> Vec<InlineKeyboardButton> {
    vec![button("🔙 Back", action)]
}

/// A keyboard with a single back button.
pub fn back(action: &CallbackAction) -> InlineKeyboardMarkup {
    InlineKeyboardMarkup::new(vec![back_row(action)])
}

/// Sources of a page, with navigation and add buttons.
pub fn sources(page: &Paginated<SourceEntry>) -> InlineKeyboardMarkup {
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = page
        .get_page_items()
        .iter()
        .map(|entry| {
            vec![
                button(
                    format!("{} {}", check_mark(entry.enabled), entry.name),
                    &CallbackAction::ToggleSource(&entry.key, page.page),
                ),
                button("🗑️", &CallbackAction::DeleteSource(&entry.key, page.page)),
            ]
        })
        .collect();

    let mut nav = Vec::new();
    if page.has_prev() {
        nav.push(button("◀️ Prev", &CallbackAction::Sources(page.page - 1)));
    }
    if page.has_next() {
        nav.push(button("Next ▶️", &CallbackAction::Sources(page.page + 1)));
    }
    if !nav.is_empty() {
        buttons.push(nav);
    }

    buttons.push(vec![
        button("➕ Add source", &CallbackAction::AddSource),
        button("📋 Popular", &CallbackAction::PopularSources),
    ]);
    buttons.push(back_row(&CallbackAction::MainMenu));
    InlineKeyboardMarkup::new(buttons)
}

/// Popular catalog grouped by region, with already enabled sources marked.
pub fn popular_sources(settings: &BotSettings) -> InlineKeyboardMarkup {
    let mut buttons = Vec::new();
    for group in SourceGroup::ALL {
        buttons.push(vec![button(format!("── {} ──", group.label()), &CallbackAction::Noop)]);

        let entries: Vec<_> = catalog::popular_in(group).collect();
        for pair in entries.chunks(2) {
            let row = pair
                .iter()
                .map(|entry| {
                    let enabled = settings.sources_enabled.get(entry.key).copied().unwrap_or(false);
                    let mark = if enabled { "✅ " } else { "" };
                    button(format!("{mark}{}", entry.name), &CallbackAction::QuickAdd(entry.key))
                })
                .collect();
            buttons.push(row);
        }
    }
    buttons.push(back_row(&CallbackAction::Sources(1)));
    InlineKeyboardMarkup::new(buttons)
}

/// Format flags and post styles.
pub fn format(settings: &BotSettings) -> InlineKeyboardMarkup {
    let format = &settings.format;
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = FORMAT_FLAGS
        .into_iter()
        .map(|(key, label)| {
            let enabled = format.flag(key).unwrap_or(false);
            vec![button(
                format!("{} {label}", check_mark(enabled)),
                &CallbackAction::ToggleFormat(key),
            )]
        })
        .collect();

    buttons.push(
        PostStyle::ALL
            .iter()
            .map(|style| {
                let mark = if *style == format.style { "🔘" } else { "⚪" };
                button(format!("{mark} {}", style.label()), &CallbackAction::SetStyle(*style))
            })
            .collect(),
    );
    buttons.push(back_row(&CallbackAction::MainMenu));
    InlineKeyboardMarkup::new(buttons)
}

/// One toggle per theme.
pub fn themes(settings: &BotSettings) -> InlineKeyboardMarkup {
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = Theme::ALL
        .chunks(2)
        .map(|pair| {
            pair.iter()
                .map(|theme| {
                    button(
                        format!(
                            "{} {}",
                            check_mark(settings.is_theme_enabled(*theme)),
                            theme.label()
                        ),
                        &CallbackAction::ToggleTheme(theme.as_str()),
                    )
                })
                .collect()
        })
        .collect();
    buttons.push(back_row(&CallbackAction::MainMenu));
    InlineKeyboardMarkup::new(buttons)
}

/// One toggle per digest schedule.
pub fn schedule(schedules: &[ScheduledPost]) -> InlineKeyboardMarkup {
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = schedules
        .iter()
        .map(|s| {
            let theme = match s.theme.parse::<Theme>() {
                Ok(theme) => theme.label(),
                Err(_) => s.theme.as_str(),
            };
            vec![button(
                format!(
                    "{} {:02}:{:02} {theme} ({})",
                    check_mark(s.enabled),
                    s.hour,
                    s.minute,
                    s.max_posts
                ),
                &CallbackAction::ToggleSchedule(s.id),
            )]
        })
        .collect();
    buttons.push(vec![button("➕ Add schedule", &CallbackAction::AddSchedule)]);
    buttons.push(back_row(&CallbackAction::MainMenu));
    InlineKeyboardMarkup::new(buttons)
}

/// AI flags and API key buttons.
pub fn ai(settings: &BotSettings) -> InlineKeyboardMarkup {
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = AI_FLAGS
        .into_iter()
        .map(|(key, label)| {
            let enabled = settings.format.flag(key).unwrap_or(false);
            vec![button(
                format!("{} {label}", check_mark(enabled)),
                &CallbackAction::ToggleAi(key),
            )]
        })
        .collect();
    buttons.push(vec![
        button("🔑 Groq key", &CallbackAction::SetGroqKey),
        button("🔑 OpenAI key", &CallbackAction::SetOpenAiKey),
    ]);
    buttons.push(back_row(&CallbackAction::MainMenu));
    InlineKeyboardMarkup::new(buttons)
}

fn calendar_flag_label(key: &str) -> &'static str {
    match key {
        "alerts" => "🔔 Alerts",
        "1day" => "⏰ 1 day before",
        "1hour" => "⏱️ 1 hour before",
        "conferences" => "🎪 Conferences",
        "speeches" => "🎤 Speeches",
        "launches" => "🚀 Launches",
        _ => "?",
    }
}

/// Alert switches.
pub fn calendar_alerts(settings: &BotSettings) -> InlineKeyboardMarkup {
    let mut buttons: Vec<Vec<InlineKeyboardButton>> = CalendarSettings::FLAGS
        .into_iter()
        .map(|key| {
            let enabled = settings.calendar.flag(key).unwrap_or(false);
            vec![button(
                format!("{} {}", check_mark(enabled), calendar_flag_label(key)),
                &CallbackAction::ToggleCalendar(key),
            )]
        })
        .collect();
    buttons.push(back_row(&CallbackAction::Calendar));
    InlineKeyboardMarkup::new(buttons)
}

lazy_static! {
    /// Main menu of the panel.
    pub static ref MAIN_MENU: InlineKeyboardMarkup = InlineKeyboardMarkup::new(vec![
        vec![
            button("📰 Sources", &CallbackAction::Sources(1)),
            button("📝 Format", &CallbackAction::Format),
        ],
        vec![
            button("🏷️ Themes", &CallbackAction::Themes),
            button("⏰ Schedule", &CallbackAction::Schedule),
        ],
        vec![
            button("🤖 AI", &CallbackAction::Ai),
            button("📊 Analytics", &CallbackAction::Analytics),
        ],
        vec![
            button("📅 Calendar", &CallbackAction::Calendar),
            button("📈 Status", &CallbackAction::Status),
        ],
        vec![button("❓ Help", &CallbackAction::Help)],
    ]);
    /// Analytics menu.
    pub static ref ANALYTICS: InlineKeyboardMarkup = InlineKeyboardMarkup::new(vec![
        vec![
            button("📈 Today", &CallbackAction::AnalyticsToday),
            button("📊 Week", &CallbackAction::AnalyticsWeek),
        ],
        vec![button("🏆 Top posts", &CallbackAction::AnalyticsTop)],
        vec![
            button("📰 By source", &CallbackAction::AnalyticsBySource),
            button("🏷️ By theme", &CallbackAction::AnalyticsByTheme),
        ],
        vec![button("🔄 Refresh", &CallbackAction::AnalyticsRefresh)],
        back_row(&CallbackAction::MainMenu),
    ]);
    /// Calendar menu.
    pub static ref CALENDAR: InlineKeyboardMarkup = InlineKeyboardMarkup::new(vec![
        vec![
            button("📅 Today", &CallbackAction::CalendarView(CalendarView::Today)),
            button("📆 Week", &CallbackAction::CalendarView(CalendarView::Week)),
        ],
        vec![button("🗓️ Month", &CallbackAction::CalendarView(CalendarView::Month))],
        vec![
            button("🎤 Speeches", &CallbackAction::CalendarView(CalendarView::Speeches)),
            button("🎪 Conferences", &CallbackAction::CalendarView(CalendarView::Conferences)),
        ],
        vec![button("🚀 Launches", &CallbackAction::CalendarView(CalendarView::Launches))],
        vec![
            button("🔔 Alerts", &CallbackAction::CalendarAlerts),
            button("➕ Add event", &CallbackAction::CalendarAdd),
        ],
        vec![button("🔄 Refresh events", &CallbackAction::CalendarRefresh)],
        back_row(&CallbackAction::MainMenu),
    ]);
    /// Single button back to the main menu.
    pub static ref BACK_TO_MENU: InlineKeyboardMarkup = back(&CallbackAction::MainMenu);
}
