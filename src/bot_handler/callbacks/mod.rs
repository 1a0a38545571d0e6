pub mod ai;
pub mod analytics;
pub mod calendar;
pub mod format;
pub mod schedule;
pub mod sources;
pub mod themes;

use super::{BotHandlerResult, CallbackAction, Context, commands};

/// Routes a button press. Returns the toast shown to the admin, if any.
pub async fn handle(
    ctx: Context<'_>,
    action: CallbackAction<'_>,
) -> BotHandlerResult<Option<String>> {
    use CallbackAction as A;

    let toast = match action {
        A::MainMenu => {
            commands::start::handle(ctx).await?;
            None
        }
        A::Status => {
            commands::status::handle(ctx).await?;
            None
        }
        A::Help => {
            commands::help::handle(ctx).await?;
            None
        }
        A::Noop => None,

        A::Sources(page) => {
            sources::show(ctx, page).await?;
            None
        }
        A::ToggleSource(key, page) => Some(sources::toggle(ctx, key, page).await?),
        A::DeleteSource(key, page) => Some(sources::delete(ctx, key, page).await?),
        A::AddSource => {
            sources::prompt_add(ctx).await?;
            None
        }
        A::PopularSources => {
            sources::show_popular(ctx).await?;
            None
        }
        A::QuickAdd(key) => Some(sources::quick_add(ctx, key).await?),

        A::Format => {
            format::show(ctx).await?;
            None
        }
        A::ToggleFormat(key) => Some(format::toggle(ctx, key).await?),
        A::SetStyle(style) => Some(format::set_style(ctx, style).await?),

        A::Themes => {
            themes::show(ctx).await?;
            None
        }
        A::ToggleTheme(key) => Some(themes::toggle(ctx, key).await?),

        A::Schedule => {
            schedule::show(ctx).await?;
            None
        }
        A::ToggleSchedule(id) => Some(schedule::toggle(ctx, id).await?),
        A::AddSchedule => {
            schedule::prompt_add(ctx).await?;
            None
        }

        A::Ai => {
            ai::show(ctx).await?;
            None
        }
        A::ToggleAi(key) => Some(ai::toggle(ctx, key).await?),
        A::SetGroqKey => {
            ai::prompt_groq_key(ctx).await?;
            None
        }
        A::SetOpenAiKey => {
            ai::prompt_openai_key(ctx).await?;
            None
        }

        A::Analytics => {
            analytics::show(ctx).await?;
            None
        }
        A::AnalyticsToday => {
            analytics::today(ctx).await?;
            None
        }
        A::AnalyticsWeek => {
            analytics::week(ctx).await?;
            None
        }
        A::AnalyticsTop => {
            analytics::top(ctx).await?;
            None
        }
        A::AnalyticsBySource => {
            analytics::by_source(ctx).await?;
            None
        }
        A::AnalyticsByTheme => {
            analytics::by_theme(ctx).await?;
            None
        }
        A::AnalyticsRefresh => {
            analytics::refresh(ctx).await?;
            Some("🔄 Refreshed".to_string())
        }

        A::Calendar => {
            commands::calendar::handle(ctx).await?;
            None
        }
        A::CalendarView(view) => {
            calendar::show_view(ctx, view).await?;
            None
        }
        A::CalendarAlerts => {
            calendar::show_alerts(ctx).await?;
            None
        }
        A::ToggleCalendar(key) => Some(calendar::toggle(ctx, key).await?),
        A::CalendarAdd => {
            calendar::prompt_add(ctx).await?;
            None
        }
        A::CalendarRefresh => {
            calendar::refresh(ctx).await?;
            None
        }
    };

    Ok(toast)
}
