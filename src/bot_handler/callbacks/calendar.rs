use chrono::Utc;

use crate::{
    bot_handler::{BotHandlerResult, CallbackAction, CommandState, Context},
    calendar::CalendarView,
    messaging::{keyboards, render, utils::check_mark},
};

pub async fn show_view(ctx: Context<'_>, view: CalendarView) -> BotHandlerResult<()> {
    let events = ctx.handler.calendar.view_events(view, Utc::now()).await?;
    ctx.show(render::calendar_view(view, &events), keyboards::back(&CallbackAction::Calendar))
        .await
}

pub async fn show_alerts(ctx: Context<'_>) -> BotHandlerResult<()> {
    let settings = ctx.handler.settings.get().await?;
    ctx.show(render::calendar_alerts_menu(), keyboards::calendar_alerts(&settings)).await
}

pub async fn toggle(ctx: Context<'_>, key: &str) -> BotHandlerResult<String> {
    let mut settings = ctx.handler.settings.get().await?;
    let enabled = settings.toggle_calendar(key)?;
    ctx.handler.settings.save(settings.clone()).await?;

    ctx.show(render::calendar_alerts_menu(), keyboards::calendar_alerts(&settings)).await?;
    Ok(format!("{} {key}", check_mark(enabled)))
}

pub async fn prompt_add(ctx: Context<'_>) -> BotHandlerResult<()> {
    ctx.prompt(CommandState::AwaitingEvent, render::add_event_prompt()).await
}

pub async fn refresh(ctx: Context<'_>) -> BotHandlerResult<()> {
    let added = ctx.handler.calendar.refresh_events(Utc::now()).await?;
    tracing::info!("Calendar refreshed from the panel, {added} new event(s)");
    ctx.show(render::calendar_refreshed(added), keyboards::CALENDAR.clone()).await
}

/// Handles `YYYY-MM-DD|Title|category|location`.
pub async fn handle_reply(ctx: Context<'_>, text: &str) -> BotHandlerResult<()> {
    let event = ctx.handler.calendar.add_manual_event(text).await?;
    tracing::info!("Manual event {} added: {}", event.id, event.title);
    ctx.show(render::event_added(&event), keyboards::CALENDAR.clone()).await
}
