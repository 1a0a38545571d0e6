use std::str::FromStr;

use crate::{
    bot_handler::{BotHandlerError, BotHandlerResult, CommandState, Context},
    messaging::{keyboards, render},
    scheduler::MAX_DIGEST_POSTS,
    settings::Theme,
};

const DEFAULT_MAX_POSTS: u32 = 5;

/// A digest schedule entered as `HH[:MM] [theme] [count]`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ScheduleInput {
    pub hour: u8,
    pub minute: u8,
    pub theme: Theme,
    pub max_posts: u32,
}

fn invalid(reason: &str) -> BotHandlerError {
    BotHandlerError::InvalidInput(format!("{reason}. Use: HH:MM theme count"))
}

/// Minutes default to 0, the theme to news and the count to 5.
pub fn parse_schedule_input(text: &str) -> BotHandlerResult<ScheduleInput> {
    let mut parts = text.split_whitespace();
    let time = parts.next().ok_or_else(|| invalid("Missing time"))?;

    let (hour, minute) = match time.split_once(':') {
        Some((h, m)) => (h, m),
        None => (time, "0"),
    };
    let hour =
        hour.parse::<u8>().ok().filter(|h| *h < 24).ok_or_else(|| invalid("Invalid hour"))?;
    let minute =
        minute.parse::<u8>().ok().filter(|m| *m < 60).ok_or_else(|| invalid("Invalid minute"))?;

    let theme = match parts.next() {
        Some(theme) => Theme::from_str(theme).map_err(|_| invalid("Unknown theme"))?,
        None => Theme::News,
    };

    let max_posts = match parts.next() {
        Some(count) => count
            .parse::<u32>()
            .ok()
            .filter(|n| (1..=MAX_DIGEST_POSTS).contains(n))
            .ok_or_else(|| invalid(&format!("Count must be between 1 and {MAX_DIGEST_POSTS}")))?,
        None => DEFAULT_MAX_POSTS,
    };

    Ok(ScheduleInput { hour, minute, theme, max_posts })
}

pub async fn show(ctx: Context<'_>) -> BotHandlerResult<()> {
    let schedules = ctx.handler.schedules.list_schedules().await?;
    ctx.show(render::schedule_menu(&schedules), keyboards::schedule(&schedules)).await
}

pub async fn toggle(ctx: Context<'_>, id: i64) -> BotHandlerResult<String> {
    let enabled = ctx
        .handler
        .schedules
        .toggle_schedule(id)
        .await?
        .ok_or_else(|| BotHandlerError::InvalidInput(format!("Schedule {id} not found")))?;

    show(ctx).await?;
    Ok(if enabled { "Schedule enabled".to_string() } else { "Schedule disabled".to_string() })
}

pub async fn prompt_add(ctx: Context<'_>) -> BotHandlerResult<()> {
    ctx.prompt(CommandState::AwaitingSchedule, render::schedule_prompt()).await
}

pub async fn handle_reply(ctx: Context<'_>, text: &str) -> BotHandlerResult<()> {
    let input = parse_schedule_input(text)?;
    let id = ctx
        .handler
        .schedules
        .add_schedule(input.hour, input.minute, input.theme.as_str(), input.max_posts)
        .await?;
    tracing::info!("Schedule {id} added: {:02}:{:02} {}", input.hour, input.minute, input.theme);

    let schedules = ctx.handler.schedules.list_schedules().await?;
    ctx.show(
        render::schedule_added(input.hour, input.minute, input.theme, input.max_posts),
        keyboards::schedule(&schedules),
    )
    .await
}
