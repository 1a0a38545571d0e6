use chrono::Utc;

use crate::{
    bot_handler::{BotHandlerResult, CallbackAction, Context},
    messaging::{keyboards, render},
};

const TOP_POSTS: u32 = 10;

fn back() -> teloxide::types::InlineKeyboardMarkup {
    keyboards::back(&CallbackAction::Analytics)
}

pub async fn show(ctx: Context<'_>) -> BotHandlerResult<()> {
    ctx.show(render::analytics_menu(), keyboards::ANALYTICS.clone()).await
}

pub async fn today(ctx: Context<'_>) -> BotHandlerResult<()> {
    let report = ctx.handler.analytics.today(Utc::now()).await?;
    ctx.show(render::daily_report(&report), back()).await
}

pub async fn week(ctx: Context<'_>) -> BotHandlerResult<()> {
    let report = ctx.handler.analytics.week(Utc::now()).await?;
    ctx.show(render::weekly_report(&report), back()).await
}

pub async fn top(ctx: Context<'_>) -> BotHandlerResult<()> {
    let posts = ctx.handler.analytics.top_posts(TOP_POSTS).await?;
    ctx.show(render::top_posts(&posts), back()).await
}

pub async fn by_source(ctx: Context<'_>) -> BotHandlerResult<()> {
    let groups = ctx.handler.analytics.by_source(Utc::now()).await?;
    ctx.show(render::breakdown("📰 <b>Analytics by Source</b>", &groups), back()).await
}

pub async fn by_theme(ctx: Context<'_>) -> BotHandlerResult<()> {
    let groups = ctx.handler.analytics.by_theme(Utc::now()).await?;
    ctx.show(render::breakdown("🏷️ <b>Analytics by Theme</b>", &groups), back()).await
}

/// View counts are not readable through the Bot API, so this only redraws
/// the menu.
pub async fn refresh(ctx: Context<'_>) -> BotHandlerResult<()> {
    ctx.show(render::analytics_refreshed(), keyboards::ANALYTICS.clone()).await
}
