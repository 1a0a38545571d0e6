use crate::{
    bot_handler::{BotHandlerResult, Context},
    messaging::{keyboards, render, utils::check_mark},
};

pub async fn show(ctx: Context<'_>) -> BotHandlerResult<()> {
    let settings = ctx.handler.settings.get().await?;
    ctx.show(render::themes_menu(), keyboards::themes(&settings)).await
}

pub async fn toggle(ctx: Context<'_>, key: &str) -> BotHandlerResult<String> {
    let mut settings = ctx.handler.settings.get().await?;
    let enabled = settings.toggle_theme(key)?;
    ctx.handler.settings.save(settings.clone()).await?;

    ctx.show(render::themes_menu(), keyboards::themes(&settings)).await?;
    Ok(format!("{} {key}", check_mark(enabled)))
}
