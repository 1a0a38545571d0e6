use crate::{
    bot_handler::{BotHandlerResult, Context},
    messaging::{keyboards, render, utils::check_mark},
    settings::PostStyle,
};

pub async fn show(ctx: Context<'_>) -> BotHandlerResult<()> {
    let settings = ctx.handler.settings.get().await?;
    ctx.show(render::format_menu(), keyboards::format(&settings)).await
}

pub async fn toggle(ctx: Context<'_>, key: &str) -> BotHandlerResult<String> {
    let mut settings = ctx.handler.settings.get().await?;
    let enabled = settings.toggle_format(key)?;
    ctx.handler.settings.save(settings.clone()).await?;

    ctx.show(render::format_menu(), keyboards::format(&settings)).await?;
    Ok(format!("{} {key}", check_mark(enabled)))
}

pub async fn set_style(ctx: Context<'_>, style: PostStyle) -> BotHandlerResult<String> {
    let mut settings = ctx.handler.settings.get().await?;
    settings.set_style(style);
    ctx.handler.settings.save(settings.clone()).await?;

    ctx.show(render::format_menu(), keyboards::format(&settings)).await?;
    Ok(format!("Style: {}", style.label()))
}
