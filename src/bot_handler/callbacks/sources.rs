use crate::{
    bot_handler::{BotHandlerError, BotHandlerResult, CommandState, Context},
    messaging::{keyboards, render},
    pagination::Paginated,
    settings::BotSettings,
    sources::{self, catalog},
};

fn page_of(settings: &BotSettings, page: usize) -> Paginated<sources::SourceEntry> {
    Paginated::new(sources::entries(settings), page)
}

async fn render_page(
    ctx: Context<'_>,
    settings: &BotSettings,
    page: usize,
) -> BotHandlerResult<()> {
    let page = page_of(settings, page);
    ctx.show(render::sources_menu(&page), keyboards::sources(&page)).await
}

pub async fn show(ctx: Context<'_>, page: usize) -> BotHandlerResult<()> {
    let settings = ctx.handler.settings.get().await?;
    render_page(ctx, &settings, page).await
}

pub async fn toggle(ctx: Context<'_>, key: &str, page: usize) -> BotHandlerResult<String> {
    let mut settings = ctx.handler.settings.get().await?;
    let enabled = settings.toggle_source(key);
    let name = sources::display_name(&settings, key);
    ctx.handler.settings.save(settings.clone()).await?;
    tracing::info!("Source {key} enabled: {enabled}");

    render_page(ctx, &settings, page).await?;
    Ok(format!("{name} {}", if enabled { "enabled" } else { "disabled" }))
}

pub async fn delete(ctx: Context<'_>, key: &str, page: usize) -> BotHandlerResult<String> {
    let mut settings = ctx.handler.settings.get().await?;
    let name = sources::display_name(&settings, key);
    if !settings.delete_source(key) {
        return Err(BotHandlerError::InvalidInput(format!("Source '{key}' not found")));
    }
    ctx.handler.settings.save(settings.clone()).await?;
    tracing::info!("Source {key} removed");

    render_page(ctx, &settings, page).await?;
    Ok(format!("🗑️ {name} removed"))
}

pub async fn prompt_add(ctx: Context<'_>) -> BotHandlerResult<()> {
    ctx.prompt(CommandState::AwaitingSource, render::add_source_prompt()).await
}

pub async fn show_popular(ctx: Context<'_>) -> BotHandlerResult<()> {
    let settings = ctx.handler.settings.get().await?;
    ctx.show(render::popular_sources_menu(), keyboards::popular_sources(&settings)).await
}

/// Enable a catalog source with its known selectors.
pub async fn quick_add(ctx: Context<'_>, key: &str) -> BotHandlerResult<String> {
    let entry = catalog::popular(key)
        .ok_or_else(|| BotHandlerError::InvalidInput(format!("Source '{key}' not found")))?;

    let mut settings = ctx.handler.settings.get().await?;
    let toast = if settings.quick_add_source(key) {
        ctx.handler.settings.save(settings.clone()).await?;
        tracing::info!("Source {key} added from the catalog");
        format!("✅ {} added", entry.name)
    } else {
        format!("{} is already enabled", entry.name)
    };

    ctx.show(render::popular_sources_menu(), keyboards::popular_sources(&settings)).await?;
    Ok(toast)
}

/// Handles `name|url[|list|title|content]`.
pub async fn handle_reply(ctx: Context<'_>, text: &str) -> BotHandlerResult<()> {
    let (key, spec) = sources::parse_source_input(text)
        .map_err(|e| BotHandlerError::InvalidInput(e.to_string()))?;

    let mut settings = ctx.handler.settings.get().await?;
    settings.add_custom_source(&key, spec.clone());
    ctx.handler.settings.save(settings.clone()).await?;
    tracing::info!("Custom source {key} added: {}", spec.url);

    let page = page_of(&settings, 1);
    ctx.show(render::source_added(&spec), keyboards::sources(&page)).await
}
