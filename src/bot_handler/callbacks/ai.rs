use crate::{
    ai::llm::Provider,
    bot_handler::{BotHandlerError, BotHandlerResult, CommandState, Context},
    messaging::{keyboards, render, utils::check_mark},
};

async fn render_menu(ctx: Context<'_>) -> BotHandlerResult<()> {
    let settings = ctx.handler.settings.get().await?;
    let llm = ctx.handler.assistant.llm();
    let (groq, openai) = (llm.has_key(Provider::Groq).await, llm.has_key(Provider::OpenAi).await);
    ctx.show(render::ai_menu(groq, openai), keyboards::ai(&settings)).await
}

pub async fn show(ctx: Context<'_>) -> BotHandlerResult<()> {
    render_menu(ctx).await
}

pub async fn toggle(ctx: Context<'_>, key: &str) -> BotHandlerResult<String> {
    let mut settings = ctx.handler.settings.get().await?;
    let enabled = settings.toggle_format(key)?;
    ctx.handler.settings.save(settings).await?;

    render_menu(ctx).await?;
    Ok(format!("{} {key}", check_mark(enabled)))
}

pub async fn prompt_groq_key(ctx: Context<'_>) -> BotHandlerResult<()> {
    ctx.prompt(CommandState::AwaitingGroqKey, render::groq_key_prompt()).await
}

pub async fn prompt_openai_key(ctx: Context<'_>) -> BotHandlerResult<()> {
    ctx.prompt(CommandState::AwaitingOpenAiKey, render::openai_key_prompt()).await
}

fn parse_key(text: &str) -> BotHandlerResult<String> {
    match text.trim() {
        "" => Err(BotHandlerError::InvalidInput("The API key is empty".to_string())),
        key if key.contains(char::is_whitespace) => {
            Err(BotHandlerError::InvalidInput("The API key must not contain spaces".to_string()))
        }
        key => Ok(key.to_string()),
    }
}

/// Stores the Groq key and checks it with a short completion.
pub async fn handle_groq_key_reply(ctx: Context<'_>, text: &str) -> BotHandlerResult<()> {
    let key = parse_key(text)?;
    ctx.handler.assistant.llm().set_api_key(Provider::Groq, key).await;
    tracing::info!("Groq API key replaced");

    let text = match ctx.handler.assistant.ping().await {
        Ok(_) => "✅ Groq API key configured and working!".to_string(),
        Err(e) => {
            tracing::warn!("Groq key test failed: {e}");
            "⚠️ Key saved, but the test call failed. Check that it is correct.".to_string()
        }
    };
    ctx.show(text, keyboards::BACK_TO_MENU.clone()).await
}

pub async fn handle_openai_key_reply(ctx: Context<'_>, text: &str) -> BotHandlerResult<()> {
    let key = parse_key(text)?;
    ctx.handler.assistant.llm().set_api_key(Provider::OpenAi, key).await;
    tracing::info!("OpenAI API key replaced");

    ctx.show(
        "✅ OpenAI API key configured! AI summaries are now available.".to_string(),
        keyboards::BACK_TO_MENU.clone(),
    )
    .await
}
