use crate::{
    ai::llm::Provider,
    bot_handler::{BotHandlerResult, Context},
    messaging::{keyboards, render},
};

pub async fn handle(ctx: Context<'_>) -> BotHandlerResult<()> {
    let settings = ctx.handler.settings.get().await?;
    let llm = ctx.handler.assistant.llm();
    let (groq, openai) = (llm.has_key(Provider::Groq).await, llm.has_key(Provider::OpenAi).await);

    ctx.show(render::status(&settings, groq, openai), keyboards::BACK_TO_MENU.clone()).await
}
