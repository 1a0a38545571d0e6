use crate::{
    bot_handler::{BotHandlerError, BotHandlerResult, Context},
    messaging::{keyboards, render},
};

/// Opens the main menu. Any pending input prompt is dropped.
pub async fn handle(ctx: Context<'_>) -> BotHandlerResult<()> {
    ctx.dialogue.exit().await.map_err(BotHandlerError::DialogueError)?;
    ctx.show(render::main_menu(), keyboards::MAIN_MENU.clone()).await
}
