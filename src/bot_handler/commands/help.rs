use crate::{
    bot_handler::{BotHandlerResult, Context},
    messaging::{keyboards, render},
};

pub async fn handle(ctx: Context<'_>) -> BotHandlerResult<()> {
    ctx.show(render::help(), keyboards::BACK_TO_MENU.clone()).await
}
