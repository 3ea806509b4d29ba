//! `/refreshcards`: rebuild the card image index after assets change on disk.
use crate::interactions::util;
use crate::model::AppState;
use serenity::builder::{CreateCommand, EditInteractionResponse};
use serenity::model::application::CommandInteraction;
use serenity::prelude::*;
use tracing::{info, warn};

pub fn register() -> CreateCommand {
    CreateCommand::new("refreshcards").description("Rescans the card image folder.")
}

pub async fn run_slash(ctx: &Context, command: &CommandInteraction) -> serenity::Result<()> {
    let Some(app_state) = AppState::from_ctx(ctx).await else {
        warn!(command = "refreshcards", "missing_app_state");
        return command
            .create_response(&ctx.http, util::notice(util::INTERNAL_ERROR))
            .await;
    };
    command.defer_ephemeral(&ctx.http).await?;
    let count = app_state.catalog().refresh().await;
    info!(target = "catalog.refresh", user_id = %command.user.id, count, "card images reindexed");
    let reply = format!("Card image index rebuilt: {count} images found.");
    command
        .edit_response(&ctx.http, EditInteractionResponse::new().content(reply))
        .await
        .map(|_| ())
}
