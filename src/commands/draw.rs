//! `/draw`: draw the next card once the starting hand is complete.
use crate::error::DeckError;
use crate::interactions::util;
use crate::model::AppState;
use serenity::builder::{CreateCommand, EditInteractionResponse};
use serenity::model::application::CommandInteraction;
use serenity::prelude::*;
use tracing::{instrument, warn};

pub fn register() -> CreateCommand {
    CreateCommand::new("draw").description("Draws your next card.")
}

#[instrument(level = "info", skip_all, fields(user_id = %command.user.id, channel_id = %command.channel_id))]
pub async fn run_slash(ctx: &Context, command: &CommandInteraction) -> serenity::Result<()> {
    let Some(app_state) = AppState::from_ctx(ctx).await else {
        warn!(command = "draw", "missing_app_state");
        return command
            .create_response(&ctx.http, util::notice(util::INTERNAL_ERROR))
            .await;
    };
    command.defer_ephemeral(&ctx.http).await?;

    let user_id = command.user.id;
    let content = match app_state
        .engine
        .draw_next(&*app_state.messenger, user_id, command.channel_id)
        .await
    {
        Ok(_) => return command.delete_response(&ctx.http).await,
        Err(DeckError::SessionNotFound) => {
            match app_state.store().channels(user_id).await.as_slice() {
                [] => DeckError::SessionNotFound.user_message(),
                [only] => format!(
                    "Use this command in the same channel you used `/deck`: <#{}>",
                    only.id.get()
                ),
                many => format!(
                    "You aren't playing in this channel. Your games are in:\n{}",
                    util::channel_list(many.iter().map(|c| c.id))
                ),
            }
        }
        Err(e) => e.user_message(),
    };
    command
        .edit_response(&ctx.http, EditInteractionResponse::new().content(content))
        .await
        .map(|_| ())
}
