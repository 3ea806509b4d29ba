//! `/hand`: list the cards currently in hand in this channel.
use crate::deck::render::title_case;
use crate::deck::session::{CardAction, HandCard};
use crate::interactions::util;
use crate::model::AppState;
use serenity::builder::CreateCommand;
use serenity::model::application::CommandInteraction;
use serenity::prelude::*;
use tracing::warn;

pub fn register() -> CreateCommand {
    CreateCommand::new("hand").description("Lists the cards in your hand in this channel's game.")
}

fn describe(card: &HandCard) -> String {
    let message = card
        .message_id
        .map_or_else(|| "-".to_string(), |id| id.get().to_string());
    let action = match card.action {
        CardAction::Redraw => " (redrawable)",
        CardAction::Play => "",
        CardAction::Idle => " (redrawn)",
    };
    format!("- {}{action} `[{} | {message}]`", title_case(&card.name), card.id)
}

pub async fn run_slash(ctx: &Context, command: &CommandInteraction) -> serenity::Result<()> {
    let Some(app_state) = AppState::from_ctx(ctx).await else {
        warn!(command = "hand", "missing_app_state");
        return command
            .create_response(&ctx.http, util::notice(util::INTERNAL_ERROR))
            .await;
    };
    let user_id = command.user.id;
    let channels = app_state.store().channels(user_id).await;
    if channels.is_empty() {
        return command
            .create_response(
                &ctx.http,
                util::notice("You aren't currently playing any games. Start with `/deck`!"),
            )
            .await;
    }

    let content = match app_state.engine.hand(user_id, command.channel_id).await {
        Ok(hand) if hand.is_empty() => "Your hand in this channel is empty.".to_string(),
        Ok(hand) => format!(
            "Here is your current hand in this channel's game:\n{}",
            hand.iter().map(describe).collect::<Vec<_>>().join("\n")
        ),
        Err(_) => format!(
            "You aren't currently playing a game in this channel.\nHere are all the channels you have games in:\n{}",
            util::channel_list(channels.iter().map(|c| c.id))
        ),
    };
    command
        .create_response(&ctx.http, util::notice(content))
        .await
}
