//! `/deck`: shuffle a 40 card deck and deal the starting hand into this channel.
use crate::constants::DEFAULT_DECK;
use crate::deck::render::fifth_prompt_button;
use crate::deck::session::{ChannelInfo, parse_deck_list};
use crate::error::DeckError;
use crate::interactions::util;
use crate::model::AppState;
use crate::services::messenger::action_rows;
use serenity::builder::{
    CreateCommand, CreateCommandOption, CreateInteractionResponse,
    CreateInteractionResponseFollowup, CreateInteractionResponseMessage,
};
use serenity::model::application::{CommandInteraction, CommandOptionType};
use serenity::model::channel::Channel;
use serenity::prelude::*;
use tracing::{error, info, instrument, warn};

pub fn register() -> CreateCommand {
    CreateCommand::new("deck")
        .description("Sets up an interactable Pikcards deck.")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::String,
                "cards",
                "The cards in the deck, separated by commas.",
            )
            .required(false),
        )
}

/// Name and guild of the invoking channel, or why it could not be read.
async fn channel_info(
    ctx: &Context,
    command: &CommandInteraction,
) -> Result<ChannelInfo, DeckError> {
    let channel = command
        .channel_id
        .to_channel(&ctx.http)
        .await
        .map_err(|e| DeckError::ChannelUnavailable(e.to_string()))?;
    let name = match &channel {
        Channel::Guild(gc) => gc.name.clone(),
        Channel::Private(pc) => format!("DM with {}", pc.recipient.name),
        _ => command.channel_id.to_string(),
    };
    Ok(ChannelInfo {
        id: command.channel_id,
        name,
        guild_id: command.guild_id,
    })
}

#[instrument(level = "info", skip_all, fields(user_id = %command.user.id, channel_id = %command.channel_id))]
pub async fn run_slash(ctx: &Context, command: &CommandInteraction) -> serenity::Result<()> {
    let Some(app_state) = AppState::from_ctx(ctx).await else {
        warn!(command = "deck", "missing_app_state");
        return command
            .create_response(&ctx.http, util::notice(util::INTERNAL_ERROR))
            .await;
    };
    let user_id = command.user.id;

    let input = command
        .data
        .options
        .iter()
        .find(|o| o.name == "cards")
        .and_then(|o| o.value.as_str())
        .unwrap_or(DEFAULT_DECK);
    let cards = match parse_deck_list(input) {
        Ok(cards) => cards,
        Err(e) => {
            info!(target = "deck.start", user_id = %user_id, error = %e, "deck list rejected");
            return command
                .create_response(&ctx.http, util::notice(e.user_message()))
                .await;
        }
    };
    if app_state.store().get(user_id, command.channel_id).await.is_some() {
        return command
            .create_response(&ctx.http, util::notice(DeckError::SessionExists.user_message()))
            .await;
    }
    let channel = match channel_info(ctx, command).await {
        Ok(channel) => channel,
        Err(e) => {
            error!(target = "deck.start", user_id = %user_id, error = %e, "failed to fetch channel");
            return command
                .create_response(&ctx.http, util::notice(e.user_message()))
                .await;
        }
    };

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(CreateInteractionResponseMessage::new().content(
                "Your deck has been shuffled! I will now show you your first 4 cards, \
                 and you may choose to re-draw each one, or not.",
            )),
        )
        .await?;

    let started = match app_state
        .engine
        .start(&*app_state.messenger, user_id, channel, cards)
        .await
    {
        Ok(started) => started,
        Err(e) => {
            error!(target = "deck.start", user_id = %user_id, error = %e, "failed to start game");
            command
                .create_followup(&ctx.http, util::followup_notice(e.user_message()))
                .await?;
            return Ok(());
        }
    };

    command
        .create_followup(
            &ctx.http,
            CreateInteractionResponseFollowup::new()
                .content("Let me know when you're ready to choose your 5th card.")
                .components(action_rows(&[fifth_prompt_button(user_id)])),
        )
        .await?;
    if !started.persisted {
        command
            .create_followup(
                &ctx.http,
                util::followup_notice(
                    "Your game has started, but it couldn't be saved yet. It will be saved on your next move.",
                ),
            )
            .await?;
    }
    Ok(())
}
