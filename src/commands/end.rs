//! `/end` and `/endall`: finish one, several or all of a player's games.
use crate::constants::SELECT_MENU_MAX_OPTIONS;
use crate::interactions::end_handler::end_single;
use crate::interactions::ids::{Action, ActionId};
use crate::interactions::util::{self, channel_list};
use crate::model::AppState;
use serenity::builder::{
    CreateActionRow, CreateButton, CreateCommand, CreateCommandOption, CreateInteractionResponse,
    CreateInteractionResponseMessage, CreateSelectMenu, CreateSelectMenuKind,
    CreateSelectMenuOption,
};
use serenity::model::application::{ButtonStyle, CommandInteraction, CommandOptionType};
use serenity::prelude::*;
use tracing::{instrument, warn};

pub fn register() -> CreateCommand {
    CreateCommand::new("end")
        .description("Ends a game session you are currently participating in.")
        .add_option(
            CreateCommandOption::new(
                CommandOptionType::Channel,
                "channel",
                "The channel in which the game you want to end is in.",
            )
            .required(false),
        )
}

pub fn register_all() -> CreateCommand {
    CreateCommand::new("endall")
        .description("Ends all game sessions you are currently participating in.")
}

#[instrument(level = "info", skip_all, fields(user_id = %command.user.id, end_all = end_all))]
pub async fn run_slash(
    ctx: &Context,
    command: &CommandInteraction,
    end_all: bool,
) -> serenity::Result<()> {
    let Some(app_state) = AppState::from_ctx(ctx).await else {
        warn!(command = "end", "missing_app_state");
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
                util::notice(
                    "You aren't in any games in any servers/channels right now.\nYou can start a game with /deck!",
                ),
            )
            .await;
    }

    let chosen = command
        .data
        .options
        .iter()
        .find(|o| o.name == "channel")
        .and_then(|o| o.value.as_channel_id());
    if let Some(channel_id) = chosen {
        let content = if channels.iter().any(|c| c.id == channel_id) {
            end_single(&app_state, user_id, channel_id, command.channel_id).await
        } else {
            format!("You are not currently playing a game in <#{}>.", channel_id.get())
        };
        return command
            .create_response(&ctx.http, util::notice(content))
            .await;
    }

    if let [only] = channels.as_slice() {
        let content = end_single(&app_state, user_id, only.id, command.channel_id).await;
        return command
            .create_response(&ctx.http, util::notice(content))
            .await;
    }

    let mut lines = vec![
        "You're currently in a game in the following channels:".to_string(),
        channel_list(channels.iter().map(|c| c.id)),
        String::new(),
    ];
    let component = if end_all {
        lines.push("Are you sure you want to end all games? **This cannot be undone.**".to_string());
        CreateActionRow::Buttons(vec![
            CreateButton::new(ActionId::new(user_id, Action::EndAll).encode())
                .label("Yes, End All Games")
                .style(ButtonStyle::Danger),
        ])
    } else {
        lines.push("Select the games you'd like to end. **This cannot be undone.**".to_string());
        if channels.len() > SELECT_MENU_MAX_OPTIONS {
            lines.push(format!(
                "Only the first {SELECT_MENU_MAX_OPTIONS} are listed; use `/endall` to end everything."
            ));
        }
        let options: Vec<CreateSelectMenuOption> = channels
            .iter()
            .take(SELECT_MENU_MAX_OPTIONS)
            .map(|c| CreateSelectMenuOption::new(c.name.clone(), c.id.get().to_string()))
            .collect();
        let max = options.len() as u8;
        CreateActionRow::SelectMenu(
            CreateSelectMenu::new(
                ActionId::new(user_id, Action::EndSelection).encode(),
                CreateSelectMenuKind::String { options },
            )
            .placeholder("Choose channels")
            .min_values(1)
            .max_values(max),
        )
    };

    command
        .create_response(
            &ctx.http,
            CreateInteractionResponse::Message(
                CreateInteractionResponseMessage::new()
                    .content(lines.join("\n"))
                    .components(vec![component])
                    .ephemeral(true),
            ),
        )
        .await
}
