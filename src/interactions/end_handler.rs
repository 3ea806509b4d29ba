//! `/endall` confirmation button and `/end` channel selection menu.
use super::util::{self, channel_list};
use crate::deck::store::RemoveReport;
use crate::error::DeckError;
use crate::model::AppState;
use serenity::builder::{CreateInteractionResponse, CreateInteractionResponseMessage};
use serenity::model::application::{ComponentInteraction, ComponentInteractionDataKind};
use serenity::model::id::{ChannelId, UserId};
use serenity::prelude::Context;
use tracing::{info, instrument};

fn channel_mention(channel_id: ChannelId, current: ChannelId) -> String {
    if channel_id == current {
        "this channel".to_string()
    } else {
        format!("<#{}>", channel_id.get())
    }
}

/// Reply for ending a single session.
pub async fn end_single(
    app_state: &AppState,
    user_id: UserId,
    channel_id: ChannelId,
    current: ChannelId,
) -> String {
    let where_ = channel_mention(channel_id, current);
    match app_state.engine.end_session(user_id, channel_id).await {
        Ok(()) => {
            info!(target = "deck.end", user_id = %user_id, channel_id = %channel_id, "session ended");
            format!("You have ended your game session in {where_}.")
        }
        Err(DeckError::SessionNotFound) => {
            format!("You are not currently playing a game in <#{}>.", channel_id.get())
        }
        Err(_) => format!(
            "An error occurred while attempting to end your game in {where_}.\nPlease try again later."
        ),
    }
}

/// Reply for a bulk removal, listing both outcomes.
pub fn report_text(report: &RemoveReport) -> String {
    let mut lines = Vec::new();
    if !report.succeeded.is_empty() {
        lines.push("You have ended your game sessions in:".to_string());
        lines.push(channel_list(report.succeeded.iter().copied()));
    }
    if !report.failed.is_empty() {
        lines.push("An error occurred while attempting to end your game sessions in:".to_string());
        lines.push(channel_list(report.failed.iter().copied()));
        lines.push("Please try again later.".to_string());
    }
    if lines.is_empty() {
        lines.push("There were no games to end.".to_string());
    }
    lines.join("\n")
}

fn update(content: String) -> CreateInteractionResponse {
    CreateInteractionResponse::UpdateMessage(
        CreateInteractionResponseMessage::new()
            .content(content)
            .components(vec![]),
    )
}

#[instrument(level = "debug", skip_all, fields(user_id = %c.user.id))]
pub async fn end_all(
    ctx: &Context,
    c: &ComponentInteraction,
    app_state: &AppState,
) -> serenity::Result<()> {
    let channels: Vec<ChannelId> = app_state
        .store()
        .channels(c.user.id)
        .await
        .into_iter()
        .map(|ch| ch.id)
        .collect();
    let report = app_state.engine.end_sessions(c.user.id, &channels).await;
    let content = if report.failed.is_empty() {
        "All of your games have now ended.".to_string()
    } else {
        format!(
            "Games in the following channels were not ended due to an error:\n{}\n\nPlease try again later.",
            channel_list(report.failed.iter().copied())
        )
    };
    c.create_response(&ctx.http, update(content)).await
}

fn selected_channels(c: &ComponentInteraction) -> Vec<ChannelId> {
    match &c.data.kind {
        ComponentInteractionDataKind::StringSelect { values } => values
            .iter()
            .filter_map(|v| v.parse::<u64>().ok())
            .filter(|id| *id != 0)
            .map(ChannelId::new)
            .collect(),
        _ => Vec::new(),
    }
}

#[instrument(level = "debug", skip_all, fields(user_id = %c.user.id))]
pub async fn end_selection(
    ctx: &Context,
    c: &ComponentInteraction,
    app_state: &AppState,
) -> serenity::Result<()> {
    let content = match selected_channels(c).as_slice() {
        [] => {
            util::defer_component(ctx, c).await;
            return Ok(());
        }
        [only] => end_single(app_state, c.user.id, *only, c.channel_id).await,
        many => report_text(&app_state.engine.end_sessions(c.user.id, many).await),
    };
    c.create_response(&ctx.http, update(content)).await
}
