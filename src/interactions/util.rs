//! Shared interaction helpers: ephemeral notices and logged acknowledgements.
use crate::constants::ERROR_COLOR;
use serenity::builder::{
    CreateEmbed, CreateInteractionResponse, CreateInteractionResponseFollowup,
    CreateInteractionResponseMessage, EditInteractionResponse,
};
use serenity::model::application::{ComponentInteraction, ModalInteraction};
use serenity::prelude::Context;

pub const INTERNAL_ERROR: &str = "An internal error occurred while processing this interaction.";

/// Plain ephemeral reply.
pub fn notice(content: impl Into<String>) -> CreateInteractionResponse {
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .content(content)
            .ephemeral(true),
    )
}

/// Ephemeral red embed, for refusals that deserve a title.
pub fn error_notice(title: &str, description: &str) -> CreateInteractionResponse {
    let embed = CreateEmbed::new()
        .title(title)
        .description(description)
        .color(ERROR_COLOR);
    CreateInteractionResponse::Message(
        CreateInteractionResponseMessage::new()
            .embed(embed)
            .ephemeral(true),
    )
}

pub fn followup_notice(content: impl Into<String>) -> CreateInteractionResponseFollowup {
    CreateInteractionResponseFollowup::new()
        .content(content)
        .ephemeral(true)
}

/// Acknowledge a button press without changing its message; duplicate acks are only logged.
pub async fn defer_component(ctx: &Context, c: &ComponentInteraction) {
    if let Err(e) = c.defer(&ctx.http).await {
        tracing::debug!(target = "ui.defer", cid = %c.data.custom_id, error = ?e, "defer failed (already acknowledged?)");
    }
}

pub async fn defer_modal(ctx: &Context, m: &ModalInteraction) {
    if let Err(e) = m.defer_ephemeral(&ctx.http).await {
        tracing::debug!(target = "ui.defer", cid = %m.data.custom_id, error = ?e, "modal defer failed");
    }
}

/// Edit the deferred modal reply; logs failure with a tag.
pub async fn edit_modal(
    ctx: &Context,
    m: &ModalInteraction,
    tag: &str,
    builder: EditInteractionResponse,
) {
    if let Err(e) = m.edit_response(&ctx.http, builder).await {
        tracing::error!(target = "ui.edit", cid = %m.data.custom_id, tag = %tag, error = ?e, "edit_response failed");
    }
}

/// `<#id>` bullet list used by every multi-channel reply.
pub fn channel_list<I>(channels: I) -> String
where
    I: IntoIterator<Item = serenity::model::id::ChannelId>,
{
    channels
        .into_iter()
        .map(|id| format!("- <#{}>", id.get()))
        .collect::<Vec<_>>()
        .join("\n")
}
