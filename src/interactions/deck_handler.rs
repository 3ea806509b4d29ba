//! Buttons and the modal of a running deck: redraw, play, and the fifth card choice.
use super::ids::{Action, ActionId, fifth_text_input_id};
use super::util;
use crate::deck::render::{Messenger, fifth_prompt_button};
use crate::deck::session::CardId;
use crate::error::DeckError;
use crate::model::AppState;
use crate::services::messenger::action_rows;
use serenity::builder::{
    CreateActionRow, CreateInputText, CreateInteractionResponse, CreateModal,
    EditInteractionResponse,
};
use serenity::model::application::{
    ActionRowComponent, ComponentInteraction, InputTextStyle, ModalInteraction,
};
use serenity::model::id::MessageId;
use serenity::prelude::Context;
use tracing::{info, instrument, warn};

async fn report(ctx: &Context, c: &ComponentInteraction, e: &DeckError) -> serenity::Result<()> {
    warn!(target = "deck.button", cid = %c.data.custom_id, user_id = %c.user.id, error = %e, "deck button refused");
    c.create_followup(&ctx.http, util::followup_notice(e.user_message()))
        .await
        .map(|_| ())
}

#[instrument(level = "debug", skip_all, fields(user_id = %c.user.id, channel_id = %c.channel_id))]
pub async fn redraw(
    ctx: &Context,
    c: &ComponentInteraction,
    app_state: &AppState,
    card_id: CardId,
) -> serenity::Result<()> {
    util::defer_component(ctx, c).await;
    match app_state
        .engine
        .redraw(&*app_state.messenger, c.user.id, c.channel_id, &card_id)
        .await
    {
        Ok(_) => Ok(()),
        Err(e) => report(ctx, c, &e).await,
    }
}

#[instrument(level = "debug", skip_all, fields(user_id = %c.user.id, channel_id = %c.channel_id))]
pub async fn play(
    ctx: &Context,
    c: &ComponentInteraction,
    app_state: &AppState,
    card_id: CardId,
) -> serenity::Result<()> {
    util::defer_component(ctx, c).await;
    match app_state
        .engine
        .play_card(&*app_state.messenger, c.user.id, c.channel_id, &card_id)
        .await
    {
        Ok(_) => Ok(()),
        Err(e) => report(ctx, c, &e).await,
    }
}

/// "Choose Card #5": flag the session and open the free-text modal.
pub async fn choose_fifth(
    ctx: &Context,
    c: &ComponentInteraction,
    app_state: &AppState,
) -> serenity::Result<()> {
    if let Err(e) = app_state.engine.request_fifth(c.user.id, c.channel_id).await {
        return c
            .create_response(&ctx.http, util::notice(e.user_message()))
            .await;
    }
    let modal_id = ActionId::new(c.user.id, Action::SubmitFifth(Some(c.message.id))).encode();
    let field = CreateInputText::new(
        InputTextStyle::Short,
        "Select your Fifth Card from your deck:",
        fifth_text_input_id(c.user.id),
    )
    .required(true);
    let modal = CreateModal::new(modal_id, "Pikcards")
        .components(vec![CreateActionRow::InputText(field)]);
    c.create_response(&ctx.http, CreateInteractionResponse::Modal(modal))
        .await
}

fn submitted_text(m: &ModalInteraction) -> Option<String> {
    let wanted = fifth_text_input_id(m.user.id);
    m.data
        .components
        .iter()
        .flat_map(|row| row.components.iter())
        .find_map(|component| match component {
            ActionRowComponent::InputText(input) if input.custom_id == wanted => {
                input.value.clone()
            }
            _ => None,
        })
}

#[instrument(level = "debug", skip_all, fields(user_id = %m.user.id, channel_id = %m.channel_id))]
pub async fn submit_fifth(
    ctx: &Context,
    m: &ModalInteraction,
    app_state: &AppState,
    prompt: Option<MessageId>,
) -> serenity::Result<()> {
    let Some(text) = submitted_text(m) else {
        return m
            .create_response(&ctx.http, util::notice(super::STALE_ID))
            .await;
    };
    // Editing every starting card can outlast the 3s response window.
    util::defer_modal(ctx, m).await;

    match app_state
        .engine
        .resolve_fifth(&*app_state.messenger, m.user.id, m.channel_id, &text)
        .await
    {
        Ok(card) => {
            info!(target = "deck.fifth", user_id = %m.user.id, card = %card.name, "fifth card chosen");
            if let Some(prompt) = prompt
                && let Err(e) = app_state.messenger.delete(m.channel_id, prompt).await
            {
                warn!(target = "deck.fifth", error = %e, "could not remove fifth card prompt");
            }
            if let Err(e) = m.delete_response(&ctx.http).await {
                warn!(target = "deck.fifth", error = ?e, "could not close modal reply");
            }
        }
        Err(e @ DeckError::CardNotInDeck(_)) => {
            let retry = EditInteractionResponse::new()
                .content(e.user_message())
                .components(action_rows(&[fifth_prompt_button(m.user.id)]));
            util::edit_modal(ctx, m, "fifth.retry", retry).await;
        }
        Err(e) => {
            warn!(target = "deck.fifth", user_id = %m.user.id, error = %e, "fifth card refused");
            util::edit_modal(
                ctx,
                m,
                "fifth.err",
                EditInteractionResponse::new().content(e.user_message()),
            )
            .await;
        }
    }
    Ok(())
}
