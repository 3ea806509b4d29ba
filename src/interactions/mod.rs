//! Central router for component and modal interactions.
//!
//! `handler.rs` forwards every button press, select menu and modal submission
//! here. The custom_id is decoded once into an [`ActionId`]; ids from other
//! component families are ignored, stale or mangled ids get a short notice and
//! presses by anyone but the bound player are refused.

pub mod deck_handler;
pub mod end_handler;
pub mod ids;
pub mod util;

use crate::model::AppState;
use ids::{Action, ActionId, IdError};
use serenity::builder::CreateInteractionResponse;
use serenity::model::application::{ComponentInteraction, ModalInteraction};
use serenity::model::id::UserId;
use serenity::prelude::Context;
use std::sync::Arc;
use tracing::{debug, warn};

pub const STALE_ID: &str = "This button is no longer valid.";
pub const NOT_YOURS: &str = "This button is not for you!";

/// Decode and check ownership; `Ok(None)` means the interaction is not ours to answer.
pub fn authorize(custom_id: &str, user_id: UserId) -> Result<Option<ActionId>, &'static str> {
    match custom_id.parse::<ActionId>() {
        Ok(id) if id.actor != user_id => Err(NOT_YOURS),
        Ok(id) => Ok(Some(id)),
        Err(IdError::ForeignDomain) => Ok(None),
        Err(IdError::Malformed(raw)) => {
            warn!(target = "router", custom_id = %raw, user_id = %user_id, "malformed custom id");
            Err(STALE_ID)
        }
    }
}

fn refusal(notice: &'static str) -> CreateInteractionResponse {
    if notice == NOT_YOURS {
        util::error_notice("Not Your Game", notice)
    } else {
        util::notice(notice)
    }
}

pub async fn handle_component(
    ctx: &Context,
    component: &ComponentInteraction,
    app_state: Arc<AppState>,
) -> serenity::Result<()> {
    let id = match authorize(&component.data.custom_id, component.user.id) {
        Ok(Some(id)) => id,
        Ok(None) => {
            debug!(target = "router", cid = %component.data.custom_id, "ignoring foreign component");
            return Ok(());
        }
        Err(notice) => {
            return component
                .create_response(&ctx.http, refusal(notice))
                .await;
        }
    };
    match id.action {
        Action::Redraw(card_id) => deck_handler::redraw(ctx, component, &app_state, card_id).await,
        Action::Play(card_id) => deck_handler::play(ctx, component, &app_state, card_id).await,
        Action::ChooseFifth => deck_handler::choose_fifth(ctx, component, &app_state).await,
        Action::EndAll => end_handler::end_all(ctx, component, &app_state).await,
        Action::EndSelection => end_handler::end_selection(ctx, component, &app_state).await,
        Action::SubmitFifth(_) => {
            component
                .create_response(&ctx.http, util::notice(STALE_ID))
                .await
        }
    }
}

pub async fn handle_modal(
    ctx: &Context,
    modal: &ModalInteraction,
    app_state: Arc<AppState>,
) -> serenity::Result<()> {
    let id = match authorize(&modal.data.custom_id, modal.user.id) {
        Ok(Some(id)) => id,
        Ok(None) => return Ok(()),
        Err(notice) => return modal.create_response(&ctx.http, refusal(notice)).await,
    };
    match id.action {
        Action::SubmitFifth(prompt) => {
            deck_handler::submit_fifth(ctx, modal, &app_state, prompt).await
        }
        _ => modal.create_response(&ctx.http, util::notice(STALE_ID)).await,
    }
}
