//! Outbound render requests and the narrow messaging seam the engine talks to.
//!
//! The engine never touches serenity builders directly: it describes a card
//! message as a [`CardRender`] and hands it to a [`Messenger`]. Production uses
//! `services::messenger::DiscordMessenger`; tests plug in a recording mock.

use super::session::{CardAction, HandCard};
use crate::constants::BUTTON_LABEL_MAX;
use crate::error::DeckError;
use crate::interactions::ids::{Action, ActionId};
use async_trait::async_trait;
use serenity::model::id::{ChannelId, MessageId, UserId};
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ButtonTone {
    Success,
    Danger,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderButton {
    pub custom_id: String,
    pub label: String,
    pub tone: ButtonTone,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CardRender {
    pub content: Option<String>,
    pub image: Option<PathBuf>,
    pub buttons: Vec<RenderButton>,
}

#[async_trait]
pub trait Messenger: Send + Sync {
    /// Post a new message and return its id.
    async fn send(
        &self,
        channel_id: ChannelId,
        render: &CardRender,
    ) -> Result<MessageId, DeckError>;
    /// Replace content, attachment and buttons of an existing message.
    async fn replace(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        render: &CardRender,
    ) -> Result<(), DeckError>;
    /// Swap only the buttons of an existing message.
    async fn set_buttons(
        &self,
        channel_id: ChannelId,
        message_id: MessageId,
        buttons: &[RenderButton],
    ) -> Result<(), DeckError>;
    async fn delete(&self, channel_id: ChannelId, message_id: MessageId) -> Result<(), DeckError>;
}

pub fn title_case(s: &str) -> String {
    s.split_whitespace()
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first
                    .to_uppercase()
                    .chain(chars.flat_map(char::to_lowercase))
                    .collect(),
                None => String::new(),
            }
        })
        .collect::<Vec<String>>()
        .join(" ")
}

fn clamp_label(label: String) -> String {
    if label.chars().count() <= BUTTON_LABEL_MAX {
        return label;
    }
    let mut clipped: String = label.chars().take(BUTTON_LABEL_MAX - 1).collect();
    clipped.push('…');
    clipped
}

/// Buttons for a hand card in its current state (none once it is idle).
pub fn card_buttons(user_id: UserId, card: &HandCard) -> Vec<RenderButton> {
    let (action, verb, tone) = match card.action {
        CardAction::Redraw => (Action::Redraw(card.id.clone()), "Redraw", ButtonTone::Danger),
        CardAction::Play => (Action::Play(card.id.clone()), "Play", ButtonTone::Success),
        CardAction::Idle => return Vec::new(),
    };
    vec![RenderButton {
        custom_id: ActionId::new(user_id, action).encode(),
        label: clamp_label(format!("{verb} {}", title_case(&card.name))),
        tone,
    }]
}

/// Full message for a hand card: its image when one exists, else its name as text.
pub fn card_render(user_id: UserId, card: &HandCard, image: Option<PathBuf>) -> CardRender {
    CardRender {
        content: image.is_none().then(|| title_case(&card.name)),
        image,
        buttons: card_buttons(user_id, card),
    }
}

/// "Choose Card #5" prompt shown after the starting hand is dealt (or re-offered).
pub fn fifth_prompt_button(user_id: UserId) -> RenderButton {
    RenderButton {
        custom_id: ActionId::new(user_id, Action::ChooseFifth).encode(),
        label: "Choose Card #5".to_string(),
        tone: ButtonTone::Success,
    }
}
