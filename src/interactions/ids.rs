//! Typed custom_id codec for every component and modal the bot emits.
//!
//! Wire form: `<domain>:<action>:<user_id>[:<payload>]`, e.g. `deck:redraw:1234:9f0c…`.
//! Ids are decoded once at the router; handlers only ever see [`ActionId`].

use crate::deck::session::CardId;
use serenity::model::id::{MessageId, UserId};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

pub const DECK_DOMAIN: &str = "deck";
pub const END_DOMAIN: &str = "end";

const REDRAW: &str = "redraw";
const PLAY: &str = "play";
const CHOOSE_FIFTH: &str = "choosefifth";
const MODAL_FIFTH: &str = "modalfifth";
const TEXT_FIFTH: &str = "txtfifth";
const END_ALL: &str = "all";
const END_SELECTION: &str = "selection";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    Redraw(CardId),
    Play(CardId),
    /// "Choose Card #5" button; opens the modal.
    ChooseFifth,
    /// Fifth card modal; carries the prompt message to delete once resolved.
    SubmitFifth(Option<MessageId>),
    /// Confirmation button of `/endall`.
    EndAll,
    /// Channel multi-select of `/end`.
    EndSelection,
}

impl Action {
    pub fn domain(&self) -> &'static str {
        match self {
            Action::EndAll | Action::EndSelection => END_DOMAIN,
            _ => DECK_DOMAIN,
        }
    }

    fn verb(&self) -> &'static str {
        match self {
            Action::Redraw(_) => REDRAW,
            Action::Play(_) => PLAY,
            Action::ChooseFifth => CHOOSE_FIFTH,
            Action::SubmitFifth(_) => MODAL_FIFTH,
            Action::EndAll => END_ALL,
            Action::EndSelection => END_SELECTION,
        }
    }

    fn payload(&self) -> Option<String> {
        match self {
            Action::Redraw(id) | Action::Play(id) => Some(id.to_string()),
            Action::SubmitFifth(Some(message_id)) => Some(message_id.get().to_string()),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ActionId {
    /// The only user allowed to trigger this component.
    pub actor: UserId,
    pub action: Action,
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdError {
    #[error("custom id belongs to another component family")]
    ForeignDomain,
    #[error("malformed custom id `{0}`")]
    Malformed(String),
}

impl ActionId {
    pub fn new(actor: UserId, action: Action) -> Self {
        Self { actor, action }
    }

    pub fn encode(&self) -> String {
        self.to_string()
    }
}

impl fmt::Display for ActionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}:{}:{}",
            self.action.domain(),
            self.action.verb(),
            self.actor.get()
        )?;
        if let Some(payload) = self.action.payload() {
            write!(f, ":{payload}")?;
        }
        Ok(())
    }
}

fn parse_snowflake(raw: &str) -> Option<u64> {
    raw.parse::<u64>().ok().filter(|v| *v != 0)
}

impl FromStr for ActionId {
    type Err = IdError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let malformed = || IdError::Malformed(raw.to_string());
        let mut parts = raw.splitn(4, ':');
        let domain = parts.next().unwrap_or_default();
        if domain != DECK_DOMAIN && domain != END_DOMAIN {
            return Err(IdError::ForeignDomain);
        }
        let verb = parts.next().ok_or_else(malformed)?;
        let actor = parts
            .next()
            .and_then(parse_snowflake)
            .map(UserId::new)
            .ok_or_else(malformed)?;
        let payload = parts.next().filter(|p| !p.is_empty());

        let action = match (domain, verb, payload) {
            (DECK_DOMAIN, REDRAW, Some(p)) => {
                Action::Redraw(CardId::parse(p).ok_or_else(malformed)?)
            }
            (DECK_DOMAIN, PLAY, Some(p)) => Action::Play(CardId::parse(p).ok_or_else(malformed)?),
            (DECK_DOMAIN, CHOOSE_FIFTH, None) => Action::ChooseFifth,
            (DECK_DOMAIN, MODAL_FIFTH, None) => Action::SubmitFifth(None),
            (DECK_DOMAIN, MODAL_FIFTH, Some(p)) => Action::SubmitFifth(Some(MessageId::new(
                parse_snowflake(p).ok_or_else(malformed)?,
            ))),
            (END_DOMAIN, END_ALL, None) => Action::EndAll,
            (END_DOMAIN, END_SELECTION, None) => Action::EndSelection,
            _ => return Err(malformed()),
        };
        Ok(ActionId { actor, action })
    }
}

/// custom_id of the free-text field inside the fifth card modal.
pub fn fifth_text_input_id(user_id: UserId) -> String {
    format!("{DECK_DOMAIN}:{TEXT_FIFTH}:{}", user_id.get())
}
