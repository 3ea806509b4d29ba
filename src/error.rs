//! Error taxonomy shared by the session store, the deck engine and start-up.
//!
//! Every `DeckError` maps to a short user-facing notice through
//! [`DeckError::user_message`]; handlers never show raw error text to players.

use crate::constants::{DECK_SIZE, MAX_HAND_SIZE};
use crate::deck::session::CardId;
use std::path::PathBuf;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("i/o error on {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("failed to serialize session: {0}")]
    Serialize(#[from] serde_json::Error),
    #[error("malformed session record {path}: {source}")]
    Malformed {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("a session already exists for user {user_id} in channel {channel_id}")]
    AlreadyExists { user_id: u64, channel_id: u64 },
}

impl StoreError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        StoreError::Io {
            path: path.into(),
            source,
        }
    }

    /// True for failures of the durable write itself (the in-memory record may still exist).
    pub fn is_persistence(&self) -> bool {
        matches!(self, StoreError::Io { .. } | StoreError::Serialize(_))
    }
}

#[derive(Debug, Error)]
pub enum DeckError {
    #[error("no session for this user in this channel")]
    SessionNotFound,
    #[error("a session already exists in this channel")]
    SessionExists,
    #[error("card {0} is not in the hand")]
    CardNotInHand(CardId),
    #[error("card `{0}` is not in the deck")]
    CardNotInDeck(String),
    #[error("card {0} can no longer be redrawn")]
    NotRedrawable(CardId),
    #[error("card {0} cannot be played")]
    NotPlayable(CardId),
    #[error("the deck is empty")]
    DeckEmpty,
    #[error("the hand already holds {} cards", MAX_HAND_SIZE)]
    HandFull,
    #[error("the fifth card has not been chosen yet")]
    FifthNotDrawn,
    #[error("the fifth card has already been chosen")]
    FifthAlreadyDrawn,
    #[error("the starting hand has already been dealt")]
    AlreadyDealt,
    #[error("a deck needs exactly {} cards, counted {}", DECK_SIZE, .0)]
    InvalidDeckSize(usize),
    #[error("channel unavailable: {0}")]
    ChannelUnavailable(String),
    #[error("render failed: {0}")]
    Render(String),
    #[error(transparent)]
    Persistence(#[from] StoreError),
}

impl DeckError {
    /// Notice shown to the player (ephemeral) when an operation fails.
    pub fn user_message(&self) -> String {
        match self {
            DeckError::SessionNotFound => {
                "You don't appear to be playing in this channel. You can start with `/deck`!"
                    .to_string()
            }
            DeckError::SessionExists => {
                "You already have a game in this channel. End it with `/end` first.".to_string()
            }
            DeckError::CardNotInHand(_) => "That card is no longer in your hand.".to_string(),
            DeckError::CardNotInDeck(name) => {
                format!("The card `{name}` was not found in your deck, please try again.")
            }
            DeckError::NotRedrawable(_) => "That card can't be redrawn anymore.".to_string(),
            DeckError::NotPlayable(_) => "That card can't be played right now.".to_string(),
            DeckError::DeckEmpty => "You have no more cards left in your deck!".to_string(),
            DeckError::HandFull => {
                format!("You already have {MAX_HAND_SIZE} cards and can't hold any more!")
            }
            DeckError::FifthNotDrawn => {
                "You need to finish drawing your starting hand (select 5th card) before you can draw."
                    .to_string()
            }
            DeckError::FifthAlreadyDrawn => "You have already chosen your 5th card.".to_string(),
            DeckError::AlreadyDealt => "Your starting hand has already been dealt.".to_string(),
            DeckError::InvalidDeckSize(n) => {
                format!("A deck needs exactly {DECK_SIZE} cards, counted {n} cards.")
            }
            DeckError::ChannelUnavailable(_) => {
                "ERROR: I may be lacking View Channel or similar permissions.".to_string()
            }
            DeckError::Render(_) => {
                "I couldn't post that card. Nothing was changed, please try again.".to_string()
            }
            DeckError::Persistence(_) => {
                "An error occurred while saving your game. Please try again later.".to_string()
            }
        }
    }
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing environment variable {0}")]
    Missing(&'static str),
    #[error("invalid value for {name}: {value}")]
    Invalid { name: &'static str, value: String },
}
