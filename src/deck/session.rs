//! Session data model and the pure deck/hand state machine.
//!
//! Nothing in here performs I/O: the engine takes a snapshot, applies one of
//! these transitions, renders, and either persists or restores the snapshot.

use crate::constants::{DECK_SIZE, MAX_HAND_SIZE, REDRAW_EXCLUSION, STARTING_HAND_SIZE};
use crate::error::DeckError;
use chrono::{DateTime, Utc};
use rand::Rng;
use rand::seq::SliceRandom;
use serde::{Deserialize, Serialize};
use serenity::model::id::{ChannelId, GuildId, MessageId, UserId};
use std::collections::BTreeSet;
use std::fmt;

/// Opaque per-card identifier; stays the same for the lifetime of the card's message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CardId(String);

impl CardId {
    pub fn generate<R: Rng + ?Sized>(rng: &mut R) -> Self {
        let bytes: [u8; 16] = rng.random();
        Self(
            uuid::Builder::from_random_bytes(bytes)
                .into_uuid()
                .simple()
                .to_string(),
        )
    }

    /// Accepts ids read back out of a component custom_id.
    pub fn parse(raw: &str) -> Option<Self> {
        let valid = !raw.is_empty()
            && raw.len() <= 64
            && raw
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        valid.then(|| Self(raw.to_string()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CardId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct SessionKey {
    pub user_id: UserId,
    pub channel_id: ChannelId,
}

impl SessionKey {
    pub fn new(user_id: UserId, channel_id: ChannelId) -> Self {
        Self {
            user_id,
            channel_id,
        }
    }

    /// Deterministic record file name for this pair.
    pub fn file_name(&self) -> String {
        format!("{}_{}.json", self.user_id.get(), self.channel_id.get())
    }
}

impl fmt::Display for SessionKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[@{} | #{}]", self.user_id, self.channel_id)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ChannelInfo {
    pub id: ChannelId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub guild_id: Option<GuildId>,
}

/// The button currently attached to a hand card's message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CardAction {
    Redraw,
    Play,
    Idle,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HandCard {
    pub id: CardId,
    pub name: String,
    #[serde(default)]
    pub message_id: Option<MessageId>,
    pub action: CardAction,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionFlag {
    FifthRequested,
    FifthDrawn,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Dealing,
    AwaitingFifth,
    FifthPicked,
}

/// Outcome of a successful redraw, kept for logging and rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Redraw {
    pub card_id: CardId,
    pub old_card: String,
    pub new_card: String,
    pub reinserted_at: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Session {
    pub user_id: UserId,
    pub channel: ChannelInfo,
    pub deck: Vec<String>,
    pub hand: Vec<HandCard>,
    #[serde(default)]
    pub played: Vec<String>,
    #[serde(default)]
    pub flags: BTreeSet<SessionFlag>,
    pub created_at: DateTime<Utc>,
    #[serde(skip)]
    retired: bool,
}

/// Trim, case-fold and collapse inner whitespace so free text matches deck entries.
pub fn normalize_card_name(raw: &str) -> String {
    raw.split_whitespace()
        .collect::<Vec<_>>()
        .join(" ")
        .to_lowercase()
}

/// Parse a comma separated deck list; it must hold exactly `DECK_SIZE` cards.
pub fn parse_deck_list(input: &str) -> Result<Vec<String>, DeckError> {
    let cards: Vec<String> = input
        .split(',')
        .map(normalize_card_name)
        .filter(|c| !c.is_empty())
        .collect();
    if cards.len() != DECK_SIZE {
        return Err(DeckError::InvalidDeckSize(cards.len()));
    }
    Ok(cards)
}

/// Where a redrawn card goes back into a deck of `deck_len` cards.
/// Uniform in `[REDRAW_EXCLUSION, deck_len]`; short decks append at the end.
pub fn reinsertion_index<R: Rng + ?Sized>(deck_len: usize, rng: &mut R) -> usize {
    if deck_len < REDRAW_EXCLUSION {
        deck_len
    } else {
        rng.random_range(REDRAW_EXCLUSION..=deck_len)
    }
}

impl Session {
    /// Build a session from a full deck list and shuffle it.
    pub fn new<R: Rng + ?Sized>(
        user_id: UserId,
        channel: ChannelInfo,
        cards: Vec<String>,
        rng: &mut R,
    ) -> Result<Self, DeckError> {
        if cards.len() != DECK_SIZE {
            return Err(DeckError::InvalidDeckSize(cards.len()));
        }
        let mut deck = cards;
        deck.shuffle(rng);
        Ok(Self {
            user_id,
            channel,
            deck,
            hand: Vec::new(),
            played: Vec::new(),
            flags: BTreeSet::new(),
            created_at: Utc::now(),
            retired: false,
        })
    }

    pub fn key(&self) -> SessionKey {
        SessionKey::new(self.user_id, self.channel.id)
    }

    pub fn has_flag(&self, flag: SessionFlag) -> bool {
        self.flags.contains(&flag)
    }

    pub fn phase(&self) -> Phase {
        if self.has_flag(SessionFlag::FifthDrawn) {
            Phase::FifthPicked
        } else if self.has_flag(SessionFlag::FifthRequested) {
            Phase::AwaitingFifth
        } else {
            Phase::Dealing
        }
    }

    /// Cards accounted for across deck, hand and discard; always `DECK_SIZE`.
    pub fn total_cards(&self) -> usize {
        self.deck.len() + self.hand.len() + self.played.len()
    }

    pub fn card(&self, card_id: &CardId) -> Option<&HandCard> {
        self.hand.iter().find(|c| &c.id == card_id)
    }

    pub(crate) fn is_retired(&self) -> bool {
        self.retired
    }

    pub(crate) fn retire(&mut self) {
        self.retired = true;
    }

    /// Record the message that now displays `card_id`.
    pub fn attach_message(&mut self, card_id: &CardId, message_id: MessageId) -> bool {
        match self.hand.iter_mut().find(|c| &c.id == card_id) {
            Some(card) => {
                card.message_id = Some(message_id);
                true
            }
            None => false,
        }
    }

    /// Move the top `STARTING_HAND_SIZE` cards into an empty hand, each redrawable once.
    pub fn deal<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<Vec<CardId>, DeckError> {
        if self.phase() != Phase::Dealing || !self.hand.is_empty() || !self.played.is_empty() {
            return Err(DeckError::AlreadyDealt);
        }
        if self.deck.len() < STARTING_HAND_SIZE {
            return Err(DeckError::DeckEmpty);
        }
        let mut dealt = Vec::with_capacity(STARTING_HAND_SIZE);
        for _ in 0..STARTING_HAND_SIZE {
            let name = self.deck.remove(0);
            dealt.push(self.push_card(name, CardAction::Redraw, rng));
        }
        Ok(dealt)
    }

    /// Swap a starting card for the top of the deck and bury the old one.
    pub fn redraw<R: Rng + ?Sized>(
        &mut self,
        card_id: &CardId,
        rng: &mut R,
    ) -> Result<Redraw, DeckError> {
        if self.has_flag(SessionFlag::FifthDrawn) {
            return Err(DeckError::FifthAlreadyDrawn);
        }
        let slot = self
            .hand
            .iter()
            .position(|c| &c.id == card_id)
            .ok_or_else(|| DeckError::CardNotInHand(card_id.clone()))?;
        if self.hand[slot].action != CardAction::Redraw {
            return Err(DeckError::NotRedrawable(card_id.clone()));
        }
        if self.deck.is_empty() {
            return Err(DeckError::DeckEmpty);
        }

        let new_card = self.deck.remove(0);
        let reinserted_at = reinsertion_index(self.deck.len(), rng);
        let entry = &mut self.hand[slot];
        let old_card = std::mem::replace(&mut entry.name, new_card.clone());
        entry.action = CardAction::Idle;
        self.deck.insert(reinserted_at, old_card.clone());

        Ok(Redraw {
            card_id: card_id.clone(),
            old_card,
            new_card,
            reinserted_at,
        })
    }

    pub fn request_fifth(&mut self) -> Result<(), DeckError> {
        if self.has_flag(SessionFlag::FifthDrawn) {
            return Err(DeckError::FifthAlreadyDrawn);
        }
        self.flags.insert(SessionFlag::FifthRequested);
        Ok(())
    }

    /// Pull the named card out of the deck as the fifth card and commit the hand.
    pub fn resolve_fifth<R: Rng + ?Sized>(
        &mut self,
        text: &str,
        rng: &mut R,
    ) -> Result<CardId, DeckError> {
        if self.has_flag(SessionFlag::FifthDrawn) {
            return Err(DeckError::FifthAlreadyDrawn);
        }
        let wanted = normalize_card_name(text);
        let index = self
            .deck
            .iter()
            .position(|c| *c == wanted)
            .ok_or_else(|| DeckError::CardNotInDeck(wanted.clone()))?;
        if self.hand.len() >= MAX_HAND_SIZE {
            return Err(DeckError::HandFull);
        }

        let name = self.deck.remove(index);
        for card in &mut self.hand {
            card.action = CardAction::Play;
        }
        let card_id = self.push_card(name, CardAction::Play, rng);
        self.flags.remove(&SessionFlag::FifthRequested);
        self.flags.insert(SessionFlag::FifthDrawn);
        Ok(card_id)
    }

    pub fn draw_next<R: Rng + ?Sized>(&mut self, rng: &mut R) -> Result<CardId, DeckError> {
        if !self.has_flag(SessionFlag::FifthDrawn) {
            return Err(DeckError::FifthNotDrawn);
        }
        if self.deck.is_empty() {
            return Err(DeckError::DeckEmpty);
        }
        if self.hand.len() >= MAX_HAND_SIZE {
            return Err(DeckError::HandFull);
        }
        let name = self.deck.remove(0);
        Ok(self.push_card(name, CardAction::Play, rng))
    }

    /// Remove a card from the hand for good; it is not returned to the deck.
    pub fn play(&mut self, card_id: &CardId) -> Result<HandCard, DeckError> {
        let slot = self
            .hand
            .iter()
            .position(|c| &c.id == card_id)
            .ok_or_else(|| DeckError::CardNotInHand(card_id.clone()))?;
        if self.hand[slot].action != CardAction::Play {
            return Err(DeckError::NotPlayable(card_id.clone()));
        }
        let card = self.hand.remove(slot);
        self.played.push(card.name.clone());
        Ok(card)
    }

    fn push_card<R: Rng + ?Sized>(
        &mut self,
        name: String,
        action: CardAction,
        rng: &mut R,
    ) -> CardId {
        let id = loop {
            let candidate = CardId::generate(rng);
            if self.card(&candidate).is_none() {
                break candidate;
            }
        };
        self.hand.push(HandCard {
            id: id.clone(),
            name,
            message_id: None,
            action,
        });
        id
    }
}
