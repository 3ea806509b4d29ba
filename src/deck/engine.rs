//! The deck engine: runs each game operation against one locked session.
//!
//! Every operation follows the same shape: lock the session, snapshot it,
//! apply the pure transition, render through the [`Messenger`], then either
//! persist or restore the snapshot if the platform call failed. The session
//! lock is held for the whole sequence, so interactions for the same
//! (user, channel) never interleave.

use super::catalog::CardCatalog;
use super::render::{Messenger, card_buttons, card_render};
use super::session::{CardId, ChannelInfo, HandCard, Redraw, Session};
use super::store::{RemoveReport, SessionStore};
use crate::error::DeckError;
use rand::SeedableRng;
use rand::rngs::StdRng;
use serenity::model::id::{ChannelId, UserId};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tokio::sync::OwnedMutexGuard;
use tracing::{error, info, instrument, warn};

/// Result of `/deck`: the dealt starting hand, and whether it reached disk.
#[derive(Debug, Clone)]
pub struct StartedGame {
    pub dealt: Vec<HandCard>,
    pub persisted: bool,
}

pub struct DeckEngine {
    store: Arc<SessionStore>,
    catalog: Arc<CardCatalog>,
    seed: Option<u64>,
    rng_draws: AtomicU64,
}

impl DeckEngine {
    pub fn new(store: Arc<SessionStore>, catalog: Arc<CardCatalog>) -> Self {
        Self {
            store,
            catalog,
            seed: None,
            rng_draws: AtomicU64::new(0),
        }
    }

    /// Deterministic engine for tests: every operation derives its RNG from `seed`.
    pub fn with_seed(store: Arc<SessionStore>, catalog: Arc<CardCatalog>, seed: u64) -> Self {
        Self {
            seed: Some(seed),
            ..Self::new(store, catalog)
        }
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        &self.store
    }

    pub fn catalog(&self) -> &Arc<CardCatalog> {
        &self.catalog
    }

    fn rng(&self) -> StdRng {
        match self.seed {
            Some(seed) => {
                let n = self.rng_draws.fetch_add(1, Ordering::Relaxed);
                StdRng::seed_from_u64(seed.wrapping_add(n))
            }
            None => StdRng::from_os_rng(),
        }
    }

    async fn lock(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
    ) -> Result<OwnedMutexGuard<Session>, DeckError> {
        let handle = self
            .store
            .get(user_id, channel_id)
            .await
            .ok_or(DeckError::SessionNotFound)?;
        let session = handle.lock_owned().await;
        // Removed while we were queued behind another interaction.
        if session.is_retired() {
            return Err(DeckError::SessionNotFound);
        }
        Ok(session)
    }

    async fn persist(&self, session: &Session) -> bool {
        match self.store.save(session).await {
            Ok(()) => true,
            Err(e) => {
                error!(target = "deck.persist", key = %session.key(), error = %e, "failed to persist deck session");
                false
            }
        }
    }

    async fn render_new(
        &self,
        messenger: &dyn Messenger,
        session: &mut Session,
        card: &HandCard,
    ) -> Result<(), DeckError> {
        let image = self.catalog.find(&card.name).await;
        let render = card_render(session.user_id, card, image);
        let message_id = messenger.send(session.channel.id, &render).await?;
        session.attach_message(&card.id, message_id);
        Ok(())
    }

    /// Create a session for `cards` in `channel` and deal the starting hand.
    #[instrument(level = "debug", skip_all, fields(user_id = %user_id, channel_id = %channel.id))]
    pub async fn start(
        &self,
        messenger: &dyn Messenger,
        user_id: UserId,
        channel: ChannelInfo,
        cards: Vec<String>,
    ) -> Result<StartedGame, DeckError> {
        let channel_id = channel.id;
        if self.store.get(user_id, channel_id).await.is_some() {
            return Err(DeckError::SessionExists);
        }
        let session = Session::new(user_id, channel, cards, &mut self.rng())?;
        info!(target = "deck.start", key = %session.key(), deck = ?session.deck, "deck shuffled");

        let mut persisted = true;
        if let Err(e) = self.store.create(session).await {
            if !e.is_persistence() {
                return Err(DeckError::SessionExists);
            }
            warn!(target = "deck.start", user_id = %user_id, channel_id = %channel_id, error = %e, "session created in memory only; next save will retry");
            persisted = false;
        }

        match self.deal(messenger, user_id, channel_id).await {
            Ok((dealt, saved)) => {
                if saved && !persisted {
                    info!(target = "deck.start", user_id = %user_id, channel_id = %channel_id, "session record written after retry");
                }
                Ok(StartedGame {
                    dealt,
                    persisted: saved,
                })
            }
            Err(e) => {
                if let Err(discard) = self.store.discard(user_id, channel_id).await {
                    error!(target = "deck.start", user_id = %user_id, channel_id = %channel_id, error = %discard, "could not discard session after failed deal");
                }
                Err(e)
            }
        }
    }

    /// Deal the starting hand, one message per card, each with a one-shot redraw button.
    #[instrument(level = "debug", skip_all, fields(user_id = %user_id, channel_id = %channel_id))]
    pub async fn deal(
        &self,
        messenger: &dyn Messenger,
        user_id: UserId,
        channel_id: ChannelId,
    ) -> Result<(Vec<HandCard>, bool), DeckError> {
        let mut session = self.lock(user_id, channel_id).await?;
        let snapshot = session.clone();
        let dealt_ids = session.deal(&mut self.rng())?;

        for (posted, card_id) in dealt_ids.iter().enumerate() {
            let Some(card) = session.card(card_id).cloned() else {
                continue;
            };
            if let Err(e) = self.render_new(messenger, &mut session, &card).await {
                error!(target = "deck.deal", key = %session.key(), card = %card.name, error = %e, "failed to post starting card; rolling back deal");
                for earlier in &dealt_ids[..posted] {
                    if let Some(message_id) = session.card(earlier).and_then(|c| c.message_id)
                        && let Err(e) = messenger.delete(channel_id, message_id).await
                    {
                        warn!(target = "deck.deal", error = %e, "failed to clean up starting card message");
                    }
                }
                *session = snapshot;
                return Err(e);
            }
            info!(target = "deck.deal", key = %session.key(), card = %card.name, "dealt card");
        }

        let dealt = dealt_ids
            .iter()
            .filter_map(|id| session.card(id).cloned())
            .collect();
        let saved = self.persist(&session).await;
        Ok((dealt, saved))
    }

    /// Swap one starting card for the top of the deck.
    #[instrument(level = "debug", skip_all, fields(user_id = %user_id, channel_id = %channel_id, card_id = %card_id))]
    pub async fn redraw(
        &self,
        messenger: &dyn Messenger,
        user_id: UserId,
        channel_id: ChannelId,
        card_id: &CardId,
    ) -> Result<Redraw, DeckError> {
        let mut session = self.lock(user_id, channel_id).await?;
        let snapshot = session.clone();
        let redraw = session.redraw(card_id, &mut self.rng())?;
        let Some(card) = session.card(card_id).cloned() else {
            *session = snapshot;
            return Err(DeckError::CardNotInHand(card_id.clone()));
        };

        let image = self.catalog.find(&card.name).await;
        let render = card_render(user_id, &card, image);
        let rendered = match card.message_id {
            Some(message_id) => messenger.replace(channel_id, message_id, &render).await,
            None => match messenger.send(channel_id, &render).await {
                Ok(message_id) => {
                    session.attach_message(card_id, message_id);
                    Ok(())
                }
                Err(e) => Err(e),
            },
        };
        if let Err(e) = rendered {
            error!(target = "deck.redraw", key = %session.key(), error = %e, "failed to show redrawn card; rolling back");
            *session = snapshot;
            return Err(e);
        }

        info!(
            target = "deck.redraw",
            key = %session.key(),
            old = %redraw.old_card,
            new = %redraw.new_card,
            reinserted_at = redraw.reinserted_at,
            "redrew card"
        );
        self.persist(&session).await;
        Ok(redraw)
    }

    /// Mark the session as waiting on the fifth card choice.
    #[instrument(level = "debug", skip_all, fields(user_id = %user_id, channel_id = %channel_id))]
    pub async fn request_fifth(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
    ) -> Result<(), DeckError> {
        let mut session = self.lock(user_id, channel_id).await?;
        session.request_fifth()?;
        self.persist(&session).await;
        Ok(())
    }

    /// Take the named card from the deck as the fifth card and turn the hand playable.
    #[instrument(level = "debug", skip_all, fields(user_id = %user_id, channel_id = %channel_id))]
    pub async fn resolve_fifth(
        &self,
        messenger: &dyn Messenger,
        user_id: UserId,
        channel_id: ChannelId,
        text: &str,
    ) -> Result<HandCard, DeckError> {
        let mut session = self.lock(user_id, channel_id).await?;
        let snapshot = session.clone();
        let card_id = match session.resolve_fifth(text, &mut self.rng()) {
            Ok(id) => id,
            Err(e) => {
                info!(target = "deck.fifth", key = %session.key(), input = %text, error = %e, "fifth card not taken");
                return Err(e);
            }
        };
        let Some(fifth) = session.card(&card_id).cloned() else {
            *session = snapshot;
            return Err(DeckError::CardNotInHand(card_id));
        };
        if let Err(e) = self.render_new(messenger, &mut session, &fifth).await {
            error!(target = "deck.fifth", key = %session.key(), error = %e, "failed to post fifth card; rolling back");
            *session = snapshot;
            return Err(e);
        }

        info!(target = "deck.fifth", key = %session.key(), card = %fifth.name, "updating starting hand to show play buttons");
        for card in session.hand.iter().filter(|c| c.id != card_id) {
            let Some(message_id) = card.message_id else {
                continue;
            };
            let buttons = card_buttons(user_id, card);
            if let Err(e) = messenger.set_buttons(channel_id, message_id, &buttons).await {
                warn!(target = "deck.fifth", card = %card.name, error = %e, "failed to switch card to play button");
            }
        }

        self.persist(&session).await;
        Ok(session.card(&card_id).cloned().unwrap_or(fifth))
    }

    /// Draw the next card of the turn.
    #[instrument(level = "debug", skip_all, fields(user_id = %user_id, channel_id = %channel_id))]
    pub async fn draw_next(
        &self,
        messenger: &dyn Messenger,
        user_id: UserId,
        channel_id: ChannelId,
    ) -> Result<HandCard, DeckError> {
        let mut session = self.lock(user_id, channel_id).await?;
        let snapshot = session.clone();
        let card_id = session.draw_next(&mut self.rng())?;
        let Some(card) = session.card(&card_id).cloned() else {
            *session = snapshot;
            return Err(DeckError::CardNotInHand(card_id));
        };
        if let Err(e) = self.render_new(messenger, &mut session, &card).await {
            error!(target = "deck.draw", key = %session.key(), error = %e, "failed to post drawn card; rolling back");
            *session = snapshot;
            return Err(e);
        }
        info!(target = "deck.draw", key = %session.key(), card = %card.name, remaining = session.deck.len(), "drew card");
        self.persist(&session).await;
        Ok(session.card(&card_id).cloned().unwrap_or(card))
    }

    /// Play a card: its message is removed and the card leaves the game.
    #[instrument(level = "debug", skip_all, fields(user_id = %user_id, channel_id = %channel_id, card_id = %card_id))]
    pub async fn play_card(
        &self,
        messenger: &dyn Messenger,
        user_id: UserId,
        channel_id: ChannelId,
        card_id: &CardId,
    ) -> Result<HandCard, DeckError> {
        let mut session = self.lock(user_id, channel_id).await?;
        let snapshot = session.clone();
        let card = session.play(card_id)?;
        if let Some(message_id) = card.message_id
            && let Err(e) = messenger.delete(channel_id, message_id).await
        {
            error!(target = "deck.play", key = %session.key(), error = %e, "failed to remove played card message; rolling back");
            *session = snapshot;
            return Err(e);
        }
        info!(target = "deck.play", key = %session.key(), card = %card.name, "played card");
        self.persist(&session).await;
        Ok(card)
    }

    /// Current hand in this channel, for `/hand`.
    pub async fn hand(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
    ) -> Result<Vec<HandCard>, DeckError> {
        let session = self.lock(user_id, channel_id).await?;
        Ok(session.hand.clone())
    }

    /// End one session; its record is deleted before it is forgotten.
    pub async fn end_session(
        &self,
        user_id: UserId,
        channel_id: ChannelId,
    ) -> Result<(), DeckError> {
        if self.store.remove(user_id, channel_id).await? {
            Ok(())
        } else {
            Err(DeckError::SessionNotFound)
        }
    }

    /// End several sessions; partial success is reported per channel.
    pub async fn end_sessions(&self, user_id: UserId, channel_ids: &[ChannelId]) -> RemoveReport {
        self.store.remove_multi(user_id, channel_ids).await
    }
}
