//! Shared state stored in serenity's global `TypeMap`.
use crate::deck::{CardCatalog, DeckEngine, SessionStore};
use crate::services::DiscordMessenger;
use serenity::gateway::ShardManager;
use serenity::prelude::TypeMapKey;
use std::sync::Arc;

/// A container for the ShardManager, used by `/ping` to read gateway latency.
pub struct ShardManagerContainer;

impl TypeMapKey for ShardManagerContainer {
    type Value = Arc<ShardManager>;
}

/// The central, shared state of the bot.
/// An `Arc<AppState>` is inserted once at start-up and cloned out by every handler.
pub struct AppState {
    /// Runs every deck operation; owns the session store and card catalog.
    pub engine: Arc<DeckEngine>,
    /// Outbound card messages.
    pub messenger: Arc<DiscordMessenger>,
}

impl AppState {
    pub fn new(engine: Arc<DeckEngine>, messenger: Arc<DiscordMessenger>) -> Self {
        Self { engine, messenger }
    }

    pub async fn from_ctx(ctx: &serenity::prelude::Context) -> Option<Arc<Self>> {
        ctx.data.read().await.get::<AppState>().cloned()
    }

    pub fn store(&self) -> &Arc<SessionStore> {
        self.engine.store()
    }

    pub fn catalog(&self) -> &Arc<CardCatalog> {
        self.engine.catalog()
    }
}

impl TypeMapKey for AppState {
    type Value = Arc<AppState>;
}
