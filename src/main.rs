use std::sync::Arc;

use pikcards_bot::config::Config;
use pikcards_bot::deck::{CardCatalog, DeckEngine, SessionStore};
use pikcards_bot::handler::Handler;
use pikcards_bot::services::DiscordMessenger;
use pikcards_bot::{AppState, ShardManagerContainer};
use serenity::model::gateway::GatewayIntents;
use serenity::prelude::*;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() {
    // A missing .env is fine; the variables may come from the environment.
    if let Err(e) = dotenv::dotenv() {
        eprintln!("no .env loaded: {e}");
    }
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => {
            error!(error = %e, "invalid configuration");
            std::process::exit(1);
        }
    };

    let store = match SessionStore::load(&config.decks_dir).await {
        Ok(store) => Arc::new(store),
        Err(e) => {
            error!(error = %e, dir = %config.decks_dir.display(), "could not open session directory");
            std::process::exit(1);
        }
    };
    let catalog = Arc::new(CardCatalog::open(&config.card_images_dir).await);
    let engine = Arc::new(DeckEngine::new(store, catalog));

    // Interactions arrive without any privileged intent.
    let intents = GatewayIntents::GUILDS;

    let mut client = match Client::builder(&config.token, intents)
        .event_handler(Handler {
            guild_id: config.guild_id,
        })
        .await
    {
        Ok(client) => client,
        Err(e) => {
            error!(error = ?e, "error creating the Discord client");
            std::process::exit(1);
        }
    };

    let messenger = Arc::new(DiscordMessenger::new(client.http.clone()));
    let app_state = Arc::new(AppState::new(engine, messenger));
    {
        let mut data = client.data.write().await;
        data.insert::<ShardManagerContainer>(client.shard_manager.clone());
        data.insert::<AppState>(app_state);
    }

    info!("starting client");
    if let Err(why) = client.start().await {
        error!(error = ?why, "client error");
    }
}
