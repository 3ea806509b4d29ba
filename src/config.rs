//! Start-up configuration read from the environment (and `.env`, when present).
use crate::constants::{DEFAULT_CARD_IMAGES_DIR, DEFAULT_DECKS_DIR};
use crate::error::ConfigError;
use serenity::model::id::GuildId;
use std::env;
use std::path::PathBuf;

#[derive(Debug, Clone)]
pub struct Config {
    pub token: String,
    /// Register commands in this guild only; global registration when unset.
    pub guild_id: Option<GuildId>,
    pub decks_dir: PathBuf,
    pub card_images_dir: PathBuf,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    /// Build from an arbitrary variable source; blank values count as unset.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let var = |name: &str| lookup(name).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let token = var("DISCORD_TOKEN").ok_or(ConfigError::Missing("DISCORD_TOKEN"))?;
        let guild_id = match var("SERVER_ID") {
            Some(raw) => Some(
                raw.parse::<u64>()
                    .ok()
                    .filter(|id| *id != 0)
                    .map(GuildId::new)
                    .ok_or(ConfigError::Invalid {
                        name: "SERVER_ID",
                        value: raw,
                    })?,
            ),
            None => None,
        };
        Ok(Self {
            token,
            guild_id,
            decks_dir: var("DECKS_DIR").unwrap_or_else(|| DEFAULT_DECKS_DIR.to_string()).into(),
            card_images_dir: var("CARD_IMAGES_DIR")
                .unwrap_or_else(|| DEFAULT_CARD_IMAGES_DIR.to_string())
                .into(),
        })
    }
}
